//! Middleware de Rate Limiting
//!
//! Ventana fija por IP. Login/registro y el chatbot usan contadores
//! separados, así que el tráfico del chat no agota el cupo de login.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::EnvironmentConfig;
use crate::utils::errors::AppError;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

/// Contadores por IP compartidos entre requests
#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
    trust_forwarded_for: bool,
}

impl RateLimitState {
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self::with_limits(config.rate_limit_requests, Duration::from_secs(config.rate_limit_window))
            .trust_forwarded_for(config.trust_proxy_headers)
    }

    pub fn with_limits(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window_duration,
            trust_forwarded_for: false,
        }
    }

    /// Usar `x-forwarded-for` como IP del cliente (solo detrás de un proxy propio)
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    /// IP del cliente: la del proxy si se confía en él, si no la del socket
    pub fn client_ip(&self, request: &Request) -> String {
        let forwarded = self
            .trust_forwarded_for
            .then(|| {
                request
                    .headers()
                    .get("x-forwarded-for")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|h| h.split(',').next())
                    .map(|ip| ip.trim().to_string())
                    .filter(|ip| !ip.is_empty())
            })
            .flatten();

        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }

    /// Registrar una request de `ip`; falla si ya agotó la ventana
    pub async fn check_rate_limit(&self, ip: &str) -> Result<(), AppError> {
        let mut requests = self.requests.write().await;
        let now = Instant::now();

        requests.retain(|_, info| now.duration_since(info.window_start) < self.window_duration);

        let info = requests.entry(ip.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        if info.requests >= self.max_requests {
            warn!("🚦 Límite de requests alcanzado para {}", ip);
            return Err(AppError::RateLimitExceeded);
        }

        info.requests += 1;
        Ok(())
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = limiter.client_ip(&request);
    limiter.check_rate_limit(&ip).await?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_from(peer: Option<&str>, forwarded_for: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/login");
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if let Some(peer) = peer {
            let addr: SocketAddr = peer.parse().unwrap();
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[test]
    fn test_client_ip_ignores_forwarded_for_by_default() {
        let limiter = RateLimitState::with_limits(5, Duration::from_secs(60));

        let request = request_from(Some("192.168.1.7:51000"), Some("1.2.3.4"));
        assert_eq!(limiter.client_ip(&request), "192.168.1.7");

        let request = request_from(None, Some("1.2.3.4"));
        assert_eq!(limiter.client_ip(&request), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_client_ip_behind_trusted_proxy() {
        let limiter = RateLimitState::with_limits(5, Duration::from_secs(60)).trust_forwarded_for(true);

        let request = request_from(Some("10.0.0.1:443"), Some("1.2.3.4, 10.0.0.1"));
        assert_eq!(limiter.client_ip(&request), "1.2.3.4");

        // Sin cabecera se usa el socket
        let request = request_from(Some("10.0.0.1:443"), None);
        assert_eq!(limiter.client_ip(&request), "10.0.0.1");
    }

    #[tokio::test]
    async fn test_limit_per_ip() {
        let limiter = RateLimitState::with_limits(2, Duration::from_secs(60));

        assert!(limiter.check_rate_limit("10.0.0.1").await.is_ok());
        assert!(limiter.check_rate_limit("10.0.0.1").await.is_ok());
        assert!(matches!(
            limiter.check_rate_limit("10.0.0.1").await,
            Err(AppError::RateLimitExceeded)
        ));

        // Otra IP tiene su propia ventana
        assert!(limiter.check_rate_limit("10.0.0.2").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_expires() {
        let limiter = RateLimitState::with_limits(1, Duration::from_millis(20));
        assert!(limiter.check_rate_limit("ip").await.is_ok());
        assert!(limiter.check_rate_limit("ip").await.is_err());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.check_rate_limit("ip").await.is_ok());
    }
}
