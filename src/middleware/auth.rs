//! Middleware de autenticación JWT
//!
//! Este módulo valida el bearer token, comprueba que el usuario siga
//! existiendo y lo inyecta en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::user::UserRole,
    state::AppState,
    utils::{
        errors::{forbidden_error, AppError, AppResult},
        jwt::{extract_token_from_header, verify_token, JwtConfig},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Exigir un rol concreto para la operación
    pub fn require_role(&self, role: UserRole, operation: &str) -> AppResult<()> {
        if self.role != role {
            return Err(forbidden_error(
                operation,
                &format!("requires role '{}'", role.as_str()),
            ));
        }
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(header_value)?;
    let claims = verify_token(token, &JwtConfig::from(&state.config))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

    // El token puede sobrevivir al usuario
    let user = state
        .repos
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    debug!("🔑 Usuario autenticado: {} ({})", user.email, user.role.as_str());

    request.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Middleware para verificar permisos de admin
pub async fn admin_only_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Administrator role required".to_string()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            name: "Laura".to_string(),
            email: "laura@parkly.co".to_string(),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(user(UserRole::Client).require_role(UserRole::Client, "book").is_ok());

        let err = user(UserRole::Owner)
            .require_role(UserRole::Client, "book")
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(err.to_string().contains("client"));
    }

    #[test]
    fn test_is_admin() {
        assert!(user(UserRole::Admin).is_admin());
        assert!(!user(UserRole::Owner).is_admin());
    }
}
