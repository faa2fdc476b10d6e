use serde::{Deserialize, Serialize};

use crate::dto::spot_dto::OwnerSpotResponse;
use crate::models::notification::OwnerNotification;
use crate::models::spot_request::SpotRequest;
use crate::repositories::Decision;

// Filtro de texto para los listados del admin
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    /// Término normalizado, `None` si está vacío
    pub fn term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
    }
}

/// Resultado de aprobar o rechazar una solicitud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub request: SpotRequest,
    pub spot: Option<OwnerSpotResponse>,
    pub notification: OwnerNotification,
}

impl From<Decision> for DecisionResponse {
    fn from(decision: Decision) -> Self {
        Self {
            request: decision.request,
            spot: decision.spot.map(OwnerSpotResponse::from),
            notification: decision.notification,
        }
    }
}
