//! Services module
//!
//! Este módulo contiene la lógica de negocio que no depende del
//! almacenamiento: precios, filtros del catálogo, agregados del admin,
//! verificación de pagos y el chatbot.

pub mod analytics_service;
pub mod catalog_service;
pub mod chatbot_service;
pub mod payment_service;
pub mod pricing_service;

pub use chatbot_service::{ChatOutcome, ChatResponder, KeywordResponder, LlmResponder};
pub use payment_service::PaymentService;
