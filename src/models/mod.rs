//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL de `migrations/`.

pub mod analytics;
pub mod chat;
pub mod notification;
pub mod reservation;
pub mod review;
pub mod spot;
pub mod spot_request;
pub mod user;
