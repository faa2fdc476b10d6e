//! Controladores
//!
//! Cada controlador se construye desde el `AppState` en el handler y
//! delega en los repositorios y servicios.

pub mod admin_controller;
pub mod auth_controller;
pub mod chat_controller;
pub mod reservation_controller;
pub mod spot_controller;
pub mod spot_request_controller;
