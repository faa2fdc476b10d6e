//! DTOs de entrada y salida de la API

pub mod admin_dto;
pub mod api_response;
pub mod auth_dto;
pub mod chat_dto;
pub mod reservation_dto;
pub mod spot_dto;
pub mod spot_request_dto;
