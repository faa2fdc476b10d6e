//! Controlador de identidad
//!
//! Registro de clientes y owners, login con JWT y perfil del usuario
//! autenticado. La cuenta admin solo se crea desde el arranque.

use std::sync::Arc;

use bcrypt::{hash, verify};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::user::{normalize_email, User, UserResponse, UserRole};
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.repos.users.clone(),
            jwt: JwtConfig::from(&state.config),
            bcrypt_cost: state.config.bcrypt_cost,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let role = match UserRole::from_str(request.role.trim()) {
            Some(role @ (UserRole::Client | UserRole::Owner)) => role,
            _ => {
                return Err(AppError::BadRequest(
                    "Role must be 'client' or 'owner'".to_string(),
                ))
            }
        };

        let password_hash = self.hash_password(&request.password)?;
        let user = User::new(
            request.name.trim().to_string(),
            request.email,
            request.phone.filter(|p| !p.trim().is_empty()),
            password_hash,
            role,
        );

        let saved = self.users.create(&user).await?;
        info!("👤 Usuario registrado: {} ({})", saved.email, saved.role.as_str());

        Ok(ApiResponse::success_with_message(
            UserResponse::from(saved),
            "User registered successfully",
        ))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .users
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))?;
        if !valid {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let (token, expires_at) = generate_token(&user, &self.jwt)?;
        info!("🔐 Login exitoso: {}", user.email);

        Ok(LoginResponse {
            token,
            expires_at,
            user: UserResponse::from(user),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<ApiResponse<UserResponse>> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("User", &user_id.to_string()))?;

        Ok(ApiResponse::success(UserResponse::from(user)))
    }

    /// Crear la cuenta admin si todavía no existe. Devuelve `true` si la creó.
    pub async fn bootstrap_admin(&self, name: &str, email: &str, password: &str) -> AppResult<bool> {
        let email = normalize_email(email);
        if let Some(existing) = self.users.find_by_email(&email).await? {
            if existing.role != UserRole::Admin {
                return Err(AppError::Conflict(format!(
                    "User '{}' already exists with role '{}'",
                    email,
                    existing.role.as_str()
                )));
            }
            return Ok(false);
        }

        let admin = User::new(
            name.to_string(),
            email,
            None,
            self.hash_password(password)?,
            UserRole::Admin,
        );
        self.users.create(&admin).await?;
        info!("🛡️ Cuenta admin creada: {}", admin.email);
        Ok(true)
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        hash(password, self.bcrypt_cost).map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::utils::jwt::verify_token;

    fn controller() -> AuthController {
        let config = EnvironmentConfig {
            bcrypt_cost: 4,
            ..EnvironmentConfig::default()
        };
        let state = AppState::in_memory(config).unwrap();
        AuthController::new(&state)
    }

    fn register_request(email: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Carlos Pérez".to_string(),
            email: email.to_string(),
            password: "supersecreta".to_string(),
            role: role.to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let controller = controller();
        let response = controller
            .register(register_request("Carlos@Parkly.co", "client"))
            .await
            .unwrap();
        let user = response.data.unwrap();
        assert_eq!(user.email, "carlos@parkly.co");
        assert_eq!(user.role, UserRole::Client);

        let login = controller
            .login(LoginRequest {
                email: "carlos@parkly.co".to_string(),
                password: "supersecreta".to_string(),
            })
            .await
            .unwrap();
        let claims = verify_token(&login.token, &controller.jwt).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, UserRole::Client);
    }

    #[tokio::test]
    async fn test_register_admin_is_refused() {
        let err = controller()
            .register(register_request("root@parkly.co", "admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let controller = controller();
        controller
            .register(register_request("ana@parkly.co", "owner"))
            .await
            .unwrap();

        let err = controller
            .login(LoginRequest {
                email: "ana@parkly.co".to_string(),
                password: "otra-clave".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Invalid credentials");
    }

    #[tokio::test]
    async fn test_bootstrap_admin_once() {
        let controller = controller();
        assert!(controller
            .bootstrap_admin("Admin", "admin@parkly.co", "adminadmin")
            .await
            .unwrap());
        assert!(!controller
            .bootstrap_admin("Admin", "ADMIN@parkly.co", "adminadmin")
            .await
            .unwrap());
    }
}
