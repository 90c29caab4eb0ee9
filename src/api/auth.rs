//! # Puerta de acceso del operador
//!
//! Emite y verifica la credencial que protege las operaciones de
//! administración. El operador se configura por variables de entorno
//! (`ADMIN_USER`, `ADMIN_PASS`) y la credencial es un JWT HS256 firmado con
//! `JWT_SECRET`, con caducidad de 8 horas. El resto de la aplicación solo ve
//! el [`AuthContext`] resultante, nunca el token.

use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;

use super::{AppError, AppResult};

/// Rol dentro del contexto de autorización.
///
/// Hoy solo existe `Admin`; el enum deja sitio para añadir roles sin tocar
/// la puerta ni los handlers que la consumen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Admin,
}

/// Contexto autorizado que reciben los handlers tras verificar la credencial
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub role: Rol,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Rol::Admin
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    role: Rol,
    exp: i64,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

/// Identidad del operador y clave de firma de la credencial
#[derive(Clone)]
pub struct AccessGate {
    admin_user: String,
    admin_pass: String,
    secret: String,
}

impl AccessGate {
    pub fn new(admin_user: &str, admin_pass: &str, secret: &str) -> AccessGate {
        AccessGate {
            admin_user: admin_user.to_string(),
            admin_pass: admin_pass.to_string(),
            secret: secret.to_string(),
        }
    }

    /// Lee `ADMIN_USER`, `ADMIN_PASS` y `JWT_SECRET` del entorno.
    ///
    /// Los valores pueden faltar al arrancar; en ese caso la puerta rechaza
    /// todo intento con error de configuración, como hace el login cuando
    /// falta el secreto.
    pub fn from_env() -> AccessGate {
        AccessGate::new(
            &env::var("ADMIN_USER").unwrap_or_default(),
            &env::var("ADMIN_PASS").unwrap_or_default(),
            &env::var("JWT_SECRET").unwrap_or_default(),
        )
    }

    /// Emite una credencial de administrador si usuario y contraseña
    /// coinciden con la identidad configurada
    pub fn issue(&self, username: &str, password: &str) -> AppResult<String> {
        if self.admin_user.is_empty()
            || username != self.admin_user
            || password != self.admin_pass
        {
            return Err(AppError::Unauthorized(
                "Nombre o contraseña incorrectos".to_string(),
            ));
        }

        if self.secret.is_empty() {
            return Err(AppError::Internal("JWT_SECRET sin configurar".to_string()));
        }

        let claims = Claims {
            role: Rol::Admin,
            exp: (Utc::now() + Duration::hours(8)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Error firmando token: {}", e)))
    }

    /// Verifica una credencial presentada y devuelve su contexto autorizado
    pub fn verify(&self, token: &str) -> AppResult<AuthContext> {
        if self.secret.is_empty() {
            return Err(AppError::Internal("JWT_SECRET sin configurar".to_string()));
        }

        let datos = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;

        Ok(AuthContext {
            role: datos.claims.role,
        })
    }
}

/// Extrae el token Bearer del header Authorization
fn extract_token(req: &HttpRequest) -> AppResult<String> {
    let auth_header = req
        .headers()
        .get("authorization")
        .ok_or(AppError::Unauthorized(
            "Falta header Authorization".to_string(),
        ))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Header Authorization inválido".to_string()))?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::Unauthorized(
            "Formato de token inválido".to_string(),
        ));
    }

    Ok(auth_str[7..].to_string())
}

/// Verifica la credencial de la petición y exige rol de administrador.
///
/// Todos los handlers protegidos pasan por aquí antes de tocar el servicio.
pub fn require_admin(gate: &AccessGate, req: &HttpRequest) -> AppResult<AuthContext> {
    let token = extract_token(req)?;
    let ctx = gate.verify(&token)?;

    if !ctx.is_admin() {
        return Err(AppError::Unauthorized(
            "Se requiere rol de administrador".to_string(),
        ));
    }

    Ok(ctx)
}

/// Login del operador: credenciales correctas -> token Bearer
///
/// # Respuesta
///
/// ```json
/// { "token": "eyJhbGciOi..." }
/// ```
///
/// # Errores
///
/// - `400 Bad Request`: falta usuario o contraseña
/// - `401 Unauthorized`: credenciales incorrectas
/// - `500 Internal Server Error`: `JWT_SECRET` sin configurar
#[post("/admin/login")]
async fn admin_login(
    gate: web::Data<AccessGate>,
    data: web::Json<LoginRequest>,
) -> AppResult<impl Responder> {
    let mut campos: Vec<&str> = Vec::new();
    let username = data.username.as_deref().unwrap_or_default();
    let password = data.password.as_deref().unwrap_or_default();

    if username.is_empty() {
        campos.push("username");
    }
    if password.is_empty() {
        campos.push("password");
    }
    if !campos.is_empty() {
        return Err(AppError::validation(&campos));
    }

    let token = gate.issue(username, password)?;
    tracing::info!("Login de administrador correcto");

    Ok(HttpResponse::Ok().json(json!({ "token": token })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(admin_login);
}
