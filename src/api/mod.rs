//! # Módulo API
//!
//! Rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`auth`] - Puerta de acceso del operador (login, verificación de token)
//! - [`availability`] - Vista pública de ocupación por fecha
//! - [`reservation`] - Alta, listado y cancelación de reservas
//! - [`errors`] - Manejo de errores de la aplicación

pub mod auth;
pub mod availability;
pub mod errors;
pub mod reservation;

// Re-exportar tipos comunes para facilitar su uso
pub use errors::{AppError, AppResult, ErrorResponse};

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

/// Comprobación de vida del servidor
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// Configura todas las rutas de la API
///
/// ## Rutas configuradas
///
/// - `GET /health`
/// - `POST /admin/login` - Ver [`auth::routes`]
/// - `GET /availability` - Ver [`availability::routes`]
/// - `/reservations/*` - Ver [`reservation::routes`]
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
    auth::routes(cfg);
    availability::routes(cfg);
    reservation::routes(cfg);
}
