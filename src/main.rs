//! # Terraza Reservation Server
//!
//! Servidor de reservas de un único local construido con Rust, Actix Web y
//! MongoDB. Cada hueco (fecha, hora) admite como mucho una reserva viva; la
//! exclusividad la garantiza un índice único del almacén, también bajo
//! peticiones concurrentes.
//!
//! ## API
//!
//! - `GET /health` - comprobación de vida
//! - `GET /availability?date=YYYY-MM-DD` - horas ocupadas, sin datos personales
//! - `POST /reservations` - alta pública de una reserva
//! - `POST /admin/login` - credencial del operador
//! - `GET /reservations[?date=]` - listado completo (solo operador)
//! - `DELETE /reservations/{id}` - cancelación (solo operador)
//!
//! ## Configuración
//!
//! Variables de entorno (archivo `.env`):
//!
//! ```env
//! # Base de datos MongoDB
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=terraza_reservation
//!
//! # Servidor
//! BIND_ADDRESS=0.0.0.0:3001
//!
//! # Operador
//! ADMIN_USER=admin
//! ADMIN_PASS=cambiame
//! JWT_SECRET=clave-larga-y-aleatoria
//!
//! # Logging
//! RUST_LOG=debug,mongodb=info
//! ```

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::env;

mod api;
mod db;
mod service;

use api::auth::AccessGate;
use api::AppError;
use db::MongoSlotStore;
use service::ReservationService;

/// Arranca el servidor: entorno, logging, conexión a MongoDB, índices y HTTP
///
/// # Errores
///
/// Retorna `std::io::Error` si:
/// - No se puede conectar a MongoDB
/// - No se pueden crear los índices (el índice único de hueco es obligatorio)
/// - No se puede bindear al puerto especificado
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Configurar sistema de logging con tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("terraza_reservation=debug".parse().unwrap())
                .add_directive("mongodb=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Iniciando Terraza Reservation Server...");

    let store = match MongoSlotStore::init().await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Error conectando a MongoDB: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Error de MongoDB: {}", e),
            ));
        }
    };

    // El índice único sobre (date, time) sostiene la exclusividad de hueco:
    // sin él no se arranca.
    if let Err(e) = store.ensure_indexes().await {
        tracing::error!("Error creando índices: {}", e);
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Error de índices: {}", e),
        ));
    }

    let gate = AccessGate::from_env();
    let servicio = ReservationService::new(store);

    let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".to_string());

    tracing::info!("Servidor iniciando en {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(servicio.clone()))
            .app_data(web::Data::new(gate.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::warn!(error = %err, "Cuerpo JSON rechazado");
                AppError::validation(&["body"]).into()
            }))
            .wrap(Logger::default())
            .configure(api::init_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
