//! # Manejo de errores de la aplicación
//!
//! Un único enum de dominio con `thiserror`; la capa HTTP despacha siempre
//! por variante, nunca inspeccionando el texto del mensaje.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::db::StoreError;

/// Tipos de error de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Entrada inválida del cliente: lista los campos ausentes o mal formados
    #[error("Campos inválidos o ausentes: {}", .fields.join(", "))]
    Validation { fields: Vec<String> },

    /// El hueco (fecha, hora) ya tiene una reserva viva.
    ///
    /// Es un resultado legítimo del negocio: el cliente debe elegir otro
    /// horario, no reintentar el mismo.
    #[error("El horario {time} del {date} ya está reservado")]
    SlotTaken { date: String, time: String },

    /// Recurso inexistente
    #[error("No encontrado: {0}")]
    NotFound(String),

    /// Credencial ausente, malformada o rechazada por la puerta de acceso
    #[error("No autorizado: {0}")]
    Unauthorized(String),

    /// Fallo de almacenamiento; opaco para el cliente
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Database {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error interno no atribuible al almacén
    #[error("Error interno: {0}")]
    Internal(String),
}

impl AppError {
    /// Crea un error de validación a partir de los nombres de campo afectados
    pub fn validation(fields: &[&str]) -> Self {
        Self::Validation {
            fields: fields.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            // Un conflicto solo puede nacer en create, que lo traduce a
            // SlotTaken con su (fecha, hora) antes de llegar aquí.
            StoreError::Conflict => {
                Self::Internal("conflicto de hueco fuera de una creación".to_string())
            }
            StoreError::NotFound => Self::NotFound("No existe esa reserva".to_string()),
            StoreError::Backend { operation, source } => Self::Database { operation, source },
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        // Log estructurado del error antes de responder
        match self {
            Self::Validation { fields } => {
                tracing::warn!(fields = ?fields, "Validation error");
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Datos inválidos".to_string(),
                    message: self.to_string(),
                    fields: Some(fields.clone()),
                })
            }
            Self::SlotTaken { date, time } => {
                tracing::info!(date = %date, time = %time, "Slot already taken");
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Horario ocupado".to_string(),
                    message: self.to_string(),
                    fields: None,
                })
            }
            Self::NotFound(_) => {
                tracing::info!(message = %self, "Resource not found");
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "No encontrado".to_string(),
                    message: self.to_string(),
                    fields: None,
                })
            }
            Self::Unauthorized(_) => {
                tracing::warn!(message = %self, "Unauthorized access attempt");
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "No autorizado".to_string(),
                    message: self.to_string(),
                    fields: None,
                })
            }
            Self::Database { operation, source } => {
                tracing::error!(
                    operation = %operation,
                    error = %source,
                    "Database error occurred"
                );
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error de base de datos".to_string(),
                    message: "Error interno del servidor".to_string(),
                    fields: None,
                })
            }
            Self::Internal(message) => {
                tracing::error!(message = %message, "Internal error");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error interno".to_string(),
                    message: "Error interno del servidor".to_string(),
                    fields: None,
                })
            }
        }
    }
}

/// Cuerpo JSON de cualquier respuesta de error
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

pub type AppResult<T> = Result<T, AppError>;
