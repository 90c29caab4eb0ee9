use serde::{Deserialize, Serialize};

/// Reserva de un hueco (fecha, hora) del local.
///
/// Es el documento persistido en la colección `reservations` y a la vez la
/// forma que viaja al frontend, por eso los nombres de campo siguen el
/// contrato JSON del cliente (`createdAt` incluido).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reserva {
    /// Identificador numérico creciente asignado por el almacén
    pub id: i64,
    /// Nombre del cliente, nunca vacío
    pub name: String,
    pub phone: Option<String>,
    /// Fecha en formato canónico YYYY-MM-DD
    pub date: String,
    /// Hora en formato canónico HH:MM
    pub time: String,
    /// Número de comensales, entre 1 y 50
    pub people: i32,
    pub notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64, // timestamp unix
}
