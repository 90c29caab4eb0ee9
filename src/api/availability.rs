//! # Vista pública de disponibilidad
//!
//! Único endpoint de lectura sin autenticación: expone las horas ocupadas de
//! una fecha para que el cliente elija hueco, sin ningún dato personal.

use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;

use super::AppResult;
use crate::db::MongoSlotStore;
use crate::service::ReservationService;

#[derive(Deserialize)]
struct AvailabilityQuery {
    date: Option<String>,
}

/// Horas ocupadas de una fecha
///
/// # Respuesta
///
/// ```json
/// { "date": "2024-06-01", "bookedTimes": ["13:00", "19:00"] }
/// ```
///
/// # Errores
///
/// - `400 Bad Request`: fecha ausente o fuera del formato YYYY-MM-DD
/// - `500 Internal Server Error`: error de base de datos
#[get("/availability")]
async fn availability(
    servicio: web::Data<ReservationService<MongoSlotStore>>,
    query: web::Query<AvailabilityQuery>,
) -> AppResult<impl Responder> {
    let disponibilidad = servicio.check_availability(query.date.as_deref()).await?;
    Ok(HttpResponse::Ok().json(disponibilidad))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(availability);
}
