//! # Endpoints de reservas
//!
//! - Alta pública de una reserva (`POST /reservations`)
//! - Listado completo para administración (`GET /reservations`)
//! - Cancelación por id (`DELETE /reservations/{id}`)
//!
//! Las dos últimas exigen credencial de administrador; el alta es pública.

use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use super::auth::{require_admin, AccessGate};
use super::AppResult;
use crate::db::MongoSlotStore;
use crate::service::{ReservationService, SolicitudReserva};

type Servicio = web::Data<ReservationService<MongoSlotStore>>;

#[derive(Deserialize)]
struct ReservationQuery {
    /// Filtrar por fecha concreta (formato YYYY-MM-DD)
    date: Option<String>,
}

/// Crea una reserva para un hueco (fecha, hora)
///
/// # Validaciones
///
/// - `name` presente y no vacío tras recortar
/// - `date` en formato canónico YYYY-MM-DD
/// - `time` en formato canónico HH:MM
/// - `people` entero entre 1 y 50, ambos incluidos
///
/// # Respuesta
///
/// `201 Created` con la reserva completa, id y `createdAt` incluidos.
///
/// # Errores
///
/// - `400 Bad Request`: campos ausentes o mal formados (se listan todos)
/// - `409 Conflict`: el hueco ya tiene una reserva viva
/// - `500 Internal Server Error`: error de base de datos
#[post("/reservations")]
async fn create_reservation(
    servicio: Servicio,
    data: web::Json<SolicitudReserva>,
) -> AppResult<impl Responder> {
    let reserva = servicio.book(data.into_inner()).await?;

    tracing::info!(
        id = reserva.id,
        date = %reserva.date,
        time = %reserva.time,
        "Reserva creada"
    );

    Ok(HttpResponse::Created().json(reserva))
}

/// Listado de reservas para el operador, con filtro opcional por fecha
///
/// Sin fecha devuelve todas las reservas ordenadas de más reciente a más
/// antigua; con fecha, las de ese día por hora ascendente. No se redacta
/// ningún campo: este endpoint está detrás de la puerta de acceso.
///
/// # Errores
///
/// - `400 Bad Request`: fecha fuera del formato YYYY-MM-DD
/// - `401 Unauthorized`: credencial ausente o inválida
/// - `500 Internal Server Error`: error de base de datos
#[get("/reservations")]
async fn list_reservations(
    servicio: Servicio,
    gate: web::Data<AccessGate>,
    query: web::Query<ReservationQuery>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    require_admin(gate.get_ref(), &req)?;

    let reservas = servicio.list_for_admin(query.date.as_deref()).await?;
    Ok(HttpResponse::Ok().json(reservas))
}

/// Cancela una reserva por id, liberando el hueco al instante
///
/// El borrado es definitivo; cancelar un id ya cancelado responde `404`,
/// de modo que el operador distingue "borrada ahora" de "ya no existía".
///
/// # Errores
///
/// - `401 Unauthorized`: credencial ausente o inválida
/// - `404 Not Found`: no existe reserva con ese id
/// - `500 Internal Server Error`: error de base de datos
#[delete("/reservations/{id}")]
async fn delete_reservation(
    servicio: Servicio,
    gate: web::Data<AccessGate>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    require_admin(gate.get_ref(), &req)?;

    let id = path.into_inner();
    servicio.cancel(id).await?;

    tracing::info!(id, "Reserva cancelada");
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_reservation);
    cfg.service(list_reservations);
    cfg.service(delete_reservation);
}
