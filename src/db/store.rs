//! Contrato del almacén de huecos.
//!
//! El almacén es el único dueño de los registros de reserva y el único
//! árbitro de la exclusividad por hueco: la comprobación de unicidad de
//! `create` la aplica el propio motor de almacenamiento (índice único),
//! nunca un leer-y-escribir a nivel de aplicación.

use async_trait::async_trait;
use thiserror::Error;

use super::models::Reserva;

/// Campos de una reserva antes de persistirla.
///
/// El `id` y el `createdAt` no aparecen aquí: los asigna el almacén al crear.
#[derive(Debug, Clone)]
pub struct NuevaReserva {
    pub name: String,
    pub phone: Option<String>,
    pub date: String,
    pub time: String,
    pub people: i32,
    pub notes: Option<String>,
}

/// Resultados con error propios del almacén
#[derive(Error, Debug)]
pub enum StoreError {
    /// El hueco (fecha, hora) ya está ocupado. Es un resultado esperado del
    /// negocio, no un fallo de infraestructura.
    #[error("el hueco ya está reservado")]
    Conflict,

    /// No existe ninguna reserva con ese id
    #[error("reserva no encontrada")]
    NotFound,

    /// Fallo de infraestructura, fatal para la petición en curso
    #[error("error de base de datos en operación '{operation}': {source}")]
    Backend {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Crea un error de infraestructura con el nombre de la operación
    pub fn backend(
        operation: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            operation: operation.to_string(),
            source: source.into(),
        }
    }
}

/// Operaciones del almacén de reservas.
///
/// Hay dos implementaciones: [`super::MongoSlotStore`] en producción y un
/// doble en memoria para las pruebas del servicio.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Persiste una reserva nueva con id y `createdAt` recién asignados.
    ///
    /// La comprobación de hueco libre y la inserción son una sola operación
    /// atómica para cualquier otra llamada concurrente: de N intentos sobre
    /// el mismo (fecha, hora) gana exactamente uno y el resto recibe
    /// [`StoreError::Conflict`].
    async fn create(&self, datos: NuevaReserva) -> Result<Reserva, StoreError>;

    /// Reservas de una fecha, por hora ascendente (empates por id ascendente)
    async fn list_by_date(&self, date: &str) -> Result<Vec<Reserva>, StoreError>;

    /// Todas las reservas, por fecha descendente, hora descendente, id descendente
    async fn list_all(&self) -> Result<Vec<Reserva>, StoreError>;

    /// Horas ocupadas de una fecha, ascendentes. Es la única lectura que
    /// alimenta la vista pública y no saca ningún dato personal del almacén.
    async fn occupied_times(&self, date: &str) -> Result<Vec<String>, StoreError>;

    /// Recupera una reserva por id
    async fn get(&self, id: i64) -> Result<Reserva, StoreError>;

    /// Borra una reserva por id. Borrar un id inexistente devuelve
    /// [`StoreError::NotFound`], nunca se ignora en silencio.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
