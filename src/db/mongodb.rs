//! Implementación MongoDB del almacén de huecos.
//!
//! La exclusividad por (fecha, hora) la sostiene un índice único compuesto;
//! `create` inserta sin consulta previa y traduce el error de clave duplicada
//! (código 11000) a [`StoreError::Conflict`]. Los ids numéricos crecientes
//! salen de la colección `counters` con un `$inc` atómico.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use std::env;

use super::models::Reserva;
use super::store::{NuevaReserva, SlotStore, StoreError};

/// Documento de la colección `counters` para asignar ids crecientes
#[derive(Debug, Serialize, Deserialize)]
struct Contador {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

/// Proyección mínima para la vista pública de disponibilidad
#[derive(Debug, Deserialize)]
struct SoloHora {
    time: String,
}

#[derive(Debug, Clone)]
pub struct MongoSlotStore {
    pub client: Client,
    pub database: Database,
}

/// Código de clave duplicada de MongoDB (violación de índice único)
const CLAVE_DUPLICADA: i32 = 11000;

fn es_clave_duplicada(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == CLAVE_DUPLICADA
    )
}

impl MongoSlotStore {
    /// Abre la conexión usando `MONGODB_URI` y `MONGODB_DATABASE`
    pub async fn init() -> Result<MongoSlotStore, StoreError> {
        let mongo_uri =
            env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let client = Client::with_uri_str(&mongo_uri)
            .await
            .map_err(|e| StoreError::backend("connect", e))?;

        let database_name =
            env::var("MONGODB_DATABASE").unwrap_or_else(|_| "terraza_reservation".to_string());

        let database = client.database(&database_name);

        // Test connection
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::backend("ping", e))?;

        tracing::info!("Conexión a MongoDB establecida exitosamente");

        Ok(MongoSlotStore { client, database })
    }

    fn reservas(&self) -> Collection<Reserva> {
        self.database.collection("reservations")
    }

    fn contadores(&self) -> Collection<Contador> {
        self.database.collection("counters")
    }

    /// Crea los índices de los que depende el almacén.
    ///
    /// El índice único sobre (date, time) es quien garantiza que un hueco
    /// solo admite una reserva viva; sin él el servidor no debe arrancar.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let indices = vec![
            IndexModel::builder()
                .keys(doc! { "date": 1, "time": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        ];

        self.reservas()
            .create_indexes(indices)
            .await
            .map_err(|e| StoreError::backend("create_indexes", e))?;

        tracing::info!("Índices de reservas creados exitosamente");
        Ok(())
    }

    /// Siguiente id de reserva, vía `$inc` atómico sobre un contador.
    ///
    /// Los ids son crecientes pero no necesariamente densos: un intento que
    /// acaba en conflicto de hueco consume igualmente su número.
    async fn next_id(&self) -> Result<i64, StoreError> {
        let contador = self
            .contadores()
            .find_one_and_update(doc! { "_id": "reservations" }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| StoreError::backend("next_id", e))?;

        contador
            .map(|c| c.seq)
            .ok_or_else(|| StoreError::backend("next_id", "el upsert no devolvió el contador"))
    }

    /// Timestamp unix actual, en segundos
    pub fn current_timestamp() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[async_trait]
impl SlotStore for MongoSlotStore {
    async fn create(&self, datos: NuevaReserva) -> Result<Reserva, StoreError> {
        let reserva = Reserva {
            id: self.next_id().await?,
            name: datos.name,
            phone: datos.phone,
            date: datos.date,
            time: datos.time,
            people: datos.people,
            notes: datos.notes,
            created_at: Self::current_timestamp(),
        };

        // Sin consulta previa: el índice único decide el ganador entre
        // inserciones concurrentes sobre el mismo hueco.
        match self.reservas().insert_one(&reserva).await {
            Ok(_) => Ok(reserva),
            Err(e) if es_clave_duplicada(&e) => Err(StoreError::Conflict),
            Err(e) => Err(StoreError::backend("create_reservation", e)),
        }
    }

    async fn list_by_date(&self, date: &str) -> Result<Vec<Reserva>, StoreError> {
        let mut cursor = self
            .reservas()
            .find(doc! { "date": date })
            .sort(doc! { "time": 1, "id": 1 })
            .await
            .map_err(|e| StoreError::backend("list_by_date", e))?;

        let mut resultados = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| StoreError::backend("list_by_date", e))?
        {
            resultados.push(
                cursor
                    .deserialize_current()
                    .map_err(|e| StoreError::backend("list_by_date", e))?,
            );
        }

        Ok(resultados)
    }

    async fn list_all(&self) -> Result<Vec<Reserva>, StoreError> {
        let mut cursor = self
            .reservas()
            .find(doc! {})
            .sort(doc! { "date": -1, "time": -1, "id": -1 })
            .await
            .map_err(|e| StoreError::backend("list_all", e))?;

        let mut resultados = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| StoreError::backend("list_all", e))?
        {
            resultados.push(
                cursor
                    .deserialize_current()
                    .map_err(|e| StoreError::backend("list_all", e))?,
            );
        }

        Ok(resultados)
    }

    async fn occupied_times(&self, date: &str) -> Result<Vec<String>, StoreError> {
        // La proyección se queda solo con la hora: nombre, teléfono y notas
        // no salen del almacén por esta vía.
        let mut cursor = self
            .reservas()
            .clone_with_type::<SoloHora>()
            .find(doc! { "date": date })
            .projection(doc! { "time": 1, "_id": 0 })
            .sort(doc! { "time": 1 })
            .await
            .map_err(|e| StoreError::backend("occupied_times", e))?;

        let mut horas = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| StoreError::backend("occupied_times", e))?
        {
            horas.push(
                cursor
                    .deserialize_current()
                    .map_err(|e| StoreError::backend("occupied_times", e))?
                    .time,
            );
        }

        Ok(horas)
    }

    async fn get(&self, id: i64) -> Result<Reserva, StoreError> {
        self.reservas()
            .find_one(doc! { "id": id })
            .await
            .map_err(|e| StoreError::backend("get_reservation", e))?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let resultado = self
            .reservas()
            .delete_one(doc! { "id": id })
            .await
            .map_err(|e| StoreError::backend("delete_reservation", e))?;

        // delete_one es atómico: de dos cancelaciones concurrentes del mismo
        // id, exactamente una ve deleted_count == 1.
        if resultado.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
