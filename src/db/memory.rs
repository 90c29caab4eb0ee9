//! Doble de pruebas del almacén: misma semántica de exclusividad, en memoria.
//!
//! El comprobar-e-insertar de `create` ocurre bajo un único candado, que es
//! la restricción nativa de este motor, igual que el índice único lo es del
//! de MongoDB. Cada prueba crea su propio `MemStore` aislado.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::models::Reserva;
use super::store::{NuevaReserva, SlotStore, StoreError};

#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<Estado>>,
}

#[derive(Default)]
struct Estado {
    seq: i64,
    filas: Vec<Reserva>,
}

#[async_trait]
impl SlotStore for MemStore {
    async fn create(&self, datos: NuevaReserva) -> Result<Reserva, StoreError> {
        let mut estado = self.inner.lock().unwrap();

        if estado
            .filas
            .iter()
            .any(|r| r.date == datos.date && r.time == datos.time)
        {
            return Err(StoreError::Conflict);
        }

        estado.seq += 1;
        let reserva = Reserva {
            id: estado.seq,
            name: datos.name,
            phone: datos.phone,
            date: datos.date,
            time: datos.time,
            people: datos.people,
            notes: datos.notes,
            created_at: chrono::Utc::now().timestamp(),
        };
        estado.filas.push(reserva.clone());

        Ok(reserva)
    }

    async fn list_by_date(&self, date: &str) -> Result<Vec<Reserva>, StoreError> {
        let estado = self.inner.lock().unwrap();
        let mut filas: Vec<Reserva> = estado
            .filas
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect();
        filas.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        Ok(filas)
    }

    async fn list_all(&self) -> Result<Vec<Reserva>, StoreError> {
        let estado = self.inner.lock().unwrap();
        let mut filas = estado.filas.clone();
        filas.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.time.cmp(&a.time))
                .then(b.id.cmp(&a.id))
        });
        Ok(filas)
    }

    async fn occupied_times(&self, date: &str) -> Result<Vec<String>, StoreError> {
        let estado = self.inner.lock().unwrap();
        let mut horas: Vec<String> = estado
            .filas
            .iter()
            .filter(|r| r.date == date)
            .map(|r| r.time.clone())
            .collect();
        horas.sort();
        Ok(horas)
    }

    async fn get(&self, id: i64) -> Result<Reserva, StoreError> {
        let estado = self.inner.lock().unwrap();
        estado
            .filas
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut estado = self.inner.lock().unwrap();
        let antes = estado.filas.len();
        estado.filas.retain(|r| r.id != id);
        if estado.filas.len() == antes {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nueva(date: &str, time: &str) -> NuevaReserva {
        NuevaReserva {
            name: "Ana".to_string(),
            phone: None,
            date: date.to_string(),
            time: time.to_string(),
            people: 2,
            notes: None,
        }
    }

    #[tokio::test]
    async fn asigna_ids_crecientes_y_recupera_por_id() {
        let store = MemStore::default();

        let a = store.create(nueva("2024-06-01", "19:00")).await.unwrap();
        let b = store.create(nueva("2024-06-01", "20:00")).await.unwrap();
        assert!(b.id > a.id);

        assert_eq!(store.get(a.id).await.unwrap().time, "19:00");

        store.delete(a.id).await.unwrap();
        assert!(matches!(store.get(a.id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn ordena_los_listados_como_el_almacen_real() {
        let store = MemStore::default();
        store.create(nueva("2024-06-02", "13:00")).await.unwrap();
        store.create(nueva("2024-06-01", "21:00")).await.unwrap();
        store.create(nueva("2024-06-01", "12:00")).await.unwrap();

        let dia: Vec<String> = store
            .list_by_date("2024-06-01")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.time)
            .collect();
        assert_eq!(dia, vec!["12:00", "21:00"]);

        let todas: Vec<(String, String)> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.date, r.time))
            .collect();
        assert_eq!(
            todas,
            vec![
                ("2024-06-02".to_string(), "13:00".to_string()),
                ("2024-06-01".to_string(), "21:00".to_string()),
                ("2024-06-01".to_string(), "12:00".to_string()),
            ]
        );
    }
}
