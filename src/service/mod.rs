//! # Servicio de reservas
//!
//! Orquesta las cuatro operaciones de dominio contra el almacén de huecos:
//! consultar disponibilidad, reservar, listar para administración y cancelar.
//! Aquí vive toda la validación de entrada y la traducción de errores del
//! almacén a errores de dominio; el servicio no guarda ningún estado entre
//! llamadas.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::{AppError, AppResult};
use crate::db::{NuevaReserva, Reserva, SlotStore, StoreError};

/// Petición de reserva tal y como llega del cliente.
///
/// Todos los campos son opcionales para que sea el servicio, y no el
/// deserializador, quien decida qué falta y lo reporte campo a campo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolicitudReserva {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub people: Option<i32>,
    pub notes: Option<String>,
}

/// Vista pública de ocupación de una fecha.
///
/// Solo fecha y horas: nombre, teléfono y notas no aparecen nunca aquí.
#[derive(Debug, Serialize)]
pub struct Disponibilidad {
    pub date: String,
    #[serde(rename = "bookedTimes")]
    pub booked_times: Vec<String>,
}

/// `true` si el valor está en forma canónica YYYY-MM-DD (cero-relleno incluido)
fn fecha_canonica(valor: &str) -> bool {
    NaiveDate::parse_from_str(valor, "%Y-%m-%d")
        .map(|f| f.format("%Y-%m-%d").to_string() == valor)
        .unwrap_or(false)
}

/// `true` si el valor está en forma canónica HH:MM
fn hora_canonica(valor: &str) -> bool {
    NaiveTime::parse_from_str(valor, "%H:%M")
        .map(|h| h.format("%H:%M").to_string() == valor)
        .unwrap_or(false)
}

/// Recorta un campo opcional; en blanco pasa a ser ausente
fn limpiar(valor: Option<String>) -> Option<String> {
    valor.and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

#[derive(Clone)]
pub struct ReservationService<S> {
    store: S,
}

impl<S: SlotStore> ReservationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Horas ocupadas de una fecha, para la vista pública.
    ///
    /// Falla con error de validación si la fecha falta o no es canónica.
    pub async fn check_availability(&self, date: Option<&str>) -> AppResult<Disponibilidad> {
        let date = match date {
            Some(d) if fecha_canonica(d) => d,
            _ => return Err(AppError::validation(&["date"])),
        };

        let booked_times = self.store.occupied_times(date).await?;

        Ok(Disponibilidad {
            date: date.to_string(),
            booked_times,
        })
    }

    /// Crea una reserva nueva para un hueco (fecha, hora).
    ///
    /// Valida todos los campos de una pasada y reporta juntos los que
    /// fallen. Si el almacén responde con conflicto, lo eleva como
    /// [`AppError::SlotTaken`]: no hay reintento, el cliente debe elegir
    /// otro horario.
    pub async fn book(&self, solicitud: SolicitudReserva) -> AppResult<Reserva> {
        let mut campos: Vec<&str> = Vec::new();

        let name = limpiar(solicitud.name).unwrap_or_default();
        if name.is_empty() {
            campos.push("name");
        }

        let date = solicitud.date.unwrap_or_default();
        if !fecha_canonica(&date) {
            campos.push("date");
        }

        let time = solicitud.time.unwrap_or_default();
        if !hora_canonica(&time) {
            campos.push("time");
        }

        // 0 nunca es válido, así que sirve también como "ausente"
        let people = solicitud.people.unwrap_or(0);
        if !(1..=50).contains(&people) {
            campos.push("people");
        }

        if !campos.is_empty() {
            return Err(AppError::validation(&campos));
        }

        let resultado = self
            .store
            .create(NuevaReserva {
                name,
                phone: limpiar(solicitud.phone),
                date: date.clone(),
                time: time.clone(),
                people,
                notes: limpiar(solicitud.notes),
            })
            .await;

        match resultado {
            Ok(reserva) => Ok(reserva),
            Err(StoreError::Conflict) => Err(AppError::SlotTaken { date, time }),
            Err(otro) => Err(otro.into()),
        }
    }

    /// Listado completo para administración, sin redactar campos.
    ///
    /// Con fecha delega en el listado del día (hora ascendente); sin ella
    /// devuelve todas las reservas, las más recientes primero. La
    /// autorización la aplica la puerta de acceso antes de llegar aquí.
    pub async fn list_for_admin(&self, date: Option<&str>) -> AppResult<Vec<Reserva>> {
        match date {
            Some(d) if fecha_canonica(d) => Ok(self.store.list_by_date(d).await?),
            Some(_) => Err(AppError::validation(&["date"])),
            None => Ok(self.store.list_all().await?),
        }
    }

    /// Cancela (borra) una reserva por id, liberando su hueco al instante
    pub async fn cancel(&self, id: i64) -> AppResult<()> {
        self.store.delete(id).await.map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound(format!("No existe la reserva {}", id)),
            otro => otro.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemStore;

    fn servicio() -> ReservationService<MemStore> {
        ReservationService::new(MemStore::default())
    }

    fn solicitud(name: &str, date: &str, time: &str, people: i32) -> SolicitudReserva {
        SolicitudReserva {
            name: Some(name.to_string()),
            phone: None,
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            people: Some(people),
            notes: None,
        }
    }

    fn campos_de(error: AppError) -> Vec<String> {
        match error {
            AppError::Validation { fields } => fields,
            otro => panic!("se esperaba error de validación, llegó: {}", otro),
        }
    }

    #[test]
    fn formato_canonico_estricto() {
        assert!(fecha_canonica("2024-06-01"));
        assert!(!fecha_canonica("2024-6-1"));
        assert!(!fecha_canonica("01-06-2024"));
        assert!(!fecha_canonica("2024-13-01"));
        assert!(!fecha_canonica("mañana"));

        assert!(hora_canonica("19:00"));
        assert!(hora_canonica("00:00"));
        assert!(!hora_canonica("19:5"));
        assert!(!hora_canonica("9:05"));
        assert!(!hora_canonica("24:00"));
        assert!(!hora_canonica("19:00:00"));
    }

    #[tokio::test]
    async fn escenario_completo_de_reserva() {
        let svc = servicio();

        let reserva = svc
            .book(solicitud("Ana", "2024-06-01", "19:00", 2))
            .await
            .unwrap();
        assert_eq!(reserva.id, 1);
        assert_eq!(reserva.people, 2);

        // mismo hueco, otro cliente: conflicto de negocio, no error genérico
        let repetida = svc.book(solicitud("Bo", "2024-06-01", "19:00", 4)).await;
        assert!(matches!(repetida, Err(AppError::SlotTaken { .. })));

        let disp = svc.check_availability(Some("2024-06-01")).await.unwrap();
        assert_eq!(disp.booked_times, vec!["19:00"]);

        svc.cancel(reserva.id).await.unwrap();
        let disp = svc.check_availability(Some("2024-06-01")).await.unwrap();
        assert!(disp.booked_times.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reservas_concurrentes_un_solo_ganador() {
        let svc = servicio();

        let mut tareas = Vec::new();
        for i in 0..16 {
            let svc = svc.clone();
            tareas.push(tokio::spawn(async move {
                svc.book(solicitud(&format!("Cliente {}", i), "2024-06-01", "21:00", 2))
                    .await
            }));
        }

        let mut exitos = 0;
        let mut conflictos = 0;
        for tarea in tareas {
            match tarea.await.unwrap() {
                Ok(_) => exitos += 1,
                Err(AppError::SlotTaken { .. }) => conflictos += 1,
                Err(otro) => panic!("error inesperado: {}", otro),
            }
        }

        assert_eq!(exitos, 1);
        assert_eq!(conflictos, 15);
    }

    #[tokio::test]
    async fn disponibilidad_sin_datos_personales() {
        let svc = servicio();
        svc.book(SolicitudReserva {
            name: Some("Ana".into()),
            phone: Some("+359 888 123 456".into()),
            date: Some("2024-06-01".into()),
            time: Some("19:00".into()),
            people: Some(2),
            notes: Some("mesa junto a la ventana".into()),
        })
        .await
        .unwrap();

        let disp = svc.check_availability(Some("2024-06-01")).await.unwrap();
        let json = serde_json::to_value(&disp).unwrap();
        let objeto = json.as_object().unwrap();

        assert_eq!(objeto.len(), 2);
        assert!(objeto.contains_key("date"));
        assert!(objeto.contains_key("bookedTimes"));
        assert!(objeto.get("name").is_none());
        assert!(objeto.get("phone").is_none());
        assert!(objeto.get("notes").is_none());
    }

    #[tokio::test]
    async fn disponibilidad_requiere_fecha_canonica() {
        let svc = servicio();
        for fecha in [None, Some("2024-6-1"), Some("mañana")] {
            let err = svc.check_availability(fecha).await.unwrap_err();
            assert_eq!(campos_de(err), vec!["date"]);
        }
    }

    #[tokio::test]
    async fn limites_de_personas_inclusivos() {
        let svc = servicio();

        for invalido in [0, 51, -3] {
            let err = svc
                .book(solicitud("Ana", "2024-06-01", "12:00", invalido))
                .await
                .unwrap_err();
            assert_eq!(campos_de(err), vec!["people"]);
        }

        svc.book(solicitud("Ana", "2024-06-01", "12:00", 1))
            .await
            .unwrap();
        svc.book(solicitud("Bo", "2024-06-01", "13:00", 50))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn la_validacion_lista_todos_los_campos() {
        let svc = servicio();

        let err = svc.book(SolicitudReserva::default()).await.unwrap_err();
        assert_eq!(campos_de(err), vec!["name", "date", "time", "people"]);

        // nombre en blanco tras el recorte cuenta como ausente
        let err = svc
            .book(solicitud("   ", "2024-06-01", "12:00", 2))
            .await
            .unwrap_err();
        assert_eq!(campos_de(err), vec!["name"]);

        // formatos no canónicos
        let err = svc
            .book(solicitud("Ana", "2024-6-1", "19:5", 2))
            .await
            .unwrap_err();
        assert_eq!(campos_de(err), vec!["date", "time"]);
    }

    #[tokio::test]
    async fn recorta_campos_y_anula_opcionales_vacios() {
        let svc = servicio();
        let reserva = svc
            .book(SolicitudReserva {
                name: Some("  Ana  ".into()),
                phone: Some("   ".into()),
                date: Some("2024-06-01".into()),
                time: Some("19:00".into()),
                people: Some(2),
                notes: Some(" sin gluten ".into()),
            })
            .await
            .unwrap();

        assert_eq!(reserva.name, "Ana");
        assert_eq!(reserva.phone, None);
        assert_eq!(reserva.notes.as_deref(), Some("sin gluten"));
    }

    #[tokio::test]
    async fn cancelar_dos_veces_detecta_la_segunda() {
        let svc = servicio();
        let reserva = svc
            .book(solicitud("Ana", "2024-06-01", "19:00", 2))
            .await
            .unwrap();

        svc.cancel(reserva.id).await.unwrap();
        assert!(matches!(
            svc.cancel(reserva.id).await,
            Err(AppError::NotFound(_))
        ));

        // el hueco queda libre al instante para volver a reservarse
        svc.book(solicitud("Bo", "2024-06-01", "19:00", 4))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn listado_de_administracion() {
        let svc = servicio();
        svc.book(solicitud("Ana", "2024-06-02", "13:00", 2))
            .await
            .unwrap();
        svc.book(solicitud("Bo", "2024-06-01", "21:00", 4))
            .await
            .unwrap();
        svc.book(solicitud("Cleo", "2024-06-01", "12:00", 3))
            .await
            .unwrap();

        // sin fecha: todas, las más recientes primero
        let todas: Vec<String> = svc
            .list_for_admin(None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(todas, vec!["Ana", "Bo", "Cleo"]);

        // con fecha: solo ese día, por hora ascendente y sin redactar campos
        let dia = svc.list_for_admin(Some("2024-06-01")).await.unwrap();
        let horas: Vec<&str> = dia.iter().map(|r| r.time.as_str()).collect();
        assert_eq!(horas, vec!["12:00", "21:00"]);
        assert_eq!(dia[0].name, "Cleo");

        let err = svc.list_for_admin(Some("no-es-fecha")).await.unwrap_err();
        assert_eq!(campos_de(err), vec!["date"]);
    }
}
