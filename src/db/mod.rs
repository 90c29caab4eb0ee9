// src/db/mod.rs
pub mod models;
pub mod mongodb;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use models::Reserva;
pub use mongodb::MongoSlotStore;
pub use store::{NuevaReserva, SlotStore, StoreError};
