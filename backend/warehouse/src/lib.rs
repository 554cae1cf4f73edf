//! `stockscan-warehouse` — goods-received intake ledger.
//!
//! Records warehouse intake events (reference, manufacturer, quantity,
//! operator, photos) into append-only JSON files plus a
//! `manufacturer/reference` folder tree of saved images.

pub mod store;

pub use store::{
    CreatedEntry, EntriesPage, NewEntry, ReferenceCheck, WarehouseError, WarehouseStore,
};
