//! `stockscan-catalog` — flat-file product catalog lookup.

pub mod store;

pub use store::ProductStore;
