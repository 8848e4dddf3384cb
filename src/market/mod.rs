//! Market state module
//!
//! Snapshots, in-memory history and the poller that keeps them current

mod poller;
mod store;
mod types;

pub use poller::{CycleReport, Poller};
pub use store::{PriceStore, StoreWriter};
pub use types::{
    decode_history, decode_latest, CoinSnapshot, HistoryMap, HistoryPoint, LatestSnapshotMap,
    PriceUpdate,
};
