//! SQLite schema and queries for the on-device store

pub mod init;
pub mod leads;
pub mod routes;
pub mod sync_state;

pub use init::*;
pub use sync_state::SyncedTable;
