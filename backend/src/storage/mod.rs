//! # Storage Module
//!
//! Handles all data persistence for the chore rota.
//!
//! The engines are pure and never persist anything; this module is the data source
//! they are fed from and the place their results are written back to. The
//! implementation can be swapped out (flat files, a database, a synced document store)
//! without affecting the domain logic.
//!
//! ## Current Implementation
//!
//! - **Primary Storage**: flat files in a data directory (`storage::csv`)
//! - YAML for the catalog, roster, configuration and rating ledger
//! - CSV for the assignment history and point snapshots
//!
//! Writes replace whole files atomically (temp file + rename). There is no locking:
//! concurrent writers are last-write-wins.

pub mod csv;
pub mod traits;

pub use self::csv::{
    AssignmentRepository, ChoreRepository, CsvConnection, GlobalConfig, GlobalConfigRepository,
    GlobalConfigStorage, PersonRepository, PointsRepository, RatingLedgerRepository,
};
pub use traits::*;
