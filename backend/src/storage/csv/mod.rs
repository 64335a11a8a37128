pub mod assignment_repository;
pub mod chore_repository;
pub mod connection;
pub mod global_config_repository;
pub mod person_repository;
pub mod points_repository;
pub mod rating_ledger_repository;

#[cfg(test)]
pub mod test_utils;

pub use assignment_repository::AssignmentRepository;
pub use chore_repository::ChoreRepository;
pub use connection::CsvConnection;
pub use global_config_repository::{GlobalConfig, GlobalConfigRepository, GlobalConfigStorage};
pub use person_repository::PersonRepository;
pub use points_repository::PointsRepository;
pub use rating_ledger_repository::RatingLedgerRepository;
