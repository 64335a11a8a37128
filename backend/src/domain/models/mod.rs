pub mod config;
pub mod validation;

pub use config::{AssignmentWeights, EngineConfig, PointsSource, ScoringPolicy};
pub use validation::{ChoreValidationError, PersonValidationError};
