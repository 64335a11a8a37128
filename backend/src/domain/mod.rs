//! # Domain Module
//!
//! Contains all business logic for the chore rota.
//!
//! ## Module Organization
//!
//! - **assignment_engine**: weekly chore distribution (pure, seeded by the caller's RNG)
//! - **scoring_engine**: weekly/yearly point totals with rating penalties (pure)
//! - **chore_service** / **person_service**: catalog and roster CRUD with cascading deletes
//! - **assignment_service**: runs the assignment engine against stored data; completion and ratings
//! - **points_service**: stored totals, leaderboard and per-person statistics
//! - **weekly_reset**: Monday-midnight rollover check
//! - **commands**: command and result types passed to the services
//! - **models**: engine configuration and validation errors
//!
//! ## Business Rules
//!
//! - Weeks run Sunday (day 0) to Saturday (day 6) for scheduling
//! - Assignments for a week are generated once and only replaced by an explicit reassignment
//! - Completed chores earn their point value (10 when unset), reduced when peers rate them
//!   below 3 on average, never below zero
//! - Totals are always recomputed from the full assignment history

pub mod assignment_engine;
pub mod assignment_service;
pub mod chore_service;
pub mod commands;
pub mod models;
pub mod person_service;
pub mod points_service;
pub mod scoring_engine;
pub mod weekly_reset;

pub use assignment_engine::AssignmentEngine;
pub use assignment_service::AssignmentService;
pub use chore_service::ChoreService;
pub use commands::*;
pub use person_service::PersonService;
pub use points_service::PointsService;
pub use scoring_engine::{add_rating, ScoringEngine};
pub use weekly_reset::{ResetOutcome, WeeklyResetService};
