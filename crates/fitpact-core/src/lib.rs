//! # FitPact Core Library
//!
//! Core business logic for FitPact, a group fitness-accountability tracker:
//! friends log workouts against a shared weekly goal, shortfalls accrue a
//! monetary penalty, and a coach adjusts goals and penalties. All operations
//! are available through this library; the CLI binary is a thin presentation
//! layer over it.
//!
//! ## Architecture
//!
//! - **Calendar**: pure Monday-to-Sunday week math with an injected "now"
//! - **Storage**: SQLite-backed key-value repository plus TOML configuration
//! - **Engine**: weekly summaries and the idempotent Monday penalty sweep
//! - **App**: session-holding application state with a re-read-after-mutation
//!   contract
//! - **Tips**: AI tip generation that fails closed to a fallback string
//!
//! ## Key Components
//!
//! - [`App`]: application state object handed to the presentation layer
//! - [`Database`]: collection persistence and the penalty ledger
//! - [`Config`]: tip-generator and refresh configuration
//! - [`engine::apply_weekly_penalties`]: the once-per-week penalty sweep

pub mod app;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod model;
pub mod storage;
pub mod tips;

pub use app::App;
pub use error::{ConfigError, ConflictError, CoreError, DatabaseError, ValidationError};
pub use model::{
    Activity, ActivityType, AppSettings, ChatMessage, GoalStatus, User, WeekHistory,
    WeeklySummary, FORFEIT_TYPE_ID,
};
pub use storage::{Config, Database};
pub use tips::{TipGenerator, FALLBACK_TIP};
