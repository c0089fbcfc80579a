//! # Cadence Core Library
//!
//! This library provides the core business logic for the Cadence habit,
//! goal, and schedule tracker. All operations are available to any surface;
//! the REST server and the CLI are thin layers over the same core.
//!
//! ## Architecture
//!
//! - **Schedule**: one document per (owner, day) owning an ordered list of
//!   time blocks, each with an accumulating stopwatch
//! - **Habits**: occurrence logs with derived streak/consistency metrics
//! - **Goals**: milestone-driven status transitions with audit history
//! - **Rewards**: points ledger earned from completions, spent on rewards
//! - **Storage**: SQLite persistence and TOML-based configuration
//! - **Integrations**: payment collaborator trait for the checkout flow
//!
//! ## Key Components
//!
//! - [`Store`]: SQLite persistence for all entities
//! - [`Config`]: Application configuration management
//! - [`weekly_metrics`]: Pure weekly aggregation over persisted records
//! - [`PaymentProvider`]: Trait for the external payment collaborator

pub mod auth;
pub mod error;
pub mod events;
pub mod goal;
pub mod habit;
pub mod integrations;
pub mod metrics;
pub mod rewards;
pub mod schedule;
pub mod storage;

pub use auth::TokenVerifier;
pub use error::{ConfigError, CoreError, DatabaseError, PaymentError, ValidationError};
pub use events::Event;
pub use goal::{Goal, GoalPriority, GoalStatus, Milestone};
pub use habit::{Habit, HabitPeriod, HabitReport, Occurrence};
pub use integrations::{CheckoutRequest, CheckoutSession, PaymentProvider, StripeCheckout};
pub use metrics::{weekly_metrics, WeeklyMetrics};
pub use rewards::{LedgerEntry, PointsReason, Reward, POINTS_PER_BLOCK, POINTS_PER_HABIT_COUNT};
pub use schedule::{BlockCategory, BlockTask, DaySchedule, Stopwatch, TimeBlock};
pub use storage::{Config, Store};
