//! rosette-cloud — competition order intake and credit reconciliation
//!
//! Long-running service that:
//! - Receives purchase notifications from the commerce system (webhook)
//! - Converts each order into entry credits, durably and idempotently
//! - Enforces the one-competition-type-per-event exclusivity rule
//! - Routes orders it cannot auto-resolve into a human review queue
//! - Fans out post-commit domain events to notification listeners
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── config.rs      # env configuration
//! ├── state.rs       # shared AppState
//! ├── error.rs       # AppError + response envelope
//! ├── db/            # SQLite pool, migrations, per-table access
//! ├── orders/        # order engine, exclusivity rule, webhook signatures
//! ├── events/        # post-commit domain event dispatcher
//! ├── email/         # SES notification listener
//! └── api/           # HTTP routes and handlers
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod events;
pub mod orders;
pub mod state;

// Re-export public types
pub use config::Config;
pub use db::DbService;
pub use error::{AppError, AppResponse, AppResult};
pub use events::{DomainEvent, EventDispatcher};
pub use orders::{OrderOutcome, OrderPayload, OrderStatus, process_order};
pub use state::AppState;
