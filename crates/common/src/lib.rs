//! Common utilities and shared types for inkfeed.
//!
//! This crate provides foundational components used across all inkfeed crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Infrastructure errors via [`AppError`] and [`AppResult`],
//!   and the engagement error taxonomy via [`EngagementError`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use inkfeed_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} -> {}", config.database.url, id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, DatabaseConfig, EngagementConfig};
pub use error::{AppError, AppResult, EngagementError, EngagementResult};
pub use id::IdGenerator;
