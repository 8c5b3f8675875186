//! MediGuard Database Layer
//!
//! Aggregate queries over the `blood_samples` table. The [`SampleStore`]
//! trait is the query layer used by the analysis engine and the web
//! handlers; two implementations are provided:
//!
//! - [`PgSampleStore`]: PostgreSQL via a shared `sqlx` pool
//! - [`MemorySampleStore`]: in-process store with identical semantics,
//!   used by tests and demos
//!
//! # Example
//!
//! ```rust,no_run
//! use mediguard_config::Config;
//! use mediguard_db::{connect, PgSampleStore, SampleStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let pool = connect(&config.database).await?;
//!     let store = PgSampleStore::new(pool, &config.store)?;
//!
//!     let latest = store.latest_sample("P001").await?;
//!     println!("{latest:?}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod layout;
pub mod memory;
pub mod pg;
pub mod stats;
pub mod store;

pub use error::{DbError, Result};
pub use layout::{quote_ident, TableLayout};
pub use memory::MemorySampleStore;
pub use pg::{connect, PgSampleStore};
pub use store::SampleStore;
