pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::starburst::StarburstClient;
pub use config::toml_config::SyncConfig;
pub use core::migrant::{DatasetMigrant, DomainPair, ProductPair};
pub use core::migrator::DatameshMigrator;
pub use core::outcome::{MigrationOutcome, MigrationReport, OutcomeKind};
pub use utils::error::{DatameshError, Result};
