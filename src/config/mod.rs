pub mod migration_files;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "datamesh-sync")]
#[command(about = "Migrate data mesh domains, data products and datasets between Starburst instances")]
pub struct CliConfig {
    /// Path to the TOML file holding the source and destination connections
    #[arg(short, long, default_value = "datamesh-sync.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run every migration declared in the .starburst files of a directory
    Files {
        #[arg(long)]
        directory: String,
    },
    /// Only validate the .starburst files of a directory
    Validate {
        #[arg(long)]
        directory: String,
    },
    /// Create or overwrite a domain on the destination
    Domain {
        #[arg(long)]
        name: String,
    },
    /// Create or overwrite one data product
    Product {
        #[arg(long)]
        domain_src: String,
        #[arg(long)]
        domain_dest: String,
        #[arg(long)]
        product: String,
    },
    /// Copy every view and materialized view of a data product
    Datasets {
        #[arg(long)]
        domain_src: String,
        #[arg(long)]
        domain_dest: String,
        #[arg(long)]
        product_src: String,
        #[arg(long)]
        product_dest: String,
    },
    /// Copy a single dataset into an existing destination data product
    Dataset {
        #[arg(long)]
        domain_src: String,
        #[arg(long)]
        domain_dest: String,
        #[arg(long)]
        product_src: String,
        #[arg(long)]
        product_dest: String,
        #[arg(long)]
        name: String,
        /// Dataset type: view or materializedView
        #[arg(long = "type", default_value = "view")]
        kind: String,
    },
    /// Create or overwrite every data product of a domain
    DomainProducts {
        #[arg(long)]
        domain_src: String,
        #[arg(long)]
        domain_dest: String,
    },
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset_command() {
        let cli = CliConfig::try_parse_from([
            "datamesh-sync",
            "--config",
            "conf.toml",
            "dataset",
            "--domain-src",
            "finance",
            "--domain-dest",
            "finance",
            "--product-src",
            "p1",
            "--product-dest",
            "p1b",
            "--name",
            "v1",
            "--type",
            "materializedView",
        ])
        .unwrap();

        assert_eq!(cli.config, "conf.toml");
        match cli.command {
            Command::Dataset { product_dest, kind, .. } => {
                assert_eq!(product_dest, "p1b");
                assert_eq!(kind, "materializedView");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_files_command_requires_directory() {
        assert!(CliConfig::try_parse_from(["datamesh-sync", "files"]).is_err());
    }
}
