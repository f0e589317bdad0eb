use clap::Parser;
use datamesh_sync::config::migration_files::read_starburst_files;
use datamesh_sync::utils::error::ErrorSeverity;
use datamesh_sync::utils::{logger, validation::Validate};
use datamesh_sync::{
    CliConfig, Command, DatameshError, DatameshMigrator, DatasetMigrant, DomainPair,
    MigrationOutcome, OutcomeKind, ProductPair, StarburstClient, SyncConfig,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting datamesh-sync CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Migration failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            exit_code_for(&e)
        }
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_code_for(error: &DatameshError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 重試錯誤
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

async fn run(cli: CliConfig) -> datamesh_sync::Result<i32> {
    // 只驗證遷移檔案，不需要連線
    if let Command::Validate { directory } = &cli.command {
        let documents = read_starburst_files(directory)?;
        println!("✅ {} valid Starburst files in {}", documents.len(), directory);
        return Ok(0);
    }

    // 載入並驗證配置
    let config = SyncConfig::from_file(&cli.config)?;
    config.validate()?;

    // 建立來源與目的端客戶端
    let source = StarburstClient::new(&config.source)?;
    let destination = StarburstClient::new(&config.destination)?;
    tracing::info!(
        "Migrating from {} to {}",
        source.base_url(),
        destination.base_url()
    );
    let migrator = DatameshMigrator::new(source, destination, config.production_catalog());

    let outcomes: Vec<MigrationOutcome> = match cli.command {
        Command::Files { directory } => {
            let report = migrator.migrate_from_starburst_files(&directory).await?;
            println!("📊 {}", report.summary());
            report.outcomes
        }
        Command::Validate { .. } => Vec::new(),
        Command::Domain { name } => vec![migrator.migrate_domain(&name).await?],
        Command::Product {
            domain_src,
            domain_dest,
            product,
        } => {
            let domains = DomainPair::new(domain_src, domain_dest);
            vec![migrator.migrate_product(&domains, &product).await?]
        }
        Command::Datasets {
            domain_src,
            domain_dest,
            product_src,
            product_dest,
        } => {
            let domains = DomainPair::new(domain_src, domain_dest);
            let products = ProductPair::new(product_src, product_dest);
            vec![migrator.migrate_all_product_datasets(&domains, &products).await?]
        }
        Command::Dataset {
            domain_src,
            domain_dest,
            product_src,
            product_dest,
            name,
            kind,
        } => {
            let migrant = DatasetMigrant {
                name,
                kind,
                product_src,
                product_dest,
                domain_src,
                domain_dest,
            };
            vec![migrator.migrate_dataset(&migrant).await?]
        }
        Command::DomainProducts {
            domain_src,
            domain_dest,
        } => {
            let domains = DomainPair::new(domain_src, domain_dest);
            vec![migrator.migrate_all_domain_products(&domains).await?]
        }
    };

    for outcome in &outcomes {
        println!("{}", outcome);
    }

    if outcomes.iter().any(|o| o.kind == OutcomeKind::Failed) {
        return Ok(1);
    }
    tracing::info!("✅ Migration completed");
    Ok(0)
}
