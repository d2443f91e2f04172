use clap::Parser;
use scheme_calc::config::toml_config::BatchConfig;
use scheme_calc::utils::{logger, validation::Validate};
use scheme_calc::{BatchRunner, InMemorySlabStore};

#[derive(Parser)]
#[command(name = "scheme-batch")]
#[command(about = "Apply free-goods schemes to a batch of order lines described in TOML")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "scheme-batch.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match BatchConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let result = match InMemorySlabStore::from_config(&config) {
        Ok(store) => BatchRunner::new(store, config).run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            println!(
                "✅ {} lines: {} with free goods, {} below minimum, {} without scheme",
                report.lines.len(),
                report.applied,
                report.below_minimum,
                report.no_scheme
            );
            for path in &report.outputs {
                println!("📁 Output saved to: {}", path.display());
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Batch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &BatchConfig) {
    println!("📋 Configuration Summary:");
    println!(
        "  Batch: {} v{}",
        config.batch.name,
        config.batch.version.as_deref().unwrap_or("-")
    );
    println!("  Master data: {}", config.master_data.path);
    match config.master_data.as_of {
        Some(date) => println!("  As of: {}", date),
        None => println!("  As of: today"),
    }
    println!("  Orders: {}", config.orders.len());
    println!("  Output: {}", config.output.path);
    println!("  Formats: {}", config.output.formats.join(", "));
    println!();
}

fn perform_dry_run(config: &BatchConfig) {
    println!("🔍 Dry Run Analysis:");
    for entry in &config.orders {
        let scope = entry
            .scope()
            .map(|scope| scope.to_string())
            .unwrap_or_else(|e| format!("invalid ({})", e));
        println!(
            "  {} {} qty {}{}",
            entry.line_id,
            scope,
            entry.order_qty,
            if entry.wants_upsell() { " (apply upsell)" } else { "" }
        );
    }
    for format in &config.output.formats {
        println!(
            "  Would write {}/{}.{}",
            config.output.path,
            config.output_filename(),
            format
        );
    }
}
