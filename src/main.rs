use clap::Parser;
use scheme_calc::domain::model::{SchemeEvaluation, SchemeStatus};
use scheme_calc::utils::error::SchemeError;
use scheme_calc::utils::{logger, validation::Validate};
use scheme_calc::{CliConfig, InMemorySlabStore, SchemeEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting scheme-calc");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    match run(&config).await {
        Ok(evaluation) => {
            if config.json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                print_summary(&evaluation);
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

async fn run(config: &CliConfig) -> scheme_calc::Result<SchemeEvaluation> {
    let scope = config.scope()?;
    let store = InMemorySlabStore::from_config(config)?;
    let engine = SchemeEngine::new(store);
    engine.evaluate(&scope, config.qty).await
}

fn fail(e: &SchemeError) -> ! {
    tracing::error!(
        "❌ scheme-calc failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    std::process::exit(e.severity().exit_code());
}

fn print_summary(evaluation: &SchemeEvaluation) {
    println!("📋 {} qty {}", evaluation.scope, evaluation.order_qty);

    match evaluation.status {
        SchemeStatus::NoScheme => {
            println!("  No active scheme for this product.");
            return;
        }
        SchemeStatus::BelowMinimum { min_qty } => {
            println!("  Below scheme minimum of {} units.", min_qty);
        }
        SchemeStatus::Applied => {
            if let Some(slab) = &evaluation.entitlement.applied_slab {
                println!(
                    "  ✅ {} free (tier {}{}, {}%)",
                    evaluation.entitlement.free_qty,
                    slab.min_qty,
                    if slab.is_virtual { ", implied" } else { "" },
                    evaluation.scheme_percent
                );
            }
        }
    }

    if let (Some(next), Some(gap)) = (&evaluation.upsell.next_tier, evaluation.upsell_gap()) {
        println!(
            "  💡 Add {} more to reach {} and get {} free",
            gap, next.min_qty, next.free_qty
        );
    }
}
