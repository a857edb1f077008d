//! Status command handler

use anyhow::Result;
use serde_json::json;

use evoke_core::{Config, StoreKind};

use crate::output::{Output, OutputFormat};
use crate::stores::Stores;

/// Per-store summary
struct StoreStatus {
    kind: StoreKind,
    path: String,
    exists: bool,
    available: bool,
    count: Result<usize>,
}

async fn collect(stores: &Stores) -> Vec<StoreStatus> {
    let mut statuses = Vec::new();
    for kind in StoreKind::ALL {
        let store = stores.store(kind);
        let count = store
            .records()
            .await
            .map(|records| records.len())
            .map_err(anyhow::Error::from);
        statuses.push(StoreStatus {
            kind,
            path: store.path().display().to_string(),
            exists: store.path().exists(),
            available: store.is_available(),
            count,
        });
    }
    statuses
}

/// Show status information
pub async fn show(stores: &Stores, config: &Config, output: &Output) -> Result<()> {
    let statuses = collect(stores).await;

    match output.format {
        OutputFormat::Json => {
            let json_stores: Vec<_> = statuses
                .iter()
                .map(|status| {
                    json!({
                        "kind": status.kind,
                        "path": status.path,
                        "exists": status.exists,
                        "available": status.available,
                        "count": status.count.as_ref().ok(),
                        "error": status.count.as_ref().err().map(|e| format!("{:#}", e)),
                    })
                })
                .collect();
            println!(
                "{}",
                json!({
                    "data_dir": config.data_dir,
                    "offline": stores.offline(),
                    "strategy": if stores.configured { "configured" } else { "default" },
                    "stores": json_stores,
                })
            );
        }
        OutputFormat::Quiet => {
            for status in &statuses {
                println!(
                    "{} {}",
                    status.kind,
                    status.count.as_ref().map(|n| *n).unwrap_or(0)
                );
            }
        }
        OutputFormat::Human => {
            println!("Evoke Status");
            println!("============");
            println!();
            println!("Data:     {}", config.data_dir.display());
            println!("Mode:     {}", mode(stores));
            println!(
                "Strategy: {}",
                if stores.configured {
                    "configured"
                } else {
                    "default"
                }
            );
            for status in &statuses {
                println!();
                println!("{} store:", capitalize(status.kind.as_str()));
                println!("  Path:      {}", status.path);
                println!(
                    "  Available: {}",
                    if status.available { "yes" } else { "no" }
                );
                match &status.count {
                    Ok(count) if status.exists => println!("  Cars:      {}", count),
                    Ok(_) => println!("  Cars:      0 (no file yet)"),
                    Err(e) => println!("  Cars:      unreadable ({:#})", e),
                }
            }
        }
    }

    Ok(())
}

/// Mode the stores were opened in, whether from --offline or the config
fn mode(stores: &Stores) -> &'static str {
    if stores.offline() {
        "offline"
    } else {
        "online"
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
