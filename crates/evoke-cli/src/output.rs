//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Human output of a routed call ends with its trail: which store served it
//! and what each store returned along the way.

use serde::Serialize;
use serde_json::json;

use evoke_core::{Metadata, Outcome, Snapshot, StoreKind, Strategy};

use crate::models::Car;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Data that can be printed as the payload of an outcome
pub trait Listing: Serialize {
    fn print_human(&self);
    fn print_quiet(&self);
}

impl Listing for Car {
    fn print_human(&self) {
        println!("ID:    {}", self.id);
        println!("Model: {}", self.model);
        println!("Year:  {}", self.year);
    }

    fn print_quiet(&self) {
        println!("{}", self.id);
    }
}

impl Listing for Vec<Car> {
    fn print_human(&self) {
        if self.is_empty() {
            println!("No cars found.");
            return;
        }
        for car in self {
            println!(
                "{} | {} | {}",
                short_id(&car.id),
                truncate(&car.model, 30),
                car.year
            );
        }
        println!("\n{} car(s)", self.len());
    }

    fn print_quiet(&self) {
        for car in self {
            println!("{}", car.id);
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print whatever data an outcome carries, followed by its trail
    pub fn print_outcome<D: Listing>(&self, outcome: &Outcome<D>) {
        match self.format {
            OutputFormat::Human => {
                if let Some(ref data) = outcome.data {
                    data.print_human();
                }
                self.print_trail(outcome.origin, &outcome.metadata);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    json!({
                        "data": outcome.data.as_ref().map(to_json),
                        "origin": outcome.origin,
                        "error": outcome.error.as_ref().map(|e| e.to_string()),
                        "trail": trail_json(&outcome.metadata),
                    })
                );
            }
            OutputFormat::Quiet => {
                if let Some(ref data) = outcome.data {
                    data.print_quiet();
                }
            }
        }
    }

    fn print_trail(&self, origin: Option<StoreKind>, metadata: &Metadata) {
        println!();
        match origin {
            Some(kind) => println!("── Trail (answered by {}) ──", kind),
            None => println!("── Trail (no store reached) ──"),
        }
        for kind in StoreKind::ALL {
            let line = metadata
                .raw(kind)
                .map(describe)
                .unwrap_or_else(|| "not called".to_string());
            println!("  {:<7} {}", format!("{}:", kind), line);
        }
    }

    /// Print the routing rule of every action
    pub fn print_strategy(&self, strategy: &Strategy, configured: bool) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "Car strategy ({}):",
                    if configured { "configured" } else { "default" }
                );
                for (action, rule) in strategy.rules() {
                    println!("  {:<11} {}", action, rule);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    json!({
                        "configured": configured,
                        "rules": to_json(strategy),
                    })
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", json!({"status": "success", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One-line summary of a store's raw result
fn describe(snapshot: &Snapshot) -> String {
    if let Some(error) = snapshot.error() {
        return format!("failed: {}", error);
    }
    if let Some(cars) = snapshot.data::<Vec<Car>>() {
        return format!("{} car(s)", cars.len());
    }
    if snapshot.has_data() {
        "1 car".to_string()
    } else {
        "no data".to_string()
    }
}

fn trail_json(metadata: &Metadata) -> serde_json::Value {
    let trail: serde_json::Map<String, serde_json::Value> = StoreKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let snapshot = metadata.raw(kind)?;
            Some((
                kind.to_string(),
                json!({
                    "ok": snapshot.is_ok(),
                    "summary": describe(snapshot),
                }),
            ))
        })
        .collect();
    serde_json::Value::Object(trail)
}

fn to_json<S: Serialize + ?Sized>(value: &S) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// First segment of a UUID, or the whole ID when it is short
fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
