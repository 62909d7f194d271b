//! Re-run the appetite evaluation over a previously written risk-profile
//! stream.
//!
//! Reads `profile.ndjson` (or the first positional argument), applies the
//! thresholds from `--params <file.json>` (canonical defaults otherwise),
//! then prints the per-day breach and KRI status tables.

use std::fs::File;
use std::io::{BufRead, BufReader};

use oprisk::appetite;
use oprisk::config::RiskAppetiteParams;
use oprisk::records::{BreachStatus, KriStatus, RiskProfileRecord, profile_row_from_json};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut profile_path = "profile.ndjson".to_string();
    let mut params = RiskAppetiteParams::canonical();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--params" => {
                i += 1;
                let file = File::open(&args[i]).unwrap_or_else(|e| {
                    eprintln!("error: cannot open {} — {e}", args[i]);
                    std::process::exit(1);
                });
                let value: serde_json::Value = serde_json::from_reader(file).unwrap_or_else(|e| {
                    eprintln!("error: {} is not valid JSON — {e}", args[i]);
                    std::process::exit(1);
                });
                params = RiskAppetiteParams::from_json(&value).unwrap_or_else(|e| {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                });
            }
            other => profile_path = other.to_string(),
        }
        i += 1;
    }

    // ── Load profile rows ─────────────────────────────────────────────────────
    let file = File::open(&profile_path).unwrap_or_else(|e| {
        eprintln!("error: cannot open {profile_path} — {e}");
        eprintln!("Run `cargo run --release` first to generate the profile stream.");
        std::process::exit(1);
    });

    let mut profile: Vec<RiskProfileRecord> = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error reading line {}: {}", line_no + 1, e);
            std::process::exit(1);
        });
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line).unwrap_or_else(|e| {
            eprintln!("error: line {} is not valid JSON: {e}", line_no + 1);
            std::process::exit(1);
        });
        match profile_row_from_json(&value) {
            Ok(row) => profile.push(row),
            Err(e) => {
                eprintln!("error: failed to decode line {}: {e}", line_no + 1);
                eprintln!("  line: {line}");
                std::process::exit(1);
            }
        }
    }

    let (breaches, kri_status) = appetite::evaluate(&profile, &params);

    if breaches.is_empty() {
        println!("(empty profile — nothing to evaluate)");
        return;
    }

    // ── Per-day status table ──────────────────────────────────────────────────
    println!("=== Daily Appetite Status ({} days) ===", breaches.len());
    println!(
        "{:>12} | {:>15} | {:>15} | {:>15} | {:>12}",
        "Date", "ExpectedLoss", "UnexpectedLoss", "SevereEvents", "KRI"
    );
    println!("{}", "-".repeat(80));
    for (breach, kri) in breaches.iter().zip(&kri_status) {
        println!(
            "{:>12} | {:>15} | {:>15} | {:>15} | {:>12}",
            breach.date.to_string(),
            status_cell(breach.expected_loss),
            status_cell(breach.unexpected_loss),
            status_cell(breach.severe_loss_events),
            kri.status.to_string(),
        );
    }

    // ── Summary ───────────────────────────────────────────────────────────────
    let breached = |pick: fn(&oprisk::records::BreachRecord) -> Option<BreachStatus>| {
        breaches.iter().filter(|b| pick(b) == Some(BreachStatus::Breached)).count()
    };
    let kri_above = kri_status.iter().filter(|k| k.status == KriStatus::AboveLimit).count();
    println!("\nBreached days — EL: {}, UL: {}, severe: {}; KRI above limit: {}",
        breached(|b| b.expected_loss),
        breached(|b| b.unexpected_loss),
        breached(|b| b.severe_loss_events),
        kri_above,
    );
}

fn status_cell(status: Option<BreachStatus>) -> String {
    match status {
        Some(s) => s.to_string(),
        None => "(skipped)".to_string(),
    }
}
