use std::fs::File;
use std::io::{BufWriter, Write};

use chrono::NaiveDate;

use oprisk::config::{RiskAppetiteParams, SimulationConfig};
use oprisk::error::Error;
use oprisk::pipeline::Evaluation;
use oprisk::profile;
use oprisk::records::{BreachRecord, BreachStatus, KriStatus};
use oprisk::sampler::SeverityModel;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut config = SimulationConfig::canonical();
    let mut params = RiskAppetiteParams::canonical();
    let mut output_path = "profile.ndjson".to_string();
    let mut quiet = false;
    let mut runs: Option<u64> = None;
    let mut sev_mean_override: Option<f64> = None;
    let mut sev_std_override: Option<f64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                config.seed = args[i].parse().expect("--seed requires a u64");
            }
            "--start" => {
                i += 1;
                config.start = parse_date(&args[i]);
            }
            "--end" => {
                i += 1;
                config.end = parse_date(&args[i]);
            }
            "--growth" => {
                i += 1;
                config.business.growth_rate = args[i].parse().expect("--growth requires a number");
            }
            "--freq-mean" => {
                i += 1;
                config.loss_frequency.mean =
                    args[i].parse().expect("--freq-mean requires a number");
            }
            "--sev-mean" => {
                i += 1;
                sev_mean_override = Some(args[i].parse().expect("--sev-mean requires a number"));
            }
            "--sev-std" => {
                i += 1;
                sev_std_override = Some(args[i].parse().expect("--sev-std requires a number"));
            }
            "--kri-baseline" => {
                i += 1;
                config.kri.baseline = args[i].parse().expect("--kri-baseline requires a number");
            }
            "--kri-volatility" => {
                i += 1;
                config.kri.volatility =
                    args[i].parse().expect("--kri-volatility requires a number");
            }
            "--params" => {
                i += 1;
                params = load_params(&args[i]);
            }
            "--output" => {
                i += 1;
                output_path = args[i].clone();
            }
            "--quiet" => quiet = true,
            "--runs" => {
                i += 1;
                runs = Some(args[i].parse().expect("--runs requires a positive integer"));
            }
            _ => {}
        }
        i += 1;
    }

    if let SeverityModel::FoldedNormal { mean, std } = &mut config.loss_severity {
        if let Some(m) = sev_mean_override {
            *mean = m;
        }
        if let Some(s) = sev_std_override {
            *std = s;
        }
    }

    if let Some(n) = runs {
        run_batch(&config, &params, n, quiet);
    } else {
        run_single(&config, &params, &output_path, quiet);
    }
}

fn run_single(config: &SimulationConfig, params: &RiskAppetiteParams, output_path: &str, quiet: bool) {
    let eval = Evaluation::run(config, params).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let file = File::create(output_path).expect("failed to create output file");
    let mut writer = BufWriter::new(file);
    for row in &eval.profile {
        serde_json::to_writer(&mut writer, row).expect("failed to serialize profile row");
        writeln!(writer).expect("failed to write newline");
    }

    if !quiet {
        print_operations_preview(&eval);
        print_profile_summary(&eval);
        print_appetite_summary(&eval, params);
        println!("\nProfile rows written: {} → {output_path}", eval.profile.len());
    }
}

fn run_batch(base: &SimulationConfig, params: &RiskAppetiteParams, n: u64, quiet: bool) {
    use rayon::prelude::*;

    struct RunSummary {
        seed: u64,
        loss_events: usize,
        expected_loss: f64,
        unexpected_loss: f64,
        el_breach_days: usize,
        ul_breach_days: usize,
        kri_above_days: usize,
    }

    let start_seed = base.seed;
    let summaries: Vec<RunSummary> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut config = base.clone();
            config.seed = start_seed + i;
            let eval = Evaluation::run(&config, params).unwrap_or_else(|e| {
                eprintln!("error (seed {}): {e}", config.seed);
                std::process::exit(1);
            });
            let scalar = |f: fn(&oprisk::records::RiskProfileRecord) -> f64| {
                eval.profile.first().map(f).unwrap_or(0.0)
            };
            RunSummary {
                seed: config.seed,
                loss_events: eval.losses.len(),
                expected_loss: scalar(|r| r.expected_loss),
                unexpected_loss: scalar(|r| r.unexpected_loss),
                el_breach_days: breached_days(&eval.breaches, |b| b.expected_loss),
                ul_breach_days: breached_days(&eval.breaches, |b| b.unexpected_loss),
                kri_above_days: eval
                    .kri_status
                    .iter()
                    .filter(|k| k.status == KriStatus::AboveLimit)
                    .count(),
            }
        })
        .collect();

    if quiet {
        return;
    }

    println!("=== Per-Run Summary (N={n}) ===");
    println!(
        "{:>6} | {:>7} | {:>10} | {:>10} | {:>7} | {:>7} | {:>7}",
        "Seed", "Losses", "EL", "UL", "EL-brk", "UL-brk", "KRI>lim"
    );
    println!("{}", "-".repeat(70));
    for s in &summaries {
        println!(
            "{:>6} | {:>7} | {:>10.2} | {:>10.2} | {:>7} | {:>7} | {:>7}",
            s.seed,
            s.loss_events,
            s.expected_loss,
            s.unexpected_loss,
            s.el_breach_days,
            s.ul_breach_days,
            s.kri_above_days,
        );
    }

    let els: Vec<f64> = summaries.iter().map(|s| s.expected_loss).collect();
    let uls: Vec<f64> = summaries.iter().map(|s| s.unexpected_loss).collect();
    println!("\n=== Cross-Run Statistics ===");
    println!("  Expected Loss:   mean {:>10.2}  std {:>9.2}", profile::mean(&els), profile::sample_std(&els));
    println!("  Unexpected Loss: mean {:>10.2}  std {:>9.2}", profile::mean(&uls), profile::sample_std(&uls));
}

fn print_operations_preview(eval: &Evaluation) {
    const PREVIEW_ROWS: usize = 10;
    println!(
        "\n=== Operations ({} days, showing first {}) ===",
        eval.operations.len(),
        PREVIEW_ROWS.min(eval.operations.len())
    );
    println!("{:>12} | {:>8} | {:>9} | {:>7}", "Date", "Volume", "Revenue", "KRI");
    println!("{}", "-".repeat(46));
    for op in eval.operations.iter().take(PREVIEW_ROWS) {
        println!(
            "{:>12} | {:>8} | {:>9.1} | {:>7.2}",
            op.date.to_string(),
            op.business_volume,
            op.revenue,
            op.kri,
        );
    }
}

fn print_profile_summary(eval: &Evaluation) {
    let total_loss: f64 = eval.losses.iter().map(|l| l.amount).sum();
    let (el, ul) = eval
        .profile
        .first()
        .map(|r| (r.expected_loss, r.unexpected_loss))
        .unwrap_or((0.0, 0.0));
    println!("\n=== Risk Profile ===");
    println!("  Loss events:     {:>10}", eval.losses.len());
    println!("  Total loss:      {:>10.2}", total_loss);
    println!("  Expected Loss:   {:>10.2}  (scalar, all rows)", el);
    println!("  Unexpected Loss: {:>10.2}  (scalar, all rows)", ul);
}

fn print_appetite_summary(eval: &Evaluation, params: &RiskAppetiteParams) {
    let days = eval.breaches.len();
    println!("\n=== Appetite Summary ===");
    print_loss_check(
        "Expected Loss",
        params.max_expected_loss,
        breached_days(&eval.breaches, |b| b.expected_loss),
        days,
    );
    print_loss_check(
        "Unexpected Loss",
        params.max_unexpected_loss,
        breached_days(&eval.breaches, |b| b.unexpected_loss),
        days,
    );
    match params.max_severe_loss_events {
        // The stock profile carries no severe-event counts, so this check
        // can only report as skipped here.
        Some(_) if eval.breaches.iter().all(|b| b.severe_loss_events.is_none()) => {
            println!("  Severe events:   check skipped (no per-day severe counts)");
        }
        Some(max) => print_loss_check(
            "Severe events",
            Some(max as f64),
            breached_days(&eval.breaches, |b| b.severe_loss_events),
            days,
        ),
        None => println!("  Severe events:   check skipped (no threshold)"),
    }
    match params.kri_limit {
        Some(limit) => {
            let above = eval
                .kri_status
                .iter()
                .filter(|k| k.status == KriStatus::AboveLimit)
                .count();
            println!("  KRI:             above limit {above}/{days} days (limit {limit})");
        }
        None => println!("  KRI:             check skipped (no limit)"),
    }
    if let Some(capacity) = params.risk_capacity {
        println!("  Risk capacity:   {capacity} (reference only)");
    }
}

fn print_loss_check(label: &str, threshold: Option<f64>, breached: usize, days: usize) {
    match threshold {
        Some(t) => {
            let verdict = if breached > 0 { "BREACHED" } else { "within appetite" };
            println!("  {label:<16} {verdict}: {breached}/{days} days over threshold {t}");
        }
        None => println!("  {label:<16} check skipped (no threshold)"),
    }
}

fn breached_days(
    breaches: &[BreachRecord],
    pick: fn(&BreachRecord) -> Option<BreachStatus>,
) -> usize {
    breaches.iter().filter(|b| pick(b) == Some(BreachStatus::Breached)).count()
}

fn parse_date(arg: &str) -> NaiveDate {
    arg.parse().unwrap_or_else(|_| {
        eprintln!("error: {}", Error::InvalidDate { input: arg.to_string() });
        std::process::exit(1);
    })
}

fn load_params(path: &str) -> RiskAppetiteParams {
    let file = File::open(path).unwrap_or_else(|e| {
        eprintln!("error: cannot open {path} — {e}");
        std::process::exit(1);
    });
    let value: serde_json::Value = serde_json::from_reader(file).unwrap_or_else(|e| {
        eprintln!("error: {path} is not valid JSON — {e}");
        std::process::exit(1);
    });
    RiskAppetiteParams::from_json(&value).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}
