//! Repricer CLI — scenario evaluation and inspection commands.
//!
//! Commands:
//! - `evaluate` — run a full repricing pass over a scenario file
//! - `sample` — generate a seeded synthetic scenario for demos and tests
//! - `explain` — re-run one scenario and print the full decision trail
//!   for a single SKU

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use repricer_core::domain::SkuId;
use repricer_core::notify::{NullNotifier, StdoutNotifier};
use repricer_runner::{
    run_scenario, save_artifacts, synthetic_scenario, RunConfig, RunSummary, Scenario,
};

#[derive(Parser)]
#[command(name = "repricer", about = "Repricer CLI — marketplace repricing engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full repricing pass over a scenario and save the artifacts.
    Evaluate {
        /// Path to a TOML run config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a JSON scenario file (ad-hoc run, no run id).
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Output directory for the artifacts. Defaults to ./out.
        #[arg(long, default_value = "out")]
        output_dir: PathBuf,

        /// Also write the CSV decision tape next to the JSON summary.
        #[arg(long, default_value_t = false)]
        csv: bool,

        /// Suppress engine notifications (chat messages, tasks, logs).
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    /// Generate a seeded synthetic scenario file.
    Sample {
        /// Where to write the scenario JSON.
        #[arg(long)]
        out: PathBuf,

        /// RNG seed. Same seed, same scenario.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of products to generate.
        #[arg(long, default_value_t = 8)]
        products: usize,
    },
    /// Re-run a scenario and print the decision trail for one SKU.
    Explain {
        /// Path to a JSON scenario file.
        #[arg(long)]
        scenario: PathBuf,

        /// Numeric SKU id to explain.
        #[arg(long)]
        sku: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            config,
            scenario,
            output_dir,
            csv,
            quiet,
        } => run_evaluate(config, scenario, output_dir, csv, quiet),
        Commands::Sample {
            out,
            seed,
            products,
        } => run_sample(&out, seed, products),
        Commands::Explain { scenario, sku } => run_explain(&scenario, SkuId(sku)),
    }
}

fn run_evaluate(
    config_path: Option<PathBuf>,
    scenario_path: Option<PathBuf>,
    mut output_dir: PathBuf,
    mut csv: bool,
    quiet: bool,
) -> Result<()> {
    if config_path.is_some() && scenario_path.is_some() {
        bail!("--config and --scenario are mutually exclusive");
    }

    let (scenario_file, run_id) = if let Some(path) = config_path {
        let config = RunConfig::load(&path)?;
        output_dir = config.output_dir.clone();
        csv = config.export_csv;
        (config.scenario.clone(), config.run_id())
    } else if let Some(path) = scenario_path {
        (path, String::new())
    } else {
        bail!("one of --config or --scenario is required");
    };

    let scenario = Scenario::load(&scenario_file)?;

    let mut summary = if quiet {
        run_scenario(scenario, &NullNotifier)
    } else {
        run_scenario(scenario, &StdoutNotifier)
    };
    summary.run_id = run_id;

    print_summary(&summary);

    let paths = save_artifacts(&summary, &output_dir, csv)?;
    println!("Summary saved to: {}", paths.summary.display());
    if let Some(csv_path) = &paths.decisions_csv {
        println!("Decision tape saved to: {}", csv_path.display());
    }

    Ok(())
}

fn run_sample(out: &Path, seed: u64, products: usize) -> Result<()> {
    let scenario = synthetic_scenario(seed, products);
    let json = scenario.to_json()?;
    std::fs::write(out, json)
        .with_context(|| format!("failed to write {}", out.display()))?;

    println!(
        "Wrote scenario '{}' ({} products, {} SKUs, seed {seed}) to {}",
        scenario.name,
        scenario.products.len(),
        scenario.sku_count(),
        out.display()
    );
    Ok(())
}

fn run_explain(scenario_path: &Path, sku: SkuId) -> Result<()> {
    let scenario = Scenario::load(scenario_path)?;
    let summary = run_scenario(scenario, &NullNotifier);

    for report in &summary.products {
        for skipped in &report.skipped {
            if skipped.sku_id == sku {
                println!("=== {sku} (skipped) ===");
                println!("Reason: {}", skipped.reason);
                return Ok(());
            }
        }
        let Some(result) = report.results.iter().find(|r| r.sku_id == Some(sku)) else {
            continue;
        };

        println!("=== {sku} ({}) ===", report.product_id);
        println!("Mark:            {}", result.mark);
        match result.new_price {
            Some(price) => println!("New price:       {price:.2}"),
            None => println!("New price:       (no change)"),
        }
        if let Some(price) = result.new_promotion_price {
            println!("Promotion price: {price:.2}");
        }
        if let Some(err) = &result.error {
            println!("Error:           {err}");
        }
        if !result.directives.is_empty() {
            println!("Directives:");
            for directive in &result.directives {
                println!("  - {directive:?}");
            }
        }
        if let Some(commit) = &report.commit {
            println!("Product commit:  {} ({} directives)", commit.event_id, commit.directives.len());
        }
        println!();
        println!("--- Decision trail ---");
        println!("{}", result.trail.trim_end());
        if !result.narrative.is_empty() {
            println!();
            println!("--- Narrative ---");
            print!("{}", result.narrative);
        }
        return Ok(());
    }

    bail!("sku {} not found in scenario {}", sku.0, scenario_path.display());
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Run Summary ===");
    println!("Scenario:       {}", summary.scenario_name);
    if !summary.run_id.is_empty() {
        println!("Run id:         {}", summary.run_id);
    }
    println!("Products:       {}", summary.products.len());
    println!("SKUs:           {}", summary.totals.skus);
    println!("Priced:         {}", summary.totals.priced);
    println!("Errors:         {}", summary.totals.errors);
    println!("Skipped:        {}", summary.totals.skipped);
    println!("Promo commits:  {}", summary.totals.commits);
    println!();
}
