//! Affordability across a grid of incomes and property types
//!
//! Outputs one CSV row per (income, property type) pair

use anyhow::{Context, Result};
use clap::Parser;
use property_engine::affordability::{calculate_affordability, AffordabilityInput};
use property_engine::{Buyer, LoanType, PropertyType, RegulatoryConfig, ResidencyStatus};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "affordability_sweep")]
#[command(about = "Maximum affordable price over an income grid", long_about = None)]
struct Cli {
    #[arg(long, default_value_t = 4_000.0)]
    min_income: f64,

    #[arg(long, default_value_t = 30_000.0)]
    max_income: f64,

    #[arg(long, default_value_t = 1_000.0)]
    step: f64,

    #[arg(long, default_value = "SC")]
    residency: ResidencyStatus,

    #[arg(long, default_value_t = 0)]
    existing_properties: u32,

    /// Annual interest rate as a decimal
    #[arg(long, default_value_t = 0.035)]
    rate: f64,

    #[arg(long, default_value_t = 30)]
    years: u32,

    /// Directory holding the regulatory tables; built-in tables when omitted
    #[arg(long)]
    config_dir: Option<PathBuf>,

    #[arg(long, default_value = "affordability_sweep.csv")]
    output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
struct SweepRow {
    monthly_income: f64,
    property_type: &'static str,
    loan_type: &'static str,
    tenure_years: u32,
    binding_constraint: &'static str,
    max_loan: f64,
    ltv_pct: f64,
    max_price: f64,
    min_cash_down_payment: f64,
    cpf_eligible_down_payment: f64,
    bsd: f64,
    absd: f64,
    total_cash_required: f64,
    monthly_repayment: f64,
    tdsr_at_max_loan: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    anyhow::ensure!(cli.step > 0.0, "--step must be positive");
    anyhow::ensure!(cli.max_income >= cli.min_income, "--max-income must not be below --min-income");

    let start = Instant::now();
    let config = match &cli.config_dir {
        Some(dir) => RegulatoryConfig::from_csv_path(dir)
            .with_context(|| format!("loading regulatory tables from {}", dir.display()))?,
        None => RegulatoryConfig::singapore_2024(),
    };
    println!("Using regulatory configuration {}", config.version);

    let steps = ((cli.max_income - cli.min_income) / cli.step).floor() as usize;
    let grid: Vec<(f64, PropertyType)> = (0..=steps)
        .flat_map(|i| {
            let income = cli.min_income + i as f64 * cli.step;
            PropertyType::ALL.into_iter().map(move |p| (income, p))
        })
        .collect();

    println!("Running {} affordability cases...", grid.len());
    let run_start = Instant::now();

    let rows: Vec<SweepRow> = grid
        .par_iter()
        .map(|&(income, property_type)| {
            let loan_type = if property_type == PropertyType::Hdb {
                LoanType::Hdb
            } else {
                LoanType::Bank
            };
            let input = AffordabilityInput {
                buyers: vec![Buyer::new(cli.residency, 35, income)],
                existing_monthly_debts: 0.0,
                existing_mortgage_repayments: 0.0,
                property_type,
                loan_type,
                existing_properties: cli.existing_properties,
                existing_loans: 0,
                annual_interest_rate: cli.rate,
                loan_tenure_years: cli.years,
            };
            let result = calculate_affordability(&input, &config);

            SweepRow {
                monthly_income: income,
                property_type: property_type.as_str(),
                loan_type: match loan_type {
                    LoanType::Bank => "Bank",
                    LoanType::Hdb => "HDB",
                },
                tenure_years: result.effective_tenure_years,
                binding_constraint: result.binding_constraint.as_str(),
                max_loan: result.max_loan_amount,
                ltv_pct: result.ltv.rule.max_ltv_pct,
                max_price: result.max_affordable_price,
                min_cash_down_payment: result.min_cash_down_payment,
                cpf_eligible_down_payment: result.cpf_eligible_down_payment,
                bsd: result.stamp_duty.bsd,
                absd: result.stamp_duty.absd,
                total_cash_required: result.total_cash_required,
                monthly_repayment: result.monthly_repayment,
                tdsr_at_max_loan: result.tdsr_at_max_loan,
            }
        })
        .collect();

    println!("Cases complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", cli.output.display());

    println!("\nSweep Summary:");
    for property_type in PropertyType::ALL {
        let prices: Vec<f64> = rows
            .iter()
            .filter(|r| r.property_type == property_type.as_str())
            .map(|r| r.max_price)
            .collect();
        if let (Some(first), Some(last)) = (prices.first(), prices.last()) {
            println!(
                "  {:<6} max price ${:.0} at ${:.0}/month to ${:.0} at ${:.0}/month",
                property_type.as_str(),
                first,
                cli.min_income,
                last,
                cli.min_income + steps as f64 * cli.step
            );
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
