//! Property Engine CLI
//!
//! Command-line interface for stamp duty, affordability, mortgage, CPF and
//! total cost of ownership calculations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use property_engine::affordability::{calculate_affordability, AffordabilityInput, AffordabilityResult};
use property_engine::config::loader;
use property_engine::cpf::{optimize_cpf_usage, CpfComparison, CpfOptimizerInput};
use property_engine::mortgage::{mortgage_summary, MortgageSummary};
use property_engine::stamp_duty::{calculate_stamp_duty, StampDutyInput, StampDutyResult};
use property_engine::tco::{calculate_tco, TcoInput, TcoResult};
use property_engine::{Buyer, LoanType, PropertyType, RegulatoryConfig, ResidencyStatus, SaleFacts};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "property_engine")]
#[command(about = "Singapore residential property calculations", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print results as JSON instead of a report
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Directory holding the regulatory CSV tables and parameters.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Regulatory configuration snapshot (JSON); takes precedence over --config-dir
    #[arg(long, global = true)]
    config_json: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Buyer's, Additional Buyer's and Seller's Stamp Duty on a purchase
    StampDuty {
        #[arg(long)]
        price: f64,

        #[arg(long, default_value = "SC")]
        residency: ResidencyStatus,

        /// Residency of a co-buyer on a joint purchase
        #[arg(long)]
        joint_residency: Option<ResidencyStatus>,

        #[arg(long, default_value = "Condo")]
        property_type: PropertyType,

        /// Residential properties already owned
        #[arg(long, default_value_t = 0)]
        existing_properties: u32,

        /// Sale price, to assess SSD on a disposal
        #[arg(long, requires = "holding_months")]
        sale_price: Option<f64>,

        /// Months held at the time of sale
        #[arg(long, requires = "sale_price")]
        holding_months: Option<u32>,
    },

    /// Maximum affordable purchase price for one or two buyers
    Affordability(AffordabilityArgs),

    /// Monthly repayment and amortization schedule
    Mortgage {
        #[arg(long)]
        principal: f64,

        /// Annual interest rate as a decimal (0.035 for 3.5%)
        #[arg(long)]
        rate: f64,

        #[arg(long)]
        years: u32,

        /// Loan start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Write the full schedule to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Schedule rows to print
        #[arg(long, default_value_t = 12)]
        show: usize,
    },

    /// Compare CPF Ordinary Account usage strategies
    Cpf {
        #[arg(long)]
        price: f64,

        #[arg(long)]
        loan: f64,

        /// Annual interest rate as a decimal
        #[arg(long)]
        rate: f64,

        #[arg(long)]
        years: u32,

        /// Current CPF Ordinary Account balance
        #[arg(long)]
        oa_balance: f64,

        #[arg(long)]
        age: u32,

        #[arg(long, default_value_t = 65)]
        retirement_age: u32,

        /// Monthly contribution credited to the OA
        #[arg(long, default_value_t = 0.0)]
        monthly_contribution: f64,
    },

    /// Total cost of ownership over a holding period
    Tco {
        #[arg(long)]
        price: f64,

        #[arg(long)]
        loan: f64,

        /// Annual interest rate as a decimal
        #[arg(long)]
        rate: f64,

        #[arg(long)]
        years: u32,

        /// Years held before selling
        #[arg(long)]
        holding_years: u32,

        /// Annual price appreciation as a decimal
        #[arg(long, default_value_t = 0.0)]
        appreciation: f64,

        #[arg(long, default_value = "SC")]
        residency: ResidencyStatus,

        #[arg(long)]
        joint_residency: Option<ResidencyStatus>,

        #[arg(long, default_value = "Condo")]
        property_type: PropertyType,

        #[arg(long, default_value_t = 0)]
        existing_properties: u32,

        /// Tax as a let-out property instead of owner-occupied
        #[arg(long, default_value_t = false)]
        investment: bool,

        /// Annual Value for property tax; estimated from price when omitted
        #[arg(long)]
        annual_value: Option<f64>,

        /// Monthly maintenance; configured default for the property type when omitted
        #[arg(long)]
        monthly_maintenance: Option<f64>,
    },

    /// Show the active regulatory configuration
    Config {
        /// Write the configuration as a JSON snapshot to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Args)]
struct AffordabilityArgs {
    /// Read the full affordability input from a JSON file
    #[arg(long)]
    input: Option<PathBuf>,

    /// Fixed monthly income of the main buyer
    #[arg(long, required_unless_present = "input")]
    income: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    variable_income: f64,

    #[arg(long, default_value = "SC")]
    residency: ResidencyStatus,

    #[arg(long, default_value_t = 35)]
    age: u32,

    /// Fixed monthly income of a co-buyer
    #[arg(long)]
    co_income: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    co_variable_income: f64,

    #[arg(long, default_value = "SC")]
    co_residency: ResidencyStatus,

    #[arg(long, default_value_t = 35)]
    co_age: u32,

    /// All existing monthly debt repayments
    #[arg(long, default_value_t = 0.0)]
    debts: f64,

    /// Existing monthly property loan repayments (part of --debts)
    #[arg(long, default_value_t = 0.0)]
    mortgage_debts: f64,

    #[arg(long, default_value = "Condo")]
    property_type: PropertyType,

    #[arg(long, default_value = "Bank")]
    loan_type: LoanType,

    #[arg(long, default_value_t = 0)]
    existing_properties: u32,

    #[arg(long, default_value_t = 0)]
    existing_loans: u32,

    /// Annual interest rate as a decimal
    #[arg(long, default_value_t = 0.035)]
    rate: f64,

    #[arg(long, default_value_t = 30)]
    years: u32,
}

impl AffordabilityArgs {
    fn to_input(&self) -> Result<AffordabilityInput> {
        if let Some(path) = &self.input {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading affordability input {}", path.display()))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("parsing affordability input {}", path.display()));
        }

        let income = self.income.context("--income is required without --input")?;
        let mut buyers = vec![Buyer::new(self.residency, self.age, income).with_variable_income(self.variable_income)];
        if let Some(co_income) = self.co_income {
            buyers.push(Buyer::new(self.co_residency, self.co_age, co_income).with_variable_income(self.co_variable_income));
        }

        Ok(AffordabilityInput {
            buyers,
            existing_monthly_debts: self.debts,
            existing_mortgage_repayments: self.mortgage_debts,
            property_type: self.property_type,
            loan_type: self.loan_type,
            existing_properties: self.existing_properties,
            existing_loans: self.existing_loans,
            annual_interest_rate: self.rate,
            loan_tenure_years: self.years,
        })
    }
}

/// One schedule line as written to CSV
#[derive(Serialize)]
struct ScheduleCsvRow {
    month: u32,
    payment_date: NaiveDate,
    payment: f64,
    principal: f64,
    interest: f64,
    balance: f64,
    cumulative_interest: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match &cli.cmd {
        Commands::StampDuty {
            price,
            residency,
            joint_residency,
            property_type,
            existing_properties,
            sale_price,
            holding_months,
        } => {
            let mut input = StampDutyInput::purchase(*price, *residency, *property_type, *existing_properties);
            if let Some(joint) = joint_residency {
                input = input.with_joint_buyer(*joint);
            }
            if let (Some(sale_price), Some(months)) = (sale_price, holding_months) {
                input = input.with_sale(SaleFacts::new(*sale_price, *months));
            }
            let result = calculate_stamp_duty(&input, &config);
            emit(cli.json, &result, |r| print_stamp_duty(&input, r))?;
        }
        Commands::Affordability(args) => {
            let input = args.to_input()?;
            let result = calculate_affordability(&input, &config);
            emit(cli.json, &result, print_affordability)?;
        }
        Commands::Mortgage {
            principal,
            rate,
            years,
            start_date,
            csv,
            show,
        } => {
            let start = start_date.unwrap_or_else(|| Local::now().date_naive());
            let summary = mortgage_summary(*principal, *rate, *years, start);
            if let Some(path) = csv {
                write_schedule_csv(path, &summary)?;
            }
            emit(cli.json, &summary, |s| print_mortgage(s, *show))?;
            if let Some(path) = csv {
                if !cli.json {
                    println!("\nFull schedule written to: {}", path.display());
                }
            }
        }
        Commands::Cpf {
            price,
            loan,
            rate,
            years,
            oa_balance,
            age,
            retirement_age,
            monthly_contribution,
        } => {
            let input = CpfOptimizerInput {
                property_price: *price,
                loan_amount: *loan,
                annual_interest_rate: *rate,
                loan_tenure_years: *years,
                cpf_oa_balance: *oa_balance,
                current_age: *age,
                retirement_age: *retirement_age,
                monthly_oa_contribution: *monthly_contribution,
            };
            let comparison = optimize_cpf_usage(&input, &config);
            emit(cli.json, &comparison, print_cpf)?;
        }
        Commands::Tco {
            price,
            loan,
            rate,
            years,
            holding_years,
            appreciation,
            residency,
            joint_residency,
            property_type,
            existing_properties,
            investment,
            annual_value,
            monthly_maintenance,
        } => {
            let input = TcoInput {
                purchase_price: *price,
                loan_amount: *loan,
                annual_interest_rate: *rate,
                loan_tenure_years: *years,
                holding_period_years: *holding_years,
                annual_appreciation_rate: *appreciation,
                residency: *residency,
                joint_residency: *joint_residency,
                existing_properties: *existing_properties,
                property_type: *property_type,
                owner_occupied: !investment,
                annual_value: *annual_value,
                monthly_maintenance: *monthly_maintenance,
            };
            let result = calculate_tco(&input, &config);
            emit(cli.json, &result, |r| print_tco(&input, r))?;
        }
        Commands::Config { export } => {
            if let Some(path) = export {
                let json = serde_json::to_string_pretty(config.data())?;
                std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
                println!("Configuration {} written to: {}", config.version, path.display());
            } else {
                print_config(&config);
            }
        }
    }

    Ok(())
}

fn load_config(args: &ConfigArgs) -> Result<RegulatoryConfig> {
    if let Some(path) = &args.config_json {
        return loader::from_json_file(path)
            .with_context(|| format!("loading regulatory snapshot {}", path.display()));
    }
    if let Some(dir) = &args.config_dir {
        return RegulatoryConfig::from_csv_path(dir)
            .with_context(|| format!("loading regulatory tables from {}", dir.display()));
    }
    Ok(RegulatoryConfig::singapore_2024())
}

fn emit<T: Serialize>(json: bool, value: &T, report: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        report(value);
    }
    Ok(())
}

fn write_schedule_csv(path: &Path, summary: &MortgageSummary) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in &summary.schedule {
        writer.serialize(ScheduleCsvRow {
            month: row.entry.month,
            payment_date: row.payment_date,
            payment: row.entry.payment,
            principal: row.entry.principal_component,
            interest: row.entry.interest_component,
            balance: row.entry.balance,
            cumulative_interest: row.entry.cumulative_interest,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn print_stamp_duty(input: &StampDutyInput, result: &StampDutyResult) {
    let breakdown = &result.breakdown;

    println!("Stamp Duty");
    println!("==========\n");
    println!("  Purchase Price: ${:.2}", input.purchase_price);
    println!("  Property Type: {}", input.property_type.as_str());
    println!("  Effective Residency: {}", breakdown.effective_residency.as_str());
    println!("  Existing Properties: {}", input.existing_properties);
    println!();

    println!("Buyer's Stamp Duty:");
    for tier in &breakdown.bsd_tiers {
        println!(
            "  {:<24} {:>14.2} x {:>5.2}% = {:>12.2}",
            tier.label,
            tier.taxable_amount,
            tier.rate * 100.0,
            tier.duty
        );
    }
    println!("  BSD: ${:.2}", result.bsd);

    println!("\nAdditional Buyer's Stamp Duty:");
    println!("  Rate: {:.2}%{}", breakdown.absd_rate.rate * 100.0, if breakdown.absd_rate.was_fallback { " (fallback)" } else { "" });
    println!("  Basis: {}", breakdown.absd_rate.rationale);
    println!("  ABSD: ${:.2}", result.absd);

    if let Some(sale) = &input.sale {
        println!("\nSeller's Stamp Duty:");
        println!("  Sale Price: ${:.2} after {} months", sale.sale_price, sale.holding_period_months);
        match (&breakdown.ssd.band, breakdown.ssd.exempt) {
            (_, true) => println!("  Exempt"),
            (Some(band), false) => println!("  {} at {:.2}%", band, breakdown.ssd.rate * 100.0),
            (None, false) => {}
        }
        println!("  SSD: ${:.2}", result.ssd);
    }

    println!("\nTotal Stamp Duty: ${:.2}", result.total_stamp_duty);
}

fn print_affordability(result: &AffordabilityResult) {
    println!("Affordability");
    println!("=============\n");
    println!("  Tenure: {} years", result.effective_tenure_years);
    println!("  Binding Constraint: {}", result.binding_constraint.as_str());
    println!("  Max Loan: ${:.2}", result.max_loan_amount);
    println!(
        "  LTV: {:.0}% ({}{})",
        result.ltv.rule.max_ltv_pct,
        result.ltv.rationale,
        if result.ltv.was_fallback { ", fallback" } else { "" }
    );
    println!("  Max Affordable Price: ${:.2}", result.max_affordable_price);
    println!();
    println!("Down Payment:");
    println!("  Total: ${:.2}", result.total_down_payment);
    println!("  Minimum Cash: ${:.2}", result.min_cash_down_payment);
    println!("  CPF Eligible: ${:.2}", result.cpf_eligible_down_payment);
    println!();
    println!("Stamp Duty ({}):", result.effective_residency.as_str());
    println!("  BSD: ${:.2}", result.stamp_duty.bsd);
    println!("  ABSD: ${:.2}", result.stamp_duty.absd);
    println!();
    println!("Total Cash Required: ${:.2}", result.total_cash_required);
    println!(
        "Monthly Repayment: ${:.2} (TDSR {:.2}%, {})",
        result.monthly_repayment,
        result.tdsr_at_max_loan * 100.0,
        if result.within_tdsr_limit { "within limit" } else { "over limit" }
    );
}

fn print_mortgage(summary: &MortgageSummary, show: usize) {
    println!("Mortgage");
    println!("========\n");
    println!("  Principal: ${:.2}", summary.principal);
    println!("  Rate: {:.3}%", summary.annual_rate * 100.0);
    println!("  Tenure: {} months", summary.tenure_months);
    println!("  Monthly Repayment: ${:.2}", summary.monthly_repayment);
    println!();

    println!("{:>5} {:>12} {:>12} {:>12} {:>12} {:>14}", "Month", "Date", "Payment", "Principal", "Interest", "Balance");
    println!("{}", "-".repeat(72));
    for row in summary.schedule.iter().take(show) {
        println!(
            "{:>5} {:>12} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.entry.month,
            row.payment_date,
            row.entry.payment,
            row.entry.principal_component,
            row.entry.interest_component,
            row.entry.balance
        );
    }
    if summary.schedule.len() > show {
        println!("... ({} more months)", summary.schedule.len() - show);
    }

    println!("\nSummary:");
    println!("  Total Payment: ${:.2}", summary.total_payment);
    println!("  Total Interest: ${:.2} ({:.2}% of payments)", summary.total_interest, summary.interest_pct_of_total);
    if let Some(last) = summary.final_payment_date {
        println!("  Final Payment: {}", last);
    }
}

fn print_cpf(comparison: &CpfComparison) {
    println!("CPF Usage Comparison");
    println!("====================\n");
    println!(
        "{:<22} {:>14} {:>14} {:>16} {:>16} {:>16}",
        "Scenario", "CPF Down", "CPF Install.", "Total Interest", "OA at Retire", "Net Wealth"
    );
    println!("{}", "-".repeat(104));
    for scenario in comparison.scenarios() {
        println!(
            "{:<22} {:>14.2} {:>14.2} {:>16.2} {:>16.2} {:>16.2}",
            format!("{}: {}", scenario.kind.letter(), scenario.kind.name()),
            scenario.cpf_down_payment,
            scenario.total_cpf_installments,
            scenario.total_interest,
            scenario.projected_cpf_oa_at_retirement,
            scenario.net_wealth_at_retirement
        );
    }

    let best = comparison.recommended_scenario();
    println!("\nRecommended: Scenario {} ({})", best.kind.letter(), best.kind.name());
    println!("  Interest Saved (A vs C): ${:.2}", comparison.interest_saved);
    println!("  CPF Reduction (B vs C): ${:.2}", comparison.cpf_reduction);
}

fn print_tco(input: &TcoInput, result: &TcoResult) {
    let costs = &result.costs;

    println!("Total Cost of Ownership ({} years)", input.holding_period_years);
    println!("==============================\n");
    println!("  Purchase Price: ${:.2}", costs.purchase_price);
    println!("  BSD: ${:.2}", costs.stamp_duty.bsd);
    println!("  ABSD: ${:.2}", costs.stamp_duty.absd);
    if costs.stamp_duty.ssd > 0.0 {
        println!("  SSD on Sale: ${:.2}", costs.stamp_duty.ssd);
    }
    println!("  Mortgage Interest: ${:.2}", costs.mortgage_interest);
    println!(
        "  Property Tax: ${:.2} (${:.2}/yr on AV ${:.2})",
        costs.property_tax, result.annual_property_tax, result.annual_value
    );
    println!("  Maintenance: ${:.2} (${:.2}/yr)", costs.maintenance, result.annual_maintenance);
    println!("  Legal Fees: ${:.2}", costs.legal_fees);
    println!("  Valuation Fee: ${:.2}", costs.valuation_fee);
    println!("  Grand Total: ${:.2}", result.grand_total);
    println!();
    println!("  Projected Sale Price: ${:.2}", result.projected_sale_price);
    println!("  Outstanding Loan at Sale: ${:.2}", result.outstanding_loan_at_sale);
    println!("  Net Gain: ${:.2}", result.net_gain);
    println!("  Annualized Return: {:.2}%", result.annualized_return * 100.0);
}

fn print_config(config: &RegulatoryConfig) {
    println!("Regulatory Configuration {}", config.version);
    println!("  Effective: {}", config.effective_date);
    println!("  Last Updated: {}", config.last_updated);
    println!("  BSD Tiers: {}", config.bsd_tiers.len());
    println!("  ABSD Rates: {} (entity {:.0}%)", config.absd_rates.len(), config.absd_entity_rate * 100.0);
    println!(
        "  SSD Bands: {} (exempt from {} months)",
        config.ssd.tiers.len(),
        config.ssd.exemption_threshold_months
    );
    println!("  LTV Rules: {}", config.ltv_rules.len());
    println!("  TDSR Limit: {:.0}%", config.tdsr.limit * 100.0);
    println!("  MSR Limit: {:.0}%", config.msr.limit * 100.0);
    println!(
        "  CPF OA Rate: {:.2}%, SA Rate: {:.2}%",
        config.cpf.oa_interest_rate * 100.0,
        config.cpf.sa_interest_rate * 100.0
    );
}
