//! Lendcore entry point
//!
//! `run` bootstraps the capability graph and drives a demo loan through its
//! lifecycle; `graph` prints the wired capability table.

use std::path::PathBuf;

use chrono::{Months, Utc};
use clap::{Parser, Subcommand};
use lendcore::bootstrap::AppContext;
use lendcore::{init_app, init_logging, ConfigLoader};
use lendcore_domain::commands::LoanApplicationCommand;
use lendcore_domain::loan::Money;
use lendcore_registry::BindingSource;
use tracing::info;

/// Command line interface for the lendcore platform
#[derive(Parser, Debug)]
#[command(name = "lendcore")]
#[command(about = "Loan account platform - composition root and demo driver")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bootstrap the platform and run a demo loan lifecycle
    Run,
    /// Print the wired capability graph
    Graph,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load()?;
    init_logging(&config.logging)?;

    let context = init_app(config)?;
    match cli.command {
        Command::Run => run_demo(&context).await?,
        Command::Graph => print_graph(&context),
    }
    Ok(())
}

/// Drive one loan from application to full repayment
async fn run_demo(context: &AppContext) -> anyhow::Result<()> {
    let demo = context.config.demo.clone();
    let applications = context.applications();
    let loans = context.loans();

    let today = Utc::now().date_naive();
    let loan = applications
        .submit_application(LoanApplicationCommand {
            client: demo.client,
            principal: Money::new(demo.currency.clone(), demo.principal_minor),
            term_months: demo.term_months,
            submitted_on: today,
            charges: Vec::new(),
        })
        .await?;
    info!(loan_id = %loan.id, status = %loan.status, "application submitted");

    let loan = applications.approve_application(loan.id, today).await?;
    info!(loan_id = %loan.id, status = %loan.status, "application approved");

    let disbursement_date = today
        .checked_add_months(Months::new(1))
        .unwrap_or(today);
    let loan = loans.disburse(loan.id, disbursement_date).await?;
    info!(loan_id = %loan.id, status = %loan.status, "loan disbursed");

    let loan = loans
        .make_repayment(
            loan.id,
            Money::new(demo.currency, demo.principal_minor),
            disbursement_date,
        )
        .await?;
    info!(loan_id = %loan.id, status = %loan.status, "loan repaid in full");

    println!(
        "demo loan {} finished in status '{}' with {} transactions",
        loan.id,
        loan.status,
        loan.transactions.len()
    );
    Ok(())
}

/// Print the capability table in registration order
fn print_graph(context: &AppContext) {
    println!("{:<45} {:<9} {:<9} target", "capability", "source", "resolved");
    for entry in context.capability_graph() {
        let source = match entry.source {
            BindingSource::Default => "default",
            BindingSource::External => "external",
        };
        println!(
            "{:<45} {:<9} {:<9} {}",
            entry.name, source, entry.resolved, entry.target
        );
    }
}
