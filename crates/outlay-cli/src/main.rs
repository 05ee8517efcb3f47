//! Outlay CLI - Personal expense tracker
//!
//! Usage:
//!   outlay init                 Initialize database
//!   outlay import --file CSV    Import records (date,amount,description,category)
//!   outlay report               Current month totals, averages and alerts
//!   outlay add --amount 12.5 --description Lunch --category groceries

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let owner = cli.owner;
    let today = commands::today();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db)?;
            let catalog = commands::load_catalog(cli.categories.as_deref())?;
            commands::cmd_import(&db, &catalog, owner, &file).map(|_| ())
        }
        Commands::Report { year, month, json } => {
            let db = commands::open_db(&cli.db)?;
            let catalog = commands::load_catalog(cli.categories.as_deref())?;
            let period = commands::resolve_month(year, month, today)?;
            commands::cmd_report(&db, &catalog, owner, period, today, json).map(|_| ())
        }
        Commands::Alerts => {
            let db = commands::open_db(&cli.db)?;
            let catalog = commands::load_catalog(cli.categories.as_deref())?;
            commands::cmd_alerts(&db, &catalog, owner, today).map(|_| ())
        }
        Commands::List {
            year,
            month,
            page,
            page_size,
        } => {
            let db = commands::open_db(&cli.db)?;
            let period = commands::resolve_month(year, month, today)?;
            commands::cmd_list(&db, owner, period, page, page_size).map(|_| ())
        }
        Commands::Add {
            amount,
            description,
            date,
            category,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(
                &db,
                owner,
                amount,
                &description,
                date.as_deref(),
                &category,
            )
            .map(|_| ())
        }
        Commands::Edit {
            id,
            amount,
            description,
            date,
            category,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_edit(&db, owner, id, amount, &description, &date, &category)
        }
        Commands::Delete { id } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_delete(&db, owner, id)
        }
        Commands::Years => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_years(&db, owner, today).map(|_| ())
        }
        Commands::Categories => {
            let catalog = commands::load_catalog(cli.categories.as_deref())?;
            commands::cmd_categories(&catalog)
        }
    }
}
