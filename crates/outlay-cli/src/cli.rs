//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Outlay - Track expenses against monthly budgets
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Personal expense tracker with monthly category budgets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "outlay.db", global = true)]
    pub db: PathBuf,

    /// Category catalog (TOML); falls back to OUTLAY_CATEGORIES, then the
    /// data-dir override, then built-in defaults
    #[arg(long, global = true)]
    pub categories: Option<PathBuf>,

    /// Owner whose records are read and written
    #[arg(long, default_value_t = 1, global = true)]
    pub owner: i64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import records from CSV (date,amount,description,category; no header)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Monthly report: totals, averages and budget alerts
    Report {
        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month 1-12 (defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Budget alerts for the current month
    Alerts,

    /// List a month's records
    List {
        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        month: Option<u32>,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Records per page
        #[arg(long, default_value = "20")]
        page_size: i64,
    },

    /// Add a single record
    Add {
        /// Amount in major units (e.g. 12.50)
        #[arg(short, long)]
        amount: f64,

        #[arg(short, long)]
        description: String,

        /// Date (YYYY-MM-DD, YYYY-MM-DD HH:MM[:SS], MM/DD/YYYY, DD.MM.YYYY or RFC 3339); defaults to now
        #[arg(long)]
        date: Option<String>,

        #[arg(short, long)]
        category: String,
    },

    /// Replace a record's amount, description, date and category
    Edit {
        /// Record ID
        id: i64,

        #[arg(short, long)]
        amount: f64,

        #[arg(short, long)]
        description: String,

        /// Date, in any format `add` accepts
        #[arg(long)]
        date: String,

        #[arg(short, long)]
        category: String,
    },

    /// Delete a record
    Delete {
        /// Record ID
        id: i64,
    },

    /// Years that have records
    Years,

    /// Show the category catalog with budgets
    Categories,
}
