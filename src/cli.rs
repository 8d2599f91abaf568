use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, CommandReport};
use crate::eco::catalog::{ActionId, CustomActionDraft};

/// Exit status for a command that ran but reported issues.
const ISSUES_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "ecotrack",
    version,
    about = "Track your daily climate wins: log eco actions and follow a weekly CO2 goal"
)]
struct Cli {
    /// Print the command report as JSON instead of text lines
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog actions, optionally filtered
    Catalog {
        /// Case-insensitive substring of the action name
        #[arg(long)]
        search: Option<String>,
        /// Category to show (default: All)
        #[arg(long)]
        category: Option<String>,
    },
    /// List catalog categories
    Categories,
    /// Log one occurrence of an action
    Log {
        /// Action id from `ecotrack catalog`
        id: String,
    },
    /// Undo one occurrence; the entry is dropped when its count reaches zero
    Unlog { id: String },
    /// Remove a tracked action entirely
    Remove { id: String },
    /// Reset the week: remove every tracked action
    Clear,
    /// Show or set the weekly CO2 goal in kg
    Goal {
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },
    /// Create a custom action
    AddCustom {
        #[arg(long)]
        name: String,
        /// CO2 reduction per occurrence in kg
        #[arg(long, allow_hyphen_values = true)]
        co2: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show every tracked action with its impact
    Tracked,
    /// Weekly impact summary
    Summary,
    /// Show resolved paths and configuration
    Status,
}

fn dispatch(command: Commands) -> Result<CommandReport> {
    match command {
        Commands::Catalog { search, category } => {
            commands::catalog::run(&commands::catalog::CatalogOptions { search, category })
        }
        Commands::Categories => commands::catalog::run_categories(),
        Commands::Log { id } => commands::track::run_log(&ActionId::parse(&id)),
        Commands::Unlog { id } => commands::track::run_unlog(&ActionId::parse(&id)),
        Commands::Remove { id } => commands::track::run_remove(&ActionId::parse(&id)),
        Commands::Clear => commands::track::run_clear(),
        Commands::Goal { value } => commands::goal::run(value.as_deref()),
        Commands::AddCustom {
            name,
            co2,
            category,
            description,
        } => commands::custom::run(&CustomActionDraft {
            name,
            co2_reduction: co2,
            category,
            description,
        }),
        Commands::Tracked => commands::summary::run_tracked(),
        Commands::Summary => commands::summary::run(),
        Commands::Status => commands::status::run(),
    }
}

fn render_text(report: &CommandReport) -> String {
    let mut out = format!(
        "{}: {}\n",
        report.command,
        if report.ok { "ok" } else { "issues" }
    );
    for detail in &report.details {
        out.push_str(&format!("  {detail}\n"));
    }
    for issue in &report.issues {
        out.push_str(&format!("  ! {issue}\n"));
    }
    out
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = dispatch(cli.command)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    if !report.ok {
        std::process::exit(ISSUES_EXIT_CODE);
    }
    Ok(())
}
