use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use parcboard::api::Filters;
use parcboard::cli::{self, OutputFormat};
use parcboard::{config, status};

#[derive(Debug, Parser)]
#[command(name = "parcboard")]
#[command(about = "Equipment inventory dashboard: status KPIs, charts and listings")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

/// Filters merged over the `[filters]` config section.
#[derive(Debug, Args)]
struct FilterArgs {
    /// Equipment status, as entered upstream (e.g. "En service")
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// Creation date lower bound (YYYY-MM-DD)
    #[arg(long)]
    date_from: Option<String>,
    /// Creation date upper bound (YYYY-MM-DD)
    #[arg(long)]
    date_to: Option<String>,
}

impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Filters {
            status: args.status,
            location: args.location,
            model: args.model,
            date_from: args.date_from,
            date_to: args.date_to,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// KPI tiles, status chart and monthly timeline
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Refresh the table view every N seconds
        #[arg(long)]
        watch: Option<u64>,
    },
    /// Equipment counts per normalized status
    Status {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Equipments added per month
    Timeline {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Paged equipment list
    Equipments {
        #[command(flatten)]
        filters: FilterArgs,
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Values available to the status and location filters
    Filters {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config files, API reachability and the status synonym table
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default ~/.parcboard/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `api.base_url`
    Set { key: String, value: String },
    /// Restore the global config file to defaults
    Reset,
    /// Print config file locations
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();

    init_logging(&cfg.logging.level);
    if !cfg.display.color {
        colored::control::set_override(false);
    }

    status::validate_synonym_table()?;

    match app.command {
        Commands::Dashboard {
            filters,
            format,
            watch,
        } => {
            let filters = cfg.filters.merged_with(&filters.into());
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_dashboard(&cfg, &filters, fmt, watch)
        }
        Commands::Status { filters, format } => {
            let filters = cfg.filters.merged_with(&filters.into());
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_status(&cfg, &filters, fmt)
        }
        Commands::Timeline { filters, format } => {
            let filters = cfg.filters.merged_with(&filters.into());
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_timeline(&cfg, &filters, fmt)
        }
        Commands::Equipments {
            filters,
            page,
            format,
        } => {
            let filters = cfg.filters.merged_with(&filters.into());
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_equipments(&cfg, &filters, page, fmt)
        }
        Commands::Filters { format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_filters(&cfg, fmt)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
            ConfigAction::Path => cli::run_config_path(),
        },
    }
}

/// `RUST_LOG` wins; otherwise the `[logging] level` from config.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}
