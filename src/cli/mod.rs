//! CLI command implementations for the parcboard dashboard.
//!
//! Provides subcommand handlers for:
//! - `parcboard dashboard`: KPI tiles, status chart and monthly timeline
//! - `parcboard status`: per-status totals
//! - `parcboard timeline`: equipments added per month
//! - `parcboard equipments`: paged equipment table
//! - `parcboard filters`: values offered by the status and location filters
//! - `parcboard health`: config files, API reachability, synonym table
//! - `parcboard config show|init|set|reset|path`: configuration management

pub mod charts;

use std::thread;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::api::{ApiClient, EquipmentPage, Filters};
use crate::config::{self, ParcConfig};
use crate::dashboard::{self, SectionError, Snapshot};
use crate::metrics::{AggregatedMetrics, Locale};
use crate::status;
use crate::utils::format::{
    format_date, format_number_with_spaces, format_total_value, truncate,
};

use charts::{ChartSeries, ChartState};

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// parcboard dashboard
// ---------------------------------------------------------------------------

/// Show KPI tiles, the status chart and the monthly timeline.
///
/// With `watch`, the table view refreshes every `watch` seconds until
/// interrupted. Charts keep their last series across refreshes that bring
/// no data.
pub fn run_dashboard(
    config: &ParcConfig,
    filters: &Filters,
    format: OutputFormat,
    watch: Option<u64>,
) -> Result<()> {
    let client = ApiClient::from_config(&config.api);
    let snapshot = dashboard::collect(&client, filters, config.display.locale);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Csv => print_dashboard_csv(&snapshot.metrics),
        OutputFormat::Table => {
            let mut chart_state = ChartState::default();
            print_dashboard_table(&snapshot, filters, config, &mut chart_state);

            if let Some(secs) = watch {
                loop {
                    thread::sleep(Duration::from_secs(secs.max(1)));
                    let snapshot = dashboard::collect(&client, filters, config.display.locale);
                    println!();
                    print_dashboard_table(&snapshot, filters, config, &mut chart_state);
                }
            }
        }
    }

    Ok(())
}

fn print_dashboard_table(
    snapshot: &Snapshot,
    filters: &Filters,
    config: &ParcConfig,
    chart_state: &mut ChartState,
) {
    let metrics = &snapshot.metrics;
    let display = &config.display;

    println!("{}", "Equipment Dashboard".bold().cyan());
    println!("{}", "=".repeat(60));
    if !filters.is_empty() {
        println!("  {} {}", "Filters:".dimmed(), filters.query_string().dimmed());
    }
    println!();

    print_kpi_tiles(metrics, display.locale, &display.currency);
    println!();

    println!("{}", "Status Distribution".bold().cyan());
    let fresh = charts::update_status_chart(chart_state, metrics);
    print_chart(chart_state.status.as_ref(), fresh, display.chart_width, "No status data.");
    println!();

    println!("{}", "Monthly Additions".bold().cyan());
    let fresh = charts::update_timeline_chart(chart_state, metrics);
    print_chart(chart_state.timeline.as_ref(), fresh, display.chart_width, "No timeline data.");
    if metrics.skipped_month_observations > 0 {
        println!(
            "  {}",
            format!(
                "{} date group(s) skipped (missing or invalid date)",
                metrics.skipped_month_observations
            )
            .dimmed()
        );
    }

    print_section_errors(&snapshot.errors);
}

fn print_chart(series: Option<&ChartSeries>, fresh: bool, width: usize, empty_message: &str) {
    let Some(series) = series else {
        println!("  {}", empty_message.yellow());
        return;
    };
    for line in charts::render_bars(series, width) {
        println!("  {}", line);
    }
    if !fresh {
        println!("  {}", "(no new data, showing previous refresh)".dimmed());
    }
}

fn print_kpi_tiles(metrics: &AggregatedMetrics, locale: Locale, currency: &str) {
    let kpi = &metrics.kpi;
    println!(
        "  {} {}",
        "Total equipments:   ".bold(),
        format_number_with_spaces(metrics.total_count)
    );
    println!(
        "  {} {}",
        "In service:         ".bold(),
        format_number_with_spaces(kpi.in_service).green()
    );
    println!(
        "  {} {}",
        "Maintenance / out:  ".bold(),
        format_number_with_spaces(kpi.in_maintenance_or_out).red()
    );
    println!(
        "  {} {}",
        "In stock:           ".bold(),
        format_number_with_spaces(kpi.in_stock).blue()
    );

    let value = format_total_value(metrics.total_value_minor, locale);
    if metrics.total_value_minor > 0 {
        println!("  {} {} {}", "Total value:        ".bold(), value, currency);
    } else {
        println!("  {} {}", "Total value:        ".bold(), value.dimmed());
    }
}

fn print_dashboard_csv(metrics: &AggregatedMetrics) {
    println!("section,key,label,count");
    for (status, count) in &metrics.per_status_totals {
        println!("status,{},{},{}", csv_field(status.code()), csv_field(status.label()), count);
    }
    println!("kpi,in_service,,{}", metrics.kpi.in_service);
    println!("kpi,in_maintenance_or_out,,{}", metrics.kpi.in_maintenance_or_out);
    println!("kpi,in_stock,,{}", metrics.kpi.in_stock);
    for entry in &metrics.monthly_series {
        println!("month,{},{},{}", entry.month_key, csv_field(&entry.label), entry.count);
    }
}

fn print_section_errors(errors: &[SectionError]) {
    if errors.is_empty() {
        return;
    }
    println!();
    for error in errors {
        println!(
            "  {} {}: {}",
            "!".yellow().bold(),
            error.section.yellow(),
            error.message.dimmed()
        );
    }
}

// ---------------------------------------------------------------------------
// parcboard status
// ---------------------------------------------------------------------------

/// Show per-status totals and shares.
pub fn run_status(config: &ParcConfig, filters: &Filters, format: OutputFormat) -> Result<()> {
    let client = ApiClient::from_config(&config.api);
    let snapshot = dashboard::collect(&client, filters, config.display.locale);
    let metrics = &snapshot.metrics;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "total_count": metrics.total_count,
                "total_value": metrics.total_value(),
                "kpi": metrics.kpi,
                "statuses": metrics.per_status_totals.iter().map(|(s, count)| serde_json::json!({
                    "code": s.code(),
                    "label": s.label(),
                    "count": count,
                    "pct": metrics.status_pct(s),
                })).collect::<Vec<_>>(),
                "errors": snapshot.errors,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("code,label,count,pct");
            for (s, count) in &metrics.per_status_totals {
                println!(
                    "{},{},{},{:.1}",
                    csv_field(s.code()),
                    csv_field(s.label()),
                    count,
                    metrics.status_pct(s)
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "Equipments by Status".bold().cyan());
            println!("{}", "=".repeat(50));

            if metrics.per_status_totals.is_empty() {
                println!("  {}", "No status data.".yellow());
            } else {
                println!("  {:<20} {:>10} {:>8}", "Status", "Count", "Share");
                println!("  {}", "-".repeat(40));
                for (i, (s, count)) in metrics.per_status_totals.iter().enumerate() {
                    let line = format!(
                        "  {:<20} {:>10} {:>7.1}%",
                        truncate(s.label(), 20),
                        format_number_with_spaces(*count),
                        metrics.status_pct(s),
                    );
                    if i % 2 == 0 {
                        println!("{}", line);
                    } else {
                        println!("{}", line.dimmed());
                    }
                }
                println!("  {}", "-".repeat(40));
                println!(
                    "  {} {:>10}",
                    format!("{:<20}", "Total").bold(),
                    format_number_with_spaces(metrics.total_count)
                );
            }

            print_section_errors(&snapshot.errors);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// parcboard timeline
// ---------------------------------------------------------------------------

/// Show equipments added per month, oldest first.
pub fn run_timeline(config: &ParcConfig, filters: &Filters, format: OutputFormat) -> Result<()> {
    let client = ApiClient::from_config(&config.api);
    let snapshot = dashboard::collect(&client, filters, config.display.locale);
    let metrics = &snapshot.metrics;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "months": metrics.monthly_series,
                "skipped": metrics.skipped_month_observations,
                "errors": snapshot.errors,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("month,label,count");
            for entry in &metrics.monthly_series {
                println!("{},{},{}", entry.month_key, csv_field(&entry.label), entry.count);
            }
        }
        OutputFormat::Table => {
            println!("{}", "Monthly Additions".bold().cyan());
            println!("{}", "=".repeat(50));

            let mut chart_state = ChartState::default();
            let fresh = charts::update_timeline_chart(&mut chart_state, metrics);
            print_chart(
                chart_state.timeline.as_ref(),
                fresh,
                config.display.chart_width,
                "No timeline data.",
            );

            if metrics.skipped_month_observations > 0 {
                println!(
                    "  {}",
                    format!(
                        "{} date group(s) skipped (missing or invalid date)",
                        metrics.skipped_month_observations
                    )
                    .dimmed()
                );
            }

            print_section_errors(&snapshot.errors);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// parcboard equipments
// ---------------------------------------------------------------------------

/// Show one page of the equipment list.
pub fn run_equipments(
    config: &ParcConfig,
    filters: &Filters,
    page: u32,
    format: OutputFormat,
) -> Result<()> {
    let client = ApiClient::from_config(&config.api);
    let page = page.max(1);
    let listing = client.fetch_equipments(filters, page, config.api.page_size)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Csv => print_equipments_csv(&listing),
        OutputFormat::Table => print_equipments_table(&listing, config),
    }

    Ok(())
}

fn print_equipments_table(listing: &EquipmentPage, config: &ParcConfig) {
    let locale = config.display.locale;

    println!("{}", "Equipments".bold().cyan());
    println!("{}", "=".repeat(100));

    if listing.results.is_empty() {
        println!("  {}", "No equipments match the current filters.".yellow());
        return;
    }

    println!(
        "  {:<20} {:<16} {:<14} {:<14} {:<16} {:>14}",
        "Model", "Serial", "Barcode", "Status", "Location", "Created"
    );
    println!("  {}", "-".repeat(98));

    for (i, eq) in listing.results.iter().take(config.display.max_rows).enumerate() {
        let line = format!(
            "  {:<20} {:<16} {:<14} {:<14} {:<16} {:>14}",
            truncate(eq.model.as_deref().unwrap_or("N/A"), 20),
            truncate(eq.serial.as_deref().unwrap_or("N/A"), 16),
            truncate(eq.barcode.as_deref().unwrap_or("N/A"), 14),
            truncate(status::normalize(eq.status.as_deref()).label(), 14),
            truncate(eq.location.as_deref().unwrap_or("N/A"), 16),
            format_date(eq.creation_date.as_deref(), locale),
        );

        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!();
    println!(
        "  {}",
        format!(
            "Page {} of {} ({} equipments)",
            listing.page.max(1),
            page_count(listing.total, listing.page_size),
            format_number_with_spaces(listing.total)
        )
        .dimmed()
    );
}

fn print_equipments_csv(listing: &EquipmentPage) {
    println!("id,model,serial,barcode,status,location,creation_date");
    for eq in &listing.results {
        println!(
            "{},{},{},{},{},{},{}",
            csv_field(eq.id.as_deref().unwrap_or("")),
            csv_field(eq.model.as_deref().unwrap_or("")),
            csv_field(eq.serial.as_deref().unwrap_or("")),
            csv_field(eq.barcode.as_deref().unwrap_or("")),
            csv_field(status::normalize(eq.status.as_deref()).code()),
            csv_field(eq.location.as_deref().unwrap_or("")),
            csv_field(eq.creation_date.as_deref().unwrap_or("")),
        );
    }
}

/// Number of pages for `total` rows, at least one.
fn page_count(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        1
    } else {
        total.div_ceil(page_size).max(1)
    }
}

// ---------------------------------------------------------------------------
// parcboard filters
// ---------------------------------------------------------------------------

/// Show the values offered by the status and location filters.
pub fn run_filters(config: &ParcConfig, format: OutputFormat) -> Result<()> {
    let client = ApiClient::from_config(&config.api);
    let options = dashboard::filter_options(&client);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
        OutputFormat::Csv => {
            println!("filter,value");
            for s in &options.statuses {
                println!("status,{}", csv_field(s.label()));
            }
            for location in &options.locations {
                println!("location,{}", csv_field(location));
            }
        }
        OutputFormat::Table => {
            println!("{}", "Filter Options".bold().cyan());
            println!("{}", "=".repeat(40));

            println!("{}", "Status".bold());
            for s in &options.statuses {
                println!("  {} {}", "·".dimmed(), s.label());
            }
            println!();
            println!("{}", "Location".bold());
            for location in &options.locations {
                println!("  {} {}", "·".dimmed(), location);
            }

            print_section_errors(&options.errors);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// parcboard health
// ---------------------------------------------------------------------------

/// Check config files, API reachability and the status synonym table.
pub fn run_health(config: &ParcConfig) -> Result<()> {
    println!("{}", "parcboard Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.parcboard/config.toml found"
        } else {
            "not found (run `parcboard config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".parcboard.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = ApiClient::from_config(&config.api);
    let api_ok = client.is_healthy();
    let api_detail = if api_ok {
        format!("reachable at {}", client.base_url())
    } else {
        format!("not reachable at {}", client.base_url())
    };
    print_health_item("Inventory API", api_ok, &api_detail);

    match status::validate_synonym_table() {
        Ok(()) => print_health_item(
            "Status synonyms",
            true,
            &format!("{} entries", status::STATUS_SYNONYMS.len()),
        ),
        Err(e) => print_health_item("Status synonyms", false, &format!("{e:#}")),
    }

    print_health_item(
        "Locale",
        true,
        &format!("{} (currency {})", config.display.locale, config.display.currency),
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// parcboard config show | init | set | reset | path
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective parcboard Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.parcboard/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.parcboard/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".parcboard.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".parcboard.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "PARCBOARD_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.parcboard/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Point [api] base_url at your inventory backend.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Print the config file locations.
pub fn run_config_path() -> Result<()> {
    match config::global_config_file() {
        Some(path) => println!("{} {}", "global: ".bold(), path.display()),
        None => println!("{} {}", "global: ".bold(), "no home directory".yellow()),
    }
    match config::project_config_file() {
        Some(path) => println!("{} {}", "project:".bold(), path.display()),
        None => println!("{} {}", "project:".bold(), "no working directory".yellow()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Quote a CSV field if it contains a separator, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("Rabat"), "Rabat");
        assert_eq!(csv_field("Bureau 2, étage 1"), "\"Bureau 2, étage 1\"");
        assert_eq!(csv_field("écran 24\""), "\"écran 24\"\"\"");
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(134, 20), 7);
        assert_eq!(page_count(5, 0), 1);
    }
}
