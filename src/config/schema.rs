/// Configuration schema and defaults for parcboard.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[api]`, `[display]`, `[filters]` and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

use crate::api::Filters;
use crate::metrics::Locale;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level parcboard configuration.
///
/// Maps directly to the `~/.parcboard/config.toml` and `.parcboard.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParcConfig {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub filters: Filters,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Inventory REST API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
    /// Equipment list / group-by endpoint, relative to `base_url`.
    pub equipments_path: String,
    /// Status distribution endpoint, relative to `base_url`.
    pub status_distribution_path: String,
    /// Rows requested per equipment page.
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout_ms: 10_000,
            equipments_path: "equipments/".to_string(),
            status_distribution_path: "analytics/status-distribution/".to_string(),
            page_size: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Terminal rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Language of month and date labels: `fr` or `en`.
    pub locale: Locale,
    /// Colored output.
    pub color: bool,
    /// Maximum rows printed by table views.
    pub max_rows: usize,
    /// Currency shown next to the total value.
    pub currency: String,
    /// Width of the longest bar in chart views (characters).
    pub chart_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            color: true,
            max_rows: 50,
            currency: "MAD".to_string(),
            chart_width: 40,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter when `RUST_LOG` is unset: `off`, `error`, `warn`,
    /// `info`, `debug` or `trace`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl ParcConfig {
    /// Annotated default config file, written by `parcboard config init`.
    pub fn default_toml() -> String {
        r#"# parcboard configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (PARCBOARD_*)
#   2. Project config (.parcboard.toml in current directory)
#   3. User global config (~/.parcboard/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://127.0.0.1:8000/api"
timeout_ms = 10000
equipments_path = "equipments/"
status_distribution_path = "analytics/status-distribution/"
page_size = 20

[display]
locale = "fr"          # fr | en
color = true
max_rows = 50
currency = "MAD"
chart_width = 40

[filters]
# Default filters applied to every request (command-line flags win)
# status = "En service"
# location = ""
# model = ""
# date_from = "2024-01-01"
# date_to = "2024-12-31"

[logging]
level = "warn"         # off | error | warn | info | debug | trace
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
