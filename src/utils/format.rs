//! Display formatting shared by the CLI views.

use crate::metrics::Locale;
use crate::metrics::timeline::parse_date_key;

/// Placeholder for a total value that could not be computed.
pub const NOT_AVAILABLE_FR: &str = "Non disponible";
pub const NOT_AVAILABLE_EN: &str = "Not available";

/// Group digits by three with a space: `12345` → `12 345`.
pub fn format_number_with_spaces(n: u64) -> String {
    group_digits(&n.to_string())
}

fn group_digits(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(' ');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Total value given in hundredths, shown with two decimals and grouped
/// thousands, or a localized "not available" when nothing was summed.
pub fn format_total_value(minor_units: u64, locale: Locale) -> String {
    if minor_units == 0 {
        return match locale {
            Locale::Fr => NOT_AVAILABLE_FR.to_string(),
            Locale::En => NOT_AVAILABLE_EN.to_string(),
        };
    }

    format!(
        "{}.{:02}",
        format_number_with_spaces(minor_units / 100),
        minor_units % 100
    )
}

/// Equipment date for tables: `5 janv. 2024` (fr), `Jan 5, 2024` (en) or
/// `N/A` when missing or unparseable.
pub fn format_date(date_key: Option<&str>, locale: Locale) -> String {
    use chrono::Datelike;

    let Some(date) = date_key.and_then(parse_date_key) else {
        return "N/A".to_string();
    };

    let month = locale.short_month(date.month());
    match locale {
        Locale::Fr => format!("{} {} {}", date.day(), month, date.year()),
        Locale::En => format!("{} {}, {}", month, date.day(), date.year()),
    }
}

/// Truncate to `max_len` characters, appending "…" if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
