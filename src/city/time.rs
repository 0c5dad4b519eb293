use chrono::{DateTime, Utc};
use chrono_tz::{TZ_VARIANTS, Tz};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::tool;

use super::ToolReport;

/// Fold a city name into IANA zone leaf form: "São Paulo" -> "sao_paulo".
///
/// Decomposes (NFD), drops combining marks and anything that is neither
/// alphanumeric nor whitespace, lowercases, and joins words with `_`.
pub fn normalize_city(city: &str) -> String {
    let folded: String = city
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join("_")
}

/// First zone whose last path component equals `normalized`, ignoring case.
///
/// Zones are scanned in the order of the bundled tz database list, which is
/// sorted by name. Several zones can share a leaf; the first one wins, and a
/// different tz database release may pick a different zone.
pub fn find_zone(normalized: &str) -> Option<Tz> {
    if normalized.is_empty() {
        return None;
    }
    TZ_VARIANTS.iter().copied().find(|tz| {
        tz.name()
            .rsplit_once('/')
            .is_some_and(|(_, leaf)| leaf.eq_ignore_ascii_case(normalized))
    })
}

/// `get_current_time` at an explicit instant.
pub fn current_time_at(city: &str, now: DateTime<Utc>) -> ToolReport {
    let normalized = normalize_city(city);
    tracing::debug!(%city, %normalized, "normalized city");

    match find_zone(&normalized) {
        Some(tz) => {
            let time = now.with_timezone(&tz).format("%H:%M").to_string();
            tracing::info!(zone = tz.name(), %city, %time, "matched time zone");
            ToolReport::success(format!("The current time in {} is {}.", city, time))
        }
        None => {
            tracing::warn!(%city, %normalized, "no time zone information found");
            ToolReport::error(format!(
                "Sorry, I don't have timezone information for {}.",
                city
            ))
        }
    }
}

/// Best-effort city to time lookup by matching IANA zone names.
#[tool(
    name = "get_current_time",
    description = "Returns the current time in a specified city.",
    params(city = "The name of the city for which to retrieve the current time")
)]
pub fn get_current_time(city: String) -> ToolReport {
    tracing::debug!(%city, "get_current_time called");
    current_time_at(&city, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalization_strips_accents_and_punctuation() {
        assert_eq!(normalize_city("New York"), "new_york");
        assert_eq!(normalize_city("  São   Paulo "), "sao_paulo");
        assert_eq!(normalize_city("St. John's"), "st_johns");
        assert_eq!(normalize_city("Zürich"), "zurich");
    }

    #[test]
    fn zone_lookup_by_leaf() {
        assert_eq!(find_zone("new_york"), Some(chrono_tz::America::New_York));
        assert_eq!(find_zone("TOKYO"), Some(chrono_tz::Asia::Tokyo));
        assert_eq!(find_zone("sao_paulo"), Some(chrono_tz::America::Sao_Paulo));
        assert_eq!(find_zone(""), None);
        assert_eq!(find_zone("nowhereistan"), None);
    }

    #[test]
    fn formats_local_time() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 17, 5, 0).unwrap();
        let report = current_time_at("New York", now);
        assert!(report.is_success());
        assert_eq!(report.report, "The current time in New York is 12:05.");

        let report = current_time_at("tokyo", now);
        assert_eq!(report.report, "The current time in tokyo is 02:05.");
    }

    #[test]
    fn live_lookup_reports_hh_mm() {
        let report = get_current_time("New York".to_string());
        assert!(report.is_success());
        let time = report
            .report
            .trim_start_matches("The current time in New York is ")
            .trim_end_matches('.');
        let bytes = time.as_bytes();
        assert_eq!(bytes.len(), 5);
        assert!(bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit());
        assert_eq!(bytes[2], b':');
        assert!(bytes[3].is_ascii_digit() && bytes[4].is_ascii_digit());
    }

    #[test]
    fn unknown_city() {
        let report = get_current_time("Nowhereistan".to_string());
        assert!(!report.is_success());
        assert_eq!(
            report.report,
            "Sorry, I don't have timezone information for Nowhereistan."
        );
    }
}
