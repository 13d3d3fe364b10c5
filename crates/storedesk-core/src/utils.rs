//! Utility functions for the storedesk admin console

use chrono::{DateTime, Utc};
use std::path::Path;

/// Content types accepted for bulk image staging
pub const IMAGE_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Content type required for bulk CSV uploads
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Parse an RFC 3339 timestamp into UTC
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Content type reported for a local file, by extension
///
/// Stands in for the MIME type a browser file picker reports.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => CSV_CONTENT_TYPE,
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Filename from a `Content-Disposition` header, falling back to `default`
#[must_use]
pub fn filename_from_content_disposition(header: Option<&str>, default: &str) -> String {
    header
        .and_then(|value| {
            let start = value.find("filename=\"")? + "filename=\"".len();
            let rest = value.get(start..)?;
            let end = rest.find('"')?;
            rest.get(..end)
        })
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Sanitize a server-provided filename before writing it locally
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '.' || c == '_' || c == '-' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_matches(|c| c == '_' || c == '.')
        .to_string()
}

/// Avatar initials: first letter of up to the first two words, uppercased
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// First character uppercased, the rest untouched
#[must_use]
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Payment method key as shown to admins: the first `_` becomes a space
#[must_use]
pub fn payment_method_label(method: &str) -> String {
    method.replacen('_', " ", 1)
}

/// Truncate to `max` characters, appending `...` when anything was cut
#[must_use]
pub fn truncate_label(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let head: String = value.chars().take(max).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}

/// Rupee amount with thousands separators and two decimals
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}₹{grouped}.{frac}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("2024-03-15T14:25:30.000Z"),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 14, 25, 30).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-03-15T20:00:00+05:30"),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap())
        );
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[rstest]
    #[case("products.csv", "text/csv")]
    #[case("PHOTO.JPG", "image/jpeg")]
    #[case("a/b/c.jpeg", "image/jpeg")]
    #[case("frame.webp", "image/webp")]
    #[case("anim.gif", "image/gif")]
    #[case("noext", "application/octet-stream")]
    fn test_content_type_for(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(content_type_for(Path::new(name)), expected);
    }

    #[test]
    fn test_filename_from_content_disposition() {
        assert_eq!(
            filename_from_content_disposition(
                Some("attachment; filename=\"invoice-ORD123.pdf\""),
                "invoice.pdf"
            ),
            "invoice-ORD123.pdf"
        );
        assert_eq!(
            filename_from_content_disposition(Some("attachment"), "invoice.pdf"),
            "invoice.pdf"
        );
        assert_eq!(filename_from_content_disposition(None, "invoice.pdf"), "invoice.pdf");
        assert_eq!(
            filename_from_content_disposition(Some("attachment; filename=\"../../etc/passwd\""), "x.pdf"),
            "etc_passwd"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("invoice 12.pdf"), "invoice_12.pdf");
        assert_eq!(sanitize_filename("___file___.pdf"), "file___.pdf");
        assert_eq!(sanitize_filename("a/b\\c.pdf"), "a_b_c.pdf");
    }

    #[rstest]
    #[case("Asha Rao", "AR")]
    #[case("asha", "A")]
    #[case("  mary jane watson ", "MJ")]
    #[case("", "")]
    fn test_initials(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(initials(name), expected);
    }

    #[test]
    fn test_labels() {
        assert_eq!(capitalize("shipped"), "Shipped");
        assert_eq!(capitalize(""), "");
        assert_eq!(payment_method_label("cash_on_delivery"), "cash on_delivery");
        assert_eq!(payment_method_label("upi"), "upi");
        assert_eq!(truncate_label("Polarized Aviator Gold", 15), "Polarized Aviat...");
        assert_eq!(truncate_label("Short", 15), "Short");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(999.5), "₹999.50");
        assert_eq!(format_currency(1_234_567.891), "₹1,234,567.89");
        assert_eq!(format_currency(-1500.0), "-₹1,500.00");
    }

    proptest! {
        #[test]
        fn prop_truncate_never_exceeds_limit(s in "\\PC{0,40}", max in 1usize..30) {
            let out = truncate_label(&s, max);
            prop_assert!(out.chars().count() <= max + 3);
        }

        #[test]
        fn prop_initials_at_most_two_words(s in "[a-zA-Z ]{0,40}") {
            prop_assert!(initials(&s).chars().count() <= 2);
        }
    }
}
