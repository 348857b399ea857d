//! Money formatting

use rusty_money::{Money, iso};

/// Render a minor-unit USD amount, e.g. `150050` as `$1,500.50`.
#[must_use]
pub fn format_usd(minor: i64) -> String {
    Money::from_minor(minor, iso::USD).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_symbol_and_separators() {
        assert_eq!(format_usd(150_050), "$1,500.50");
        assert_eq!(format_usd(45_000), "$450.00");
    }

    #[test]
    fn formats_negative_amounts() {
        let formatted = format_usd(-5_000);

        assert!(formatted.contains('-'), "missing sign in {formatted}");
        assert!(formatted.contains("50.00"), "missing amount in {formatted}");
    }
}
