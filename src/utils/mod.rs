//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of dollar amounts and share quantities in reports.

use rust_decimal::Decimal;

/// Sign display options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignStyle {
    /// Only negative values carry a sign: "$-40.00"
    Negative,
    /// Always show the sign: "$+40.00"
    Always,
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using US conventions:
/// - Thousands separator: `,`
/// - Decimal separator: `.`
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `width` - Minimum width for padding (0 for no padding, right-aligned)
/// * `sign` - Whether positive values get an explicit `+`
///
/// # Examples
/// ```
/// use robin_pnl::utils::{format_usd_with_width, SignStyle};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_usd_with_width(dec!(1234.56), 0, SignStyle::Negative),
///     "$1,234.56"
/// );
///
/// assert_eq!(
///     format_usd_with_width(dec!(40), 10, SignStyle::Always),
///     "   $+40.00"
/// );
/// ```
pub fn format_usd_with_width(value: Decimal, width: usize, sign: SignStyle) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = match (is_negative, sign) {
        (true, _) => "-",
        (false, SignStyle::Always) => "+",
        (false, SignStyle::Negative) => "",
    };

    let result = format!("${}{}.{}", sign, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as dollars: "$1,234.56"
///
/// # Examples
/// ```
/// use robin_pnl::utils::format_usd;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_usd(dec!(1234.56)), "$1,234.56");
/// assert_eq!(format_usd(dec!(-500)), "$-500.00");
/// ```
pub fn format_usd(value: Decimal) -> String {
    format_usd_with_width(value, 0, SignStyle::Negative)
}

/// Format a gain or loss with an explicit sign: "$+40.00"
pub fn format_gain(value: Decimal) -> String {
    format_usd_with_width(value, 0, SignStyle::Always)
}

/// Share quantity without trailing zeros: "12", "0.5"
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_usd_basic() {
        assert_eq!(format_usd(dec!(1234.56)), "$1,234.56");
        assert_eq!(format_usd(dec!(0.99)), "$0.99");
        assert_eq!(format_usd(dec!(1000000)), "$1,000,000.00");
        assert_eq!(format_usd(dec!(0)), "$0.00");
        assert_eq!(format_usd(dec!(999.99)), "$999.99");
    }

    #[test]
    fn test_format_usd_negative() {
        assert_eq!(format_usd(dec!(-1234.56)), "$-1,234.56");
        assert_eq!(format_usd(dec!(-0.01)), "$-0.01");
    }

    #[test]
    fn test_format_gain_sign() {
        assert_eq!(format_gain(dec!(40)), "$+40.00");
        assert_eq!(format_gain(dec!(-40)), "$-40.00");
        assert_eq!(format_gain(dec!(0)), "$+0.00");
    }

    #[test]
    fn test_format_with_width() {
        let result = format_usd_with_width(dec!(100), 12, SignStyle::Negative);
        assert_eq!(result, "     $100.00");
        assert_eq!(format_usd_with_width(dec!(1000000), 5, SignStyle::Negative), "$1,000,000.00");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(dec!(12.000)), "12");
        assert_eq!(format_quantity(dec!(0.50)), "0.5");
    }
}
