//! Number formatting.
//!
//! Numbers are grouped the Indian way by default (`12,34,567`) with at most
//! one fraction digit, and the `short` format abbreviates with lakh/crore
//! suffixes. The locale is external configuration; absent or unknown
//! language tags fall back to `en-IN`.

use covid_map_statistic_models::{StatisticConfig, StatisticFormat, StatisticKind};

use crate::registry::{StatisticRegistry, default_registry};

/// Placeholder rendered for NaN and hidden zeros.
pub const BLANK: &str = "-";

/// Suffix thresholds for abbreviated numbers, largest first.
const ABBREVIATIONS: &[(f64, &str)] = &[
    (1e14, "L Cr"),
    (1e10, "K Cr"),
    (1e7, "Cr"),
    (1e5, "L"),
    (1e3, "K"),
];

/// How integer digits are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigitGrouping {
    /// Last three digits, then pairs: `12,34,567`.
    #[default]
    Indian,
    /// Groups of three: `1,234,567`.
    Thousands,
}

/// Locale settings for number rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    /// Digit grouping style.
    pub grouping: DigitGrouping,
    /// Separator between digit groups.
    pub group_separator: char,
    /// Separator before the fraction digit.
    pub decimal_separator: char,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::EN_IN
    }
}

impl NumberLocale {
    /// English (India).
    pub const EN_IN: Self = Self {
        grouping: DigitGrouping::Indian,
        group_separator: ',',
        decimal_separator: '.',
    };

    /// English (United States).
    pub const EN_US: Self = Self {
        grouping: DigitGrouping::Thousands,
        group_separator: ',',
        decimal_separator: '.',
    };

    /// Picks a locale for a BCP 47 language tag, falling back to `en-IN`.
    #[must_use]
    pub fn for_language(tag: Option<&str>) -> Self {
        match tag.map(str::to_ascii_lowercase).as_deref() {
            Some("en-us" | "en-gb") => Self::EN_US,
            _ => Self::EN_IN,
        }
    }

    /// Formats with locale grouping and at most one fraction digit,
    /// rounding the exact decimal value half away from zero. Negative
    /// values keep their sign even when they round to zero (`-0`).
    #[must_use]
    pub fn format_decimal(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            let symbol = if value > 0.0 { "∞" } else { "-∞" };
            return symbol.to_string();
        }

        let fixed = format!("{:.1}", round_tie_away(value.abs()));
        let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0"));

        let mut out = String::new();
        if value.is_sign_negative() {
            out.push('-');
        }
        out.push_str(&self.group(integer));
        if fraction != "0" {
            out.push(self.decimal_separator);
            out.push_str(fraction);
        }
        out
    }

    fn group(&self, digits: &str) -> String {
        let len = digits.len();
        let head_len = match self.grouping {
            DigitGrouping::Thousands => 3,
            DigitGrouping::Indian => 2,
        };
        if len <= 3 {
            return digits.to_string();
        }

        let (head, tail) = digits.split_at(len - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(head_len);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        groups.push(tail);
        groups.join(&self.group_separator.to_string())
    }
}

/// Resolves exact one-decimal ties (`x.25`, `x.75`) away from zero, which
/// `{:.1}` would otherwise round to even. Every other value is returned
/// unchanged and rounded by `{:.1}` from its exact binary value.
#[allow(clippy::float_cmp)]
fn round_tie_away(magnitude: f64) -> f64 {
    let quarters = magnitude * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        (magnitude * 10.0).round() / 10.0
    } else {
        magnitude
    }
}

/// `Math.round` semantics: halves round towards positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Formats numbers for display against a registry and locale.
#[derive(Debug, Clone, Copy)]
pub struct NumberFormatter<'a> {
    registry: &'a StatisticRegistry,
    locale: NumberLocale,
}

impl Default for NumberFormatter<'static> {
    fn default() -> Self {
        Self::new(default_registry(), NumberLocale::default())
    }
}

impl<'a> NumberFormatter<'a> {
    #[must_use]
    pub const fn new(registry: &'a StatisticRegistry, locale: NumberLocale) -> Self {
        Self { registry, locale }
    }

    /// Abbreviates with Indian-system suffixes. Magnitudes below a
    /// thousand are floored to an integer.
    #[must_use]
    pub fn abbreviate_number(&self, value: f64) -> String {
        let magnitude = round_half_up(value.abs());
        for &(threshold, suffix) in ABBREVIATIONS {
            if magnitude >= threshold {
                return format!("{}{suffix}", self.locale.format_decimal(value / threshold));
            }
        }
        self.locale.format_decimal(value.floor())
    }

    /// Formats a statistic value.
    ///
    /// Returns [`BLANK`] for NaN, and for zero when the statistic's config
    /// sets `hide_zero`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn format_number(
        &self,
        value: f64,
        format: StatisticFormat,
        statistic: Option<StatisticKind>,
    ) -> String {
        let hide_zero = statistic
            .and_then(|kind| self.registry.get(kind))
            .is_some_and(|config: &StatisticConfig| config.hide_zero);
        if value.is_nan() || (hide_zero && value == 0.0) {
            return BLANK.to_string();
        }

        match format {
            StatisticFormat::Long => self.locale.format_decimal(if value.abs() < 1.0 {
                value
            } else {
                round_half_up(value)
            }),
            StatisticFormat::Short => self.abbreviate_number(value),
            StatisticFormat::Percent => format!("{}%", self.locale.format_decimal(value)),
            StatisticFormat::Plain => self.locale.format_decimal(value),
        }
    }
}

/// [`NumberFormatter::format_number`] with the embedded registry and the
/// default locale.
#[must_use]
pub fn format_number(value: f64, format: StatisticFormat, statistic: Option<StatisticKind>) -> String {
    NumberFormatter::default().format_number(value, format, statistic)
}

/// [`NumberFormatter::abbreviate_number`] with the default locale.
#[must_use]
pub fn abbreviate_number(value: f64) -> String {
    NumberFormatter::default().abbreviate_number(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_blank() {
        for format in [
            StatisticFormat::Plain,
            StatisticFormat::Long,
            StatisticFormat::Short,
            StatisticFormat::Percent,
        ] {
            assert_eq!(format_number(f64::NAN, format, None), BLANK);
        }
    }

    #[test]
    fn zero_is_blank_only_when_hidden() {
        assert_eq!(
            format_number(0.0, StatisticFormat::Plain, Some(StatisticKind::ActiveRatio)),
            BLANK
        );
        assert_eq!(
            format_number(0.0, StatisticFormat::Plain, Some(StatisticKind::Confirmed)),
            "0"
        );
        assert_eq!(format_number(0.0, StatisticFormat::Plain, None), "0");
    }

    #[test]
    fn short_uses_indian_suffixes() {
        assert_eq!(abbreviate_number(999.0), "999");
        assert_eq!(abbreviate_number(150_000.0), "1.5L");
        assert_eq!(abbreviate_number(12_000_000.0), "1.2Cr");
        assert_eq!(abbreviate_number(25_000.0), "25K");
        assert_eq!(abbreviate_number(3e10), "3K Cr");
        assert_eq!(abbreviate_number(2.5e14), "2.5L Cr");
        assert_eq!(
            format_number(150_000.0, StatisticFormat::Short, None),
            "1.5L"
        );
    }

    #[test]
    fn short_floors_small_values() {
        assert_eq!(abbreviate_number(42.9), "42");
        assert_eq!(abbreviate_number(-1500.0), "-1.5K");
        assert_eq!(abbreviate_number(-3.2), "-4");
    }

    #[test]
    fn long_rounds_integers_and_keeps_small_fractions() {
        assert_eq!(
            format_number(1_234_567.4, StatisticFormat::Long, None),
            "12,34,567"
        );
        assert_eq!(format_number(2.5, StatisticFormat::Long, None), "3");
        assert_eq!(format_number(0.26, StatisticFormat::Long, None), "0.3");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_number(12.345, StatisticFormat::Percent, None), "12.3%");
        assert_eq!(format_number(40.0, StatisticFormat::Percent, None), "40%");
    }

    #[test]
    fn plain_groups_and_rounds_to_one_decimal() {
        assert_eq!(format_number(1234.56, StatisticFormat::Plain, None), "1,234.6");
        assert_eq!(
            format_number(123_456_789.0, StatisticFormat::Plain, None),
            "12,34,56,789"
        );
        assert_eq!(format_number(-0.04, StatisticFormat::Plain, None), "-0");
    }

    #[test]
    fn thousands_locale_groups_by_three() {
        let formatter = NumberFormatter::new(default_registry(), NumberLocale::EN_US);
        assert_eq!(
            formatter.format_number(1_234_567.0, StatisticFormat::Long, None),
            "1,234,567"
        );
        assert_eq!(formatter.abbreviate_number(150_000.0), "1.5L");
    }

    #[test]
    fn language_tags_fall_back_to_en_in() {
        assert_eq!(NumberLocale::for_language(Some("en-US")), NumberLocale::EN_US);
        assert_eq!(NumberLocale::for_language(Some("hi")), NumberLocale::EN_IN);
        assert_eq!(NumberLocale::for_language(None), NumberLocale::EN_IN);
    }

    #[test]
    fn rounds_exact_decimal_value() {
        assert_eq!(format_number(1.45, StatisticFormat::Percent, None), "1.4%");
        assert_eq!(format_number(0.15, StatisticFormat::Plain, None), "0.1");
        assert_eq!(format_number(2.675, StatisticFormat::Plain, None), "2.7");
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        assert_eq!(format_number(0.25, StatisticFormat::Plain, None), "0.3");
        assert_eq!(format_number(2.75, StatisticFormat::Percent, None), "2.8%");
        assert_eq!(format_number(-0.25, StatisticFormat::Plain, None), "-0.3");
        assert_eq!(abbreviate_number(112_500.0), "1.1L");
    }

    #[test]
    fn negative_values_rounding_to_zero_keep_sign() {
        assert_eq!(NumberLocale::EN_IN.format_decimal(-0.04), "-0");
        assert_eq!(NumberLocale::EN_IN.format_decimal(0.04), "0");
        assert_eq!(NumberLocale::EN_IN.format_decimal(-1234.5), "-1,234.5");
    }

    #[test]
    fn infinities_render_as_symbols() {
        assert_eq!(NumberLocale::EN_IN.format_decimal(f64::INFINITY), "∞");
        assert_eq!(NumberLocale::EN_IN.format_decimal(f64::NEG_INFINITY), "-∞");
    }
}
