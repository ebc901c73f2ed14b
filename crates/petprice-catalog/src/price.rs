//! Locale-formatted currency text → `Decimal`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid amount regex"));
static BRL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R\$\s*(\d[\d.,]*)").expect("valid BRL regex"));

/// Parses the first amount in `text`, e.g. `"R$ 1.234,56"` → `1234.56`.
///
/// Separator handling:
/// - both `.` and `,` present: the last one is the decimal point
/// - one separator repeated (`1.234.567`): thousands grouping
/// - one separator followed by exactly three digits (`1.234`): thousands
/// - otherwise the lone separator is the decimal point (`45,90`)
///
/// Returns `None` when the text contains no digits.
#[must_use]
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let raw = AMOUNT_RE.find(text)?.as_str();
    normalize_amount(raw)
}

/// Every `R$ <amount>` occurrence in `text`, in order of appearance.
#[must_use]
pub fn extract_prices(text: &str) -> Vec<Decimal> {
    BRL_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| normalize_amount(m.as_str()))
        .collect()
}

fn normalize_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim_end_matches(['.', ',']);
    let last_dot = raw.rfind('.');
    let last_comma = raw.rfind(',');

    let cleaned = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            let (decimal_sep, group_sep) = if dot > comma { ('.', ',') } else { (',', '.') };
            raw.replace(group_sep, "").replace(decimal_sep, ".")
        }
        (Some(pos), None) | (None, Some(pos)) => {
            let sep = if last_dot.is_some() { '.' } else { ',' };
            let repeated = raw.matches(sep).count() > 1;
            let trailing_digits = raw.len() - pos - 1;
            if repeated || trailing_digits == 3 {
                raw.replace(sep, "")
            } else {
                raw.replace(sep, ".")
            }
        }
        (None, None) => raw.to_string(),
    };

    Decimal::from_str(&cleaned).ok()
}
