//! Scrape-time checks: does a candidate's size match the target, and which
//! of its visible prices is the shelf price.

use rust_decimal::Decimal;

use crate::text::fold;
use crate::units::{parse_decimal, parse_quantity, Quantity};

/// Known `(target, found)` numeric pairs accepted as equal.
///
/// Petz lists several 10 kg bags as 10,1 kg. The table is directional and
/// exhaustive: any other mismatch is a different size.
pub const NUMERIC_ALIASES: &[(&str, &str)] = &[("10", "10.1")];

/// Amounts below this (in reais) are stray digits, not prices.
pub const MIN_PLAUSIBLE_PRICE: Decimal = Decimal::TEN;

/// Markers of a subscription or loyalty price next to the shelf price.
///
/// `"prime"` is deliberately absent: it is also an N&D product line.
pub const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "assinante",
    "assinatura",
    "programada",
    "clube",
    "socio",
    "vip",
    "fidelidade",
    "amigo",
    "subscriber",
    "subscription",
    "club",
    "loyalty",
    "recurring",
];

/// Returns `true` when `found` describes the same size as `target`.
///
/// When both sides parse as quantities the parsed values decide: same
/// dimension and exactly equal amounts, with [`NUMERIC_ALIASES`] consulted
/// per value. Otherwise one compacted string must contain the other, not
/// directly after a digit, or both must be the same bare number.
#[must_use]
pub fn weights_equivalent(target: &str, found: &str) -> bool {
    let t = compact(target);
    let f = compact(found);
    if t.is_empty() || f.is_empty() {
        return false;
    }

    match (parse_quantity(target), parse_quantity(found)) {
        (Some(tq), Some(fq)) => quantities_match(&tq, &fq),
        _ => {
            if contains_unanchored(&f, &t) || contains_unanchored(&t, &f) {
                return true;
            }
            match (parse_decimal(&t), parse_decimal(&f)) {
                (Some(a), Some(b)) => values_match(a, b),
                _ => false,
            }
        }
    }
}

/// Picks the shelf price out of every price visible near a candidate.
///
/// Amounts under [`MIN_PLAUSIBLE_PRICE`] are dropped. If the surrounding text
/// advertises a subscription price the highest amount is the regular one,
/// otherwise the lowest is the current one. No plausible price yields zero.
#[must_use]
pub fn pick_retail_price(prices: &[Decimal], context_text: &str) -> Decimal {
    let plausible = prices.iter().copied().filter(|p| *p >= MIN_PLAUSIBLE_PRICE);

    let picked = if mentions_subscription(context_text) {
        plausible.max()
    } else {
        plausible.min()
    };
    picked.unwrap_or(Decimal::ZERO)
}

/// Whether `text` advertises a subscription or loyalty price.
#[must_use]
pub fn mentions_subscription(text: &str) -> bool {
    let folded = fold(text);
    SUBSCRIPTION_KEYWORDS.iter().any(|k| folded.contains(k))
}

fn compact(s: &str) -> String {
    fold(s)
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// `needle` occurs in `haystack` and is not the tail of a longer number
/// (`"5kg"` is not inside `"15kg"`).
fn contains_unanchored(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(pos, _)| {
        haystack[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_ascii_digit() || c == '.'))
    })
}

fn values_match(target: Decimal, found: Decimal) -> bool {
    if target == found {
        return true;
    }
    let (t, f) = (target.normalize().to_string(), found.normalize().to_string());
    NUMERIC_ALIASES.iter().any(|(at, af)| *at == t && *af == f)
}

fn quantities_match(target: &Quantity, found: &Quantity) -> bool {
    let thousand = Decimal::from(1000);
    match (target, found) {
        (Quantity::Mass { grams: a }, Quantity::Mass { grams: b }) => {
            values_match(*a / thousand, *b / thousand)
        }
        (
            Quantity::MassRange {
                low_kg: tl,
                high_kg: th,
            },
            Quantity::MassRange {
                low_kg: fl,
                high_kg: fh,
            },
        ) => values_match(*tl, *fl) && values_match(*th, *fh),
        (Quantity::Volume { millilitres: a }, Quantity::Volume { millilitres: b })
        | (Quantity::Dosage { mg: a }, Quantity::Dosage { mg: b }) => a == b,
        (Quantity::Count(a), Quantity::Count(b)) => a == b,
        (Quantity::Letter(a), Quantity::Letter(b)) => a == b,
        _ => false,
    }
}
