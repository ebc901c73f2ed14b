//! Free-text size and quantity parsing.
//!
//! Retail titles express size in many shapes: `"15kg"`, `"10,1 kg"`,
//! `"4.5 a 10kg"`, `"3 comprimidos"`, `"250mg"`, `"Tam. M"`. This module
//! turns the first recognisable expression into a [`Quantity`] so sizes from
//! different stores can be compared exactly.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::text::fold;

const NUM: &str = r"(\d+(?:[.,]\d+)?)";

static RANGE_KG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{NUM}\s*(?:kg)?\s*(?:a|-|ate)\s*{NUM}\s*kg"))
        .expect("valid weight range regex")
});
static KG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{NUM}\s*kg")).expect("valid kg regex"));
static MG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{NUM}\s*mg\b")).expect("valid mg regex"));
static GRAMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{NUM}\s*(?:gramas|gr|g)\b")).expect("valid grams regex")
});
static ML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{NUM}\s*ml\b")).expect("valid ml regex"));
static LITRES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{NUM}\s*(?:litros?|l)\b")).expect("valid litres regex")
});
static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+)\s*(?:unidades|unidade|unid|un|comprimidos|comprimido|comp|tabletes|tablete|tab|capsulas|capsula|caps|doses|dose|pipetas|pipeta)\b",
    )
    .expect("valid count regex")
});

/// Letter sizes used by accessories and some medications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeLetter {
    P,
    M,
    G,
    GG,
}

impl SizeLetter {
    /// Recognises a single folded token: a letter code or its Portuguese word.
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "p" | "pequeno" | "pequena" => Some(Self::P),
            "m" | "medio" | "media" => Some(Self::M),
            "g" | "grande" => Some(Self::G),
            "gg" | "gigante" => Some(Self::GG),
            _ => None,
        }
    }
}

impl fmt::Display for SizeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::P => "P",
            Self::M => "M",
            Self::G => "G",
            Self::GG => "GG",
        };
        f.write_str(s)
    }
}

/// A parsed size or quantity expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quantity {
    Mass { grams: Decimal },
    Volume { millilitres: Decimal },
    /// Body-weight band printed on antiparasitics, e.g. `10 a 20kg`.
    MassRange { low_kg: Decimal, high_kg: Decimal },
    Count(u32),
    Dosage { mg: Decimal },
    Letter(SizeLetter),
}

impl Quantity {
    /// Compact rendering used for size comparison: `"15kg"`, `"500g"`,
    /// `"10.1-25kg"`, `"3un"`, `"250mg"`, `"M"`.
    #[must_use]
    pub fn compact(&self) -> String {
        let thousand = Decimal::from(1000);
        match self {
            Self::Mass { grams } if *grams >= thousand => {
                format!("{}kg", (*grams / thousand).normalize())
            }
            Self::Mass { grams } => format!("{}g", grams.normalize()),
            Self::Volume { millilitres } if *millilitres >= thousand => {
                format!("{}l", (*millilitres / thousand).normalize())
            }
            Self::Volume { millilitres } => format!("{}ml", millilitres.normalize()),
            Self::MassRange { low_kg, high_kg } => {
                format!("{}-{}kg", low_kg.normalize(), high_kg.normalize())
            }
            Self::Count(n) => format!("{n}un"),
            Self::Dosage { mg } => format!("{}mg", mg.normalize()),
            Self::Letter(letter) => letter.to_string(),
        }
    }
}

/// Parses a decimal written with either `.` or `,` as the decimal point.
pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', ".")).ok()
}

/// Parses the first size expression found in `text`.
///
/// Expressions are tried from most to least specific: weight range, kg,
/// mg, grams, ml, litres, unit count, and finally a whole-token letter size.
#[must_use]
pub fn parse_quantity(text: &str) -> Option<Quantity> {
    let folded = fold(text);
    let thousand = Decimal::from(1000);

    if let Some((low, high)) = weight_range(&folded) {
        return Some(Quantity::MassRange {
            low_kg: low,
            high_kg: high,
        });
    }
    // Out-of-range amounts fall through to the next rule.
    if let Some(grams) = first_decimal(&KG_RE, &folded).and_then(|kg| kg.checked_mul(thousand)) {
        return Some(Quantity::Mass { grams });
    }
    if let Some(mg) = first_decimal(&MG_RE, &folded) {
        return Some(Quantity::Dosage { mg });
    }
    if let Some(grams) = first_decimal(&GRAMS_RE, &folded) {
        return Some(Quantity::Mass { grams });
    }
    if let Some(ml) = first_decimal(&ML_RE, &folded) {
        return Some(Quantity::Volume { millilitres: ml });
    }
    if let Some(millilitres) =
        first_decimal(&LITRES_RE, &folded).and_then(|l| l.checked_mul(thousand))
    {
        return Some(Quantity::Volume { millilitres });
    }
    if let Some(n) = unit_count(&folded) {
        return Some(Quantity::Count(n));
    }
    size_letter(&folded).map(Quantity::Letter)
}

/// Returns the first size expression in `title` in compact form
/// (`"15kg"`, `"10.1-25kg"`), or `None` when the title carries no size.
#[must_use]
pub fn extract_quantity_text(title: &str) -> Option<String> {
    parse_quantity(title).map(|q| q.compact())
}

/// First `X a Y kg` band in already-folded text, returned as `(low, high)`.
pub(crate) fn weight_range(folded: &str) -> Option<(Decimal, Decimal)> {
    let caps = RANGE_KG_RE.captures(folded)?;
    let low = parse_decimal(caps.get(1)?.as_str())?;
    let high = parse_decimal(caps.get(2)?.as_str())?;
    Some((low, high))
}

pub(crate) fn single_kg(folded: &str) -> Option<Decimal> {
    first_decimal(&KG_RE, folded)
}

pub(crate) fn dosage_mg(folded: &str) -> Option<Decimal> {
    first_decimal(&MG_RE, folded)
}

pub(crate) fn unit_count(folded: &str) -> Option<u32> {
    COUNT_RE
        .captures(folded)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whole-token letter size. A token directly after a number is a unit
/// (`"500 g"`), not a size.
pub(crate) fn size_letter(folded: &str) -> Option<SizeLetter> {
    let tokens: Vec<&str> = folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        let after_number = i > 0 && tokens[i - 1].chars().all(|c| c.is_ascii_digit());
        if after_number {
            continue;
        }
        if *token == "extra" && tokens.get(i + 1) == Some(&"grande") {
            return Some(SizeLetter::GG);
        }
        if let Some(letter) = SizeLetter::from_token(token) {
            return Some(letter);
        }
    }
    None
}

fn first_decimal(re: &Regex, folded: &str) -> Option<Decimal> {
    re.captures(folded)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_decimal(m.as_str()))
}
