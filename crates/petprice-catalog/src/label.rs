//! Short size/quantity label that tells variants of one group apart.

use rust_decimal::Decimal;

use crate::taxonomy::WEIGHT_LABELLED_BRANDS;
use crate::text::{fold, has_any_term, has_word};
use crate::units::{self, Quantity};

/// Placeholder label for names with no recognisable size.
pub const UNCLASSIFIED_LABEL: &str = "Ver";

/// Ranges wider than this are taken as two unrelated numbers, not a band.
const MAX_RANGE_SPAN_KG: i64 = 60;

const COUNT_KEYWORDS: &[&str] = &["comprimido", "tablete", "unidade", "unid", "capsula"];

/// Derives the variant label for `raw_name`.
///
/// Rules, first hit wins: weight band (`"10-20kg"`), single kg (`"15kg"`),
/// unit count (`"3 Un."`), dosage (`"250mg"`, never for brands labelled by
/// body weight), grams or millilitres (`"500g"`), letter size (`"M"`).
/// Anything else is [`UNCLASSIFIED_LABEL`].
#[must_use]
pub fn variant_label(raw_name: &str) -> String {
    let folded = fold(raw_name);
    if folded.trim().is_empty() {
        return UNCLASSIFIED_LABEL.to_string();
    }

    if let Some((low, high)) = units::weight_range(&folded) {
        if (high - low).abs() < Decimal::from(MAX_RANGE_SPAN_KG) {
            return format!("{}-{}kg", low.normalize(), high.normalize());
        }
    }

    if let Some(kg) = units::single_kg(&folded) {
        return format!("{}kg", kg.normalize());
    }

    if has_any_term(&folded, COUNT_KEYWORDS) || has_word(&folded, "un") {
        if let Some(n) = units::unit_count(&folded) {
            return format!("{n} Un.");
        }
    }

    let weight_labelled = WEIGHT_LABELLED_BRANDS.iter().any(|b| folded.contains(b));
    if !weight_labelled {
        if let Some(mg) = units::dosage_mg(&folded) {
            return format!("{}mg", mg.normalize());
        }
    }

    if let Some(q @ (Quantity::Mass { .. } | Quantity::Volume { .. })) =
        units::parse_quantity(&folded)
    {
        return q.compact();
    }

    units::size_letter(&folded).map_or_else(|| UNCLASSIFIED_LABEL.to_string(), |l| l.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_band() {
        assert_eq!(variant_label("Bravecto Cães 10 a 20kg"), "10-20kg");
        assert_eq!(variant_label("Bravecto Cães 4,5 a 10 kg"), "4.5-10kg");
        assert_eq!(variant_label("NexGard Spectra 7,6 até 15kg"), "7.6-15kg");
        assert_eq!(variant_label("Simparic 2,5 - 5kg"), "2.5-5kg");
    }

    #[test]
    fn implausibly_wide_band_falls_back_to_single_kg() {
        assert_eq!(variant_label("Kit 1 a 100kg"), "100kg");
    }

    #[test]
    fn single_kg() {
        assert_eq!(variant_label("Ração Golden Special 15kg"), "15kg");
        assert_eq!(variant_label("Ração Golden Gatos 10,1 kg"), "10.1kg");
    }

    #[test]
    fn grams_and_millilitres() {
        assert_eq!(variant_label("Petisco Biscrok 500g"), "500g");
        assert_eq!(variant_label("Shampoo Sanol Dog 500ml"), "500ml");
    }

    #[test]
    fn unit_count_needs_a_unit_keyword() {
        assert_eq!(variant_label("Simparic 3 comprimidos"), "3 Un.");
        assert_eq!(variant_label("Tapete Higiênico 30 un"), "30 Un.");
        assert_eq!(variant_label("Vermífugo 4 tabletes"), "4 Un.");
    }

    #[test]
    fn multipack_count_wins_over_unit_weight() {
        assert_eq!(variant_label("Sachê Whiskas Carne 85g 12 unidades"), "12 Un.");
        assert_eq!(variant_label("Sachê Whiskas Carne 85g"), "85g");
    }

    #[test]
    fn oversized_number_does_not_panic() {
        assert_eq!(
            variant_label("Shampoo 79228162514264337593543950335 l"),
            UNCLASSIFIED_LABEL
        );
        assert_eq!(
            variant_label("Ração 79228162514264337593543950335kg"),
            "79228162514264337593543950335kg"
        );
    }

    #[test]
    fn dosage_is_suppressed_for_weight_labelled_brands() {
        assert_eq!(variant_label("Vermífugo Drontal 500mg"), "500mg");
        assert_eq!(variant_label("Bravecto 1000mg"), UNCLASSIFIED_LABEL);
        assert_eq!(variant_label("NexGard 68mg"), UNCLASSIFIED_LABEL);
    }

    #[test]
    fn letter_sizes_are_whole_tokens() {
        assert_eq!(variant_label("Coleira Antipulgas Tam. M"), "M");
        assert_eq!(variant_label("Caminha Pet GG"), "GG");
        assert_eq!(variant_label("Caminha Pet Grande"), "G");
        assert_eq!(variant_label("Guia Retrátil"), UNCLASSIFIED_LABEL);
    }

    #[test]
    fn unclassified_fallback() {
        assert_eq!(variant_label("Tapete Higiênico"), UNCLASSIFIED_LABEL);
        assert_eq!(variant_label(""), UNCLASSIFIED_LABEL);
    }
}
