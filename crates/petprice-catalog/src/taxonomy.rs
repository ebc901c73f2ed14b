//! Curated keyword tables for product attributes.
//!
//! All terms are folded (lower-case, no accents) and match at the start of a
//! word, so `"adult"` covers `"adulto"`, `"adultos"` and `"adults"`. Tables
//! whose order matters are scanned first to last and the first hit wins.

use crate::text::{has_any_term, has_term, has_word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    /// Key fragment, e.g. `"para Cães"`.
    #[must_use]
    pub fn key_fragment(self) -> &'static str {
        match self {
            Self::Dog => "para Cães",
            Self::Cat => "para Gatos",
        }
    }
}

const CAT_TERMS: &[&str] = &["gato", "gatinho", "felin"];
const CAT_WORDS: &[&str] = &["cat", "cats"];
// "canin" alone would swallow the Royal Canin brand name.
const DOG_TERMS: &[&str] = &["cao", "caes", "cachorro", "dog", "canino", "canina"];

/// Life stage, first match wins.
const STAGES: &[(&[&str], &str)] = &[
    (&["filhote", "puppy", "kitten", "junior"], "Filhotes"),
    (&["senior", "idoso", "7+", "mature"], "Sênior"),
    (&["castrad", "sterili"], "Castrados"),
    (&["light", "obeso", "peso"], "Light"),
    (&["adult"], "Adultos"),
];

/// Dog size class, first match wins. Giant is checked before large so that
/// `"gigante"` never degrades to `"Gde."`.
const SIZES: &[(&[&str], &str)] = &[
    (&["pequeno", "pequena", "small", "mini", "toy"], "Peq."),
    (&["medio", "media", "medium"], "Méd."),
    (&["gigante", "giant", "maxi"], "Gig."),
    (&["grande", "large"], "Gde."),
];

/// Flavors, multi-word combinations before their single-word parts.
const FLAVORS: &[(&str, &str)] = &[
    ("frango e arroz", "Frango e Arroz"),
    ("cordeiro e arroz", "Cordeiro e Arroz"),
    ("carne e arroz", "Carne e Arroz"),
    ("frango", "Frango"),
    ("carne", "Carne"),
    ("salmao", "Salmão"),
    ("salmon", "Salmão"),
    ("cordeiro", "Cordeiro"),
    ("peru", "Peru"),
    ("peixe", "Peixe"),
    ("vegeta", "Vegetais"),
    ("arroz", "Arroz"),
];

/// Antiparasitic delivery forms other than the default chewable tablet.
pub(crate) const TRANSDERMAL_TERMS: &[&str] = &["transdermal", "pipeta", "topico"];

/// Brands whose names carry a body-weight band, never a dosage label.
pub(crate) const WEIGHT_LABELLED_BRANDS: &[&str] = &["bravecto", "nexgard"];

/// Product lines per brand: `(terms, display)`, first match wins.
pub(crate) type LineTable = &'static [(&'static [&'static str], &'static str)];

pub(crate) const GOLDEN_LINES: LineTable = &[
    (&["special"], "Special"),
    (&["formula"], "Fórmula"),
    (&["selecao"], "Seleção Natural"),
    (&["mega"], "Mega"),
];

pub(crate) const PREMIER_LINES: LineTable = &[
    (&["formula"], "Fórmula"),
    (&["especific", "racas especificas"], "Raças Específicas"),
    (&["nattu"], "Nattu"),
    (&["cookie"], "Cookie"),
];

pub(crate) const ROYAL_CANIN_LINES: LineTable = &[
    (&["urinary"], "Urinary"),
    (&["satiety"], "Satiety"),
    (&["hypoallergenic"], "Hypoallergenic"),
    (&["gastro"], "Gastro"),
    (&["renal"], "Renal"),
    (&["hepatic"], "Hepatic"),
    (&["indoor"], "Indoor"),
    (&["outdoor"], "Outdoor"),
    (&["fit"], "Fit"),
];

pub(crate) const ND_LINES: LineTable = &[
    (&["ancestral grain", "ancestral"], "Ancestral Grain"),
    (&["prime"], "Prime"),
    (&["pumpkin"], "Pumpkin"),
    (&["quinoa"], "Quinoa"),
    (&["ocean"], "Ocean"),
];

pub(crate) const HILLS_LINES: LineTable = &[
    (&["prescription diet", "prescription"], "Prescription Diet"),
    (&["science diet", "science"], "Science Diet"),
];

pub(crate) fn species(folded: &str) -> Option<Species> {
    if has_any_term(folded, CAT_TERMS) || CAT_WORDS.iter().any(|w| has_word(folded, w)) {
        Some(Species::Cat)
    } else if has_any_term(folded, DOG_TERMS) {
        Some(Species::Dog)
    } else {
        None
    }
}

pub(crate) fn life_stage(folded: &str) -> Option<&'static str> {
    first_label(folded, STAGES)
}

pub(crate) fn size_class(folded: &str) -> Option<&'static str> {
    first_label(folded, SIZES)
}

pub(crate) fn flavor(folded: &str) -> Option<&'static str> {
    FLAVORS
        .iter()
        .find(|(term, _)| has_term(folded, term))
        .map(|(_, label)| *label)
}

pub(crate) fn product_line(folded: &str, table: LineTable) -> Option<&'static str> {
    first_label(folded, table)
}

fn first_label(folded: &str, table: &[(&[&str], &'static str)]) -> Option<&'static str> {
    table
        .iter()
        .find(|(terms, _)| has_any_term(folded, terms))
        .map(|(_, label)| *label)
}
