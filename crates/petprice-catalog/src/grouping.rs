//! Canonical grouping: raw product name → stable group key.
//!
//! Brand handling is a strategy table. Each [`BrandRule`] pairs a predicate
//! with a key builder; rules are tried in priority order and the first match
//! produces the key. Names no rule claims fall through to a weight-stripping
//! fallback.

use std::sync::LazyLock;

use regex::Regex;

use crate::taxonomy::{self, LineTable, Species};
use crate::text::{collapse_whitespace, fold, has_any_term, has_term, has_word};
use crate::units::unit_count;

/// Key for names that are empty or whitespace only.
pub const UNNAMED_GROUP: &str = "Produto Sem Nome";

/// Shortest weight-stripped name still considered informative.
const MIN_FALLBACK_LEN: usize = 10;

static STRIP_KG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+[.,]?\d*\s*kg").expect("valid kg strip regex"));
static STRIP_G_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+[.,]?\d*\s*g\b").expect("valid g strip regex"));
static BOX_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bcx|\bcaixa|\bpack|\bkit|\bc/)\s*(?:com\s*)?(\d+)").expect("valid box count regex")
});

/// Attributes extracted once per name and shared by every rule.
#[derive(Debug)]
pub struct NameFeatures {
    pub folded: String,
    pub species: Option<Species>,
    pub stage: Option<&'static str>,
    pub size: Option<&'static str>,
    pub flavor: Option<&'static str>,
}

impl NameFeatures {
    #[must_use]
    pub fn extract(raw_name: &str) -> Self {
        let folded = fold(raw_name);
        Self {
            species: taxonomy::species(&folded),
            stage: taxonomy::life_stage(&folded),
            size: taxonomy::size_class(&folded),
            flavor: taxonomy::flavor(&folded),
            folded,
        }
    }

    fn has(&self, term: &str) -> bool {
        has_term(&self.folded, term)
    }

    fn line(&self, table: LineTable) -> Option<&'static str> {
        taxonomy::product_line(&self.folded, table)
    }

    /// Pack multiplicity of a medication box, `"3 Un."`; single unit when
    /// nothing in the name says otherwise.
    fn pack(&self) -> String {
        let n = unit_count(&self.folded)
            .or_else(|| {
                BOX_COUNT_RE
                    .captures(&self.folded)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok())
            })
            .filter(|n| *n > 0)
            .unwrap_or(1);
        format!("{n} Un.")
    }
}

/// One entry of the brand strategy table.
pub struct BrandRule {
    pub name: &'static str,
    matches: fn(&NameFeatures) -> bool,
    build: fn(&NameFeatures) -> String,
}

impl BrandRule {
    /// Returns the group key if this rule claims the name.
    #[must_use]
    pub fn apply(&self, features: &NameFeatures) -> Option<String> {
        (self.matches)(features).then(|| (self.build)(features))
    }
}

/// Brand rules in priority order: medications, foods, litter, mass brands.
pub static BRAND_RULES: &[BrandRule] = &[
    BrandRule {
        name: "nexgard",
        matches: |f| f.has("nexgard"),
        build: nexgard_key,
    },
    BrandRule {
        name: "bravecto",
        matches: |f| f.has("bravecto"),
        build: bravecto_key,
    },
    BrandRule {
        name: "simparic",
        matches: |f| f.has("simparic"),
        build: simparic_key,
    },
    BrandRule {
        name: "golden",
        matches: |f| f.has("golden"),
        build: golden_key,
    },
    BrandRule {
        name: "premier",
        matches: |f| f.has("premier"),
        build: premier_key,
    },
    BrandRule {
        name: "royal canin",
        matches: |f| f.has("royal canin"),
        build: royal_canin_key,
    },
    BrandRule {
        name: "n&d",
        matches: |f| f.has("n&d") || has_word(&f.folded, "nd") || f.has("farmina"),
        build: nd_key,
    },
    BrandRule {
        name: "hills",
        matches: |f| has_any_term(&f.folded, &["hill's", "hills", "hill s"]),
        build: hills_key,
    },
    BrandRule {
        name: "litter",
        matches: |f| f.has("areia"),
        build: litter_key,
    },
    BrandRule {
        name: "pedigree",
        matches: |f| f.has("pedigree"),
        build: pedigree_key,
    },
    BrandRule {
        name: "whiskas",
        matches: |f| f.has("whiskas"),
        build: whiskas_key,
    },
];

/// Maps a raw product name to its canonical group key.
///
/// Total and deterministic: every input yields a key, and two wordings of
/// the same product (different store naming, sizes, extra flavor words)
/// yield the same key whenever their extracted attributes agree.
#[must_use]
pub fn group_key(raw_name: &str) -> String {
    if raw_name.trim().is_empty() {
        return UNNAMED_GROUP.to_string();
    }

    let features = NameFeatures::extract(raw_name);
    BRAND_RULES
        .iter()
        .find_map(|rule| rule.apply(&features))
        .unwrap_or_else(|| fallback_key(raw_name))
}

/// Weight tokens stripped; the untouched name if too little is left.
fn fallback_key(raw_name: &str) -> String {
    let without_kg = STRIP_KG_RE.replace_all(raw_name, "");
    let without_g = STRIP_G_RE.replace_all(&without_kg, "");
    let stripped = collapse_whitespace(&without_g);

    if stripped.chars().count() < MIN_FALLBACK_LEN {
        raw_name.to_string()
    } else {
        stripped
    }
}

fn join_key(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn species_part(f: &NameFeatures) -> Option<&'static str> {
    f.species.map(Species::key_fragment)
}

/// Oral chewable unless the name says topical.
fn delivery_form(f: &NameFeatures) -> &'static str {
    if has_any_term(&f.folded, taxonomy::TRANSDERMAL_TERMS) {
        "Transdermal"
    } else {
        "Mastigável"
    }
}

fn nexgard_key(f: &NameFeatures) -> String {
    let pack = f.pack();
    join_key(&[
        Some("NexGard"),
        f.has("spectra").then_some("Spectra"),
        Some(delivery_form(f)),
        Some(pack.as_str()),
        species_part(f),
    ])
}

fn bravecto_key(f: &NameFeatures) -> String {
    let pack = f.pack();
    join_key(&[
        Some("Bravecto"),
        Some(delivery_form(f)),
        Some(pack.as_str()),
        species_part(f),
    ])
}

fn simparic_key(f: &NameFeatures) -> String {
    let pack = f.pack();
    join_key(&[
        Some("Simparic"),
        Some(delivery_form(f)),
        Some(pack.as_str()),
        species_part(f),
    ])
}

fn food_key(brand: &str, line: Option<&str>, f: &NameFeatures, species: Option<Species>) -> String {
    join_key(&[
        Some(brand),
        line,
        f.flavor,
        f.stage,
        f.size,
        species.map(Species::key_fragment),
    ])
}

fn golden_key(f: &NameFeatures) -> String {
    let species = f.species.or(Some(Species::Dog));
    food_key("Ração Golden", f.line(taxonomy::GOLDEN_LINES), f, species)
}

fn premier_key(f: &NameFeatures) -> String {
    food_key("Ração Premier", f.line(taxonomy::PREMIER_LINES), f, f.species)
}

fn royal_canin_key(f: &NameFeatures) -> String {
    join_key(&[
        Some("Ração Royal Canin"),
        f.line(taxonomy::ROYAL_CANIN_LINES),
        f.stage,
        f.size,
        species_part(f),
    ])
}

fn nd_key(f: &NameFeatures) -> String {
    food_key("Ração N&D", f.line(taxonomy::ND_LINES), f, f.species)
}

fn hills_key(f: &NameFeatures) -> String {
    food_key("Ração Hill's", f.line(taxonomy::HILLS_LINES), f, f.species)
}

fn litter_key(f: &NameFeatures) -> String {
    if f.has("viva verde") {
        "Areia Viva Verde para Gatos".to_string()
    } else if f.has("pipicat") {
        "Areia Pipicat para Gatos".to_string()
    } else {
        "Areia Higiênica para Gatos".to_string()
    }
}

fn pedigree_key(f: &NameFeatures) -> String {
    let species = f.species.or(Some(Species::Dog));
    food_key("Ração Pedigree", None, f, species)
}

fn whiskas_key(f: &NameFeatures) -> String {
    join_key(&[
        Some("Ração Whiskas"),
        f.flavor,
        f.stage,
        Some(Species::Cat.key_fragment()),
    ])
}

#[cfg(test)]
#[path = "grouping_test.rs"]
mod tests;
