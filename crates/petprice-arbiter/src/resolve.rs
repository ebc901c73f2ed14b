//! Scrape-time resolution of raw search results against one target product.

use petprice_catalog::{
    extract_prices, extract_quantity_text, parse_price_text, pick_retail_price, weights_equivalent,
};
use petprice_core::{Candidate, RawCandidate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::arbiter::Arbiter;

/// What the scraper is looking for.
#[derive(Debug, Clone)]
pub struct ResolveTarget {
    pub name: String,
    /// Explicit size such as `"10,1 kg"`; taken from `name` when absent.
    pub weight: Option<String>,
}

impl ResolveTarget {
    #[must_use]
    pub fn new(name: impl Into<String>, weight: Option<String>) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    /// The size every accepted candidate must have, if one is known.
    #[must_use]
    pub fn size(&self) -> Option<String> {
        self.weight
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .or_else(|| extract_quantity_text(&self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// The size filter left exactly one candidate.
    Size,
    /// The arbiter picked among several plausible candidates.
    Arbiter,
}

/// A candidate accepted as the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMatch {
    /// Position in the raw candidate list handed to [`CandidateResolver::resolve`].
    pub index: usize,
    pub title: String,
    pub price: Decimal,
    pub link: String,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Matched(ResolvedMatch),
    NoMatch,
}

impl Resolution {
    #[must_use]
    pub fn matched(&self) -> Option<&ResolvedMatch> {
        match self {
            Self::Matched(m) => Some(m),
            Self::NoMatch => None,
        }
    }
}

/// Filters raw candidates by price and size, then defers to an [`Arbiter`]
/// when more than one remains.
pub struct CandidateResolver<'a> {
    arbiter: &'a dyn Arbiter,
}

impl<'a> CandidateResolver<'a> {
    #[must_use]
    pub fn new(arbiter: &'a dyn Arbiter) -> Self {
        Self { arbiter }
    }

    /// Decides which of `raw` (if any) is `target`.
    ///
    /// A single survivor is accepted only when a size check selected it; with
    /// no known size even a lone candidate goes to the arbiter.
    pub async fn resolve(&self, target: &ResolveTarget, raw: &[RawCandidate]) -> Resolution {
        let priced: Vec<(usize, Candidate)> = raw
            .iter()
            .enumerate()
            .filter_map(|(i, r)| price_candidate(r).map(|c| (i, c)))
            .collect();

        let size = target.size();
        let survivors: Vec<(usize, Candidate)> = match size.as_deref() {
            Some(size) => priced
                .into_iter()
                .filter(|(_, c)| {
                    extract_quantity_text(&c.display_title)
                        .is_some_and(|found| weights_equivalent(size, &found))
                })
                .collect(),
            None => priced,
        };

        tracing::debug!(
            target_name = %target.name,
            size = ?size,
            raw = raw.len(),
            survivors = survivors.len(),
            "candidates filtered"
        );

        match survivors.as_slice() {
            [] => Resolution::NoMatch,
            [(index, only)] if size.is_some() => {
                Resolution::Matched(to_match(*index, only, MatchMethod::Size))
            }
            _ => {
                let candidates: Vec<Candidate> =
                    survivors.iter().map(|(_, c)| c.clone()).collect();
                let Some(choice) = self.arbiter.select(&candidates, &target.name).await else {
                    return Resolution::NoMatch;
                };
                match survivors.get(choice) {
                    Some((index, chosen)) => {
                        Resolution::Matched(to_match(*index, chosen, MatchMethod::Arbiter))
                    }
                    None => {
                        tracing::warn!(
                            target_name = %target.name,
                            choice,
                            survivors = survivors.len(),
                            "arbiter chose an index outside the candidate list; treating as no match"
                        );
                        Resolution::NoMatch
                    }
                }
            }
        }
    }
}

/// Turns a raw search result into a priced candidate, or `None` if it lacks a
/// title, a link or a plausible price.
#[must_use]
pub fn price_candidate(raw: &RawCandidate) -> Option<Candidate> {
    if raw.title.trim().is_empty() || raw.link.trim().is_empty() {
        return None;
    }

    let mut prices = extract_prices(&raw.price_text);
    if prices.is_empty() {
        prices.extend(parse_price_text(&raw.price_text));
    }
    let price = pick_retail_price(&prices, &raw.price_text);
    if price <= Decimal::ZERO {
        return None;
    }

    Some(Candidate {
        display_title: raw.title.trim().to_string(),
        observed_price: price,
        link: raw.link.trim().to_string(),
        sales_count: raw.sales_count,
    })
}

fn to_match(index: usize, candidate: &Candidate, method: MatchMethod) -> ResolvedMatch {
    ResolvedMatch {
        index,
        title: candidate.display_title.clone(),
        price: candidate.observed_price,
        link: candidate.link.clone(),
        method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::StubArbiter;

    fn raw(title: &str, price_text: &str) -> RawCandidate {
        RawCandidate {
            title: title.to_string(),
            price_text: price_text.to_string(),
            link: format!("https://www.petz.com.br/p/{}", title.len()),
            sales_count: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn size_filter_resolves_bravecto_band() {
        let candidates = vec![
            raw("Bravecto Cães 4.5 a 10kg", "R$ 180,00"),
            raw("Bravecto Cães 20 a 40kg", "R$ 230,00"),
            raw("Bravecto Cães 10 a 20kg", "R$ 210,00"),
        ];
        let stub = StubArbiter::never();
        let resolver = CandidateResolver::new(&stub);
        let target = ResolveTarget::new("Bravecto 10 a 20 kg", None);

        let resolution = resolver.resolve(&target, &candidates).await;
        let m = resolution.matched().expect("expected a match");
        assert_eq!(m.index, 2);
        assert_eq!(m.price, dec("210.00"));
        assert_eq!(m.method, MatchMethod::Size);
    }

    #[tokio::test]
    async fn no_size_defers_to_arbiter_which_rejects() {
        let candidates = vec![
            raw("Shampoo Sanol Dog 500ml", "R$ 25,90"),
            raw("Tapete Higiênico", "R$ 49,90"),
        ];
        let stub = StubArbiter::never();
        let resolver = CandidateResolver::new(&stub);
        let target = ResolveTarget::new("Ração Royal Canin", None);

        assert_eq!(resolver.resolve(&target, &candidates).await, Resolution::NoMatch);
    }

    #[tokio::test]
    async fn arbiter_index_maps_back_to_raw_position() {
        let candidates = vec![
            raw("Ração Golden Special 3kg", "R$ 59,90"),
            raw("", "R$ 10,00"),
            raw("Ração Golden Special Adulto 15kg", "R$ 189,90"),
            raw("Kit 2x Ração Golden Special 15kg", "R$ 359,90"),
        ];
        let stub = StubArbiter::always(0);
        let resolver = CandidateResolver::new(&stub);
        let target = ResolveTarget::new("Ração Golden Special Adulto Frango", Some("15 kg".to_string()));

        let resolution = resolver.resolve(&target, &candidates).await;
        let m = resolution.matched().expect("expected a match");
        assert_eq!(m.index, 2);
        assert_eq!(m.method, MatchMethod::Arbiter);
    }

    /// Arbiter that ignores the list length.
    struct FixedArbiter(usize);

    #[async_trait::async_trait]
    impl Arbiter for FixedArbiter {
        async fn select(&self, _candidates: &[Candidate], _target: &str) -> Option<usize> {
            Some(self.0)
        }
    }

    #[tokio::test]
    async fn out_of_range_arbiter_choice_is_no_match() {
        let candidates = vec![
            raw("Ração Golden Special Adulto 15kg", "R$ 189,90"),
            raw("Kit 2x Ração Golden Special 15kg", "R$ 359,90"),
        ];
        let arbiter = FixedArbiter(7);
        let resolver = CandidateResolver::new(&arbiter);
        let target = ResolveTarget::new("Ração Golden Special 15kg", None);

        assert_eq!(resolver.resolve(&target, &candidates).await, Resolution::NoMatch);
    }

    #[tokio::test]
    async fn lone_candidate_without_size_still_goes_to_arbiter() {
        let candidates = vec![raw("Tapete Higiênico Super Secão", "R$ 49,90")];
        let stub = StubArbiter::never();
        let resolver = CandidateResolver::new(&stub);
        let target = ResolveTarget::new("Tapete Higiênico", None);

        assert_eq!(resolver.resolve(&target, &candidates).await, Resolution::NoMatch);
    }

    #[tokio::test]
    async fn petz_ten_point_one_bag_matches_ten_kg_target() {
        let candidates = vec![
            raw("Ração Golden Gatos Castrados Salmão 10,1kg", "R$ 189,90"),
            raw("Ração Golden Gatos Castrados Salmão 3kg", "R$ 69,90"),
        ];
        let stub = StubArbiter::never();
        let resolver = CandidateResolver::new(&stub);
        let target = ResolveTarget::new("Golden Gatos Castrados Salmão", Some("10kg".to_string()));

        let m = resolver.resolve(&target, &candidates).await;
        assert_eq!(m.matched().map(|m| m.index), Some(0));
    }

    #[tokio::test]
    async fn nothing_in_size_is_no_match() {
        let candidates = vec![raw("Ração Golden Special 3kg", "R$ 59,90")];
        let stub = StubArbiter::always(0);
        let resolver = CandidateResolver::new(&stub);
        let target = ResolveTarget::new("Ração Golden Special 15kg", None);

        assert_eq!(resolver.resolve(&target, &candidates).await, Resolution::NoMatch);
    }

    #[test]
    fn price_candidate_uses_retail_price() {
        let c = price_candidate(&raw(
            "Ração N&D Prime 10,1kg",
            "R$ 389,90 R$ 350,91 para assinantes",
        ))
        .expect("priced");
        assert_eq!(c.observed_price, dec("389.90"));

        let c = price_candidate(&raw("Ração N&D Prime 10,1kg", "389,90")).expect("priced");
        assert_eq!(c.observed_price, dec("389.90"));
    }

    #[test]
    fn price_candidate_drops_unusable_entries() {
        assert!(price_candidate(&raw("Ração", "Indisponível")).is_none());
        assert!(price_candidate(&raw("Ração", "R$ 5,00")).is_none());
        let mut no_link = raw("Ração", "R$ 50,00");
        no_link.link = "  ".to_string();
        assert!(price_candidate(&no_link).is_none());
    }

    #[test]
    fn target_size_prefers_explicit_weight() {
        let t = ResolveTarget::new("Ração Golden 15kg", Some("10,1 kg".to_string()));
        assert_eq!(t.size().as_deref(), Some("10,1 kg"));
        let t = ResolveTarget::new("Ração Golden 15kg", Some("  ".to_string()));
        assert_eq!(t.size().as_deref(), Some("15kg"));
        assert_eq!(ResolveTarget::new("Tapete", None).size(), None);
    }
}
