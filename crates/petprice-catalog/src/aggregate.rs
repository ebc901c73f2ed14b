//! Offer aggregation: listings from every source → canonical display groups.
//!
//! One pass feeds listings into a [`GroupAccumulator`], which owns all per-run
//! state (groups in first-seen order, labels already used per group). A second
//! pass propagates trusted cover images and sorts variants by price.

use std::cmp::Ordering;
use std::collections::HashMap;

use petprice_core::{Listing, ProductWithOffers, TrustPolicy};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::grouping::group_key;
use crate::label::variant_label;

/// Shortest string accepted as an image URL.
const MIN_IMAGE_URL_LEN: usize = 10;

/// One size/quantity option within a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub product_id: i64,
    pub label: String,
    pub image_url: Option<String>,
    /// Zero when the product has no valid offer.
    pub price: Decimal,
    pub source_name: Option<String>,
}

impl Variant {
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// A display unit: every product whose name maps to the same group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalGroup {
    pub group_key: String,
    pub cover_image_url: Option<String>,
    pub cover_source_name: Option<String>,
    pub cover_price: Option<Decimal>,
    /// Lowest valid price seen for the group; zero means unavailable.
    pub floor_price: Decimal,
    /// Sorted by ascending price, unpriced variants last.
    pub variants: Vec<Variant>,
}

impl CanonicalGroup {
    /// `false` when no listing in the group carried a valid price.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.floor_price > Decimal::ZERO
    }

    fn new(group_key: String) -> Self {
        Self {
            group_key,
            cover_image_url: None,
            cover_source_name: None,
            cover_price: None,
            floor_price: Decimal::ZERO,
            variants: Vec::new(),
        }
    }
}

/// Per-run grouping state. Create one per catalog build.
pub struct GroupAccumulator<'a> {
    policy: &'a TrustPolicy,
    groups: Vec<CanonicalGroup>,
    index: HashMap<String, usize>,
}

impl<'a> GroupAccumulator<'a> {
    #[must_use]
    pub fn new(policy: &'a TrustPolicy) -> Self {
        Self {
            policy,
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds one listing. Listings with an empty name are ignored.
    pub fn push(&mut self, listing: &Listing) {
        if listing.name.trim().is_empty() {
            tracing::debug!(product_id = listing.product_id, "skipping unnamed listing");
            return;
        }

        let key = group_key(&listing.name);
        let label = variant_label(&listing.name);
        let policy = self.policy;
        let group = self.group_mut(key);

        if listing.has_valid_price()
            && (group.floor_price == Decimal::ZERO || listing.price < group.floor_price)
        {
            group.floor_price = listing.price;
        }

        if listing.has_valid_price() && has_valid_image(listing.image_url.as_deref()) {
            let wins = group.cover_price.is_none_or(|cover_price| {
                beats(
                    policy,
                    listing.source_name.as_deref(),
                    listing.price,
                    group.cover_source_name.as_deref(),
                    cover_price,
                )
            });
            if wins {
                group.cover_image_url.clone_from(&listing.image_url);
                group.cover_source_name.clone_from(&listing.source_name);
                group.cover_price = Some(listing.price);
            }
        }

        let variant = Variant {
            product_id: listing.product_id,
            label,
            image_url: listing.image_url.clone(),
            price: listing.price,
            source_name: listing.source_name.clone(),
        };

        match group.variants.iter().position(|v| v.label == variant.label) {
            None => group.variants.push(variant),
            Some(slot) => {
                let existing = &group.variants[slot];
                let replaces = variant.has_price()
                    && (!existing.has_price()
                        || beats(
                            policy,
                            variant.source_name.as_deref(),
                            variant.price,
                            existing.source_name.as_deref(),
                            existing.price,
                        ));
                tracing::debug!(
                    group = %group.group_key,
                    label = %variant.label,
                    product_id = variant.product_id,
                    replaces,
                    "duplicate variant label"
                );
                if replaces {
                    group.variants[slot] = variant;
                }
            }
        }
    }

    /// Normalizes images, sorts variants and returns groups in first-seen order.
    #[must_use]
    pub fn finish(self) -> Vec<CanonicalGroup> {
        let policy = self.policy;
        let mut groups = self.groups;

        for group in &mut groups {
            let cover_trusted = group
                .cover_source_name
                .as_deref()
                .is_some_and(|s| policy.is_trusted(s));
            if cover_trusted {
                for variant in &mut group.variants {
                    let variant_trusted = variant
                        .source_name
                        .as_deref()
                        .is_some_and(|s| policy.is_trusted(s));
                    if !variant_trusted {
                        variant.image_url.clone_from(&group.cover_image_url);
                    }
                }
            }
            group.variants.sort_by(compare_variant_price);
        }

        groups
    }

    fn group_mut(&mut self, key: String) -> &mut CanonicalGroup {
        let idx = match self.index.get(&key) {
            Some(idx) => *idx,
            None => {
                let idx = self.groups.len();
                self.index.insert(key.clone(), idx);
                self.groups.push(CanonicalGroup::new(key));
                idx
            }
        };
        &mut self.groups[idx]
    }
}

/// Groups `listings` into canonical display units.
#[must_use]
pub fn build_groups(listings: &[Listing], policy: &TrustPolicy) -> Vec<CanonicalGroup> {
    let mut acc = GroupAccumulator::new(policy);
    for listing in listings {
        acc.push(listing);
    }
    let groups = acc.finish();
    tracing::debug!(
        listings = listings.len(),
        groups = groups.len(),
        "catalog groups built"
    );
    groups
}

/// Reduces each product to one listing carrying its cheapest valid offer.
///
/// Products without a valid offer keep a zero price and no source.
#[must_use]
pub fn listings_from_products(products: &[ProductWithOffers]) -> Vec<Listing> {
    products
        .iter()
        .map(|p| {
            let cheapest = p.cheapest_valid_offer();
            Listing {
                product_id: p.product.id,
                name: p.product.name.clone(),
                price: cheapest.map_or(Decimal::ZERO, |o| o.price),
                source_name: cheapest.map(|o| o.source_name.clone()),
                image_url: p.product.cover_image_url.clone(),
            }
        })
        .collect()
}

fn has_valid_image(url: Option<&str>) -> bool {
    url.is_some_and(|u| {
        let u = u.trim();
        u.len() > MIN_IMAGE_URL_LEN && (u.starts_with("http://") || u.starts_with("https://"))
    })
}

/// Trust tier first, strictly lower price second.
fn beats(
    policy: &TrustPolicy,
    incoming_source: Option<&str>,
    incoming_price: Decimal,
    current_source: Option<&str>,
    current_price: Decimal,
) -> bool {
    let incoming_trusted = incoming_source.is_some_and(|s| policy.is_trusted(s));
    let current_trusted = current_source.is_some_and(|s| policy.is_trusted(s));
    match (incoming_trusted, current_trusted) {
        (true, false) => true,
        (false, true) => false,
        _ => incoming_price < current_price,
    }
}

fn compare_variant_price(a: &Variant, b: &Variant) -> Ordering {
    match (a.has_price(), b.has_price()) {
        (true, true) => a.price.cmp(&b.price),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
