use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A canonical catalog entity, as entered by an operator or first scraped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// Raw source-of-truth name, e.g. `"Ração Golden Special Adulto Frango 15kg"`.
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub cover_image_url: Option<String>,
}

/// One (product, source) price observation.
///
/// At most one current offer exists per `(product_id, source_name)`; the
/// store enforces this with an upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub product_id: i64,
    /// Store label, e.g. `"Petz"` or `"Shopee"`.
    pub source_name: String,
    /// Zero or negative means the observation carries no usable price.
    pub price: Decimal,
    pub referral_url: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl Offer {
    #[must_use]
    pub fn has_valid_price(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// A product joined with all of its current offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithOffers {
    pub product: Product,
    pub offers: Vec<Offer>,
}

impl ProductWithOffers {
    /// Returns the cheapest offer with a positive price, if any.
    #[must_use]
    pub fn cheapest_valid_offer(&self) -> Option<&Offer> {
        self.offers
            .iter()
            .filter(|o| o.has_valid_price())
            .min_by(|a, b| a.price.cmp(&b.price))
    }
}

/// The flattened `(name, price, source, image)` tuple consumed by the offer
/// aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub product_id: i64,
    pub name: String,
    /// Zero when the product has no valid offer.
    pub price: Decimal,
    pub source_name: Option<String>,
    pub image_url: Option<String>,
}

impl Listing {
    #[must_use]
    pub fn has_valid_price(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// One search-result entry as handed over by the browser-automation layer.
///
/// `price_text` is the raw text surrounding the entry (all visible prices and
/// their labels), not a parsed amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCandidate {
    pub title: String,
    pub price_text: String,
    pub link: String,
    #[serde(default)]
    pub sales_count: Option<u32>,
}

/// A scraped candidate after its retail price has been selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub display_title: String,
    pub observed_price: Decimal,
    pub link: String,
    pub sales_count: Option<u32>,
}
