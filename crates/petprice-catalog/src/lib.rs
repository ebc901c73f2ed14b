//! Product reconciliation for the pet-supply price catalog.
//!
//! Turns noisy retail listings into canonical groups: a group key per name,
//! a variant label per size, a cover per group, plus the scrape-time size and
//! price checks applied to live search results.

pub mod aggregate;
pub mod grouping;
pub mod label;
pub mod matcher;
pub mod price;
pub mod units;

mod taxonomy;
mod text;

pub use aggregate::{build_groups, listings_from_products, CanonicalGroup, GroupAccumulator, Variant};
pub use grouping::{group_key, UNNAMED_GROUP};
pub use label::{variant_label, UNCLASSIFIED_LABEL};
pub use matcher::{mentions_subscription, pick_retail_price, weights_equivalent};
pub use price::{extract_prices, parse_price_text};
pub use taxonomy::Species;
pub use text::fold;
pub use units::{extract_quantity_text, parse_quantity, Quantity, SizeLetter};
