//! Database operations for `products` and `offers`.

use chrono::{DateTime, Utc};
use petprice_core::{Offer, Product, ProductWithOffers};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            category: row.category,
            cover_image_url: row.cover_image_url,
        }
    }
}

/// A row from the `offers` table. `(product_id, source_name)` is unique.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub product_id: i64,
    pub source_name: String,
    pub price: Decimal,
    pub referral_url: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl From<OfferRow> for Offer {
    fn from(row: OfferRow) -> Self {
        Self {
            product_id: row.product_id,
            source_name: row.source_name,
            price: row.price,
            referral_url: row.referral_url,
            last_updated: row.last_updated,
        }
    }
}

/// One row of the `products LEFT JOIN offers` read. Offer columns are all
/// `NULL` for a product without offers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductOfferRow {
    pub product_id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub cover_image_url: Option<String>,
    pub source_name: Option<String>,
    pub price: Option<Decimal>,
    pub referral_url: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Input for [`upsert_offer`].
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub product_id: i64,
    pub source_name: String,
    pub price: Decimal,
    pub referral_url: Option<String>,
}

/// Richer product metadata discovered while scraping. `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductMetadata {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub cover_image_url: Option<String>,
}

impl ProductMetadata {
    /// Trimmed copy with blank values dropped. A cover image that is not an
    /// `http(s)` URL is dropped too, so it never replaces a stored one.
    #[must_use]
    pub fn cleaned(&self) -> Self {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            name: non_blank(&self.name),
            brand: non_blank(&self.brand),
            cover_image_url: non_blank(&self.cover_image_url).filter(|u| is_http_url(u)),
        }
    }
}

// ---------------------------------------------------------------------------
// read
// ---------------------------------------------------------------------------

/// Returns every product with all of its current offers, ordered by product id.
///
/// `search` filters by a case-insensitive substring of the product name;
/// `%` and `_` in it match literally.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_with_offers(
    pool: &PgPool,
    search: Option<&str>,
) -> Result<Vec<ProductWithOffers>, DbError> {
    let pattern = search_pattern(search);

    let rows = sqlx::query_as::<_, ProductOfferRow>(
        "SELECT p.id AS product_id, p.name, p.brand, p.category, p.cover_image_url, \
                o.source_name, o.price, o.referral_url, o.last_updated \
         FROM products p \
         LEFT JOIN offers o ON o.product_id = p.id \
         WHERE ($1::text IS NULL OR p.name ILIKE $1 ESCAPE '\\') \
         ORDER BY p.id, o.source_name",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(group_joined_rows(rows))
}

/// `ILIKE` pattern for a literal substring search, or `None` for no filter.
#[must_use]
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Some(format!("%{escaped}%"))
}

/// Folds joined rows (ordered by product id) into one entry per product.
#[must_use]
pub fn group_joined_rows(rows: Vec<ProductOfferRow>) -> Vec<ProductWithOffers> {
    let mut out: Vec<ProductWithOffers> = Vec::new();

    for row in rows {
        let offer = match (row.source_name, row.price) {
            (Some(source_name), Some(price)) => Some(Offer {
                product_id: row.product_id,
                source_name,
                price,
                referral_url: row.referral_url,
                last_updated: row.last_updated.unwrap_or_else(Utc::now),
            }),
            _ => None,
        };

        let same_product = out
            .last()
            .is_some_and(|p: &ProductWithOffers| p.product.id == row.product_id);
        if !same_product {
            out.push(ProductWithOffers {
                product: Product {
                    id: row.product_id,
                    name: row.name,
                    brand: row.brand,
                    category: row.category,
                    cover_image_url: row.cover_image_url,
                },
                offers: Vec::new(),
            });
        }
        if let (Some(offer), Some(current)) = (offer, out.last_mut()) {
            current.offers.push(offer);
        }
    }

    out
}

// ---------------------------------------------------------------------------
// write
// ---------------------------------------------------------------------------

/// Upserts the current offer for `(product_id, source_name)`.
///
/// A new observation replaces the stored price and timestamp in place; the
/// referral URL is only replaced when a new one is given.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::InvalidOffer`] for an empty source or a non-positive
/// price, or [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_offer(pool: &PgPool, offer: &NewOffer) -> Result<i64, DbError> {
    if offer.source_name.trim().is_empty() {
        return Err(DbError::InvalidOffer("source_name is empty".to_string()));
    }
    if offer.price <= Decimal::ZERO {
        return Err(DbError::InvalidOffer(format!(
            "price must be positive, got {}",
            offer.price
        )));
    }

    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO offers (product_id, source_name, price, referral_url, last_updated) \
         VALUES ($1, $2, $3::numeric(10,2), $4, NOW()) \
         ON CONFLICT (product_id, source_name) DO UPDATE SET \
             price        = EXCLUDED.price, \
             referral_url = COALESCE(EXCLUDED.referral_url, offers.referral_url), \
             last_updated = NOW() \
         RETURNING id",
    )
    .bind(offer.product_id)
    .bind(offer.source_name.trim())
    .bind(offer.price)
    .bind(&offer.referral_url)
    .fetch_one(pool)
    .await?;

    tracing::debug!(
        product_id = offer.product_id,
        source = %offer.source_name,
        price = %offer.price,
        offer_id = id,
        "offer upserted"
    );
    Ok(id)
}

/// Updates name, brand and cover image of an existing product.
///
/// The cover image is only replaced by an `http(s)` URL.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `product_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn upsert_product_metadata(
    pool: &PgPool,
    product_id: i64,
    metadata: &ProductMetadata,
) -> Result<(), DbError> {
    let metadata = metadata.cleaned();

    let updated: Option<i64> = sqlx::query_scalar::<_, i64>(
        "UPDATE products SET \
             name            = COALESCE($2, name), \
             brand           = COALESCE($3, brand), \
             cover_image_url = COALESCE($4, cover_image_url), \
             updated_at      = NOW() \
         WHERE id = $1 \
         RETURNING id",
    )
    .bind(product_id)
    .bind(&metadata.name)
    .bind(&metadata.brand)
    .bind(&metadata.cover_image_url)
    .fetch_optional(pool)
    .await?;

    updated.map(|_| ()).ok_or(DbError::NotFound)
}

/// `true` for absolute `http://` or `https://` URLs.
#[must_use]
pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.len() > scheme.len() && lower.starts_with(scheme))
}
