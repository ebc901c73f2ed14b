//! `catalog` command: read the store and print canonical groups.

use petprice_catalog::{build_groups, listings_from_products};
use petprice_core::TrustPolicy;

/// Builds canonical groups from every stored product (optionally filtered by
/// name) and prints them to stdout as pretty JSON.
///
/// # Errors
///
/// Returns an error if the store read fails or the output cannot be encoded.
pub(crate) async fn run_catalog(
    pool: &sqlx::PgPool,
    policy: &TrustPolicy,
    search: Option<&str>,
) -> anyhow::Result<()> {
    let products = petprice_db::list_products_with_offers(pool, search).await?;
    let listings = listings_from_products(&products);
    let groups = build_groups(&listings, policy);

    let available = groups.iter().filter(|g| g.is_available()).count();
    tracing::info!(
        products = products.len(),
        groups = groups.len(),
        available,
        "catalog built"
    );

    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}
