//! `inspect` command: explain how one raw name is classified.

use petprice_catalog::{group_key, parse_quantity, variant_label, Quantity};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct InspectReport {
    pub name: String,
    pub group_key: String,
    pub variant_label: String,
    pub quantity: Option<Quantity>,
}

pub(crate) fn inspect_name(name: &str) -> InspectReport {
    InspectReport {
        name: name.to_string(),
        group_key: group_key(name),
        variant_label: variant_label(name),
        quantity: parse_quantity(name),
    }
}
