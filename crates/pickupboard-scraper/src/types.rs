//! Upstream payload shapes.
//!
//! Every field is optional or defaulted: the storefront omits keys freely and
//! a missing field should degrade one value, not drop a whole response.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// JSON payload embedded in a product family listing page.
#[derive(Debug, Default, Deserialize)]
pub struct ListingPayload {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub products: Vec<ListingProduct>,
}

/// One entry of `data.products[]` on a listing page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingProduct {
    pub part_number: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    /// Product line marker, `"iphone"` for phones.
    pub category: Option<String>,
    pub price: Option<ListingPrice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingPrice {
    /// Number or numeric string depending on the region.
    pub full_price: Option<serde_json::Value>,
}

/// Response of the fulfillment endpoint; only the pickup store list is read.
#[derive(Debug, Default, Deserialize)]
pub struct FulfillmentResponse {
    #[serde(default)]
    pub body: FulfillmentBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct FulfillmentBody {
    #[serde(default)]
    pub content: FulfillmentContent,
}

#[derive(Debug, Default, Deserialize)]
pub struct FulfillmentContent {
    #[serde(default, rename = "pickupMessage")]
    pub pickup_message: PickupMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct PickupMessage {
    #[serde(default)]
    pub stores: Vec<RawStore>,
}

impl FulfillmentResponse {
    #[must_use]
    pub fn into_stores(self) -> Vec<RawStore> {
        self.body.content.pickup_message.stores
    }
}

/// A store as reported by the fulfillment endpoint for one seed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawStore {
    pub store_number: Option<String>,
    pub store_name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub address: Option<RawAddress>,
    pub phone_number: Option<String>,
    #[serde(rename = "storelatitude", deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(rename = "storelongitude", deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    pub store_hours: Option<RawStoreHours>,
    /// Keyed by part number.
    pub parts_availability: HashMap<String, RawPartAvailability>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAddress {
    pub address: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStoreHours {
    pub hours: Vec<RawHoursEntry>,
}

/// One line of a store's weekly hours table, e.g. `"週一至週五:"` / `"10:00 - 21:00"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawHoursEntry {
    pub store_days: Option<String>,
    pub store_timings: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPartAvailability {
    /// `"available"`, `"unavailable"` or `"ineligible"`.
    pub pickup_display: Option<String>,
    pub pickup_search_quote: Option<String>,
    pub pickup_type: Option<String>,
    pub store_pickup_quote: Option<String>,
    pub buyability: Option<RawBuyability>,
    pub message_types: Option<RawMessageTypes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBuyability {
    pub is_buyable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMessageTypes {
    pub regular: Option<RawRegularMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRegularMessage {
    pub store_pickup_quote: Option<String>,
    pub store_pickup_product_title: Option<String>,
}

/// Accepts a number, a numeric string, or null.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
    }))
}
