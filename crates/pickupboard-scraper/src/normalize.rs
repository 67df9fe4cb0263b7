//! Store merging and normalization from raw fulfillment payloads into
//! [`pickupboard_core::Snapshot`] parts.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pickupboard_core::{AvailabilityRecord, Part, Snapshot, Store, StoreSummary};

use crate::hours::{evaluate_hours, parse_hours};
use crate::types::{RawPartAvailability, RawStore};

pub const DEFAULT_STATUS: &str = "unavailable";
pub const DEFAULT_PICKUP_QUOTE: &str = "Not currently offered";

const MAP_BASE_URL: &str = "https://maps.apple.com/";

/// Identity of a raw store: its store number, or `country|city|name`.
#[must_use]
pub fn store_key(raw: &RawStore) -> String {
    match non_empty(raw.store_number.as_deref()) {
        Some(number) => number.to_string(),
        None => format!(
            "{}|{}|{}",
            raw.country.as_deref().unwrap_or_default().trim(),
            raw.city.as_deref().unwrap_or_default().trim(),
            raw.store_name.as_deref().unwrap_or_default().trim(),
        ),
    }
}

/// Flattens per-seed store lists, keeping the first copy of each store.
#[must_use]
pub fn merge_stores(batches: Vec<Vec<RawStore>>) -> Vec<RawStore> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|store| seen.insert(store_key(store)))
        .collect()
}

/// Builds the display form of a store, evaluating its hours at `local_now`.
#[must_use]
pub fn normalize_store(raw: &RawStore, local_now: NaiveDateTime) -> Store {
    let name = non_empty(raw.store_name.as_deref())
        .unwrap_or_default()
        .to_string();
    let address = compose_address(raw);
    let phone = non_empty(raw.phone_number.as_deref()).map(str::to_string);

    let rules = raw
        .store_hours
        .as_ref()
        .map(|h| parse_hours(&h.hours))
        .unwrap_or_default();
    let hours = evaluate_hours(&rules, local_now);

    Store {
        store_number: store_key(raw),
        map_url: map_url(&name, &address, raw.latitude, raw.longitude),
        tel_url: phone.as_deref().and_then(tel_url),
        name,
        city: non_empty(raw.city.as_deref())
            .unwrap_or_default()
            .to_string(),
        address,
        phone,
        latitude: raw.latitude,
        longitude: raw.longitude,
        is_open: hours.is_open,
        today_hours: hours.today_hours,
    }
}

/// Maps deep link: exact coordinates when known, otherwise a text search.
#[must_use]
pub fn map_url(name: &str, address: &str, latitude: Option<f64>, longitude: Option<f64>) -> String {
    let encode = |s: &str| utf8_percent_encode(s, NON_ALPHANUMERIC).to_string();
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => format!("{MAP_BASE_URL}?ll={lat},{lng}&q={}", encode(name)),
        _ => {
            let query = [name, address]
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            format!("{MAP_BASE_URL}?q={}", encode(&query))
        }
    }
}

/// `tel:` link from a display phone number; `None` when nothing dialable remains.
#[must_use]
pub fn tel_url(phone: &str) -> Option<String> {
    let dialable: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if dialable.chars().any(|c| c.is_ascii_digit()) {
        Some(format!("tel:{dialable}"))
    } else {
        None
    }
}

/// One record per part the upstream reports for this store, in part order.
#[must_use]
pub fn store_availability(store: &Store, raw: &RawStore, parts: &[Part]) -> Vec<AvailabilityRecord> {
    parts
        .iter()
        .filter_map(|part| {
            raw.parts_availability
                .get(&part.part_number)
                .map(|availability| availability_record(store, part, availability))
        })
        .collect()
}

fn availability_record(
    store: &Store,
    part: &Part,
    availability: &RawPartAvailability,
) -> AvailabilityRecord {
    let regular_quote = availability
        .message_types
        .as_ref()
        .and_then(|m| m.regular.as_ref())
        .and_then(|r| non_empty(r.store_pickup_quote.as_deref()));

    let pickup_quote = regular_quote
        .or_else(|| non_empty(availability.store_pickup_quote.as_deref()))
        .or_else(|| non_empty(availability.pickup_search_quote.as_deref()))
        .unwrap_or(DEFAULT_PICKUP_QUOTE)
        .to_string();

    AvailabilityRecord {
        store: store.clone(),
        part: part.clone(),
        status: non_empty(availability.pickup_display.as_deref())
            .unwrap_or(DEFAULT_STATUS)
            .to_string(),
        is_buyable: availability
            .buyability
            .as_ref()
            .is_some_and(|b| b.is_buyable),
        pickup_type: non_empty(availability.pickup_type.as_deref()).map(str::to_string),
        pickup_quote,
    }
}

/// Merges per-seed store lists and cross-joins them with `parts` into an
/// untagged snapshot.
#[must_use]
pub fn assemble_snapshot(
    parts: Vec<Part>,
    store_batches: Vec<Vec<RawStore>>,
    local_now: NaiveDateTime,
    generated_at: DateTime<Utc>,
) -> Snapshot {
    let raw_stores = merge_stores(store_batches);

    let mut stores = Vec::with_capacity(raw_stores.len());
    let mut availability = Vec::new();
    for raw in &raw_stores {
        let store = normalize_store(raw, local_now);
        availability.extend(store_availability(&store, raw, &parts));
        stores.push(StoreSummary::from(&store));
    }

    Snapshot {
        source: None,
        generated_at,
        models: parts,
        stores,
        availability,
    }
}

fn compose_address(raw: &RawStore) -> String {
    let Some(address) = raw.address.as_ref() else {
        return String::new();
    };
    let street = [address.address2.as_deref(), address.address3.as_deref()]
        .into_iter()
        .filter_map(non_empty)
        .collect::<Vec<_>>()
        .join(" ");
    if street.is_empty() {
        non_empty(address.address.as_deref())
            .unwrap_or_default()
            .to_string()
    } else {
        street
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
