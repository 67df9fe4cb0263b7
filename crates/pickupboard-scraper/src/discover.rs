//! Part discovery from product family listing pages.

use std::collections::HashSet;
use std::str::FromStr;

use futures::future::join_all;
use pickupboard_core::Part;
use rust_decimal::Decimal;

use crate::client::UpstreamClient;
use crate::embed::extract_script_payload;
use crate::error::ScraperError;
use crate::types::{ListingPayload, ListingProduct};

const PHONE_CATEGORY: &str = "iphone";

/// Fetches every family's listing page concurrently and merges the parts
/// they list, keeping the first family's copy of any repeated part number.
///
/// A family whose page cannot be fetched or parsed contributes nothing and
/// is logged; the others still count.
///
/// # Errors
///
/// Returns [`ScraperError::NoPartsDiscovered`] when no family yields a part.
pub async fn discover_parts(
    client: &UpstreamClient,
    families: &[String],
    anchor: &str,
) -> Result<Vec<Part>, ScraperError> {
    let pages = join_all(
        families
            .iter()
            .map(|family| discover_family(client, family, anchor)),
    )
    .await;

    let batches: Vec<Vec<Part>> = families
        .iter()
        .zip(pages)
        .filter_map(|(family, result)| match result {
            Ok(parts) => {
                tracing::debug!(family = %family, count = parts.len(), "discovered family parts");
                Some(parts)
            }
            Err(e) => {
                tracing::warn!(family = %family, error = %e, "skipping product family");
                None
            }
        })
        .collect();

    let parts = merge_parts(batches);
    if parts.is_empty() {
        return Err(ScraperError::NoPartsDiscovered {
            families: families.len(),
        });
    }
    Ok(parts)
}

async fn discover_family(
    client: &UpstreamClient,
    family: &str,
    anchor: &str,
) -> Result<Vec<Part>, ScraperError> {
    let html = client.fetch_listing(family).await?;
    parse_listing(&html, anchor, family)
}

/// Extracts the phone parts listed in one family's listing page.
///
/// # Errors
///
/// - [`ScraperError::MissingPayload`] — no script block carries `anchor`.
/// - [`ScraperError::Deserialize`] — the block is not valid JSON.
pub fn parse_listing(html: &str, anchor: &str, family: &str) -> Result<Vec<Part>, ScraperError> {
    let payload = extract_script_payload(html, anchor).ok_or_else(|| {
        ScraperError::MissingPayload {
            family: family.to_owned(),
            anchor: anchor.to_owned(),
        }
    })?;

    let parsed: ListingPayload =
        serde_json::from_str(&payload).map_err(|e| ScraperError::Deserialize {
            context: format!("listing payload for {family}"),
            source: e,
        })?;

    Ok(parsed
        .data
        .products
        .into_iter()
        .filter_map(|product| listing_product_to_part(product, family))
        .collect())
}

/// Concatenates batches in order, dropping any part number already seen.
#[must_use]
pub fn merge_parts(batches: Vec<Vec<Part>>) -> Vec<Part> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|part| seen.insert(part.part_number.clone()))
        .collect()
}

fn listing_product_to_part(product: ListingProduct, family: &str) -> Option<Part> {
    let part_number = product
        .part_number
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;
    let category = product.category?;
    if !category.trim().eq_ignore_ascii_case(PHONE_CATEGORY) {
        return None;
    }

    let price = product
        .price
        .and_then(|p| p.full_price)
        .and_then(|v| parse_price(&v));

    Some(Part {
        name: product
            .name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| part_number.clone()),
        part_number,
        sku: product.sku.filter(|s| !s.is_empty()),
        family: family.to_owned(),
        price,
    })
}

fn parse_price(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_html(products: &serde_json::Value) -> String {
        format!(
            r#"<html><body><script type="application/json" id="metrics">{}</script></body></html>"#,
            serde_json::json!({ "data": { "products": products } })
        )
    }

    fn part(part_number: &str, family: &str) -> Part {
        Part {
            name: part_number.to_string(),
            part_number: part_number.to_string(),
            sku: None,
            family: family.to_string(),
            price: None,
        }
    }

    #[test]
    fn parse_listing_keeps_phone_entries_with_part_numbers() {
        let html = listing_html(&serde_json::json!([
            { "partNumber": "MG8H4ZP/A", "sku": "IPHONE17PRO", "name": "iPhone 17 Pro 256GB",
              "category": "iphone", "price": { "fullPrice": 36900 } },
            { "partNumber": "MX2D3TA/A", "name": "AirPods", "category": "airpods" },
            { "name": "No part number", "category": "iphone" },
            { "partNumber": "MG8J4ZP/A", "name": "iPhone 17 Pro 512GB" }
        ]));

        let parts = parse_listing(&html, "metrics", "iphone-17-pro").expect("parse");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].part_number, "MG8H4ZP/A");
        assert_eq!(parts[0].family, "iphone-17-pro");
        assert_eq!(parts[0].sku.as_deref(), Some("IPHONE17PRO"));
        assert_eq!(parts[0].price, Some(Decimal::from(36_900)));
    }

    #[test]
    fn parse_listing_accepts_string_prices_and_missing_names() {
        let html = listing_html(&serde_json::json!([
            { "partNumber": "MG6K4ZP/A", "category": "IPhone", "price": { "fullPrice": "NT$29,900" } }
        ]));
        let parts = parse_listing(&html, "metrics", "iphone-17").expect("parse");
        assert_eq!(parts[0].name, "MG6K4ZP/A");
        assert_eq!(parts[0].price, Some(Decimal::from(29_900)));
    }

    #[test]
    fn parse_listing_without_anchor_fails() {
        let err = parse_listing("<html></html>", "metrics", "iphone-17").unwrap_err();
        assert!(
            matches!(err, ScraperError::MissingPayload { ref family, .. } if family == "iphone-17"),
            "expected MissingPayload, got: {err:?}"
        );
    }

    #[test]
    fn parse_listing_with_broken_json_fails() {
        let html = r#"<script id="metrics">{"data": [</script>"#;
        let err = parse_listing(html, "metrics", "iphone-17").unwrap_err();
        assert!(
            matches!(err, ScraperError::Deserialize { .. }),
            "expected Deserialize, got: {err:?}"
        );
    }

    #[test]
    fn parse_listing_without_products_is_empty() {
        let html = r#"<script id="metrics">{"page":"buy"}</script>"#;
        let parts = parse_listing(html, "metrics", "iphone-17").expect("parse");
        assert!(parts.is_empty());
    }

    #[test]
    fn merge_parts_keeps_first_family_and_order() {
        let merged = merge_parts(vec![
            vec![part("A", "pro"), part("B", "pro")],
            vec![part("B", "base"), part("C", "base")],
            vec![part("A", "air"), part("D", "air")],
        ]);

        let numbers: Vec<&str> = merged.iter().map(|p| p.part_number.as_str()).collect();
        assert_eq!(numbers, vec!["A", "B", "C", "D"]);
        assert_eq!(merged[1].family, "pro");

        let unique: HashSet<&str> = numbers.iter().copied().collect();
        assert_eq!(unique.len(), merged.len());
    }
}
