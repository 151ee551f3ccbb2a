//! Raw catalog item normalization
//!
//! Turns the loosely shaped JSON items the source returns into the flat
//! `Product` schema the sink persists. Normalization of one item never fails
//! the enclosing page: a malformed item yields `None` and is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A normalized catalog record
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub slugged_name: String,
    pub status: String,
    pub brand: String,
    pub category_id: Option<i64>,
    pub category_name: String,

    // Pricing
    pub old_price: f64,
    pub retail_price: f64,
    pub discount_amount: f64,
    pub discount_percentage: f64,

    // Installment
    pub installment_enabled: bool,
    pub max_installment_months: u32,

    // Seller
    pub seller_id: String,
    pub seller_name: String,
    pub seller_rating: f64,

    // Images
    pub image_big: String,
    pub image_medium: String,
    pub image_small: String,

    // Ratings
    pub rating_value: f64,
    pub rating_count: u64,

    // Other
    pub labels: String,
    pub min_qty: u32,
    pub preorder_available: bool,
    pub qty: u32,
    pub offer_uuid: String,

    // Discount window
    pub discount_start_date: String,
    pub discount_end_date: String,

    // Metadata
    pub scraped_at: DateTime<Utc>,
}

/// Normalizes one raw catalog item
///
/// Returns `None` when the item is missing its id or name; the caller drops
/// the item and continues with the rest of the page.
pub fn normalize_product(raw: &Value) -> Option<Product> {
    let product_id = raw.get("id")?.as_i64()?;

    let name = str_field(raw, "name").trim().to_string();
    if name.is_empty() {
        tracing::warn!("Skipping product {} with missing name", product_id);
        return None;
    }

    let default_offer = raw.get("default_offer").cloned().unwrap_or(Value::Null);
    let seller = default_offer.get("seller").cloned().unwrap_or(Value::Null);
    let main_img = raw.get("main_img").cloned().unwrap_or(Value::Null);
    let category = raw.get("category").cloned().unwrap_or(Value::Null);
    let ratings = raw.get("ratings").cloned().unwrap_or(Value::Null);

    let old_price = f64_field(&default_offer, "old_price");
    let retail_price = f64_field(&default_offer, "retail_price");
    let discount_amount = old_price - retail_price;
    let discount_percentage = if old_price > 0.0 {
        round2((old_price - retail_price) / old_price * 100.0)
    } else {
        0.0
    };

    Some(Product {
        product_id,
        name,
        slugged_name: str_field(raw, "slugged_name"),
        status: str_field(raw, "status"),
        brand: str_field(raw, "brand"),
        category_id: category.get("id").and_then(Value::as_i64),
        category_name: str_field(&category, "name"),

        old_price,
        retail_price,
        discount_amount,
        discount_percentage,

        installment_enabled: bool_field(&default_offer, "installment_enabled"),
        max_installment_months: u32_field(&default_offer, "max_installment_months"),

        seller_id: str_field(&seller, "ext_id"),
        seller_name: seller
            .get("marketing_name")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        seller_rating: f64_field(&seller, "rating"),

        image_big: str_field(&main_img, "big"),
        image_medium: str_field(&main_img, "medium"),
        image_small: str_field(&main_img, "small"),

        rating_value: f64_field(&ratings, "rating_value"),
        rating_count: u64_field(&ratings, "session_count"),

        labels: join_labels(raw),
        min_qty: raw.get("min_qty").and_then(Value::as_u64).unwrap_or(1) as u32,
        preorder_available: bool_field(raw, "preorder_available"),
        qty: u32_field(&default_offer, "qty"),
        offer_uuid: str_field(&default_offer, "uuid"),

        discount_start_date: str_field(&default_offer, "discount_effective_start_date"),
        discount_end_date: str_field(&default_offer, "discount_effective_end_date"),

        scraped_at: Utc::now(),
    })
}

/// Joins the text of all product labels into one comma-separated string
fn join_labels(raw: &Value) -> String {
    raw.get("product_labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|label| label.get("text").and_then(Value::as_str))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn f64_field(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn u32_field(value: &Value, key: &str) -> u32 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0) as u32
}

fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_item() -> Value {
        json!({
            "id": 12345,
            "name": "  Cordless Drill  ",
            "slugged_name": "cordless-drill",
            "status": "active",
            "brand": "Makita",
            "category": {"id": 77, "name": "Tools"},
            "default_offer": {
                "old_price": 200.0,
                "retail_price": 150.0,
                "installment_enabled": true,
                "max_installment_months": 12,
                "qty": 5,
                "uuid": "offer-uuid-1",
                "discount_effective_start_date": "2026-01-01",
                "discount_effective_end_date": "2026-02-01",
                "seller": {
                    "ext_id": "S-9",
                    "rating": 4.5,
                    "marketing_name": {"name": "ToolShop"}
                }
            },
            "main_img": {"big": "b.jpg", "medium": "m.jpg", "small": "s.jpg"},
            "ratings": {"rating_value": 4.2, "session_count": 31},
            "product_labels": [{"text": "Hot"}, {"text": ""}, {"text": "Sale"}],
            "min_qty": 2,
            "preorder_available": true
        })
    }

    #[test]
    fn test_full_item_normalizes() {
        let product = normalize_product(&full_item()).unwrap();

        assert_eq!(product.product_id, 12345);
        assert_eq!(product.name, "Cordless Drill");
        assert_eq!(product.brand, "Makita");
        assert_eq!(product.category_id, Some(77));
        assert_eq!(product.category_name, "Tools");
        assert_eq!(product.seller_id, "S-9");
        assert_eq!(product.seller_name, "ToolShop");
        assert_eq!(product.image_medium, "m.jpg");
        assert_eq!(product.rating_count, 31);
        assert_eq!(product.labels, "Hot, Sale");
        assert_eq!(product.min_qty, 2);
        assert_eq!(product.qty, 5);
        assert!(product.preorder_available);
        assert!(product.installment_enabled);
        assert_eq!(product.max_installment_months, 12);
        assert_eq!(product.offer_uuid, "offer-uuid-1");
    }

    #[test]
    fn test_discount_math() {
        let product = normalize_product(&full_item()).unwrap();

        assert_eq!(product.old_price, 200.0);
        assert_eq!(product.retail_price, 150.0);
        assert_eq!(product.discount_amount, 50.0);
        assert_eq!(product.discount_percentage, 25.0);
    }

    #[test]
    fn test_zero_old_price_means_no_discount_percentage() {
        let item = json!({
            "id": 1,
            "name": "Freebie",
            "default_offer": {"old_price": 0.0, "retail_price": 10.0}
        });

        let product = normalize_product(&item).unwrap();
        assert_eq!(product.discount_percentage, 0.0);
    }

    #[test]
    fn test_missing_id_dropped() {
        assert!(normalize_product(&json!({"name": "No id"})).is_none());
    }

    #[test]
    fn test_blank_name_dropped() {
        assert!(normalize_product(&json!({"id": 5, "name": "   "})).is_none());
        assert!(normalize_product(&json!({"id": 5})).is_none());
    }

    #[test]
    fn test_sparse_item_gets_defaults() {
        let product = normalize_product(&json!({"id": 2, "name": "Bare"})).unwrap();

        assert_eq!(product.brand, "");
        assert_eq!(product.category_id, None);
        assert_eq!(product.old_price, 0.0);
        assert_eq!(product.min_qty, 1);
        assert_eq!(product.qty, 0);
        assert_eq!(product.labels, "");
        assert!(!product.installment_enabled);
    }

    #[test]
    fn test_mistyped_nested_objects_tolerated() {
        let item = json!({
            "id": 3,
            "name": "Odd",
            "default_offer": "not an object",
            "ratings": 17,
            "product_labels": "nope"
        });

        let product = normalize_product(&item).unwrap();
        assert_eq!(product.old_price, 0.0);
        assert_eq!(product.rating_value, 0.0);
        assert_eq!(product.labels, "");
    }
}
