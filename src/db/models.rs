use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use sqlx::FromRow;

/// Row as stored in the `products` table
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
}

/// Product as returned over the wire; price is a JSON number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price.and_then(|price| price_to_f64(row.id, price)),
            image_url: row.image_url,
        }
    }
}

fn price_to_f64(product_id: i32, price: Decimal) -> Option<f64> {
    let value = price.to_f64();
    if value.is_none() {
        tracing::warn!(product_id, price = %price, "Price has no f64 representation");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn row(price: Option<&str>) -> ProductRow {
        ProductRow {
            id: 7,
            name: "Espresso Cup".to_string(),
            description: Some("Porcelain, 90ml".to_string()),
            price: price.map(|p| Decimal::from_str(p).unwrap()),
            image_url: None,
        }
    }

    #[test]
    fn test_price_serializes_as_number() {
        let product = Product::from(row(Some("19.99")));
        let value = serde_json::to_value(&product).unwrap();

        assert!(value["price"].is_number());
        assert_eq!(value["price"], json!(19.99));
    }

    #[test]
    fn test_wire_shape() {
        let product = Product::from(row(Some("5.00")));
        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 7,
                "name": "Espresso Cup",
                "description": "Porcelain, 90ml",
                "price": 5.0,
                "image_url": null
            })
        );
    }

    #[test]
    fn test_prices_convert_to_nearest_float() {
        for (stored, expected) in [("89.50", 89.5), ("0.01", 0.01), ("42", 42.0)] {
            let converted = price_to_f64(1, Decimal::from_str(stored).unwrap());
            assert_eq!(converted, Some(expected), "stored price {}", stored);
        }
    }

    #[test]
    fn test_null_price_stays_null() {
        let product = Product::from(row(None));
        assert_eq!(product.price, None);

        let value = serde_json::to_value(&product).unwrap();
        assert!(value["price"].is_null());
    }
}
