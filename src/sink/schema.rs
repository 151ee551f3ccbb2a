//! Database schema definitions
//!
//! This module contains the SQL schema for the product sink database.

/// SQL schema for the sink database
///
/// `product_id` is the primary key; re-appending a record for the same
/// product replaces the prior row, which is what makes the sink
/// duplicate-tolerant across resumed runs.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    slugged_name TEXT,
    status TEXT,
    brand TEXT,
    category_id INTEGER,
    category_name TEXT,
    old_price REAL,
    retail_price REAL,
    discount_amount REAL,
    discount_percentage REAL,
    installment_enabled INTEGER NOT NULL DEFAULT 0,
    max_installment_months INTEGER,
    seller_id TEXT,
    seller_name TEXT,
    seller_rating REAL,
    image_big TEXT,
    image_medium TEXT,
    image_small TEXT,
    rating_value REAL,
    rating_count INTEGER,
    labels TEXT,
    min_qty INTEGER,
    preorder_available INTEGER NOT NULL DEFAULT 0,
    qty INTEGER,
    offer_uuid TEXT,
    discount_start_date TEXT,
    discount_end_date TEXT,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_brand ON products(brand);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
CREATE INDEX IF NOT EXISTS idx_products_seller ON products(seller_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_products_table_exists_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='products'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
