//! SQLite sink implementation
//!
//! Persists normalized products keyed by product id. Records are written in
//! one transaction per batch; replacing an existing row is the expected path
//! when a page is re-fetched after a resume.

use crate::catalog::Product;
use crate::sink::schema::initialize_schema;
use crate::sink::traits::{RecordSink, SinkResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite-backed record sink
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates the sink database at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better write performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory sink (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl RecordSink for SqliteSink {
    fn append_records(&mut self, records: &[Product]) -> SinkResult<usize> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO products (
                    product_id, name, slugged_name, status, brand,
                    category_id, category_name,
                    old_price, retail_price, discount_amount, discount_percentage,
                    installment_enabled, max_installment_months,
                    seller_id, seller_name, seller_rating,
                    image_big, image_medium, image_small,
                    rating_value, rating_count, labels,
                    min_qty, preorder_available, qty, offer_uuid,
                    discount_start_date, discount_end_date, scraped_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
                    ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29
                )",
            )?;

            for product in records {
                stmt.execute(params![
                    product.product_id,
                    product.name,
                    product.slugged_name,
                    product.status,
                    product.brand,
                    product.category_id,
                    product.category_name,
                    product.old_price,
                    product.retail_price,
                    product.discount_amount,
                    product.discount_percentage,
                    product.installment_enabled,
                    product.max_installment_months,
                    product.seller_id,
                    product.seller_name,
                    product.seller_rating,
                    product.image_big,
                    product.image_medium,
                    product.image_small,
                    product.rating_value,
                    product.rating_count as i64,
                    product.labels,
                    product.min_qty,
                    product.preorder_available,
                    product.qty,
                    product.offer_uuid,
                    product.discount_start_date,
                    product.discount_end_date,
                    product.scraped_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(records.len())
    }

    fn record_count(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
