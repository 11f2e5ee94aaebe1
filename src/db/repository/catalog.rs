use rusqlite::{params, Connection};

use super::select_where;
use crate::db::DatabaseError;
use crate::models::*;

pub const CATALOG_SEARCH_LIMIT: i64 = 20;

/// Active catalog entries whose generic or brand name contains `query`,
/// case-insensitively.
pub fn search_catalog(conn: &Connection, query: &str, limit: i64) -> Result<Vec<CatalogEntry>, DatabaseError> {
    let pattern = format!("%{}%", escape_like(query.trim()));
    select_where(
        conn,
        "active = 1
         AND (LOWER(generic_name) LIKE LOWER(?1) ESCAPE '\\' OR LOWER(brand_name) LIKE LOWER(?1) ESCAPE '\\')
         ORDER BY generic_name, id
         LIMIT ?2",
        params![pattern, limit],
    )
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
