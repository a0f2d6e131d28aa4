//! Page-slicing helpers shared by every paginated view.
//!
//! Pages are 1-indexed. A `page` query value that does not parse behaves as
//! page 1, and out-of-range page numbers clamp to the nearest valid page
//! instead of erroring.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, Select};
use serde::Serialize;

/// A single page of results plus the metadata needed to render next/previous
/// navigation.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching rows before pagination.
    pub total: u64,
    pub page: u64,
    pub page_count: u64,
    pub per_page: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Re-wraps the page around transformed items, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_count: self.page_count,
            per_page: self.per_page,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// Parses a raw `page` query value. Absent, non-numeric, or zero values all
/// mean page 1.
pub fn parse_page_param(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

/// Number of pages needed for `total` items. Always at least 1, so an empty
/// result set still has a valid page to land on.
pub fn page_count(total: u64, per_page: u64) -> u64 {
    if total == 0 {
        1
    } else {
        (total - 1) / per_page + 1
    }
}

/// Clamps a requested 1-indexed page into `[1, page_count]`.
pub fn clamp_page(requested: u64, page_count: u64) -> u64 {
    requested.clamp(1, page_count)
}

/// Runs a select twice, once for the total count and once for the clamped
/// page slice, and assembles the page envelope.
pub async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    requested_page: u64,
    per_page: u64,
) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync + 'static,
{
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;

    let page_count = page_count(total, per_page);
    let page = clamp_page(requested_page, page_count);

    let items = paginator.fetch_page(page - 1).await?;

    Ok(Page {
        items,
        total,
        page,
        page_count,
        per_page,
        has_next: page < page_count,
        has_prev: page > 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_param() {
        assert_eq!(parse_page_param(None), 1);
        assert_eq!(parse_page_param(Some("3")), 3);
        assert_eq!(parse_page_param(Some(" 7 ")), 7);
        assert_eq!(parse_page_param(Some("0")), 1);
        assert_eq!(parse_page_param(Some("-2")), 1);
        assert_eq!(parse_page_param(Some("abc")), 1);
        assert_eq!(parse_page_param(Some("")), 1);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 12), 1);
        assert_eq!(page_count(1, 12), 1);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);
        assert_eq!(page_count(24, 12), 2);
        assert_eq!(page_count(25, 12), 3);
    }

    #[test]
    fn test_clamp_page() {
        // Requesting a page far past the end lands on the last valid page.
        assert_eq!(clamp_page(9999, page_count(3, 12)), 1);
        assert_eq!(clamp_page(9999, page_count(30, 12)), 3);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(0, 3), 1);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page {
            items: vec![1, 2, 3],
            total: 15,
            page: 2,
            page_count: 5,
            per_page: 3,
            has_next: true,
            has_prev: true,
        };
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1", "2", "3"]);
        assert_eq!(mapped.total, 15);
        assert_eq!(mapped.page, 2);
        assert!(mapped.has_next);
    }
}
