//! Browse pagination against the filtered select: clamping and metadata.

mod common;

use common::*;
use homestead::pagination::fetch_page;
use homestead::search::ListingSearch;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use std::collections::BTreeMap;

fn count_row(total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(total)))])
}

#[actix_rt::test]
async fn test_out_of_range_page_clamps_to_last_valid_page() {
    let search = ListingSearch {
        page: Some("9999".to_owned()),
        ..Default::default()
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(3)]])
        .append_query_results(vec![vec![
            listing_model(3, 1, "Third", "third"),
            listing_model(2, 1, "Second", "second"),
            listing_model(1, 1, "First", "first"),
        ]])
        .into_connection();

    let page = fetch_page(&db, search.to_select(), search.page(), 12)
        .await
        .unwrap();

    // A 3-item result set has one page; page 9999 lands on it.
    assert_eq!(page.page, 1);
    assert_eq!(page.page_count, 1);
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 3);
    assert!(!page.has_next);
    assert!(!page.has_prev);
}

#[actix_rt::test]
async fn test_middle_page_reports_neighbors() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(30)]])
        .append_query_results(vec![vec![
            listing_model(18, 1, "Eighteen", "eighteen"),
            listing_model(17, 1, "Seventeen", "seventeen"),
        ]])
        .into_connection();

    let search = ListingSearch {
        page: Some("2".to_owned()),
        ..Default::default()
    };
    let page = fetch_page(&db, search.to_select(), search.page(), 12)
        .await
        .unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.page_count, 3);
    assert!(page.has_next);
    assert!(page.has_prev);
}

#[actix_rt::test]
async fn test_page_query_uses_limit_and_offset() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(30)]])
        .append_query_results(vec![Vec::<homestead::orm::listings::Model>::new()])
        .into_connection();

    let search = ListingSearch {
        page: Some("3".to_owned()),
        ..Default::default()
    };
    fetch_page(&db, search.to_select(), search.page(), 12)
        .await
        .unwrap();

    let rendered = format!("{:?}", db.into_transaction_log());
    assert!(rendered.contains("LIMIT"), "{}", rendered);
    assert!(rendered.contains("OFFSET"), "{}", rendered);
}
