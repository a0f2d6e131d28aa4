//! Listing deletion cascades over images, inquiries and favorites.

mod common;

use common::*;
use homestead::listings::{delete_listing, purge_listing};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

fn exec_ok(rows: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: rows,
    }
}

#[actix_rt::test]
async fn test_purge_removes_every_dependent_table() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![exec_ok(3), exec_ok(2), exec_ok(5), exec_ok(1)])
        .into_connection();

    purge_listing(&db, 42).await.unwrap();

    let rendered = format!("{:?}", db.into_transaction_log());
    for table in ["listing_images", "inquiries", "favorites", "listings"] {
        assert!(
            rendered.contains(&format!(r#"DELETE FROM "{}""#, table)),
            "missing cascade for {}: {}",
            table,
            rendered
        );
    }

    // Dependents go first; the listing row itself is deleted last.
    let listing_delete = rendered.rfind(r#"DELETE FROM "listings""#).unwrap();
    for table in ["listing_images", "inquiries", "favorites"] {
        let dependent_delete = rendered
            .find(&format!(r#"DELETE FROM "{}""#, table))
            .unwrap();
        assert!(dependent_delete < listing_delete, "{}", rendered);
    }
}

#[actix_rt::test]
async fn test_delete_listing_reports_stored_filenames() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            image_model(1, 42, true, 0),
            image_model(2, 42, false, 1),
        ]])
        .append_exec_results(vec![exec_ok(2), exec_ok(0), exec_ok(1), exec_ok(1)])
        .into_connection();

    let filenames = delete_listing(&db, 42).await.unwrap();

    assert_eq!(filenames, vec!["deadbeef01.jpg", "deadbeef02.jpg"]);
}

#[actix_rt::test]
async fn test_delete_listing_with_no_dependents_still_succeeds() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<homestead::orm::listing_images::Model>::new()])
        .append_exec_results(vec![exec_ok(0), exec_ok(0), exec_ok(0), exec_ok(1)])
        .into_connection();

    let filenames = delete_listing(&db, 7).await.unwrap();
    assert!(filenames.is_empty());
}
