//! Primary-image invariant: every listing with images has exactly one cover.

mod common;

use common::*;
use homestead::images::{attach_image, delete_image, set_primary_image};
use homestead::orm::listing_images;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

#[actix_rt::test]
async fn test_first_image_is_forced_primary() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![
            // The listing has no images yet.
            Vec::<listing_images::Model>::new(),
            // INSERT .. RETURNING id.
            vec![image_model(1, 42, true, 0)],
        ])
        .into_connection();

    // Caller did not ask for primary; the first image gets it anyway.
    let image = attach_image(&db, 42, "deadbeef01.jpg", "image/jpeg", 1024, false)
        .await
        .unwrap();

    assert!(image.is_primary);
}

#[actix_rt::test]
async fn test_later_image_defaults_to_secondary() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![
            // One image already exists.
            vec![image_model(1, 42, true, 0)],
            vec![image_model(2, 42, false, 1)],
        ])
        .into_connection();

    let image = attach_image(&db, 42, "deadbeef02.jpg", "image/jpeg", 2048, false)
        .await
        .unwrap();

    assert!(!image.is_primary);
}

#[actix_rt::test]
async fn test_attach_as_primary_clears_siblings_first() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![
            vec![image_model(1, 42, true, 0)],
            vec![image_model(2, 42, true, 1)],
        ])
        .append_exec_results(vec![exec_ok()])
        .into_connection();

    let image = attach_image(&db, 42, "deadbeef02.jpg", "image/jpeg", 2048, true)
        .await
        .unwrap();
    assert!(image.is_primary);

    let log = format!("{:?}", db.into_transaction_log());
    let clear_at = log
        .find(r#"UPDATE "listing_images""#)
        .expect("siblings must be cleared");
    let insert_at = log
        .find(r#"INSERT INTO "listing_images""#)
        .expect("row must be inserted");
    // Clear-then-set: the sibling update runs before the new primary lands.
    assert!(clear_at < insert_at, "{}", log);
}

#[actix_rt::test]
async fn test_set_primary_runs_clear_then_set_in_one_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![exec_ok(), exec_ok()])
        .into_connection();

    set_primary_image(&db, 42, 2).await.unwrap();

    let log = db.into_transaction_log();
    let rendered = format!("{:?}", log);

    // Both updates happen, clear before set, inside one transaction.
    let clear_at = rendered
        .find("FALSE")
        .or_else(|| rendered.find("false"))
        .expect("clear statement present");
    let set_at = rendered
        .rfind("TRUE")
        .or_else(|| rendered.rfind("true"))
        .expect("set statement present");
    assert!(clear_at < set_at, "{}", rendered);
}

#[actix_rt::test]
async fn test_deleting_primary_promotes_oldest_sibling() {
    let primary = image_model(1, 42, true, 0);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![
            // The oldest surviving sibling.
            vec![image_model(2, 42, false, 1)],
        ])
        .append_exec_results(vec![
            // DELETE of the primary row.
            exec_ok(),
            // Promotion of the sibling.
            exec_ok(),
        ])
        .into_connection();

    let filename = delete_image(&db, &primary).await.unwrap();
    assert_eq!(filename, "deadbeef01.jpg");

    let rendered = format!("{:?}", db.into_transaction_log());
    assert!(rendered.contains(r#"DELETE FROM "listing_images""#), "{}", rendered);
    // The sibling is promoted so the listing still has exactly one cover.
    assert!(rendered.contains(r#"UPDATE "listing_images""#), "{}", rendered);
}

#[actix_rt::test]
async fn test_deleting_secondary_touches_nothing_else() {
    let secondary = image_model(3, 42, false, 2);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![exec_ok()])
        .into_connection();

    delete_image(&db, &secondary).await.unwrap();

    let rendered = format!("{:?}", db.into_transaction_log());
    assert!(rendered.contains(r#"DELETE FROM "listing_images""#), "{}", rendered);
    assert!(!rendered.contains(r#"UPDATE "listing_images""#), "{}", rendered);
}
