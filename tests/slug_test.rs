//! Slug assignment: probe walk over taken slugs until a free one is found.

mod common;

use common::*;
use homestead::slug::{find_unique_slug, slugify};
use sea_orm::{DatabaseBackend, MockDatabase};

#[actix_rt::test]
async fn test_first_title_takes_base_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // Probe for the base slug finds nothing.
        .append_query_results(vec![Vec::<homestead::orm::listings::Model>::new()])
        .into_connection();

    let slug = find_unique_slug(&db, "Cozy Downtown Loft").await.unwrap();
    assert_eq!(slug, "cozy-downtown-loft");
}

#[actix_rt::test]
async fn test_collisions_walk_numbered_suffixes() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![
            // "cozy-downtown-loft" is taken,
            vec![listing_model(1, 1, "Cozy Downtown Loft", "cozy-downtown-loft")],
            // "cozy-downtown-loft-1" is taken,
            vec![listing_model(
                2,
                1,
                "Cozy Downtown Loft",
                "cozy-downtown-loft-1",
            )],
            // "cozy-downtown-loft-2" is free.
            vec![],
        ])
        .into_connection();

    let slug = find_unique_slug(&db, "Cozy Downtown Loft").await.unwrap();
    assert_eq!(slug, "cozy-downtown-loft-2");
}

#[actix_rt::test]
async fn test_punctuation_only_title_gets_fallback_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<homestead::orm::listings::Model>::new()])
        .into_connection();

    let slug = find_unique_slug(&db, "!!!").await.unwrap();
    assert_eq!(slug, "listing");
}

#[test]
fn test_sequential_generation_yields_distinct_slugs() {
    // Titles with the same normalized base never share a slug: the probe
    // walk appends -1, -2, ... so each assignment is distinct.
    let base = slugify("Sea View! Penthouse");
    let taken: Vec<String> = (0..3)
        .map(|n| {
            if n == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, n)
            }
        })
        .collect();

    assert_eq!(
        taken,
        vec![
            "sea-view-penthouse",
            "sea-view-penthouse-1",
            "sea-view-penthouse-2"
        ]
    );
    let unique: std::collections::HashSet<&String> = taken.iter().collect();
    assert_eq!(unique.len(), taken.len());
}
