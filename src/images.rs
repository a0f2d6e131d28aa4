//! Listing image rows and the single-primary invariant.
//!
//! Invariant: a listing with at least one image has exactly one image with
//! `is_primary = true`. Every path that touches the flag goes through this
//! module. Promotions run clear-then-set inside one transaction so readers
//! never observe zero or two primaries.

use crate::orm::listing_images;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};

/// Clears the primary flag on every image of a listing.
pub async fn clear_primary<C: ConnectionTrait>(db: &C, listing_id: i32) -> Result<(), DbErr> {
    listing_images::Entity::update_many()
        .col_expr(listing_images::Column::IsPrimary, Expr::value(false))
        .filter(listing_images::Column::ListingId.eq(listing_id))
        .filter(listing_images::Column::IsPrimary.eq(true))
        .exec(db)
        .await?;
    Ok(())
}

/// Marks a single image primary. Callers must have cleared siblings first.
pub async fn mark_primary<C: ConnectionTrait>(db: &C, image_id: i32) -> Result<(), DbErr> {
    listing_images::Entity::update_many()
        .col_expr(listing_images::Column::IsPrimary, Expr::value(true))
        .filter(listing_images::Column::Id.eq(image_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Inserts an image row for a stored payload.
///
/// The first image of a listing is forced primary regardless of the caller's
/// flag, so any listing with images always has a cover. When a later image
/// is uploaded as primary, siblings are cleared before the insert.
pub async fn attach_image<C: ConnectionTrait>(
    db: &C,
    listing_id: i32,
    filename: &str,
    content_type: &str,
    file_size: i64,
    want_primary: bool,
) -> Result<listing_images::Model, DbErr> {
    let has_images = !listing_images::Entity::find()
        .filter(listing_images::Column::ListingId.eq(listing_id))
        .limit(1)
        .all(db)
        .await?
        .is_empty();

    let is_primary = !has_images || want_primary;
    if want_primary && has_images {
        clear_primary(db, listing_id).await?;
    }

    let now = Utc::now().naive_utc();
    let record = listing_images::ActiveModel {
        listing_id: Set(listing_id),
        filename: Set(filename.to_owned()),
        content_type: Set(content_type.to_owned()),
        file_size: Set(file_size),
        is_primary: Set(is_primary),
        created_at: Set(now),
        ..Default::default()
    };
    let res = listing_images::Entity::insert(record).exec(db).await?;

    Ok(listing_images::Model {
        id: res.last_insert_id,
        listing_id,
        filename: filename.to_owned(),
        content_type: content_type.to_owned(),
        file_size,
        is_primary,
        created_at: now,
    })
}

/// Makes `image_id` the one primary image of its listing.
/// Clear and set are applied as a single transaction.
pub async fn set_primary_image(
    db: &DatabaseConnection,
    listing_id: i32,
    image_id: i32,
) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    clear_primary(&txn, listing_id).await?;
    mark_primary(&txn, image_id).await?;
    txn.commit().await
}

/// Removes an image row. When the primary image goes away and siblings
/// remain, the oldest sibling is promoted so the invariant holds.
/// Returns the storage filename so the caller can drop the payload.
pub async fn delete_image(
    db: &DatabaseConnection,
    image: &listing_images::Model,
) -> Result<String, DbErr> {
    let txn = db.begin().await?;

    listing_images::Entity::delete_many()
        .filter(listing_images::Column::Id.eq(image.id))
        .exec(&txn)
        .await?;

    if image.is_primary {
        let successor = listing_images::Entity::find()
            .filter(listing_images::Column::ListingId.eq(image.listing_id))
            .filter(listing_images::Column::Id.ne(image.id))
            .order_by_asc(listing_images::Column::CreatedAt)
            .one(&txn)
            .await?;

        if let Some(successor) = successor {
            mark_primary(&txn, successor.id).await?;
        }
    }

    txn.commit().await?;
    Ok(image.filename.clone())
}

/// Images of a listing, cover first, then upload order.
pub async fn images_for_listing(
    db: &DatabaseConnection,
    listing_id: i32,
) -> Result<Vec<listing_images::Model>, DbErr> {
    listing_images::Entity::find()
        .filter(listing_images::Column::ListingId.eq(listing_id))
        .order_by_desc(listing_images::Column::IsPrimary)
        .order_by_asc(listing_images::Column::CreatedAt)
        .all(db)
        .await
}
