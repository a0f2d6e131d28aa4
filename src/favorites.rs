//! Favorite bookkeeping between users and listings.
//!
//! The relation is keyed on (user_id, listing_id); toggling is a
//! check-and-act whose race window is closed by treating the composite
//! primary key as the authority. A concurrent duplicate insert resolves to
//! "already favorited" instead of surfacing an error.

use crate::db::is_unique_violation;
use crate::orm::favorites;
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use std::collections::HashSet;

/// Flips favorite membership for a (user, listing) pair.
/// Returns the resulting favorite state: true if the pair now exists.
pub async fn toggle_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    listing_id: i32,
) -> Result<bool, DbErr> {
    let existing = favorites::Entity::find_by_id((user_id, listing_id))
        .one(db)
        .await?;

    if existing.is_some() {
        favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::ListingId.eq(listing_id))
            .exec(db)
            .await?;
        return Ok(false);
    }

    let record = favorites::ActiveModel {
        user_id: Set(user_id),
        listing_id: Set(listing_id),
        created_at: Set(Utc::now().naive_utc()),
    };

    match favorites::Entity::insert(record).exec(db).await {
        Ok(_) => Ok(true),
        // Lost a double-click race; the unique key says the favorite exists.
        Err(err) if is_unique_violation(&err) => Ok(true),
        Err(err) => Err(err),
    }
}

/// Whether a user has favorited a listing.
pub async fn is_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    listing_id: i32,
) -> Result<bool, DbErr> {
    Ok(favorites::Entity::find_by_id((user_id, listing_id))
        .one(db)
        .await?
        .is_some())
}

/// All listing ids a user has favorited, for decorating browse results.
pub async fn favorited_listing_ids(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<HashSet<i32>, DbErr> {
    Ok(favorites::Entity::find()
        .filter(favorites::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|f| f.listing_id)
        .collect())
}

/// The user's favorites, most recently added first, for the saved view.
pub fn saved_select(user_id: i32) -> Select<favorites::Entity> {
    favorites::Entity::find()
        .filter(favorites::Column::UserId.eq(user_id))
        .order_by_desc(favorites::Column::CreatedAt)
}
