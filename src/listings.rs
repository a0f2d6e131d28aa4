//! Listing creation and removal.
//!
//! Creation owns slug assignment: the slug is derived once, probed for
//! uniqueness, and never changes afterwards. Deletion is a transactional
//! cascade over images, inquiries and favorites so a half-removed listing is
//! never observable.

use crate::db::is_unique_violation;
use crate::orm::listings::{ListingType, PropertyCondition, PropertyType};
use crate::orm::{favorites, inquiries, listing_images, listings};
use crate::slug::find_unique_slug;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};

/// How many times creation re-derives a slug after losing an insert race.
const SLUG_INSERT_ATTEMPTS: u32 = 3;

/// Validated listing content, ready to persist.
#[derive(Debug, Clone)]
pub struct ListingData {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub location: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: f64,
    pub price: Decimal,
    pub is_furnished: bool,
    pub has_parking: bool,
    pub has_balcony: bool,
    pub has_garden: bool,
    pub has_pool: bool,
    pub has_gym: bool,
    pub condition: PropertyCondition,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

/// Inserts a new listing owned by `owner_id`, assigning a unique slug.
///
/// The probe-then-insert sequence can lose to a concurrent creation with the
/// same title; the unique index on `slug` rejects the duplicate and we
/// re-derive. Anything else propagates.
pub async fn create_listing(
    db: &DatabaseConnection,
    owner_id: i32,
    data: ListingData,
) -> Result<listings::Model, DbErr> {
    let mut last_err = None;

    for _ in 0..SLUG_INSERT_ATTEMPTS {
        let slug = find_unique_slug(db, &data.title).await?;
        let now = Utc::now().naive_utc();

        let record = listings::ActiveModel {
            user_id: Set(owner_id),
            title: Set(data.title.clone()),
            slug: Set(slug),
            description: Set(data.description.clone()),
            property_type: Set(data.property_type.clone()),
            listing_type: Set(data.listing_type.clone()),
            location: Set(data.location.clone()),
            city: Set(data.city.clone()),
            state: Set(data.state.clone()),
            postal_code: Set(data.postal_code.clone()),
            latitude: Set(data.latitude),
            longitude: Set(data.longitude),
            bedrooms: Set(data.bedrooms),
            bathrooms: Set(data.bathrooms),
            area: Set(data.area),
            price: Set(data.price),
            is_furnished: Set(data.is_furnished),
            has_parking: Set(data.has_parking),
            has_balcony: Set(data.has_balcony),
            has_garden: Set(data.has_garden),
            has_pool: Set(data.has_pool),
            has_gym: Set(data.has_gym),
            condition: Set(data.condition.clone()),
            is_active: Set(true),
            is_featured: Set(false),
            contact_name: Set(data.contact_name.clone()),
            contact_phone: Set(data.contact_phone.clone()),
            contact_email: Set(data.contact_email.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match record.insert(db).await {
            Ok(model) => return Ok(model),
            Err(err) if is_unique_violation(&err) => {
                log::warn!(
                    "Slug collision on listing insert for {:?}, retrying",
                    data.title
                );
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_err.unwrap_or_else(|| DbErr::Custom("Slug assignment did not converge.".to_owned())))
}

/// Finds an active listing by slug.
pub async fn find_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<listings::Model>, DbErr> {
    listings::Entity::find()
        .filter(listings::Column::Slug.eq(slug))
        .one(db)
        .await
}

/// Deletes every dependent row of a listing, then the listing itself.
/// Must run inside the caller's transaction.
pub async fn purge_listing<C: ConnectionTrait>(db: &C, listing_id: i32) -> Result<(), DbErr> {
    listing_images::Entity::delete_many()
        .filter(listing_images::Column::ListingId.eq(listing_id))
        .exec(db)
        .await?;

    inquiries::Entity::delete_many()
        .filter(inquiries::Column::ListingId.eq(listing_id))
        .exec(db)
        .await?;

    favorites::Entity::delete_many()
        .filter(favorites::Column::ListingId.eq(listing_id))
        .exec(db)
        .await?;

    listings::Entity::delete_many()
        .filter(listings::Column::Id.eq(listing_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Transactional cascade delete of a listing.
///
/// Returns the storage filenames of the listing's images so the caller can
/// remove the payloads once the rows are gone.
pub async fn delete_listing(
    db: &DatabaseConnection,
    listing_id: i32,
) -> Result<Vec<String>, DbErr> {
    let txn = db.begin().await?;

    let filenames: Vec<String> = listing_images::Entity::find()
        .filter(listing_images::Column::ListingId.eq(listing_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|img| img.filename)
        .collect();

    purge_listing(&txn, listing_id).await?;

    txn.commit().await?;
    Ok(filenames)
}

/// Active listings in the same city with the same property type, for the
/// detail sidebar. Excludes the listing itself.
pub async fn similar_listings(
    db: &DatabaseConnection,
    listing: &listings::Model,
    limit: u64,
) -> Result<Vec<listings::Model>, DbErr> {
    listings::Entity::find()
        .filter(listings::Column::IsActive.eq(true))
        .filter(listings::Column::City.eq(listing.city.as_str()))
        .filter(listings::Column::PropertyType.eq(listing.property_type.clone()))
        .filter(listings::Column::Id.ne(listing.id))
        .order_by_desc(listings::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
}
