//! Listing browse, detail and owner CRUD.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::listings::{ListingType, PropertyCondition, PropertyType};
use crate::orm::{inquiries, listing_images, listings};
use crate::pagination::fetch_page;
use crate::search::ListingSearch;
use actix_web::{error, get, post, web, Error, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(browse_listings)
        .service(create_listing)
        .service(update_listing)
        .service(delete_listing)
        .service(view_listing);
}

/// A listing plus the decoration browse views need.
#[derive(Debug, Serialize)]
pub struct ListingSummary {
    #[serde(flatten)]
    pub listing: listings::Model,
    pub cover_url: Option<String>,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct ImageForView {
    pub id: i32,
    pub url: String,
    pub is_primary: bool,
}

impl From<listing_images::Model> for ImageForView {
    fn from(image: listing_images::Model) -> Self {
        Self {
            id: image.id,
            url: crate::storage::get_storage().public_url(&image.filename),
            is_primary: image.is_primary,
        }
    }
}

/// Primary-image URLs for a batch of listings (for grid views).
pub async fn cover_urls_for(
    db: &DatabaseConnection,
    listing_ids: &[i32],
) -> Result<HashMap<i32, String>, DbErr> {
    if listing_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let covers = listing_images::Entity::find()
        .filter(listing_images::Column::ListingId.is_in(listing_ids.to_vec()))
        .filter(listing_images::Column::IsPrimary.eq(true))
        .all(db)
        .await?;

    Ok(covers
        .into_iter()
        .map(|img| {
            (
                img.listing_id,
                crate::storage::get_storage().public_url(&img.filename),
            )
        })
        .collect())
}

/// Builds summaries for a batch of listings, including the viewer's
/// favorite flags.
pub async fn summarize_listings(
    db: &DatabaseConnection,
    items: Vec<listings::Model>,
    viewer_id: Option<i32>,
) -> Result<Vec<ListingSummary>, DbErr> {
    let favorites = match viewer_id {
        Some(user_id) => crate::favorites::favorited_listing_ids(db, user_id).await?,
        None => HashSet::new(),
    };

    let ids: Vec<i32> = items.iter().map(|l| l.id).collect();
    let covers = cover_urls_for(db, &ids).await?;

    Ok(items
        .into_iter()
        .map(|listing| ListingSummary {
            is_favorite: favorites.contains(&listing.id),
            cover_url: covers.get(&listing.id).cloned(),
            listing,
        })
        .collect())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListingForm {
    #[validate(length(min = 1, max = 200, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    #[validate(length(min = 1, max = 255, message = "Location is required."))]
    pub location: String,
    #[validate(length(min = 1, max = 100, message = "City is required."))]
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 0, message = "Bedrooms cannot be negative."))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "Bathrooms cannot be negative."))]
    pub bathrooms: Option<i32>,
    pub area: f64,
    pub price: Decimal,
    #[serde(default)]
    pub is_furnished: bool,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub has_balcony: bool,
    #[serde(default)]
    pub has_garden: bool,
    #[serde(default)]
    pub has_pool: bool,
    #[serde(default)]
    pub has_gym: bool,
    pub condition: Option<PropertyCondition>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email(message = "Contact email must be a valid address."))]
    pub contact_email: Option<String>,
}

/// Runs the derived validators plus the strict-positive checks the derive
/// attributes cannot express, collecting everything into one per-field map.
fn validate_listing_form(form: &ListingForm) -> Result<(), serde_json::Value> {
    let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();

    if let Err(errors) = form.validate() {
        for (field, errs) in errors.field_errors() {
            let messages = field_errors.entry(field.to_string()).or_default();
            for err in errs {
                messages.push(
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                );
            }
        }
    }

    if form.title.trim().is_empty() {
        field_errors
            .entry("title".to_string())
            .or_default()
            .push("Title is required.".to_string());
    }

    if form.area <= 0.0 {
        field_errors
            .entry("area".to_string())
            .or_default()
            .push("Area must be greater than 0.".to_string());
    }

    if form.price <= Decimal::ZERO {
        field_errors
            .entry("price".to_string())
            .or_default()
            .push("Price must be greater than 0.".to_string());
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(serde_json::json!(field_errors))
    }
}

impl ListingForm {
    fn into_data(self) -> crate::listings::ListingData {
        crate::listings::ListingData {
            title: self.title.trim().to_owned(),
            description: self.description,
            property_type: self.property_type,
            listing_type: self.listing_type,
            location: self.location,
            city: self.city,
            state: self.state.filter(|s| !s.is_empty()),
            postal_code: self.postal_code.filter(|s| !s.is_empty()),
            latitude: self.latitude,
            longitude: self.longitude,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            price: self.price,
            is_furnished: self.is_furnished,
            has_parking: self.has_parking,
            has_balcony: self.has_balcony,
            has_garden: self.has_garden,
            has_pool: self.has_pool,
            has_gym: self.has_gym,
            condition: self.condition.unwrap_or_default(),
            contact_name: self.contact_name.filter(|s| !s.is_empty()),
            contact_phone: self.contact_phone.filter(|s| !s.is_empty()),
            contact_email: self.contact_email.filter(|s| !s.is_empty()),
        }
    }
}

/// GET /listings - filtered, paginated browse of active listings.
#[get("/listings")]
pub async fn browse_listings(
    client: ClientCtx,
    query: web::Query<ListingSearch>,
) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let per_page = crate::app_config::limits().listings_per_page as u64;

    let raw = fetch_page(db, query.to_select(), query.page(), per_page)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let summaries = summarize_listings(db, raw.items, client.get_id())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(crate::pagination::Page {
        items: summaries,
        total: raw.total,
        page: raw.page,
        page_count: raw.page_count,
        per_page: raw.per_page,
        has_next: raw.has_next,
        has_prev: raw.has_prev,
    }))
}

/// GET /listings/{slug} - full listing detail.
#[get("/listings/{slug}")]
pub async fn view_listing(client: ClientCtx, path: web::Path<String>) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let slug = path.into_inner();

    let listing = crate::listings::find_by_slug(db, &slug)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Listing not found."))?;

    let images: Vec<ImageForView> = crate::images::images_for_listing(db, listing.id)
        .await
        .map_err(error::ErrorInternalServerError)?
        .into_iter()
        .map(ImageForView::from)
        .collect();

    let is_favorite = match client.get_id() {
        Some(user_id) => crate::favorites::is_favorite(db, user_id, listing.id)
            .await
            .map_err(error::ErrorInternalServerError)?,
        None => false,
    };

    let similar = crate::listings::similar_listings(db, &listing, 4)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let pending_inquiries = inquiries::Entity::find()
        .filter(inquiries::Column::ListingId.eq(listing.id))
        .filter(inquiries::Column::Status.eq(inquiries::InquiryStatus::Pending))
        .count(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "listing": listing,
        "images": images,
        "is_favorite": is_favorite,
        "similar": similar,
        "pending_inquiries": pending_inquiries,
    })))
}

/// POST /listings - create a listing owned by the current user.
#[post("/listings")]
pub async fn create_listing(
    client: ClientCtx,
    form: web::Json<ListingForm>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;

    if let Err(errors) = validate_listing_form(&form) {
        return Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({ "errors": errors })));
    }

    let db = get_db_pool();
    let listing = crate::listings::create_listing(db, owner_id, form.into_inner().into_data())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Created().json(listing))
}

/// Owner-scoped lookup. A miss and someone else's listing are both a 404 so
/// slugs cannot be probed for existence.
async fn find_owned_listing(
    db: &DatabaseConnection,
    slug: &str,
    owner_id: i32,
) -> Result<listings::Model, Error> {
    listings::Entity::find()
        .filter(listings::Column::Slug.eq(slug))
        .filter(listings::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Listing not found."))
}

/// POST /listings/{slug}/update - owner-only edit. The slug never changes.
#[post("/listings/{slug}/update")]
pub async fn update_listing(
    client: ClientCtx,
    path: web::Path<String>,
    form: web::Json<ListingForm>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;

    if let Err(errors) = validate_listing_form(&form) {
        return Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({ "errors": errors })));
    }

    let db = get_db_pool();
    let listing = find_owned_listing(db, &path.into_inner(), owner_id).await?;
    let data = form.into_inner().into_data();

    let updated = listings::ActiveModel {
        id: Set(listing.id),
        title: Set(data.title),
        description: Set(data.description),
        property_type: Set(data.property_type),
        listing_type: Set(data.listing_type),
        location: Set(data.location),
        city: Set(data.city),
        state: Set(data.state),
        postal_code: Set(data.postal_code),
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
        condition: Set(data.condition),
        contact_name: Set(data.contact_name),
        contact_phone: Set(data.contact_phone),
        contact_email: Set(data.contact_email),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .update(db)
    .await
    .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// POST /listings/{slug}/delete - owner-only cascade delete.
#[post("/listings/{slug}/delete")]
pub async fn delete_listing(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;

    let db = get_db_pool();
    let listing = find_owned_listing(db, &path.into_inner(), owner_id).await?;

    let filenames = crate::listings::delete_listing(db, listing.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    // Rows are gone; payload removal is best-effort cleanup.
    for filename in filenames {
        super::image::remove_orphaned_payload(db, &filename).await;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}
