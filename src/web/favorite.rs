//! Favorite toggling and the saved-listings view.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::listings;
use crate::pagination::fetch_page;
use actix_web::{error, get, post, web, Error, HttpResponse};
use sea_orm::{entity::*, query::*};
use serde::Deserialize;
use std::collections::HashMap;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(toggle_favorite).service(saved_listings);
}

/// POST /listings/{slug}/favorite - flip favorite membership.
#[post("/listings/{slug}/favorite")]
pub async fn toggle_favorite(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let db = get_db_pool();

    let listing = crate::listings::find_by_slug(db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Listing not found."))?;

    let is_favorite = crate::favorites::toggle_favorite(db, user_id, listing.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": if is_favorite { "added" } else { "removed" },
        "is_favorite": is_favorite,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// GET /favorites - the user's saved listings, newest favorite first.
#[get("/favorites")]
pub async fn saved_listings(
    client: ClientCtx,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let db = get_db_pool();

    let per_page = crate::app_config::limits().listings_per_page as u64;
    let requested = crate::pagination::parse_page_param(query.page.as_deref());

    let raw = fetch_page(
        db,
        crate::favorites::saved_select(user_id),
        requested,
        per_page,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    // Page items are favorite rows; resolve them to listings, keeping the
    // favorited-at ordering.
    let listing_ids: Vec<i32> = raw.items.iter().map(|f| f.listing_id).collect();
    let mut by_id: HashMap<i32, listings::Model> = if listing_ids.is_empty() {
        HashMap::new()
    } else {
        listings::Entity::find()
            .filter(listings::Column::Id.is_in(listing_ids.clone()))
            .all(db)
            .await
            .map_err(error::ErrorInternalServerError)?
            .into_iter()
            .map(|l| (l.id, l))
            .collect()
    };

    let ordered: Vec<listings::Model> = listing_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    let items = super::listing::summarize_listings(db, ordered, Some(user_id))
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(crate::pagination::Page {
        items,
        total: raw.total,
        page: raw.page,
        page_count: raw.page_count,
        per_page: raw.per_page,
        has_next: raw.has_next,
        has_prev: raw.has_prev,
    }))
}
