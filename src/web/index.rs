//! Home payload: featured and latest active listings.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::listings;
use actix_web::{error, get, Error, HttpResponse};
use sea_orm::{entity::*, query::*};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_home);
}

const FEATURED_COUNT: u64 = 6;
const LATEST_COUNT: u64 = 12;

#[get("/")]
pub async fn view_home(client: ClientCtx) -> Result<HttpResponse, Error> {
    let db = get_db_pool();

    let featured = listings::Entity::find()
        .filter(listings::Column::IsActive.eq(true))
        .filter(listings::Column::IsFeatured.eq(true))
        .order_by_desc(listings::Column::CreatedAt)
        .limit(FEATURED_COUNT)
        .all(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let latest = listings::Entity::find()
        .filter(listings::Column::IsActive.eq(true))
        .order_by_desc(listings::Column::CreatedAt)
        .limit(LATEST_COUNT)
        .all(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let viewer = client.get_id();
    let featured = super::listing::summarize_listings(db, featured, viewer)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let latest = super::listing::summarize_listings(db, latest, viewer)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "featured": featured,
        "latest": latest,
    })))
}
