//! Owner dashboard: listing and inquiry stats plus recent activity.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{inquiries, listings};
use actix_web::{error, get, Error, HttpResponse};
use sea_orm::{entity::*, query::*};
use serde::Serialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_dashboard);
}

const RECENT_INQUIRY_COUNT: u64 = 10;

#[derive(Debug, Serialize)]
struct DashboardStats {
    total_listings: u64,
    active_listings: u64,
    total_inquiries: u64,
    pending_inquiries: u64,
}

/// GET /dashboard - the current user's listings and inquiry overview.
#[get("/dashboard")]
pub async fn view_dashboard(client: ClientCtx) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;
    let db = get_db_pool();

    let owned = listings::Entity::find()
        .filter(listings::Column::UserId.eq(owner_id))
        .order_by_desc(listings::Column::CreatedAt)
        .all(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let total_listings = owned.len() as u64;
    let active_listings = owned.iter().filter(|l| l.is_active).count() as u64;
    let listing_ids: Vec<i32> = owned.iter().map(|l| l.id).collect();

    let (total_inquiries, pending_inquiries, recent) = if listing_ids.is_empty() {
        (0, 0, Vec::new())
    } else {
        let total = inquiries::Entity::find()
            .filter(inquiries::Column::ListingId.is_in(listing_ids.clone()))
            .count(db)
            .await
            .map_err(error::ErrorInternalServerError)?;

        let pending = inquiries::Entity::find()
            .filter(inquiries::Column::ListingId.is_in(listing_ids.clone()))
            .filter(inquiries::Column::Status.eq(inquiries::InquiryStatus::Pending))
            .count(db)
            .await
            .map_err(error::ErrorInternalServerError)?;

        let recent = inquiries::Entity::find()
            .filter(inquiries::Column::ListingId.is_in(listing_ids))
            .order_by_desc(inquiries::Column::CreatedAt)
            .limit(RECENT_INQUIRY_COUNT)
            .all(db)
            .await
            .map_err(error::ErrorInternalServerError)?;

        (total, pending, recent)
    };

    let recent = super::inquiry::with_listing_refs(db, recent)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let stats = DashboardStats {
        total_listings,
        active_listings,
        total_inquiries,
        pending_inquiries,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "stats": stats,
        "listings": owned,
        "recent_inquiries": recent,
    })))
}
