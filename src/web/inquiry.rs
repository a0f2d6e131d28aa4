//! Inquiry submission, inboxes and status management.

use crate::db::get_db_pool;
use crate::inquiries::{InquiryData, InquiryUpsert};
use crate::middleware::ClientCtx;
use crate::orm::inquiries::{self, InquiryStatus, InquiryType};
use crate::orm::listings;
use crate::pagination::fetch_page;
use actix_web::{error, get, post, web, Error, HttpResponse};
use sea_orm::{entity::*, query::*, ActiveEnum, DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(contact_listing)
        .service(received_inquiries)
        .service(sent_inquiries)
        .service(update_inquiry_status)
        .service(view_inquiry);
}

#[derive(Debug, Deserialize, Validate)]
pub struct InquiryForm {
    #[validate(length(min = 1, max = 100, message = "Name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required."))]
    #[validate(email(message = "Email must be a valid address."))]
    pub email: String,
    #[validate(length(min = 1, max = 20, message = "Phone is required."))]
    pub phone: String,
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
    pub inquiry_type: Option<InquiryType>,
}

/// POST /listings/{slug}/contact - create or update the sender's inquiry.
#[post("/listings/{slug}/contact")]
pub async fn contact_listing(
    client: ClientCtx,
    path: web::Path<String>,
    form: web::Json<InquiryForm>,
) -> Result<HttpResponse, Error> {
    let sender_id = client.require_login()?;

    if let Err(errors) = form.validate() {
        return Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({ "errors": errors })));
    }

    let db = get_db_pool();
    let listing = crate::listings::find_by_slug(db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Listing not found."))?;

    let form = form.into_inner();
    let data = InquiryData {
        name: form.name.trim().to_owned(),
        email: form.email.trim().to_owned(),
        phone: form.phone.trim().to_owned(),
        message: form.message,
        inquiry_type: form.inquiry_type.unwrap_or_default(),
    };

    let outcome = crate::inquiries::upsert_inquiry(db, listing.id, sender_id, &data)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let created = matches!(outcome, InquiryUpsert::Created(_));
    let body = serde_json::json!({
        "inquiry_id": outcome.inquiry_id(),
        "created": created,
    });

    if created {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

/// An inquiry plus the listing it concerns, for inbox views.
#[derive(Debug, Serialize)]
pub struct InquiryForView {
    #[serde(flatten)]
    pub inquiry: inquiries::Model,
    pub listing_title: Option<String>,
    pub listing_slug: Option<String>,
}

/// Decorates inquiries with the title and slug of their listings.
pub async fn with_listing_refs(
    db: &DatabaseConnection,
    items: Vec<inquiries::Model>,
) -> Result<Vec<InquiryForView>, DbErr> {
    let listing_ids: Vec<i32> = items.iter().map(|i| i.listing_id).collect();

    let refs: HashMap<i32, (String, String)> = if listing_ids.is_empty() {
        HashMap::new()
    } else {
        listings::Entity::find()
            .filter(listings::Column::Id.is_in(listing_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|l| (l.id, (l.title, l.slug)))
            .collect()
    };

    Ok(items
        .into_iter()
        .map(|inquiry| {
            let listing_ref = refs.get(&inquiry.listing_id);
            InquiryForView {
                listing_title: listing_ref.map(|(title, _)| title.clone()),
                listing_slug: listing_ref.map(|(_, slug)| slug.clone()),
                inquiry,
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// GET /inquiries/received - inbox across all of the owner's listings.
#[get("/inquiries/received")]
pub async fn received_inquiries(
    client: ClientCtx,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;
    let db = get_db_pool();

    let listing_ids: Vec<i32> = listings::Entity::find()
        .filter(listings::Column::UserId.eq(owner_id))
        .all(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .into_iter()
        .map(|l| l.id)
        .collect();

    let per_page = crate::app_config::limits().inquiries_per_page as u64;
    let requested = crate::pagination::parse_page_param(query.page.as_deref());

    let raw = fetch_page(
        db,
        crate::inquiries::received_select(listing_ids),
        requested,
        per_page,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    let items = with_listing_refs(db, raw.items)
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

/// GET /inquiries/sent - everything the current user has sent.
#[get("/inquiries/sent")]
pub async fn sent_inquiries(
    client: ClientCtx,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let sender_id = client.require_login()?;
    let db = get_db_pool();

    let per_page = crate::app_config::limits().inquiries_per_page as u64;
    let requested = crate::pagination::parse_page_param(query.page.as_deref());

    let raw = fetch_page(
        db,
        crate::inquiries::sent_select(sender_id),
        requested,
        per_page,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    let items = with_listing_refs(db, raw.items)
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

/// GET /inquiries/{inquiry_id} - a single received inquiry, owner-only.
#[get("/inquiries/{inquiry_id}")]
pub async fn view_inquiry(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;
    let db = get_db_pool();

    let inquiry = inquiries::Entity::find_by_id(path.into_inner())
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Inquiry not found."))?;

    listings::Entity::find_by_id(inquiry.listing_id)
        .filter(listings::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Inquiry not found."))?;

    let mut decorated = with_listing_refs(db, vec![inquiry])
        .await
        .map_err(error::ErrorInternalServerError)?;

    match decorated.pop() {
        Some(inquiry) => Ok(HttpResponse::Ok().json(inquiry)),
        None => Err(error::ErrorNotFound("Inquiry not found.")),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// POST /inquiries/{inquiry_id}/status - owner-only status transition.
///
/// Pending inquiries may move to responded, completed or rejected; those
/// states are terminal. Anything else is rejected without touching the row.
#[post("/inquiries/{inquiry_id}/status")]
pub async fn update_inquiry_status(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<StatusForm>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;
    let db = get_db_pool();

    let target = InquiryStatus::try_from_value(&form.status)
        .map_err(|_| error::ErrorBadRequest("Invalid status value."))?;

    let inquiry = inquiries::Entity::find_by_id(path.into_inner())
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Inquiry not found."))?;

    // Only the listing owner manages its inquiries; everyone else sees 404.
    listings::Entity::find_by_id(inquiry.listing_id)
        .filter(listings::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Inquiry not found."))?;

    let applied = crate::inquiries::transition_status(db, &inquiry, target.clone())
        .await
        .map_err(error::ErrorInternalServerError)?;

    if !applied {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "error": format!(
                "Cannot transition inquiry from {} to {}.",
                inquiry.status.to_value(),
                target.to_value(),
            ),
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "inquiry_id": inquiry.id,
        "status": target,
    })))
}
