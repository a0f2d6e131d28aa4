//! Image upload and primary-flag management.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{listing_images, listings};
use crate::storage::{get_storage, object_key};
use actix_multipart::Multipart;
use actix_web::{error, post, web, Error, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};

use super::listing::ImageForView;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(upload_images)
        .service(set_primary_image)
        .service(delete_image);
}

/// POST /listings/{slug}/images - owner-only multipart upload.
///
/// Accepts one or more `image` fields. The first image a listing ever gets
/// becomes its cover regardless of upload order within the request.
#[post("/listings/{slug}/images")]
pub async fn upload_images(
    client: ClientCtx,
    path: web::Path<String>,
    multipart: Option<Multipart>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;
    let db = get_db_pool();

    let listing = listings::Entity::find()
        .filter(listings::Column::Slug.eq(path.into_inner().as_str()))
        .filter(listings::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Listing not found."))?;

    let limits = crate::app_config::limits();
    let max_bytes = limits.max_upload_size_mb as usize * 1024 * 1024;

    let existing = listing_images::Entity::find()
        .filter(listing_images::Column::ListingId.eq(listing.id))
        .count(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let mut created: Vec<ImageForView> = Vec::new();

    if let Some(mut fields) = multipart {
        while let Ok(Some(mut field)) = fields.try_next().await {
            let field_name = match field.content_disposition().get_name() {
                Some(name) => name.to_owned(),
                None => continue,
            };

            match field_name.as_str() {
                "image" => {
                    let content_type = match field.content_type() {
                        Some(m) if m.type_() == mime::IMAGE => m.to_string(),
                        _ => {
                            return Err(error::ErrorBadRequest(
                                "Only image uploads are accepted.",
                            ))
                        }
                    };

                    if existing + created.len() as u64 >= limits.max_images_per_listing as u64 {
                        return Err(error::ErrorBadRequest(format!(
                            "A listing may have at most {} images.",
                            limits.max_images_per_listing
                        )));
                    }

                    // Stream multipart data into memory, bounded by the
                    // configured upload limit.
                    let mut buf: Vec<u8> = Vec::with_capacity(65536);
                    while let Some(chunk) = field.next().await {
                        let bytes = chunk.map_err(|e| {
                            log::error!("upload_images: multipart read error: {}", e);
                            error::ErrorBadRequest("Error interpreting upload.")
                        })?;
                        buf.extend(bytes.to_owned());

                        if buf.len() > max_bytes {
                            return Err(error::ErrorPayloadTooLarge(format!(
                                "Uploads are limited to {} MB.",
                                limits.max_upload_size_mb
                            )));
                        }
                    }

                    if buf.is_empty() {
                        return Err(error::ErrorBadRequest("Upload is empty or improper."));
                    }

                    let filename = object_key(&buf, &content_type);
                    let file_size = buf.len() as i64;

                    // Keys are content hashes; a payload seen before is
                    // already durable and does not need a second write.
                    let already_stored = get_storage().exists(&filename).await.unwrap_or(false);
                    if !already_stored {
                        get_storage()
                            .put_object(buf, &filename)
                            .await
                            .map_err(error::ErrorInternalServerError)?;
                    }

                    let txn = db.begin().await.map_err(error::ErrorInternalServerError)?;
                    let image = crate::images::attach_image(
                        &txn,
                        listing.id,
                        &filename,
                        &content_type,
                        file_size,
                        false,
                    )
                    .await
                    .map_err(error::ErrorInternalServerError)?;
                    txn.commit().await.map_err(error::ErrorInternalServerError)?;

                    created.push(ImageForView::from(image));
                }
                _ => {
                    return Err(error::ErrorBadRequest(format!(
                        "Unrecognized field '{}'",
                        field_name,
                    )));
                }
            }
        }
    }

    if created.is_empty() {
        return Err(error::ErrorBadRequest("No images were provided."));
    }

    Ok(HttpResponse::Created().json(created))
}

/// Owner-scoped image lookup. Misses and other people's images are both a
/// 404.
async fn find_owned_image(
    db: &DatabaseConnection,
    image_id: i32,
    owner_id: i32,
) -> Result<(listing_images::Model, listings::Model), Error> {
    let image = listing_images::Entity::find_by_id(image_id)
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Image not found."))?;

    let listing = listings::Entity::find_by_id(image.listing_id)
        .filter(listings::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Image not found."))?;

    Ok((image, listing))
}

/// POST /images/{image_id}/primary - make an image its listing's cover.
#[post("/images/{image_id}/primary")]
pub async fn set_primary_image(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;
    let db = get_db_pool();

    let (image, listing) = find_owned_image(db, path.into_inner(), owner_id).await?;

    crate::images::set_primary_image(db, listing.id, image.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "primary",
        "image_id": image.id,
    })))
}

/// POST /images/{image_id}/delete - remove an image.
#[post("/images/{image_id}/delete")]
pub async fn delete_image(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let owner_id = client.require_login()?;
    let db = get_db_pool();

    let (image, _listing) = find_owned_image(db, path.into_inner(), owner_id).await?;

    let filename = crate::images::delete_image(db, &image)
        .await
        .map_err(error::ErrorInternalServerError)?;

    remove_orphaned_payload(db, &filename).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}

/// Drops a stored payload once no image row references it any more.
/// Keys are content-addressed, so distinct rows can share one payload.
/// Best-effort: row state is already committed, failures are only logged.
pub(super) async fn remove_orphaned_payload(db: &DatabaseConnection, filename: &str) {
    let still_referenced = listing_images::Entity::find()
        .filter(listing_images::Column::Filename.eq(filename))
        .count(db)
        .await;

    match still_referenced {
        Ok(0) => {
            if let Err(err) = get_storage().delete_object(filename).await {
                log::warn!("Failed to remove stored payload {}: {}", filename, err);
            }
        }
        Ok(_) => {}
        Err(err) => {
            log::warn!(
                "Unable to check payload references for {}: {}",
                filename,
                err
            );
        }
    }
}
