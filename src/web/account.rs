//! Profile view and edit for the current user.

use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::users;
use actix_web::{error, get, post, web, Error, HttpResponse};
use sea_orm::{entity::*, query::*};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(update_profile).service(view_account);
}

/// GET /account - the current user's profile.
#[get("/account")]
pub async fn view_account(client: ClientCtx) -> Result<HttpResponse, Error> {
    client.require_login()?;

    let profile = client
        .get_user()
        .ok_or_else(|| error::ErrorUnauthorized("Login required"))?;

    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 30, message = "First name is too long."))]
    pub first_name: Option<String>,
    #[validate(length(max = 30, message = "Last name is too long."))]
    pub last_name: Option<String>,
    #[validate(email(message = "Email must be a valid address."))]
    pub email: Option<String>,
}

/// POST /account/profile - update name and email.
#[post("/account/profile")]
pub async fn update_profile(
    client: ClientCtx,
    form: web::Json<ProfileForm>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;

    if let Err(errors) = form.validate() {
        return Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({ "errors": errors })));
    }

    let db = get_db_pool();
    let form = form.into_inner();

    let updated = users::ActiveModel {
        id: Set(user_id),
        first_name: Set(form.first_name.filter(|s| !s.is_empty())),
        last_name: Set(form.last_name.filter(|s| !s.is_empty())),
        email: Set(form.email.filter(|s| !s.is_empty())),
        ..Default::default()
    }
    .update(db)
    .await
    .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(crate::user::Profile::from(updated)))
}
