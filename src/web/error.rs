//! JSON bodies for error responses produced outside handlers.
//!
//! Wired into the `ErrorHandlers` middleware in `main` so malformed
//! requests and panicked handlers still answer with the API's error shape.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::HttpResponse;

fn render_json_error<B>(
    res: ServiceResponse<B>,
    status: StatusCode,
    message: &str,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let (req, _) = res.into_parts();

    let response = HttpResponse::build(status).json(serde_json::json!({
        "error": message,
        "status": status.as_u16(),
    }));

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response)
            .map_into_boxed_body()
            .map_into_right_body(),
    ))
}

pub fn render_400<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    render_json_error(res, StatusCode::BAD_REQUEST, "Bad request")
}

pub fn render_404<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    render_json_error(res, StatusCode::NOT_FOUND, "Not found")
}

pub fn render_500<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    render_json_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
