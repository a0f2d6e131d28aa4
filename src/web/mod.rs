pub mod account;
pub mod dashboard;
pub mod error;
pub mod favorite;
pub mod image;
pub mod index;
pub mod inquiry;
pub mod listing;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    index::configure(conf);
    account::configure(conf);
    dashboard::configure(conf);
    favorite::configure(conf);
    image::configure(conf);
    inquiry::configure(conf);
    listing::configure(conf);
}
