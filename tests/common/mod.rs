//! Shared fixtures for integration tests.
//!
//! Tests run against sea-orm's mock connection; these builders produce the
//! rows the mock hands back.
#![allow(dead_code)]

use chrono::NaiveDateTime;
use homestead::orm::inquiries::{InquiryStatus, InquiryType};
use homestead::orm::listings::{ListingType, PropertyCondition, PropertyType};
use homestead::orm::{favorites, inquiries, listing_images, listings};
use rust_decimal::Decimal;

/// Deterministic timestamps, offset in seconds so ordering is controllable.
pub fn timestamp(offset: i64) -> NaiveDateTime {
    chrono::DateTime::from_timestamp(1_700_000_000 + offset, 0)
        .unwrap()
        .naive_utc()
}

pub fn listing_model(id: i32, owner_id: i32, title: &str, slug: &str) -> listings::Model {
    listings::Model {
        id,
        user_id: owner_id,
        title: title.to_owned(),
        slug: slug.to_owned(),
        description: "Bright rooms, quiet street.".to_owned(),
        property_type: PropertyType::Apartment,
        listing_type: ListingType::Rent,
        location: "12 Harbor Road".to_owned(),
        city: "Springfield".to_owned(),
        state: None,
        postal_code: None,
        latitude: None,
        longitude: None,
        bedrooms: Some(2),
        bathrooms: Some(1),
        area: 750.0,
        price: Decimal::new(150_000, 0),
        is_furnished: false,
        has_parking: false,
        has_balcony: false,
        has_garden: false,
        has_pool: false,
        has_gym: false,
        condition: PropertyCondition::Old,
        is_active: true,
        is_featured: false,
        contact_name: None,
        contact_phone: None,
        contact_email: None,
        created_at: timestamp(id as i64),
        updated_at: timestamp(id as i64),
    }
}

pub fn image_model(
    id: i32,
    listing_id: i32,
    is_primary: bool,
    created_offset: i64,
) -> listing_images::Model {
    listing_images::Model {
        id,
        listing_id,
        filename: format!("deadbeef{:02}.jpg", id),
        content_type: "image/jpeg".to_owned(),
        file_size: 1024,
        is_primary,
        created_at: timestamp(created_offset),
    }
}

pub fn inquiry_model(
    id: i32,
    listing_id: i32,
    sender_id: i32,
    status: InquiryStatus,
) -> inquiries::Model {
    inquiries::Model {
        id,
        listing_id,
        user_id: sender_id,
        name: "Avery Quinn".to_owned(),
        email: "avery@example.com".to_owned(),
        phone: "555-0100".to_owned(),
        message: "Is this still available?".to_owned(),
        inquiry_type: InquiryType::General,
        status,
        created_at: timestamp(id as i64),
        updated_at: timestamp(id as i64),
    }
}

pub fn favorite_model(user_id: i32, listing_id: i32) -> favorites::Model {
    favorites::Model {
        user_id,
        listing_id,
        created_at: timestamp(0),
    }
}
