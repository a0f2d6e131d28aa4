//! SeaORM Entity for listings table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property type enum matching PostgreSQL property_type
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "property_type")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[sea_orm(string_value = "apartment")]
    Apartment,
    #[sea_orm(string_value = "house")]
    House,
    #[sea_orm(string_value = "villa")]
    Villa,
    #[sea_orm(string_value = "studio")]
    Studio,
    #[sea_orm(string_value = "penthouse")]
    Penthouse,
    #[sea_orm(string_value = "townhouse")]
    Townhouse,
    #[sea_orm(string_value = "commercial")]
    Commercial,
    #[sea_orm(string_value = "land")]
    Land,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Listing type enum matching PostgreSQL listing_type
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "listing_type")]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "rent")]
    Rent,
    #[sea_orm(string_value = "lease")]
    Lease,
}

/// Condition enum matching PostgreSQL listing_condition
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "listing_condition")]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyCondition {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "old")]
    #[default]
    Old,
    #[sea_orm(string_value = "renovated")]
    Renovated,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owner of the listing.
    pub user_id: i32,
    pub title: String,
    /// URL identifier. Globally unique, assigned once at creation.
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub location: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    /// Area in sq. ft.
    pub area: f64,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub price: Decimal,
    pub is_furnished: bool,
    pub has_parking: bool,
    pub has_balcony: bool,
    pub has_garden: bool,
    pub has_pool: bool,
    pub has_gym: bool,
    pub condition: PropertyCondition,
    pub is_active: bool,
    pub is_featured: bool,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::listing_images::Entity")]
    Images,
    #[sea_orm(has_many = "super::inquiries::Entity")]
    Inquiries,
    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::listing_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::inquiries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiries.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
