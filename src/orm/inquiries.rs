//! SeaORM Entity for inquiries table
//!
//! Unique on (listing_id, user_id): a sender holds at most one inquiry per
//! listing. Re-submission updates the row in place (see `crate::inquiries`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inquiry type enum matching PostgreSQL inquiry_type
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "inquiry_type")]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum InquiryType {
    #[sea_orm(string_value = "general")]
    #[default]
    General,
    #[sea_orm(string_value = "booking")]
    Booking,
    #[sea_orm(string_value = "visit")]
    Visit,
}

/// Inquiry status enum matching PostgreSQL inquiry_status
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "inquiry_status")]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "responded")]
    Responded,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "inquiries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub listing_id: i32,
    /// Sender of the inquiry.
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub inquiry_type: InquiryType,
    pub status: InquiryStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listings::Entity",
        from = "Column::ListingId",
        to = "super::listings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Listing,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Sender,
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
