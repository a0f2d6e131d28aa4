//! Inquiry submission and status handling.
//!
//! A sender holds at most one inquiry per listing. Submitting again rewrites
//! the stored contact fields and message in place; the status column belongs
//! to the owner-only transition path and is never touched by resubmission.

use crate::db::is_unique_violation;
use crate::orm::inquiries::{self, InquiryStatus, InquiryType};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};

/// Validated inquiry content, ready to persist.
#[derive(Debug, Clone)]
pub struct InquiryData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub inquiry_type: InquiryType,
}

/// Outcome of an upsert: the id of the row that now holds the submission.
#[derive(Debug, PartialEq, Eq)]
pub enum InquiryUpsert {
    Created(i32),
    Updated(i32),
}

impl InquiryUpsert {
    pub fn inquiry_id(&self) -> i32 {
        match self {
            InquiryUpsert::Created(id) | InquiryUpsert::Updated(id) => *id,
        }
    }
}

/// Creates the inquiry for (listing, sender) or updates the existing one.
pub async fn upsert_inquiry(
    db: &DatabaseConnection,
    listing_id: i32,
    sender_id: i32,
    data: &InquiryData,
) -> Result<InquiryUpsert, DbErr> {
    if let Some(existing) = find_inquiry(db, listing_id, sender_id).await? {
        apply_update(db, existing.id, data).await?;
        return Ok(InquiryUpsert::Updated(existing.id));
    }

    let record = inquiries::ActiveModel {
        listing_id: Set(listing_id),
        user_id: Set(sender_id),
        name: Set(data.name.clone()),
        email: Set(data.email.clone()),
        phone: Set(data.phone.clone()),
        message: Set(data.message.clone()),
        inquiry_type: Set(data.inquiry_type.clone()),
        status: Set(InquiryStatus::Pending),
        created_at: Set(Utc::now().naive_utc()),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    match inquiries::Entity::insert(record).exec(db).await {
        Ok(res) => Ok(InquiryUpsert::Created(res.last_insert_id)),
        Err(err) if is_unique_violation(&err) => {
            // A concurrent submission won the insert; fold ours into it.
            match find_inquiry(db, listing_id, sender_id).await? {
                Some(existing) => {
                    apply_update(db, existing.id, data).await?;
                    Ok(InquiryUpsert::Updated(existing.id))
                }
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

/// The unique inquiry row for (listing, sender), if any.
pub async fn find_inquiry(
    db: &DatabaseConnection,
    listing_id: i32,
    sender_id: i32,
) -> Result<Option<inquiries::Model>, DbErr> {
    inquiries::Entity::find()
        .filter(inquiries::Column::ListingId.eq(listing_id))
        .filter(inquiries::Column::UserId.eq(sender_id))
        .one(db)
        .await
}

async fn apply_update(db: &DatabaseConnection, inquiry_id: i32, data: &InquiryData) -> Result<(), DbErr> {
    inquiries::Entity::update_many()
        .col_expr(inquiries::Column::Name, Expr::value(data.name.clone()))
        .col_expr(inquiries::Column::Email, Expr::value(data.email.clone()))
        .col_expr(inquiries::Column::Phone, Expr::value(data.phone.clone()))
        .col_expr(inquiries::Column::Message, Expr::value(data.message.clone()))
        .col_expr(
            inquiries::Column::InquiryType,
            Expr::value(data.inquiry_type.clone()),
        )
        .col_expr(
            inquiries::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(inquiries::Column::Id.eq(inquiry_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Whether an owner may move an inquiry from one status to another.
/// Pending fans out to the three terminal states; terminal states are final.
pub fn can_transition(from: &InquiryStatus, to: &InquiryStatus) -> bool {
    matches!(from, InquiryStatus::Pending) && !matches!(to, InquiryStatus::Pending)
}

/// Applies a status transition. Returns false (without mutating) when the
/// transition is not allowed from the stored status.
pub async fn transition_status(
    db: &DatabaseConnection,
    inquiry: &inquiries::Model,
    to: InquiryStatus,
) -> Result<bool, DbErr> {
    if !can_transition(&inquiry.status, &to) {
        return Ok(false);
    }

    inquiries::Entity::update_many()
        .col_expr(inquiries::Column::Status, Expr::value(to))
        .col_expr(
            inquiries::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(inquiries::Column::Id.eq(inquiry.id))
        .exec(db)
        .await?;

    Ok(true)
}

/// Inquiries received across all of an owner's listings, newest first.
pub fn received_select(listing_ids: Vec<i32>) -> Select<inquiries::Entity> {
    inquiries::Entity::find()
        .filter(inquiries::Column::ListingId.is_in(listing_ids))
        .order_by_desc(inquiries::Column::CreatedAt)
}

/// Inquiries a user has sent, newest first.
pub fn sent_select(sender_id: i32) -> Select<inquiries::Entity> {
    inquiries::Entity::find()
        .filter(inquiries::Column::UserId.eq(sender_id))
        .order_by_desc(inquiries::Column::CreatedAt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_fans_out() {
        assert!(can_transition(
            &InquiryStatus::Pending,
            &InquiryStatus::Responded
        ));
        assert!(can_transition(
            &InquiryStatus::Pending,
            &InquiryStatus::Completed
        ));
        assert!(can_transition(
            &InquiryStatus::Pending,
            &InquiryStatus::Rejected
        ));
    }

    #[test]
    fn test_pending_to_pending_rejected() {
        assert!(!can_transition(
            &InquiryStatus::Pending,
            &InquiryStatus::Pending
        ));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [
            InquiryStatus::Responded,
            InquiryStatus::Completed,
            InquiryStatus::Rejected,
        ] {
            for to in [
                InquiryStatus::Pending,
                InquiryStatus::Responded,
                InquiryStatus::Completed,
                InquiryStatus::Rejected,
            ] {
                assert!(!can_transition(&from, &to), "{:?} -> {:?}", from, to);
            }
        }
    }
}
