//! URL slug generation for listings.
//!
//! Slugs are derived from the listing title and must be globally unique.
//! The probe walk here (`title`, `title-1`, `title-2`, ...) is not race-free
//! on its own; `crate::listings` retries creation when the unique index on
//! `listings.slug` rejects a concurrent duplicate.

use crate::orm::listings;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

/// Fallback base when a title normalizes to nothing (e.g. all punctuation).
const EMPTY_TITLE_SLUG: &str = "listing";

/// Normalizes a title into a URL-safe base slug: lowercased, with runs of
/// non-alphanumeric characters collapsed into single hyphens and no leading
/// or trailing hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        EMPTY_TITLE_SLUG.to_owned()
    } else {
        slug
    }
}

/// Derives an unused slug for a title by probing the base slug and then
/// numbered variants until one is free. Terminates because the counter
/// space is unbounded.
pub async fn find_unique_slug(db: &DatabaseConnection, title: &str) -> Result<String, DbErr> {
    let base = slugify(title);
    let mut candidate = base.clone();
    let mut counter = 1;

    loop {
        let taken = listings::Entity::find()
            .filter(listings::Column::Slug.eq(candidate.as_str()))
            .one(db)
            .await?
            .is_some();

        if !taken {
            return Ok(candidate);
        }

        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Cozy Downtown Loft"), "cozy-downtown-loft");
        assert_eq!(slugify("3BR / 2BA Villa"), "3br-2ba-villa");
        assert_eq!(slugify("  Spacious  Apartment  "), "spacious-apartment");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("Sea -- View!!! Penthouse"), "sea-view-penthouse");
        assert_eq!(slugify("a...b---c"), "a-b-c");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify(""), "listing");
        assert_eq!(slugify("!!!"), "listing");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let once = slugify("Family House, Garden & Pool");
        assert_eq!(slugify(&once), once);
    }
}
