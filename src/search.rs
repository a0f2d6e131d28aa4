//! Listing browse filters.
//!
//! Every filter arrives as an optional raw string and is only applied when
//! it is present and parses. A value like `min_price=abc` degrades to "no
//! price floor" rather than a validation error, matching the behavior the
//! browse form has always had. Filters combine with logical AND; the
//! free-text term fans out as OR across title, description, location and
//! city. Only active listings are ever eligible.

use crate::orm::listings::{self, ListingType, PropertyType};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveEnum, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};
use serde::Deserialize;

/// Raw browse parameters, straight from the query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListingSearch {
    pub search: Option<String>,
    pub listing_type: Option<String>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub is_furnished: Option<String>,
    pub has_parking: Option<String>,
    pub page: Option<String>,
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

/// A present-but-unchecked checkbox never filters; anything else the form
/// can submit ("on", "true", "1", ...) restricts to true.
fn is_truthy(raw: &Option<String>) -> bool {
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("0") | Some("false") => false,
        Some(_) => true,
    }
}

impl ListingSearch {
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn listing_type(&self) -> Option<ListingType> {
        let raw = self.listing_type.as_deref()?.trim();
        ListingType::try_from_value(&raw.to_owned()).ok()
    }

    pub fn property_type(&self) -> Option<PropertyType> {
        let raw = self.property_type.as_deref()?.trim();
        PropertyType::try_from_value(&raw.to_owned()).ok()
    }

    pub fn city(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn min_price(&self) -> Option<Decimal> {
        self.min_price.as_deref()?.trim().parse().ok()
    }

    pub fn max_price(&self) -> Option<Decimal> {
        self.max_price.as_deref()?.trim().parse().ok()
    }

    pub fn bedrooms(&self) -> Option<i32> {
        self.bedrooms.as_deref()?.trim().parse().ok()
    }

    pub fn bathrooms(&self) -> Option<i32> {
        self.bathrooms.as_deref()?.trim().parse().ok()
    }

    pub fn is_furnished(&self) -> bool {
        is_truthy(&self.is_furnished)
    }

    pub fn has_parking(&self) -> bool {
        is_truthy(&self.has_parking)
    }

    /// Requested 1-indexed page. Bad input means page 1; clamping to the
    /// valid range happens in `crate::pagination`.
    pub fn page(&self) -> u64 {
        crate::pagination::parse_page_param(self.page.as_deref())
    }

    /// Accumulates one predicate per present-and-parsed input onto the
    /// `is_active` floor filter.
    pub fn to_condition(&self) -> Condition {
        let mut cond = Condition::all().add(listings::Column::IsActive.eq(true));

        if let Some(term) = self.search_term() {
            let pattern = like_pattern(term);
            cond = cond.add(
                Condition::any()
                    .add(Expr::cust_with_values("title ILIKE ?", vec![pattern.clone()]))
                    .add(Expr::cust_with_values(
                        "description ILIKE ?",
                        vec![pattern.clone()],
                    ))
                    .add(Expr::cust_with_values(
                        "location ILIKE ?",
                        vec![pattern.clone()],
                    ))
                    .add(Expr::cust_with_values("city ILIKE ?", vec![pattern])),
            );
        }

        if let Some(listing_type) = self.listing_type() {
            cond = cond.add(listings::Column::ListingType.eq(listing_type));
        }

        if let Some(property_type) = self.property_type() {
            cond = cond.add(listings::Column::PropertyType.eq(property_type));
        }

        if let Some(city) = self.city() {
            cond = cond.add(Expr::cust_with_values(
                "city ILIKE ?",
                vec![like_pattern(city)],
            ));
        }

        if let Some(min_price) = self.min_price() {
            cond = cond.add(listings::Column::Price.gte(min_price));
        }

        if let Some(max_price) = self.max_price() {
            cond = cond.add(listings::Column::Price.lte(max_price));
        }

        if let Some(bedrooms) = self.bedrooms() {
            cond = cond.add(listings::Column::Bedrooms.gte(bedrooms));
        }

        if let Some(bathrooms) = self.bathrooms() {
            cond = cond.add(listings::Column::Bathrooms.gte(bathrooms));
        }

        if self.is_furnished() {
            cond = cond.add(listings::Column::IsFurnished.eq(true));
        }

        if self.has_parking() {
            cond = cond.add(listings::Column::HasParking.eq(true));
        }

        cond
    }

    /// The filtered browse select, newest first.
    pub fn to_select(&self) -> Select<listings::Entity> {
        listings::Entity::find()
            .filter(self.to_condition())
            .order_by_desc(listings::Column::CreatedAt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql_for(search: &ListingSearch) -> String {
        search.to_select().build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_active_floor_and_ordering_always_present() {
        let sql = sql_for(&ListingSearch::default());
        assert!(sql.contains(r#""is_active" = TRUE"#), "{}", sql);
        assert!(sql.contains(r#"ORDER BY "listings"."created_at" DESC"#), "{}", sql);
    }

    #[test]
    fn test_price_range_and_bedroom_floor() {
        let search = ListingSearch {
            min_price: Some("100000".to_owned()),
            max_price: Some("200000".to_owned()),
            bedrooms: Some("2".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&search);
        assert!(sql.contains(r#""price" >= 100000"#), "{}", sql);
        assert!(sql.contains(r#""price" <= 200000"#), "{}", sql);
        assert!(sql.contains(r#""bedrooms" >= 2"#), "{}", sql);
    }

    #[test]
    fn test_unparsable_numeric_behaves_as_absent() {
        let with_bad_min = ListingSearch {
            min_price: Some("abc".to_owned()),
            max_price: Some("200000".to_owned()),
            bedrooms: Some("2".to_owned()),
            ..Default::default()
        };
        let without_min = ListingSearch {
            min_price: None,
            max_price: Some("200000".to_owned()),
            bedrooms: Some("2".to_owned()),
            ..Default::default()
        };
        assert_eq!(sql_for(&with_bad_min), sql_for(&without_min));

        let bad_bedrooms = ListingSearch {
            bedrooms: Some("two".to_owned()),
            ..Default::default()
        };
        assert_eq!(sql_for(&bad_bedrooms), sql_for(&ListingSearch::default()));
    }

    #[test]
    fn test_free_text_fans_out_over_four_fields() {
        let search = ListingSearch {
            search: Some("harbor".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&search);
        for clause in [
            "title ILIKE '%harbor%'",
            "description ILIKE '%harbor%'",
            "location ILIKE '%harbor%'",
            "city ILIKE '%harbor%'",
        ] {
            assert!(sql.contains(clause), "missing {:?} in {}", clause, sql);
        }
        assert!(sql.contains(" OR "), "{}", sql);
    }

    #[test]
    fn test_enum_filters_exact_match() {
        let search = ListingSearch {
            listing_type: Some("rent".to_owned()),
            property_type: Some("villa".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&search);
        assert!(sql.contains(r#""listing_type" = "#), "{}", sql);
        assert!(sql.contains("rent"), "{}", sql);
        assert!(sql.contains("villa"), "{}", sql);
    }

    #[test]
    fn test_unknown_enum_value_behaves_as_absent() {
        let search = ListingSearch {
            listing_type: Some("timeshare".to_owned()),
            ..Default::default()
        };
        assert_eq!(sql_for(&search), sql_for(&ListingSearch::default()));
    }

    #[test]
    fn test_boolean_flags_only_filter_when_truthy() {
        let checked = ListingSearch {
            is_furnished: Some("on".to_owned()),
            has_parking: Some("1".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&checked);
        assert!(sql.contains(r#""is_furnished" = TRUE"#), "{}", sql);
        assert!(sql.contains(r#""has_parking" = TRUE"#), "{}", sql);

        // Unchecked or falsy flags never filter, and never filter for false.
        let unchecked = ListingSearch {
            is_furnished: Some("".to_owned()),
            has_parking: Some("false".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&unchecked);
        assert!(!sql.contains(r#""is_furnished" = "#), "{}", sql);
        assert!(!sql.contains(r#""has_parking" = "#), "{}", sql);
    }

    #[test]
    fn test_city_filter_is_substring_match() {
        let search = ListingSearch {
            city: Some("Spring".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&search);
        assert!(sql.contains("city ILIKE '%Spring%'"), "{}", sql);
    }

    #[test]
    fn test_page_parsing_is_lenient() {
        let search = ListingSearch {
            page: Some("oops".to_owned()),
            ..Default::default()
        };
        assert_eq!(search.page(), 1);
        let search = ListingSearch {
            page: Some("4".to_owned()),
            ..Default::default()
        };
        assert_eq!(search.page(), 4);
    }
}
