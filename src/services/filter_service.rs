//! Composable entity filters.
//!
//! Each dimension is an independent predicate over `&T` and a no-op when its
//! criteria field is absent. Filters keep references to the input elements in
//! their original order; entities are never cloned or touched.

use crate::models::{FilterCriteria, Filterable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDimension {
    Status,
    Format,
    OwnerId,
    OwnerEmail,
    DateRange,
    CountRange,
    Flag,
    Search,
}

impl FilterDimension {
    /// Default pipeline order used by [`apply_filters`].
    pub const ALL: [FilterDimension; 8] = [
        FilterDimension::Status,
        FilterDimension::Format,
        FilterDimension::OwnerId,
        FilterDimension::OwnerEmail,
        FilterDimension::DateRange,
        FilterDimension::CountRange,
        FilterDimension::Flag,
        FilterDimension::Search,
    ];

    pub fn is_active(&self, criteria: &FilterCriteria) -> bool {
        match self {
            FilterDimension::Status => criteria.status_set().is_some(),
            FilterDimension::Format => criteria.format_set().is_some(),
            FilterDimension::OwnerId => criteria.owner_id.is_some(),
            FilterDimension::OwnerEmail => criteria.owner_email_needle().is_some(),
            FilterDimension::DateRange => {
                criteria.date_from.is_some() || criteria.date_to.is_some()
            }
            FilterDimension::CountRange => {
                criteria.min_count.is_some() || criteria.max_count.is_some()
            }
            FilterDimension::Flag => criteria.flag.is_some(),
            FilterDimension::Search => criteria.search_needle().is_some(),
        }
    }

    /// Whether `entity` passes this dimension alone.
    pub fn matches<T: Filterable>(&self, entity: &T, criteria: &FilterCriteria) -> bool {
        match self {
            FilterDimension::Status => criteria
                .status_set()
                .map_or(true, |set| set.contains(entity.status())),
            FilterDimension::Format => criteria.format_set().map_or(true, |set| {
                entity.format().map_or(false, |format| set.contains(format))
            }),
            FilterDimension::OwnerId => criteria.owner_id.as_deref().map_or(true, |owner| {
                entity.owner_id().map_or(false, |id| id == owner)
            }),
            FilterDimension::OwnerEmail => criteria.owner_email_needle().map_or(true, |needle| {
                entity
                    .owner_email()
                    .map_or(false, |email| email.to_lowercase().contains(&needle))
            }),
            FilterDimension::DateRange => {
                if criteria.date_from.is_none() && criteria.date_to.is_none() {
                    return true;
                }
                let Some(date) = entity.filter_date() else {
                    return false;
                };
                criteria.date_from.map_or(true, |from| date >= from)
                    && criteria.date_to.map_or(true, |to| date <= to)
            }
            FilterDimension::CountRange => {
                if criteria.min_count.is_none() && criteria.max_count.is_none() {
                    return true;
                }
                let Some(count) = entity.filter_count() else {
                    return false;
                };
                criteria.min_count.map_or(true, |min| count >= min)
                    && criteria.max_count.map_or(true, |max| count <= max)
            }
            FilterDimension::Flag => criteria
                .flag
                .map_or(true, |flag| entity.flag() == Some(flag)),
            FilterDimension::Search => criteria.search_needle().map_or(true, |needle| {
                entity
                    .search_fields()
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            }),
        }
    }
}

/// Runs one dimension over `items`.
pub fn apply_dimension<'a, T: Filterable>(
    dimension: FilterDimension,
    items: Vec<&'a T>,
    criteria: &FilterCriteria,
) -> Vec<&'a T> {
    if !dimension.is_active(criteria) {
        return items;
    }
    items
        .into_iter()
        .filter(|entity| dimension.matches(*entity, criteria))
        .collect()
}

pub fn filter_by_status<'a, T: Filterable>(items: Vec<&'a T>, c: &FilterCriteria) -> Vec<&'a T> {
    apply_dimension(FilterDimension::Status, items, c)
}

pub fn filter_by_format<'a, T: Filterable>(items: Vec<&'a T>, c: &FilterCriteria) -> Vec<&'a T> {
    apply_dimension(FilterDimension::Format, items, c)
}

pub fn filter_by_owner_id<'a, T: Filterable>(items: Vec<&'a T>, c: &FilterCriteria) -> Vec<&'a T> {
    apply_dimension(FilterDimension::OwnerId, items, c)
}

pub fn filter_by_owner_email<'a, T: Filterable>(
    items: Vec<&'a T>,
    c: &FilterCriteria,
) -> Vec<&'a T> {
    apply_dimension(FilterDimension::OwnerEmail, items, c)
}

pub fn filter_by_date_range<'a, T: Filterable>(
    items: Vec<&'a T>,
    c: &FilterCriteria,
) -> Vec<&'a T> {
    apply_dimension(FilterDimension::DateRange, items, c)
}

pub fn filter_by_count_range<'a, T: Filterable>(
    items: Vec<&'a T>,
    c: &FilterCriteria,
) -> Vec<&'a T> {
    apply_dimension(FilterDimension::CountRange, items, c)
}

pub fn filter_by_flag<'a, T: Filterable>(items: Vec<&'a T>, c: &FilterCriteria) -> Vec<&'a T> {
    apply_dimension(FilterDimension::Flag, items, c)
}

pub fn filter_by_search<'a, T: Filterable>(items: Vec<&'a T>, c: &FilterCriteria) -> Vec<&'a T> {
    apply_dimension(FilterDimension::Search, items, c)
}

/// Runs every dimension in `order` over `entities`.
pub fn apply_filters_in_order<'a, T: Filterable>(
    entities: &'a [T],
    criteria: &FilterCriteria,
    order: &[FilterDimension],
) -> Vec<&'a T> {
    order
        .iter()
        .fold(entities.iter().collect(), |items, dimension| {
            apply_dimension(*dimension, items, criteria)
        })
}

/// Selects the entities satisfying every specified criteria field.
pub fn apply_filters<'a, T: Filterable>(entities: &'a [T], criteria: &FilterCriteria) -> Vec<&'a T> {
    let filtered = apply_filters_in_order(entities, criteria, &FilterDimension::ALL);
    tracing::debug!(
        input = entities.len(),
        output = filtered.len(),
        "filters applied"
    );
    filtered
}

pub fn matches_criteria<T: Filterable>(entity: &T, criteria: &FilterCriteria) -> bool {
    FilterDimension::ALL
        .iter()
        .all(|dimension| dimension.matches(entity, criteria))
}

/// Dimensions that constrain under `criteria`.
pub fn active_dimensions(criteria: &FilterCriteria) -> Vec<FilterDimension> {
    FilterDimension::ALL
        .iter()
        .copied()
        .filter(|d| d.is_active(criteria))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Hackathon, OneOrMany, UserRecord};
    use chrono::{TimeZone, Utc};

    fn hackathon(id: i64, status: &str, registrations: i64) -> Hackathon {
        Hackathon {
            id,
            title: format!("Hack {}", id),
            description: None,
            organization: Some("Acme Labs".to_string()),
            location: None,
            status: status.to_string(),
            format: "online".to_string(),
            created_by: "org-1".to_string(),
            organizer_email: Some("Owner@Acme.dev".to_string()),
            start_date: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 3, 3, 18, 0, 0).unwrap(),
            registrations_count: registrations,
            featured: false,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn user(id: &str, bio: Option<&str>) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            username: format!("user_{}", id),
            full_name: None,
            email: None,
            bio: bio.map(String::from),
            role: None,
            status: "active".to_string(),
            warning_count: 0,
            email_verified: true,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_criteria_returns_input_in_order() {
        let items = vec![hackathon(1, "draft", 0), hackathon(2, "published", 5)];
        let out = apply_filters(&items, &FilterCriteria::default());
        assert_eq!(out.len(), 2);
        assert!(std::ptr::eq(out[0], &items[0]));
        assert!(std::ptr::eq(out[1], &items[1]));
    }

    #[test]
    fn test_status_set_matches_any_member() {
        let items = vec![
            hackathon(1, "draft", 0),
            hackathon(2, "published", 5),
            hackathon(3, "rejected", 5),
        ];
        let criteria = FilterCriteria::default().with_status(vec!["draft", "rejected"]);
        let ids: Vec<i64> = apply_filters(&items, &criteria).iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_count_range_is_inclusive() {
        let items = vec![
            hackathon(1, "published", 49),
            hackathon(2, "published", 50),
            hackathon(3, "published", 100),
            hackathon(4, "published", 101),
        ];
        let criteria = FilterCriteria::default().with_count_range(Some(50), Some(100));
        let ids: Vec<i64> = apply_filters(&items, &criteria).iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let items = vec![hackathon(1, "published", 0)];
        let start = items[0].start_date;
        let exact = FilterCriteria::default().with_date_range(Some(start), Some(start));
        assert_eq!(apply_filters(&items, &exact).len(), 1);

        let later = FilterCriteria::default()
            .with_date_range(Some(start + chrono::Duration::seconds(1)), None);
        assert!(apply_filters(&items, &later).is_empty());
    }

    #[test]
    fn test_owner_email_is_case_insensitive_substring() {
        let items = vec![hackathon(1, "published", 0)];
        let criteria = FilterCriteria::default().with_owner_email("owner@ACME");
        assert_eq!(apply_filters(&items, &criteria).len(), 1);
    }

    #[test]
    fn test_search_uses_or_across_fields_and_skips_absent() {
        let users = vec![
            user("a", Some("Rust enthusiast")),
            user("b", None),
            user("c", Some("Go developer")),
        ];
        let criteria = FilterCriteria::default().with_search("RUST");
        let ids: Vec<&str> = apply_filters(&users, &criteria)
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);

        // username matches even though bio is absent
        let by_name = FilterCriteria::default().with_search("user_b");
        assert_eq!(apply_filters(&users, &by_name).len(), 1);
    }

    #[test]
    fn test_format_constraint_excludes_entities_without_format() {
        let users = vec![user("a", None)];
        let criteria = FilterCriteria {
            format: Some(OneOrMany::One("organizer".to_string())),
            ..Default::default()
        };
        assert!(apply_filters(&users, &criteria).is_empty());
    }

    #[test]
    fn test_matches_criteria_agrees_with_apply_filters() {
        let items = vec![
            hackathon(1, "published", 80),
            hackathon(2, "draft", 80),
            hackathon(3, "published", 10),
        ];
        let criteria = FilterCriteria::default()
            .with_status("published")
            .with_count_range(Some(50), None);
        let filtered = apply_filters(&items, &criteria);
        for h in &items {
            assert_eq!(
                matches_criteria(h, &criteria),
                filtered.iter().any(|f| f.id == h.id)
            );
        }
    }

    #[test]
    fn test_active_dimensions() {
        let criteria = FilterCriteria::default()
            .with_flag(true)
            .with_search("  ");
        assert_eq!(active_dimensions(&criteria), vec![FilterDimension::Flag]);
    }
}
