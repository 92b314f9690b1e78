use crate::analyzer::price_analysis::cmp_missing_last;
use crate::model::{Deal, Field, Record};
use crate::utils::instant_or_epoch;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Group key for records whose key is missing or blank.
pub const UNKNOWN_GROUP: &str = "unknown";

/// Community name → deals of that community, input order within a group.
pub type GroupedCollection<R> = HashMap<String, Vec<R>>;

/// Sort orders offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Recently published first.
    DateAsc,
    /// Oldest first.
    DateDesc,
}

impl SortOrder {
    /// Total comparator. Missing prices go last in both directions; invalid
    /// dates compare as the unix epoch.
    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        match self {
            SortOrder::PriceAsc => cmp_missing_last(a.value(Field::Price), b.value(Field::Price)),
            SortOrder::PriceDesc => {
                cmp_missing_last(a.value(Field::Price).map(|p| -p), b.value(Field::Price).map(|p| -p))
            }
            SortOrder::DateAsc => instant_or_epoch(b.published()).cmp(&instant_or_epoch(a.published())),
            SortOrder::DateDesc => instant_or_epoch(a.published()).cmp(&instant_or_epoch(b.published())),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-asc" => Ok(SortOrder::PriceAsc),
            "price-desc" => Ok(SortOrder::PriceDesc),
            "date-asc" => Ok(SortOrder::DateAsc),
            "date-desc" => Ok(SortOrder::DateDesc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
            SortOrder::DateAsc => "date-asc",
            SortOrder::DateDesc => "date-desc",
        };
        f.write_str(name)
    }
}

/// Predicates over deals. A deal lacking the inspected field never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum DealFilter {
    /// `discount > min`
    BestDiscount { min: f64 },
    /// `comments > min`
    MostCommented { min: f64 },
    /// `temperature > min`
    Hot { min: f64 },
    /// `min <= field <= max`
    Range { field: Field, min: f64, max: f64 },
    Community(String),
}

impl DealFilter {
    pub fn matches(&self, deal: &Deal) -> bool {
        match self {
            DealFilter::BestDiscount { min } => deal.discount.is_some_and(|d| d > *min),
            DealFilter::MostCommented { min } => deal.comments.is_some_and(|c| c > *min),
            DealFilter::Hot { min } => deal.temperature.is_some_and(|t| t > *min),
            DealFilter::Range { field, min, max } => in_range(deal, *field, *min, *max),
            DealFilter::Community(name) => deal.community.as_deref() == Some(name.as_str()),
        }
    }
}

fn in_range<R: Record>(record: &R, field: Field, min: f64, max: f64) -> bool {
    record.value(field).is_some_and(|v| v >= min && v <= max)
}

/// Records whose `field` lies in `[min, max]`. Records without the field
/// are left out.
pub fn filter_by_range<R: Record>(records: &[R], field: Field, min: f64, max: f64) -> Vec<R> {
    records
        .iter()
        .filter(|r| in_range(*r, field, min, max))
        .cloned()
        .collect()
}

/// A freshly ordered copy of `records`. Stable: ties keep input order.
pub fn sorted_view<R, F>(records: &[R], comparator: F) -> Vec<R>
where
    R: Clone,
    F: FnMut(&R, &R) -> Ordering,
{
    let mut copy = records.to_vec();
    copy.sort_by(comparator);
    copy
}

/// Groups `records` in one pass. A `None` or blank key lands in
/// [`UNKNOWN_GROUP`].
pub fn group_by<R, F>(records: &[R], key_fn: F) -> GroupedCollection<R>
where
    R: Clone,
    F: Fn(&R) -> Option<String>,
{
    let mut groups: GroupedCollection<R> = HashMap::new();
    for record in records {
        let key = key_fn(record)
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_GROUP.to_string());
        groups.entry(key).or_default().push(record.clone());
    }
    groups
}

pub fn group_by_community(deals: &[Deal]) -> GroupedCollection<Deal> {
    group_by(deals, |d| d.community.clone())
}

/// Returns a new grouping with each group sorted by `order`.
pub fn sort_groups<R: Record>(groups: &GroupedCollection<R>, order: SortOrder) -> GroupedCollection<R> {
    groups
        .iter()
        .map(|(key, records)| (key.clone(), sorted_view(records, |a, b| order.compare(a, b))))
        .collect()
}

/// Group names with their sizes, largest first then by name.
pub fn group_sizes<R>(groups: &GroupedCollection<R>) -> Vec<(String, usize)> {
    let mut sizes: Vec<(String, usize)> = groups.iter().map(|(k, v)| (k.clone(), v.len())).collect();
    sizes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sizes
}

fn unique_in_order<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

/// Distinct websites in first-seen order.
pub fn unique_websites(deals: &[Deal]) -> Vec<String> {
    unique_in_order(deals.iter().filter_map(|d| d.website.clone()))
}

/// Distinct lego set ids in first-seen order.
pub fn lego_set_ids(deals: &[Deal]) -> Vec<String> {
    unique_in_order(deals.iter().map(|d| d.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::testing::{deal, vinted_listing};
    use chrono::{TimeZone, Utc};

    fn discount_fixture() -> Vec<Deal> {
        [10.0, 55.0, 60.0, 75.0, 90.0]
            .iter()
            .enumerate()
            .map(|(i, d)| deal(&format!("d{}", i), Some(10.0 * (i as f64 + 1.0)), Some(*d)))
            .collect()
    }

    #[test]
    fn test_filter_by_range_inclusive() {
        let deals = discount_fixture();
        let kept = filter_by_range(&deals, Field::Discount, 50.0, 75.0);
        let discounts: Vec<f64> = kept.iter().map(|d| d.discount.unwrap()).collect();
        assert_eq!(discounts, vec![55.0, 60.0, 75.0]);
        for d in &deals {
            let inside = kept.iter().any(|k| k.uuid == d.uuid);
            let v = d.discount.unwrap();
            assert_eq!(inside, (50.0..=75.0).contains(&v));
        }
    }

    #[test]
    fn test_filter_by_range_excludes_missing_field() {
        let mut deals = discount_fixture();
        deals.push(deal("no-discount", Some(5.0), None));
        let kept = filter_by_range(&deals, Field::Discount, 0.0, 100.0);
        assert_eq!(kept.len(), 5);
        assert!(kept.iter().all(|d| d.uuid != "no-discount"));
    }

    #[test]
    fn test_sorted_view_directions_are_reverses() {
        let deals = discount_fixture();
        let asc = sorted_view(&deals, |a, b| SortOrder::PriceAsc.compare(a, b));
        let mut desc = sorted_view(&deals, |a, b| SortOrder::PriceDesc.compare(a, b));
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc[0].price, Some(10.0));
    }

    #[test]
    fn test_sorted_view_does_not_touch_input() {
        let listing = vinted_listing();
        let before = listing.clone();
        let sorted = sorted_view(&listing, |a, b| SortOrder::PriceAsc.compare(a, b));
        assert_eq!(listing, before);
        assert_eq!(sorted[0].price, Some(5.95));
        assert_eq!(sorted.len(), listing.len());
    }

    #[test]
    fn test_sort_keeps_ties_and_puts_missing_last() {
        let deals = vec![
            deal("missing", None, None),
            deal("first", Some(5.0), None),
            deal("second", Some(5.0), None),
            deal("cheap", Some(1.0), None),
        ];
        let asc = sorted_view(&deals, |a, b| SortOrder::PriceAsc.compare(a, b));
        let order: Vec<&str> = asc.iter().map(|d| d.uuid.as_str()).collect();
        assert_eq!(order, vec!["cheap", "first", "second", "missing"]);

        let desc = sorted_view(&deals, |a, b| SortOrder::PriceDesc.compare(a, b));
        let order: Vec<&str> = desc.iter().map(|d| d.uuid.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "cheap", "missing"]);
    }

    #[test]
    fn test_sort_by_date_invalid_is_epoch() {
        let mut old = deal("old", None, None);
        old.published = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut new = deal("new", None, None);
        new.published = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let invalid = deal("invalid", None, None);
        let deals = vec![old, invalid, new];

        let recent_first = sorted_view(&deals, |a, b| SortOrder::DateAsc.compare(a, b));
        let order: Vec<&str> = recent_first.iter().map(|d| d.uuid.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "invalid"]);

        let oldest_first = sorted_view(&deals, |a, b| SortOrder::DateDesc.compare(a, b));
        assert_eq!(oldest_first[0].uuid, "invalid");
    }

    #[test]
    fn test_group_by_sentinel_and_count() {
        let mut a = deal("a", Some(1.0), None);
        a.community = Some("dealabs".into());
        let mut b = deal("b", Some(2.0), None);
        b.community = Some("avenuedelabrique".into());
        let c = deal("c", Some(3.0), None);
        let mut d = deal("d", Some(4.0), None);
        d.community = Some("dealabs".into());
        let mut e = deal("e", Some(5.0), None);
        e.community = Some("  ".into());
        let deals = vec![a, b, c, d, e];

        let groups = group_by_community(&deals);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, deals.len());
        assert_eq!(groups[UNKNOWN_GROUP].len(), 2);
        let dealabs: Vec<&str> = groups["dealabs"].iter().map(|d| d.uuid.as_str()).collect();
        assert_eq!(dealabs, vec!["a", "d"]);
    }

    #[test]
    fn test_sort_groups_returns_new_grouping() {
        let mut a = deal("a", Some(1.0), None);
        a.community = Some("dealabs".into());
        let mut b = deal("b", Some(9.0), None);
        b.community = Some("dealabs".into());
        let groups = group_by_community(&[a, b]);
        let sorted = sort_groups(&groups, SortOrder::PriceDesc);
        assert_eq!(sorted["dealabs"][0].uuid, "b");
        assert_eq!(groups["dealabs"][0].uuid, "a");
        assert_eq!(group_sizes(&sorted), vec![("dealabs".to_string(), 2)]);
    }

    #[test]
    fn test_named_filters() {
        let mut hot = deal("hot", Some(10.0), Some(40.0));
        hot.temperature = Some(150.0);
        hot.comments = Some(2.0);
        let mut chatty = deal("chatty", Some(10.0), None);
        chatty.comments = Some(12.0);
        let deals = [hot, chatty];

        let best: Vec<&Deal> = deals.iter().filter(|d| DealFilter::BestDiscount { min: 30.0 }.matches(d)).collect();
        assert_eq!(best.len(), 1);
        let commented: Vec<&Deal> = deals.iter().filter(|d| DealFilter::MostCommented { min: 5.0 }.matches(d)).collect();
        assert_eq!(commented[0].uuid, "chatty");
        assert!(DealFilter::Hot { min: 100.0 }.matches(&deals[0]));
        assert!(!DealFilter::Hot { min: 100.0 }.matches(&deals[1]));
    }

    #[test]
    fn test_unique_websites_and_ids() {
        let mut a = deal("a", None, None);
        a.website = Some("dealabs.com".into());
        let mut b = deal("b", None, None);
        b.website = Some("avenuedelabrique.com".into());
        b.id = "10423".into();
        let mut c = deal("c", None, None);
        c.website = Some("dealabs.com".into());
        let deals = vec![a, b, c];
        assert_eq!(unique_websites(&deals), vec!["dealabs.com", "avenuedelabrique.com"]);
        assert_eq!(lego_set_ids(&deals), vec!["43230", "10423"]);
    }

    #[test]
    fn test_sort_order_round_trip_names() {
        for name in ["price-asc", "price-desc", "date-asc", "date-desc"] {
            let order: SortOrder = name.parse().unwrap();
            assert_eq!(order.to_string(), name);
        }
        assert!("cheapest".parse::<SortOrder>().is_err());
    }
}
