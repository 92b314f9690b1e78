use crate::analyzer::market_indicators::{group_by_community, sort_groups, sorted_view};
use crate::analyzer::{DealFilter, GroupedCollection, SortOrder};
use crate::model::{Deal, DealsPage, PaginationMeta};
use std::sync::Arc;
use tracing::{debug, info};

/// A transformation the user can ask for. Every request starts from the
/// canonical deals; `Chain` is the only way to stack steps.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewRequest {
    Filter(DealFilter),
    Sort(SortOrder),
    Chain(Vec<ViewRequest>),
}

impl ViewRequest {
    fn apply(&self, deals: &[Deal]) -> Vec<Deal> {
        match self {
            ViewRequest::Filter(filter) => deals.iter().filter(|d| filter.matches(d)).cloned().collect(),
            ViewRequest::Sort(order) => sorted_view(deals, |a, b| order.compare(a, b)),
            ViewRequest::Chain(steps) => steps
                .iter()
                .fold(deals.to_vec(), |acc, step| step.apply(&acc)),
        }
    }
}

/// Holds the last fetched page of deals and its pagination.
///
/// The canonical deals are shared behind an `Arc` and never mutated; a
/// successful fetch swaps the whole snapshot. `applied_seq` records which
/// fetch produced the snapshot so stale responses can be refused.
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    canonical: Arc<Vec<Deal>>,
    pagination: PaginationMeta,
    applied_seq: u64,
    last_view: Option<(ViewRequest, Vec<Deal>)>,
    last_grouping: Option<GroupedCollection<Deal>>,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the canonical state wholesale. Pagination is normalized,
    /// so a current page past the last page is clamped. Derived views are
    /// dropped.
    pub fn replace(&mut self, deals: Vec<Deal>, pagination: PaginationMeta) {
        self.canonical = Arc::new(deals);
        self.pagination = pagination.normalized();
        self.clear_view();
        debug!(
            "Canonical deals replaced: {} deals, page {}/{}",
            self.canonical.len(),
            self.pagination.current_page,
            self.pagination.page_count
        );
    }

    /// Applies a fetched page if it comes from a newer request than the one
    /// currently shown. Returns whether it was applied.
    pub fn apply_fetch(&mut self, seq: u64, page: DealsPage) -> bool {
        if seq <= self.applied_seq {
            info!(
                "Discarding stale response seq={} (showing seq={})",
                seq, self.applied_seq
            );
            return false;
        }
        self.applied_seq = seq;
        self.replace(page.deals, page.pagination);
        true
    }

    /// Runs `transform` over a fresh copy of the canonical deals.
    pub fn view<F>(&self, transform: F) -> Vec<Deal>
    where
        F: FnOnce(Vec<Deal>) -> Vec<Deal>,
    {
        transform(self.canonical.as_ref().clone())
    }

    /// Computes `request` from the canonical deals and remembers the result
    /// as the current view.
    pub fn apply_view(&mut self, request: ViewRequest) -> &[Deal] {
        let deals = self.view(|copy| request.apply(&copy));
        let (_, deals) = self.last_view.insert((request, deals));
        deals.as_slice()
    }

    /// Groups the canonical deals by community, each group ordered by `order`
    /// when given.
    pub fn group(&mut self, order: Option<SortOrder>) -> &GroupedCollection<Deal> {
        let groups = group_by_community(&self.canonical);
        let groups = match order {
            Some(order) => sort_groups(&groups, order),
            None => groups,
        };
        self.last_grouping.insert(groups)
    }

    pub fn clear_view(&mut self) {
        self.last_view = None;
        self.last_grouping = None;
    }

    pub fn canonical_deals(&self) -> &[Deal] {
        self.canonical.as_slice()
    }

    /// Cheap shared handle on the canonical snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Deal>> {
        Arc::clone(&self.canonical)
    }

    pub fn pagination(&self) -> PaginationMeta {
        self.pagination
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub fn last_grouping(&self) -> Option<&GroupedCollection<Deal>> {
        self.last_grouping.as_ref()
    }

    /// Deals to display: the last flat view if any, the canonical deals
    /// otherwise.
    pub fn current_view(&self) -> &[Deal] {
        match &self.last_view {
            Some((_, deals)) => deals.as_slice(),
            None => self.canonical.as_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::testing::deal;
    use crate::analyzer::UNKNOWN_GROUP;
    use crate::model::Field;

    fn page() -> Vec<Deal> {
        let mut deals = vec![
            deal("a", Some(30.0), Some(10.0)),
            deal("b", Some(10.0), Some(55.0)),
            deal("c", Some(20.0), Some(60.0)),
            deal("d", Some(50.0), Some(75.0)),
            deal("e", Some(40.0), Some(90.0)),
        ];
        deals[0].community = Some("dealabs".into());
        deals[1].community = Some("dealabs".into());
        deals[2].community = Some("avenuedelabrique".into());
        deals
    }

    fn meta(current_page: u32, page_count: u32) -> PaginationMeta {
        PaginationMeta {
            current_page,
            page_count,
            page_size: 5,
            total_count: 5 * page_count as u64,
        }
    }

    #[test]
    fn test_replace_clamps_current_page() {
        let mut state = CollectionState::new();
        state.replace(page(), meta(7, 3));
        assert_eq!(state.pagination().current_page, 3);
        assert_eq!(state.canonical_deals().len(), 5);
    }

    #[test]
    fn test_view_never_mutates_canonical() {
        let mut state = CollectionState::new();
        state.replace(page(), meta(1, 1));
        let before_ptr = state.snapshot();
        let before = state.canonical_deals().to_vec();

        let filtered = state.view(|mut deals| {
            deals.retain(|d| d.price.is_some_and(|p| p > 25.0));
            deals
        });
        assert_eq!(filtered.len(), 3);
        state.apply_view(ViewRequest::Sort(SortOrder::PriceDesc));

        assert_eq!(state.canonical_deals(), before.as_slice());
        assert!(Arc::ptr_eq(&before_ptr, &state.snapshot()));
        assert_eq!(state.pagination(), meta(1, 1));
    }

    #[test]
    fn test_views_do_not_compound() {
        let mut state = CollectionState::new();
        state.replace(page(), meta(1, 1));

        let filter = ViewRequest::Filter(DealFilter::Range { field: Field::Discount, min: 50.0, max: 75.0 });
        assert_eq!(state.apply_view(filter).len(), 3);

        // sorting afterwards starts from all five deals, not the filtered three
        let sorted = state.apply_view(ViewRequest::Sort(SortOrder::PriceAsc));
        let order: Vec<&str> = sorted.iter().map(|d| d.uuid.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "e", "d"]);
    }

    #[test]
    fn test_explicit_chain_composes() {
        let mut state = CollectionState::new();
        state.replace(page(), meta(1, 1));
        let chained = ViewRequest::Chain(vec![
            ViewRequest::Filter(DealFilter::BestDiscount { min: 50.0 }),
            ViewRequest::Sort(SortOrder::PriceDesc),
        ]);
        let order: Vec<&str> = state.apply_view(chained).iter().map(|d| d.uuid.as_str()).collect();
        assert_eq!(order, vec!["d", "e", "c", "b"]);
    }

    #[test]
    fn test_current_view_falls_back_to_canonical() {
        let mut state = CollectionState::new();
        state.replace(page(), meta(1, 1));
        assert_eq!(state.current_view().len(), 5);

        state.apply_view(ViewRequest::Filter(DealFilter::Community("dealabs".into())));
        assert_eq!(state.current_view().len(), 2);

        state.replace(page(), meta(1, 1));
        assert!(state.last_view.is_none());
        assert_eq!(state.current_view().len(), 5);
    }

    #[test]
    fn test_group_rebuilt_from_canonical() {
        let mut state = CollectionState::new();
        state.replace(page(), meta(1, 1));
        state.apply_view(ViewRequest::Filter(DealFilter::Community("dealabs".into())));

        let groups = state.group(Some(SortOrder::PriceDesc));
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, 5);
        assert_eq!(groups[UNKNOWN_GROUP].len(), 2);
        assert_eq!(groups["dealabs"][0].uuid, "a");
        // grouping leaves the flat view alone
        assert_eq!(state.current_view().len(), 2);
        assert!(state.last_grouping().is_some());
    }

    #[test]
    fn test_apply_fetch_refuses_stale_sequence() {
        let mut state = CollectionState::new();
        let newer = DealsPage { deals: vec![deal("new", Some(1.0), None)], pagination: meta(2, 3) };
        let older = DealsPage { deals: vec![deal("old", Some(1.0), None)], pagination: meta(1, 3) };

        assert!(state.apply_fetch(2, newer));
        assert!(!state.apply_fetch(1, older));
        assert_eq!(state.canonical_deals()[0].uuid, "new");
        assert_eq!(state.applied_seq(), 2);
        assert_eq!(state.pagination().current_page, 2);
    }
}
