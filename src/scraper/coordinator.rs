use crate::model::{Deal, FetchError, MarketItem, PaginationMeta};
use crate::scraper::traits::DealSource;
use crate::state::CollectionState;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// The response replaced the canonical deals.
    Applied,
    /// A newer request had already been applied; the response was dropped.
    Stale,
    /// Nothing changed; the previous state is still in place.
    Failed(FetchError),
}

/// Outcome of one page request together with the state it left behind.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub seq: u64,
    pub status: FetchStatus,
    pub deals: Arc<Vec<Deal>>,
    pub pagination: PaginationMeta,
}

impl FetchReport {
    pub fn error(&self) -> Option<&FetchError> {
        match &self.status {
            FetchStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Issues page requests and feeds their results into the shared
/// [`CollectionState`].
///
/// Each request takes the next sequence number before it goes out. When a
/// response arrives only the highest sequence seen so far may replace the
/// canonical deals, so a slow old request can never overwrite a newer page.
pub struct FetchCoordinator<S: DealSource> {
    source: S,
    state: Arc<Mutex<CollectionState>>,
    next_seq: AtomicU64,
    last_error: Mutex<Option<FetchError>>,
}

impl<S: DealSource> FetchCoordinator<S> {
    pub fn new(source: S) -> Self {
        Self::with_state(source, Arc::new(Mutex::new(CollectionState::new())))
    }

    pub fn with_state(source: S, state: Arc<Mutex<CollectionState>>) -> Self {
        Self {
            source,
            state,
            next_seq: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    pub fn state(&self) -> Arc<Mutex<CollectionState>> {
        Arc::clone(&self.state)
    }

    /// The error of the most recent failed request, cleared by the next
    /// applied one.
    pub async fn last_error(&self) -> Option<FetchError> {
        self.last_error.lock().await.clone()
    }

    /// Requests `page` with `size` deals per page. Never fails: on any error
    /// the previous state is returned untouched and the error is carried in
    /// the report. No retry is attempted.
    pub async fn fetch_page(&self, page: u32, size: u32) -> FetchReport {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Fetching deals page={} size={} seq={}", page, size, seq);

        let result = if page == 0 {
            Err(FetchError::InvalidArgument(format!("page must be >= 1, got {}", page)))
        } else if size == 0 {
            Err(FetchError::InvalidArgument("page size must be > 0".into()))
        } else {
            self.source.fetch_deals(page, size).await
        };

        let mut state = self.state.lock().await;
        let status = match result {
            Ok(fetched) => {
                if state.apply_fetch(seq, fetched) {
                    *self.last_error.lock().await = None;
                    FetchStatus::Applied
                } else {
                    FetchStatus::Stale
                }
            }
            Err(e) => {
                warn!("Fetch seq={} failed, keeping previous deals: {}", seq, e);
                *self.last_error.lock().await = Some(e.clone());
                FetchStatus::Failed(e)
            }
        };

        FetchReport {
            seq,
            status,
            deals: state.snapshot(),
            pagination: state.pagination(),
        }
    }

    /// Re-fetches the current page with a new page size.
    pub async fn change_page_size(&self, size: u32) -> FetchReport {
        let page = self.state.lock().await.pagination().current_page;
        self.fetch_page(page, size).await
    }

    /// Moves to `page`, keeping the current page size.
    pub async fn change_page(&self, page: u32) -> FetchReport {
        let size = self.state.lock().await.pagination().page_size;
        self.fetch_page(page, size).await
    }

    /// Fires several page requests at once. Sequence numbers follow the order
    /// of `pages`, so the last listed page wins once everything completes.
    pub async fn fetch_pages(&self, pages: &[u32], size: u32) -> Vec<FetchReport> {
        join_all(pages.iter().map(|page| self.fetch_page(*page, size))).await
    }

    /// Resale listings for a lego set; does not touch the collection state.
    pub async fn fetch_sales(&self, lego_set_id: &str) -> Result<Vec<MarketItem>, FetchError> {
        self.source.fetch_sales(lego_set_id).await
    }
}
