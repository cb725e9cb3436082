use crate::errors::AppResult;
use std::future::Future;
use std::pin::Pin;

/// Rows requested per page, matching the backend's list endpoints.
pub const PAGE_SIZE: u32 = 500;

/// Upper bound on sequential page requests. Keeps the mount-time fetch
/// finite against a backend that keeps returning full pages.
pub const MAX_PAGES: u32 = 20;

pub type RecordPageFuture<R> = Pin<Box<dyn Future<Output = AppResult<Vec<R>>> + Send>>;

/// A paginated record endpoint: `fetch_page(skip, limit)` returns one slice
/// of the collection. A page shorter than `limit` means the collection is
/// exhausted.
pub trait RecordSource<R>: Send + Sync {
    fn fetch_page(&self, skip: u32, limit: u32) -> RecordPageFuture<R>;
}

/// Fetches the whole collection page by page, stopping at a short page or
/// after [`MAX_PAGES`] pages. Any page failure degrades the whole fetch to
/// an empty dataset so aggregation still runs; nothing propagates into the
/// render path.
pub async fn fetch_all_records<R>(source: &dyn RecordSource<R>) -> Vec<R> {
    let mut all = Vec::new();
    let mut skip = 0;
    for _ in 0..MAX_PAGES {
        match source.fetch_page(skip, PAGE_SIZE).await {
            Ok(batch) => {
                let exhausted = (batch.len() as u32) < PAGE_SIZE;
                all.extend(batch);
                if exhausted {
                    break;
                }
                skip += PAGE_SIZE;
            }
            Err(error) => {
                tracing::warn!(%error, "record fetch failed, rendering with empty dataset");
                return Vec::new();
            }
        }
    }
    all
}
