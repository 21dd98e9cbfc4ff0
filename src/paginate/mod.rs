//! Pagination driver
//!
//! Turns a "fetch page N" function into a lazy, finite, forward-only stream
//! of batches. Each call starts again from page 1. Pages may either be
//! addressed by index (listing URL templates) or by the link the previous
//! page's "next" marker pointed at.
//!
//! Termination, in priority order:
//! 1. the page carries no "next page" marker
//! 2. the page yields no items
//! 3. the declared maximum page count is reached (hard cap)
//!
//! A fetch error is yielded once and ends the stream.

use crate::model::{CatalogEntry, Unit};
use crate::KagamiError;
use futures::stream::{self, Stream, TryStreamExt};
use std::collections::HashSet;
use std::future::Future;

/// Items carrying the key used for duplicate suppression
pub trait Identified {
    fn identity(&self) -> &str;
}

impl Identified for CatalogEntry {
    fn identity(&self) -> &str {
        &self.identifier
    }
}

impl Identified for Unit {
    fn identity(&self) -> &str {
        &self.locator
    }
}

/// Which page the driver asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page index
    pub index: u32,

    /// Link found by the previous page's next marker, if it had one
    pub url: Option<String>,
}

/// One fetched and extracted page
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub next_url: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_next: bool) -> Self {
        Self {
            items,
            has_next,
            next_url: None,
        }
    }

    /// A page whose next marker is a followable link
    pub fn with_next_url(items: Vec<T>, next_url: Option<String>) -> Self {
        Self {
            items,
            has_next: next_url.is_some(),
            next_url,
        }
    }
}

/// Termination and duplicate policy of one listing
#[derive(Debug, Clone, Copy)]
pub struct PaginationPolicy {
    /// Hard cap on the number of pages fetched
    pub max_pages: u32,

    /// Drop items whose identity was already yielded by this stream
    pub dedupe: bool,
}

struct DriverState<T, F> {
    fetch_page: F,
    page: u32,
    next_url: Option<String>,
    finished: bool,
    seen: HashSet<String>,
    policy: PaginationPolicy,
    _items: std::marker::PhantomData<fn() -> T>,
}

/// Lazily walks pages starting at page 1
///
/// `fetch_page` receives the 1-based page index and the previous page's next
/// link. Nothing is fetched until the stream is polled.
pub fn list_pages<T, F, Fut>(
    policy: PaginationPolicy,
    fetch_page: F,
) -> impl Stream<Item = Result<Vec<T>, KagamiError>>
where
    T: Identified,
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, KagamiError>>,
{
    let state: DriverState<T, F> = DriverState {
        fetch_page,
        page: 1,
        next_url: None,
        finished: false,
        seen: HashSet::new(),
        policy,
        _items: std::marker::PhantomData,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        if state.page > state.policy.max_pages {
            tracing::debug!("Page cap of {} reached", state.policy.max_pages);
            return None;
        }

        let request = PageRequest {
            index: state.page,
            url: state.next_url.take(),
        };

        let page = match (state.fetch_page)(request).await {
            Ok(page) => page,
            Err(e) => {
                state.finished = true;
                return Some((Err(e), state));
            }
        };

        if page.items.is_empty() {
            tracing::debug!("Page {} is empty, stopping", state.page);
            return None;
        }

        let batch = if state.policy.dedupe {
            let seen = &mut state.seen;
            page.items
                .into_iter()
                .filter(|item| seen.insert(item.identity().to_string()))
                .collect()
        } else {
            page.items
        };

        state.finished = !page.has_next;
        state.next_url = page.next_url;
        state.page += 1;
        Some((Ok(batch), state))
    })
}

/// Drains a page stream into one list, failing on the first error
pub async fn collect_all<T, S>(pages: S) -> Result<Vec<T>, KagamiError>
where
    S: Stream<Item = Result<Vec<T>, KagamiError>>,
{
    pages.try_concat().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn entries(ids: &[&str]) -> Vec<CatalogEntry> {
        ids.iter().map(|id| CatalogEntry::new(*id, *id)).collect()
    }

    #[tokio::test]
    async fn test_hard_cap_with_marker_always_present() {
        let calls = AtomicU32::new(0);
        let policy = PaginationPolicy {
            max_pages: 3,
            dedupe: false,
        };

        let pages = list_pages(policy, |request: PageRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            let id = format!("e{}", request.index);
            async move { Ok(Page::new(vec![CatalogEntry::new(id, "t")], true)) }
        });

        let all = collect_all(pages).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_without_next_marker() {
        let policy = PaginationPolicy {
            max_pages: 50,
            dedupe: false,
        };

        let pages = list_pages(policy, |request: PageRequest| async move {
            let page = request.index;
            Ok(Page::new(vec![CatalogEntry::new(format!("e{}", page), "t")], page < 2))
        });

        let all = collect_all(pages).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let policy = PaginationPolicy {
            max_pages: 50,
            dedupe: false,
        };

        let pages = list_pages(policy, |request: PageRequest| async move {
            let items = if request.index == 1 {
                entries(&["a", "b"])
            } else {
                Vec::new()
            };
            Ok(Page::new(items, true))
        });

        let all = collect_all(pages).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_dedupe_across_pages() {
        let policy = PaginationPolicy {
            max_pages: 2,
            dedupe: true,
        };

        let pages = list_pages(policy, |request: PageRequest| async move {
            let items = if request.index == 1 {
                entries(&["X", "A"])
            } else {
                entries(&["X", "B"])
            };
            Ok(Page::new(items, true))
        });

        let all = collect_all(pages).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["X", "A", "B"]);
    }

    #[tokio::test]
    async fn test_duplicates_kept_without_dedupe() {
        let policy = PaginationPolicy {
            max_pages: 2,
            dedupe: false,
        };

        let pages = list_pages(policy, |_: PageRequest| async move {
            Ok(Page::new(entries(&["X"]), true))
        });

        let all = collect_all(pages).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_follows_next_links() {
        let policy = PaginationPolicy {
            max_pages: 10,
            dedupe: false,
        };

        let pages = list_pages(policy, |request: PageRequest| async move {
            let (id, next) = match request.url.as_deref() {
                None => ("first", Some("https://site.example/x?page=b".to_string())),
                Some("https://site.example/x?page=b") => ("second", None),
                Some(other) => panic!("unexpected link {}", other),
            };
            Ok(Page::with_next_url(entries(&[id]), next))
        });

        let all = collect_all(pages).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let policy = PaginationPolicy {
            max_pages: 10,
            dedupe: false,
        };

        let pages = list_pages(policy, |request: PageRequest| async move {
            if request.index == 2 {
                Err(KagamiError::Status {
                    url: "https://site.example/page/2".to_string(),
                    status: 500,
                })
            } else {
                Ok(Page::new(entries(&["a"]), true))
            }
        });

        let result: Result<Vec<CatalogEntry>, _> = collect_all(pages).await;
        assert!(matches!(result, Err(KagamiError::Status { status: 500, .. })));
    }
}
