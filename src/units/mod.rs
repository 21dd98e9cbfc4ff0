//! Unit (episode / chapter) listing
//!
//! Two layouts are supported:
//! - **Flat**: the entry page (optionally paginated) lists every unit. A
//!   fetch failure propagates, since no partial result is possible.
//! - **Grouped**: the entry page lists groups (seasons, volumes, language
//!   tracks) which are fetched independently with bounded concurrency. A
//!   failing group is logged and treated as empty.
//!
//! Units are put into canonical oldest-first order (stable ascending
//! ordinal sort, ties kept) and reversed last when newest-first is
//! requested. Grouped lists are sorted per group and concatenated in group
//! order, so seasons that restart their numbering stay contiguous.

mod order;
mod page;

pub use order::{arrange, merge_groups, sort_canonical, to_oldest_first};
pub use page::{find_groups, units_page, UnitGroup};

use crate::config::{UnitLayout, UnitsConfig};
use crate::fetch::Fetcher;
use crate::model::Unit;
use crate::paginate::{collect_all, list_pages, PageRequest, PaginationPolicy};
use crate::KagamiError;
use futures::stream::{self, StreamExt};

/// Lists the units of one entry
pub struct UnitLister<'a> {
    fetcher: &'a Fetcher,
    config: &'a UnitsConfig,
    max_concurrency: usize,
}

impl<'a> UnitLister<'a> {
    pub fn new(fetcher: &'a Fetcher, config: &'a UnitsConfig, max_concurrency: usize) -> Self {
        Self {
            fetcher,
            config,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Lists every unit of the entry at `entry_url`, in the configured order
    ///
    /// # Arguments
    ///
    /// * `entry_url` - Absolute URL of the entry's detail page
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Unit>)` - Units, rebuilt from scratch on every call
    /// * `Err(KagamiError)` - The entry page (or a flat page) failed
    pub async fn list(&self, entry_url: &str) -> Result<Vec<Unit>, KagamiError> {
        let units = match self.config.layout {
            UnitLayout::Flat => {
                let units = self.collect_pages(entry_url, None).await?;
                arrange(units, self.config.order)
            }
            UnitLayout::Grouped => {
                let groups = self.list_grouped(entry_url).await?;
                merge_groups(groups, self.config.order)
            }
        };

        tracing::debug!("Listed {} units for {}", units.len(), entry_url);
        Ok(units)
    }

    /// Fetches groups concurrently; one unit list per group, in group order
    async fn list_grouped(&self, entry_url: &str) -> Result<Vec<Vec<Unit>>, KagamiError> {
        let document = self.fetcher.fetch(entry_url).await?;
        let groups = find_groups(&document, self.config)?;

        if groups.is_empty() {
            tracing::debug!("No unit groups on {}, reading the entry page", entry_url);
            let page = units_page(&document, self.config, None)?;
            return Ok(vec![to_oldest_first(page.items, self.config.page_order)]);
        }

        tracing::debug!("Fetching {} unit groups for {}", groups.len(), entry_url);

        let results: Vec<Vec<Unit>> = stream::iter(groups.iter())
            .map(|group| async move {
                match self.collect_pages(&group.url, Some(&group.label)).await {
                    Ok(units) => units,
                    Err(e) => {
                        tracing::warn!(
                            "Unit group '{}' ({}) failed, treating as empty: {}",
                            group.label,
                            group.url,
                            e
                        );
                        Vec::new()
                    }
                }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        Ok(results)
    }

    /// Walks one paginated unit list and returns it oldest-first
    async fn collect_pages(
        &self,
        start_url: &str,
        group: Option<&str>,
    ) -> Result<Vec<Unit>, KagamiError> {
        let policy = PaginationPolicy {
            max_pages: self.config.max_pages,
            dedupe: false,
        };

        let pages = list_pages(policy, |request: PageRequest| {
            let url = request.url.unwrap_or_else(|| start_url.to_string());
            async move {
                let document = self.fetcher.fetch(&url).await?;
                units_page(&document, self.config, group)
            }
        });

        let units = collect_all(pages).await?;
        Ok(to_oldest_first(units, self.config.page_order))
    }
}
