//! Paging and result types for query results.
//!
//! This module provides [`DataPage`] for returning a slice of a larger result set
//! and [`PagingParams`] for describing which slice a caller wants.

use serde::{Deserialize, Serialize};

/// A single page of query results.
///
/// # Type Parameters
///
/// * `T` - The type of items contained in this page
///
/// # Example
///
/// ```ignore
/// use datalayer::page::DataPage;
///
/// let page: DataPage<String> = DataPage::builder(vec!["item1".to_string()])
///     .with_total(Some(100))
///     .build();
///
/// assert_eq!(page.data.len(), 1);
/// assert_eq!(page.total, Some(100));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DataPage<T> {
    /// The items contained in this page.
    pub data: Vec<T>,
    /// Number of matching items before skip/take were applied, when requested.
    pub total: Option<usize>,
}

impl<T> DataPage<T> {
    /// Creates a page from its items and optional total.
    pub fn new(data: Vec<T>, total: Option<usize>) -> Self {
        Self { data, total }
    }

    /// Creates a new builder for constructing a page.
    pub fn builder(data: Vec<T>) -> DataPageBuilder<T> {
        DataPageBuilder::new(data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for DataPage<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: None,
        }
    }
}

/// Builder for constructing [`DataPage`] instances with fluent API.
pub struct DataPageBuilder<T> {
    data: Vec<T>,
    total: Option<usize>,
}

impl<T> DataPageBuilder<T> {
    /// Creates a new builder with the given items.
    pub fn new(data: Vec<T>) -> Self {
        Self { data, total: None }
    }

    /// Sets the total count of matching items across all pages.
    pub fn with_total(mut self, total: Option<usize>) -> Self {
        self.total = total;
        self
    }

    /// Builds and returns the final [`DataPage`] instance.
    pub fn build(self) -> DataPage<T> {
        DataPage {
            data: self.data,
            total: self.total,
        }
    }
}

/// Parameters selecting a slice of a result set.
///
/// `skip` is the number of leading items to drop, `take` the maximum number of
/// items to return and `total` asks the store to report the unpaginated count.
///
/// # Example
///
/// ```ignore
/// use datalayer::page::PagingParams;
///
/// let params = PagingParams::new(Some(20), Some(10), true);
/// assert_eq!(params.get_skip(0), 20);
/// assert_eq!(params.get_take(100), 10);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PagingParams {
    /// Number of items to skip.
    pub skip: Option<usize>,
    /// Maximum number of items to return.
    pub take: Option<usize>,
    /// Whether to compute the total number of matching items.
    #[serde(default)]
    pub total: bool,
}

impl PagingParams {
    /// Creates new paging parameters.
    pub fn new(skip: Option<usize>, take: Option<usize>, total: bool) -> Self {
        Self { skip, take, total }
    }

    /// Creates a new builder for constructing paging parameters.
    pub fn builder() -> PagingParamsBuilder {
        PagingParamsBuilder::new()
    }

    /// Returns the number of items to skip, never less than `min_skip`.
    pub fn get_skip(&self, min_skip: usize) -> usize {
        self.skip.map_or(min_skip, |skip| skip.max(min_skip))
    }

    /// Returns the number of items to take, defaulting to and capped at `max_take`.
    pub fn get_take(&self, max_take: usize) -> usize {
        self.take.map_or(max_take, |take| take.min(max_take))
    }

    /// Extracts the requested slice of `items`.
    ///
    /// `total`, when requested, is the length of `items` before anything is skipped.
    /// A skip past the end yields an empty page.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let items: Vec<i32> = (1..=100).collect();
    /// let page = PagingParams::new(Some(10), Some(10), true).paginate(items, 100);
    ///
    /// assert_eq!(page.data, vec![11, 12, 13, 14, 15, 16, 17, 18, 19, 20]);
    /// assert_eq!(page.total, Some(100));
    /// ```
    pub fn paginate<T>(&self, mut items: Vec<T>, max_take: usize) -> DataPage<T> {
        let total = self.total.then_some(items.len());
        let skip = self.get_skip(0).min(items.len());
        let take = self.get_take(max_take);

        items.drain(..skip);
        items.truncate(take);

        DataPage::builder(items)
            .with_total(total)
            .build()
    }
}

/// Builder for constructing [`PagingParams`] instances.
pub struct PagingParamsBuilder {
    skip: Option<usize>,
    take: Option<usize>,
    total: bool,
}

impl PagingParamsBuilder {
    /// Creates a new builder with no parameters set.
    pub fn new() -> Self {
        Self { skip: None, take: None, total: false }
    }

    /// Sets the number of items to skip.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of items to return.
    pub fn with_take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    /// Requests the total count of matching items.
    pub fn with_total(mut self, total: bool) -> Self {
        self.total = total;
        self
    }

    /// Builds and returns the [`PagingParams`].
    pub fn build(self) -> PagingParams {
        PagingParams {
            skip: self.skip,
            take: self.take,
            total: self.total,
        }
    }
}

impl Default for PagingParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_take_everything_up_to_max() {
        let page = PagingParams::default().paginate((0..10).collect(), 4);

        assert_eq!(page.data, vec![0, 1, 2, 3]);
        assert_eq!(page.total, None);
    }

    #[test]
    fn take_is_capped_by_max_page_size() {
        let params = PagingParams::builder().with_take(50).build();

        assert_eq!(params.get_take(20), 20);
        assert_eq!(params.get_take(100), 50);
    }

    #[test]
    fn total_is_counted_before_skip_and_take() {
        let params = PagingParams::builder()
            .with_skip(3)
            .with_take(2)
            .with_total(true)
            .build();

        let page = params.paginate((0..10).collect(), 100);

        assert_eq!(page.data, vec![3, 4]);
        assert_eq!(page.total, Some(10));
    }

    #[test]
    fn skip_past_the_end_is_empty() {
        let params = PagingParams::new(Some(15), None, true);

        let page = params.paginate((0..10).collect::<Vec<u8>>(), 100);

        assert!(page.is_empty());
        assert_eq!(page.total, Some(10));
    }

    #[test]
    fn page_size_follows_min_of_take_and_remaining() {
        for n in 0..6usize {
            for k in 0..8usize {
                for m in 0..8usize {
                    let page = PagingParams::new(Some(k), Some(m), false)
                        .paginate((0..n).collect(), 100);

                    assert_eq!(page.len(), m.min(n.saturating_sub(k)));
                }
            }
        }
    }
}
