//! Query construction for in-memory stores.
//!
//! The generic engine knows nothing about record fields. Concrete stores translate
//! caller-facing parameters ([`FilterParams`], paging, sorting) into closures and pass
//! them down as a [`Query`]:
//!
//! - [`Filter`] - predicate selecting matching records
//! - [`Comparator`] - strict "less than" used for a stable sort
//! - [`Projection`] - mapping applied to each returned record
//!
//! # Example
//!
//! ```ignore
//! use datalayer::query::Query;
//!
//! let query = Query::builder()
//!     .filter(|note: &Note| note.author == "alice")
//!     .sort(|a: &Note, b: &Note| a.created < b.created)
//!     .build();
//! ```

use std::{cmp::Ordering, collections::HashMap, fmt};

/// Predicate selecting records for a query or a delete.
pub struct Filter<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Filter<T> {
    /// Wraps a predicate.
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    /// Returns `true` if the record matches.
    pub fn matches(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

/// Strict "less than" ordering between two records.
pub struct Comparator<T>(Box<dyn Fn(&T, &T) -> bool + Send + Sync>);

impl<T> Comparator<T> {
    /// Wraps a "less than" function.
    pub fn new(less: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(less))
    }

    /// Returns `true` if `a` sorts strictly before `b`.
    pub fn less(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }

    /// Derives a total [`Ordering`] from the "less than" function.
    ///
    /// Records where neither is less than the other compare as equal, so a
    /// stable sort keeps their original relative order.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl<T> fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Comparator(..)")
    }
}

/// Mapping applied to each record of a query result.
pub struct Projection<T>(Box<dyn Fn(T) -> T + Send + Sync>);

impl<T> Projection<T> {
    pub fn new(select: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Self(Box::new(select))
    }

    pub fn apply(&self, item: T) -> T {
        (self.0)(item)
    }
}

impl<T> fmt::Debug for Projection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Projection(..)")
    }
}

/// A structured query for retrieving records.
///
/// Every part is optional: an empty query returns all records in storage order.
/// Use [`QueryBuilder`] for ergonomic construction.
#[derive(Debug)]
pub struct Query<T> {
    /// Optional predicate; records not matching it are excluded.
    pub filter: Option<Filter<T>>,
    /// Optional ordering of the matching records.
    pub sort: Option<Comparator<T>>,
    /// Optional mapping applied to each returned record.
    pub select: Option<Projection<T>>,
}

impl<T> Query<T> {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Query {
            filter: None,
            sort: None,
            select: None,
        }
    }

    /// Creates a query with only a filter.
    pub fn filtered(filter: Filter<T>) -> Self {
        Query {
            filter: Some(filter),
            ..Query::new()
        }
    }

    /// Creates a new builder for constructing queries.
    pub fn builder() -> QueryBuilder<T> {
        QueryBuilder::new()
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing [`Query`] instances with a fluent API.
pub struct QueryBuilder<T> {
    query: Query<T>,
}

impl<T> QueryBuilder<T> {
    /// Creates a new query builder with no constraints.
    pub fn new() -> Self {
        QueryBuilder { query: Query::new() }
    }

    /// Sets the filter predicate.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.query.filter = Some(Filter::new(predicate));
        self
    }

    /// Sets the sort order from a strict "less than" function.
    pub fn sort(mut self, less: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        self.query.sort = Some(Comparator::new(less));
        self
    }

    /// Sets the projection applied to returned records.
    pub fn select(mut self, select: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.query.select = Some(Projection::new(select));
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query<T> {
        self.query
    }
}

impl<T> Default for QueryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Named filter values supplied by callers of a concrete store.
///
/// Keys are matched case-insensitively. The concrete store decides which keys it
/// understands and turns them into a [`Filter`].
///
/// # Example
///
/// ```ignore
/// let params = FilterParams::from_tuples([("key", "Key 1")]);
/// let key = params.get_as_nullable_string("Key");
/// let filter = Filter::new(move |d: &Dummy| key.as_ref().is_none_or(|k| &d.key == k));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams(HashMap<String, String>);

impl FilterParams {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builds parameters from key/value pairs.
    pub fn from_tuples<K, V>(tuples: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            tuples
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect()
        )
    }

    /// Sets a parameter.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into().to_lowercase(), value.into());
    }

    /// Returns the parameter value, or `None` when it is absent or empty.
    pub fn get_as_nullable_string(&self, key: &str) -> Option<String> {
        self.0
            .get(&key.to_lowercase())
            .filter(|value| !value.is_empty())
            .cloned()
    }

    /// Returns the parameter value, or `default` when it is absent or empty.
    pub fn get_as_string_with_default(&self, key: &str, default: &str) -> String {
        self.get_as_nullable_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
