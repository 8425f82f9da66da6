//! Query types
//!
//! Defines the immutable [`Query`] value and its builder.

use crate::types::{DEFAULT_PAGE_SIZE, DEFAULT_QUERY_LIMIT};

/// A structured SoQL query.
///
/// Every clause is optional. Clause text is opaque: it is passed to the
/// service verbatim and never parsed here. Once built a query cannot be
/// changed; page requests are derived from it with [`super::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    selection: Vec<String>,
    filter: Option<String>,
    group_by: Option<String>,
    having: Option<String>,
    order_by: Option<String>,
    limit: Option<u32>,
    offset: Option<u64>,
    page_size: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            selection: Vec::new(),
            filter: None,
            group_by: None,
            having: None,
            order_by: None,
            limit: None,
            offset: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Query {
    /// Create an empty query (all rows, all columns)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new query builder
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Column expressions, in order
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// `$where` predicate
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// `$group` clause
    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    /// `$having` clause
    pub fn having(&self) -> Option<&str> {
        self.having.as_deref()
    }

    /// `$order` clause
    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    /// Caller-supplied `$limit`, used by single bounded calls
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Caller-supplied `$offset`, used by single bounded calls
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Rows per page when paginating
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// `$select` value: the selection joined with `", "`, if any
    pub fn select_clause(&self) -> Option<String> {
        if self.selection.is_empty() {
            None
        } else {
            Some(self.selection.join(", "))
        }
    }

    /// Limit and offset for a single bounded call
    pub fn single_request_bounds(&self) -> (u32, u64) {
        (
            self.limit.unwrap_or(DEFAULT_QUERY_LIMIT),
            self.offset.unwrap_or(0),
        )
    }
}

/// Builder for [`Query`]
#[derive(Debug, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Append a single column expression to the selection
    #[must_use]
    pub fn column(mut self, expr: impl Into<String>) -> Self {
        self.query.selection.push(expr.into());
        self
    }

    /// Append several column expressions to the selection
    #[must_use]
    pub fn select<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query
            .selection
            .extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Set the `$where` predicate
    #[must_use]
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.query.filter = Some(predicate.into());
        self
    }

    /// Set the `$group` clause
    #[must_use]
    pub fn group_by(mut self, clause: impl Into<String>) -> Self {
        self.query.group_by = Some(clause.into());
        self
    }

    /// Set the `$having` clause
    #[must_use]
    pub fn having(mut self, clause: impl Into<String>) -> Self {
        self.query.having = Some(clause.into());
        self
    }

    /// Set the `$order` clause
    #[must_use]
    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.query.order_by = Some(clause.into());
        self
    }

    /// Set the `$limit` for single bounded calls
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Set the `$offset` for single bounded calls
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Set rows per page for pagination
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.query.page_size = page_size;
        self
    }

    /// Build the query.
    ///
    /// Blank clauses and blank column expressions are dropped so they are
    /// never sent as empty parameters.
    pub fn build(self) -> Query {
        let mut query = self.query;
        query.selection.retain(|expr| !expr.trim().is_empty());
        query.filter = non_blank(query.filter);
        query.group_by = non_blank(query.group_by);
        query.having = non_blank(query.having);
        query.order_by = non_blank(query.order_by);
        query
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
