//! Request builder
//!
//! Derives transport parameters from a [`Query`].

use super::types::Query;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved SoQL parameter names
pub mod params {
    pub const SELECT: &str = "$select";
    pub const WHERE: &str = "$where";
    pub const GROUP: &str = "$group";
    pub const HAVING: &str = "$having";
    pub const ORDER: &str = "$order";
    pub const LIMIT: &str = "$limit";
    pub const OFFSET: &str = "$offset";
}

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Clause text, sent verbatim
    Text(String),
    /// Numeric pagination control
    Integer(u64),
}

impl ParamValue {
    /// Text value, if this is a text parameter
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    /// Integer value, if this is an integer parameter
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// Transport-ready parameters for one request.
///
/// Only present clauses appear; `$limit` and `$offset` are always set.
/// Iteration order is sorted by key, so equal requests serialize equally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    params: BTreeMap<&'static str, ParamValue>,
}

impl PageRequest {
    /// Look up a parameter by its reserved name
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Check whether a parameter is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no parameters (never true for built requests)
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The `$limit` value
    pub fn limit(&self) -> u64 {
        self.get(params::LIMIT)
            .and_then(ParamValue::as_u64)
            .unwrap_or_default()
    }

    /// The `$offset` value
    pub fn offset(&self) -> u64 {
        self.get(params::OFFSET)
            .and_then(ParamValue::as_u64)
            .unwrap_or_default()
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (*k, v))
    }

    /// Render as query-string pairs for the HTTP client
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        self.iter().map(|(k, v)| (k, v.to_string())).collect()
    }
}

/// Build the parameters for one page.
///
/// Every clause present on `query` is copied under its reserved name, then
/// `$limit` and `$offset` are set from the overrides. A `limit`/`offset` set
/// on the query itself is ignored here: explicit pagination controls win.
pub fn build(query: &Query, limit: u32, offset: u64) -> PageRequest {
    let mut map = BTreeMap::new();

    if let Some(select) = query.select_clause() {
        map.insert(params::SELECT, ParamValue::Text(select));
    }

    let clauses = [
        (params::WHERE, query.filter()),
        (params::GROUP, query.group_by()),
        (params::HAVING, query.having()),
        (params::ORDER, query.order_by()),
    ];
    for (key, value) in clauses {
        if let Some(value) = value {
            map.insert(key, ParamValue::Text(value.to_string()));
        }
    }

    map.insert(params::LIMIT, ParamValue::Integer(u64::from(limit)));
    map.insert(params::OFFSET, ParamValue::Integer(offset));

    PageRequest { params: map }
}
