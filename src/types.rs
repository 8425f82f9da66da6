//! Common types used throughout soda-client
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// A single result row: field name to untyped JSON value.
///
/// Rows are passed through as the service returned them; nothing in the
/// crate inspects their contents.
pub type Row = serde_json::Map<String, JsonValue>;

/// One page of rows
pub type Rows = Vec<Row>;

// ============================================================================
// Service Limits
// ============================================================================

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Largest `$limit` the service accepts for a single request
pub const MAX_PAGE_SIZE: u32 = 50_000;

/// Row limit for a single bounded `query` call without an explicit limit
pub const DEFAULT_QUERY_LIMIT: u32 = 100;

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
