//! Engine types
//!
//! Traversal state, statistics and the cancellation handle.

use crate::types::Row;
use futures::task::AtomicWaker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Waker;

/// Observable state of a [`super::PageStream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    /// Created, nothing fetched yet
    Idle,
    /// A request is in flight
    Fetching,
    /// A full page was handed out; the next pull fetches the next one
    Yielding,
    /// No rows remain
    Exhausted,
    /// A fetch failed; the failure was handed to the caller
    Failed,
    /// The caller cancelled the traversal
    Cancelled,
}

impl PagerState {
    /// Check if no further requests will be made
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed | Self::Cancelled)
    }
}

/// Statistics for one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagerStats {
    /// Requests that completed (successfully or not)
    pub pages_fetched: usize,
    /// Rows handed to the caller
    pub rows_yielded: usize,
}

impl PagerStats {
    /// Add a completed request
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add rows handed out
    pub fn add_rows(&mut self, count: usize) {
        self.rows_yielded += count;
    }
}

/// Offset tracker for a single traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub offset: u64,
    page_size: u32,
}

impl Cursor {
    pub fn start(page_size: u32) -> Self {
        Self {
            offset: 0,
            page_size,
        }
    }

    /// The cursor for the page after this one
    pub fn advance(self) -> Self {
        Self {
            offset: self.offset + u64::from(self.page_size),
            ..self
        }
    }
}

/// A fetched page tagged with its offset, for invariant checks
pub(crate) struct PageResult<'a> {
    pub offset: u64,
    pub rows: &'a [Row],
}

/// Shared flag used to cancel a traversal, possibly from another task.
///
/// Cancellation is observed before each fetch and before the result of an
/// in-flight fetch is handed out. A consumer parked on the stream is woken
/// when the flag is set.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    waker: AtomicWaker,
}

impl CancelHandle {
    /// Request cancellation
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.waker.wake();
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wake `waker` on the next `cancel`, replacing any earlier registration
    pub(crate) fn register(&self, waker: &Waker) {
        self.inner.waker.register(waker);
    }
}
