//! Page sequencer
//!
//! [`PageStream`] walks a result set one `$limit`/`$offset` page at a time.
//! It is a pull-based state object: nothing is requested until the caller
//! polls, and each poll drives at most one request.

use super::types::{CancelHandle, Cursor, PageResult, PagerState, PagerStats};
use crate::error::Result;
use crate::http::Transport;
use crate::query::{build, Query};
use crate::types::Rows;
use futures::future::BoxFuture;
use futures::stream::{FusedStream, Stream};
use futures::{ready, FutureExt, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, warn};

enum Phase {
    /// Waiting for the next pull; fetch at `cursor` when it comes
    Pending { cursor: Cursor },
    /// One request in flight
    Fetching {
        cursor: Cursor,
        fut: BoxFuture<'static, Result<Rows>>,
    },
    Exhausted,
    Failed,
    Cancelled,
}

impl Phase {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed | Self::Cancelled)
    }
}

/// Lazy, finite, cancellable stream of row batches.
///
/// Each item is one page exactly as the transport returned it. The stream
/// ends after a page shorter than the page size, after an empty page, after
/// the first failure (which is yielded as an `Err` item), or on cancellation.
/// Dropping the stream cancels it, so outstanding [`CancelHandle`]s report
/// the traversal as cancelled. A stream cannot be restarted; call `paginate`
/// again to re-traverse.
pub struct PageStream {
    transport: Arc<dyn Transport>,
    dataset_id: Arc<str>,
    query: Arc<Query>,
    page_size: u32,
    phase: Phase,
    cancel: CancelHandle,
    stats: PagerStats,
    last_offset: Option<u64>,
}

impl PageStream {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        dataset_id: Arc<str>,
        query: Arc<Query>,
        page_size: u32,
    ) -> Self {
        Self {
            transport,
            dataset_id,
            query,
            page_size,
            phase: Phase::Pending {
                cursor: Cursor::start(page_size),
            },
            cancel: CancelHandle::default(),
            stats: PagerStats::default(),
            last_offset: None,
        }
    }

    /// Rows requested per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Dataset being traversed
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// The query being traversed
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Statistics so far
    pub fn stats(&self) -> PagerStats {
        self.stats
    }

    /// Current state
    pub fn state(&self) -> PagerState {
        if self.cancel.is_cancelled() && !self.phase.is_terminal() {
            return PagerState::Cancelled;
        }
        match self.phase {
            Phase::Pending { .. } if self.stats.pages_fetched == 0 => PagerState::Idle,
            Phase::Pending { .. } => PagerState::Yielding,
            Phase::Fetching { .. } => PagerState::Fetching,
            Phase::Exhausted => PagerState::Exhausted,
            Phase::Failed => PagerState::Failed,
            Phase::Cancelled => PagerState::Cancelled,
        }
    }

    /// A handle that cancels this traversal from anywhere
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Cancel the traversal. Any in-flight request is dropped.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.observe_cancel();
    }

    /// Pull the next batch
    pub async fn next_page(&mut self) -> Option<Result<Rows>> {
        self.next().await
    }

    fn observe_cancel(&mut self) {
        if self.cancel.is_cancelled() && !self.phase.is_terminal() {
            debug!(
                "Traversal of {} cancelled after {} pages",
                self.dataset_id, self.stats.pages_fetched
            );
            self.phase = Phase::Cancelled;
        }
    }

    fn start_fetch(&self, cursor: Cursor) -> BoxFuture<'static, Result<Rows>> {
        let request = build(&self.query, self.page_size, cursor.offset);
        let transport = Arc::clone(&self.transport);
        let dataset_id = Arc::clone(&self.dataset_id);

        debug!(
            "Fetching {} at offset {} (limit {})",
            dataset_id, cursor.offset, self.page_size
        );
        async move { transport.fetch_page(&dataset_id, &request).await }.boxed()
    }

    fn finish_fetch(&mut self, cursor: Cursor, result: Result<Rows>) -> Option<Result<Rows>> {
        self.stats.add_page();

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Fetch of {} at offset {} failed: {e}",
                    self.dataset_id, cursor.offset
                );
                self.phase = Phase::Failed;
                return Some(Err(e));
            }
        };

        self.check_page(&PageResult {
            offset: cursor.offset,
            rows: &rows,
        });

        if rows.is_empty() {
            debug!("{} exhausted at offset {}", self.dataset_id, cursor.offset);
            self.phase = Phase::Exhausted;
            return None;
        }

        if rows.len() < self.page_size as usize {
            // A short page is the end of the data; no confirming request.
            debug!(
                "{} exhausted after short page of {} rows",
                self.dataset_id,
                rows.len()
            );
            self.phase = Phase::Exhausted;
        } else {
            self.phase = Phase::Pending {
                cursor: cursor.advance(),
            };
        }

        self.stats.add_rows(rows.len());
        Some(Ok(rows))
    }

    fn check_page(&mut self, page: &PageResult<'_>) {
        debug_assert!(
            self.last_offset.map_or(page.offset == 0, |last| page.offset > last),
            "page offsets must start at 0 and strictly increase"
        );
        debug!(
            "{} page at offset {}: {} rows",
            self.dataset_id,
            page.offset,
            page.rows.len()
        );
        self.last_offset = Some(page.offset);
    }
}

impl Stream for PageStream {
    type Item = Result<Rows>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.cancel.register(cx.waker());

        loop {
            this.observe_cancel();

            match &mut this.phase {
                Phase::Pending { cursor } => {
                    let cursor = *cursor;
                    let fut = this.start_fetch(cursor);
                    this.phase = Phase::Fetching { cursor, fut };
                }
                Phase::Fetching { cursor, fut } => {
                    let result = ready!(fut.poll_unpin(cx));
                    let cursor = *cursor;
                    return Poll::Ready(this.finish_fetch(cursor, result));
                }
                Phase::Exhausted | Phase::Failed | Phase::Cancelled => {
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl Drop for PageStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl FusedStream for PageStream {
    fn is_terminated(&self) -> bool {
        self.phase.is_terminal()
    }
}

impl std::fmt::Debug for PageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStream")
            .field("dataset_id", &self.dataset_id)
            .field("page_size", &self.page_size)
            .field("state", &self.state())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
