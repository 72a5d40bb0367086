//! Crawl frontier
//!
//! This module handles:
//! - FIFO ordering of requests waiting to be rendered
//! - Depth bounding and dedup at enqueue time
//! - Parking failed requests until their retry delay has elapsed
//! - Per-run input/output/error counters

use crate::dedup::DedupFilter;
use crate::output::CrawlStats;
use crate::state::{CrawlRequest, Metadata};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Why an enqueue was a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The request is deeper than the configured maximum
    TooDeep { depth: u32, max_depth: u32 },
    /// The dedup filter has already seen the URL
    AlreadySeen,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooDeep { depth, max_depth } => {
                write!(f, "depth {} exceeds max depth {}", depth, max_depth)
            }
            Rejection::AlreadySeen => write!(f, "already seen"),
        }
    }
}

/// A retry waiting for its delay to elapse
#[derive(Debug)]
struct ParkedRequest {
    eligible_at: Instant,
    /// Insertion order, breaks ties between equal deadlines
    seq: u64,
    request: CrawlRequest,
}

// Reversed so the earliest deadline is popped first from the BinaryHeap
impl Ord for ParkedRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .eligible_at
            .cmp(&self.eligible_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ParkedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParkedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.eligible_at == other.eligible_at && self.seq == other.seq
    }
}

impl Eq for ParkedRequest {}

/// The set of requests still to be crawled in a run
///
/// The frontier is owned by a single coordinator and never shared.
#[derive(Debug)]
pub struct Frontier {
    pending: VecDeque<CrawlRequest>,
    parked: BinaryHeap<ParkedRequest>,
    filter: Option<DedupFilter>,
    max_depth: u32,
    stats: CrawlStats,
    next_seq: u64,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Deepest request depth that may be enqueued
    /// * `filter` - Dedup filter, or None to allow revisits
    pub fn new(max_depth: u32, filter: Option<DedupFilter>) -> Self {
        Self {
            pending: VecDeque::new(),
            parked: BinaryHeap::new(),
            filter,
            max_depth,
            stats: CrawlStats::default(),
            next_seq: 0,
        }
    }

    /// Adds a URL at the given depth
    pub fn enqueue(&mut self, url: &Url, depth: u32) -> Result<(), Rejection> {
        self.enqueue_with_metadata(url, depth, None)
    }

    /// Adds a URL at the given depth, carrying metadata into its record
    ///
    /// The URL is marked seen here, not when it is rendered, so a page that
    /// is linked twice before it is visited is still queued once.
    pub fn enqueue_with_metadata(
        &mut self,
        url: &Url,
        depth: u32,
        metadata: Option<Metadata>,
    ) -> Result<(), Rejection> {
        if depth > self.max_depth {
            return Err(Rejection::TooDeep {
                depth,
                max_depth: self.max_depth,
            });
        }

        if let Some(filter) = &mut self.filter {
            if filter.seen(url) {
                return Err(Rejection::AlreadySeen);
            }
            filter.mark(url);
        }

        self.pending
            .push_back(CrawlRequest::new(url.as_str(), depth).with_metadata(metadata));
        self.stats.count_input += 1;
        Ok(())
    }

    /// Takes the next ready request, if any
    ///
    /// Parked requests whose delay has elapsed join the back of the queue
    /// first.
    pub fn dequeue(&mut self) -> Option<CrawlRequest> {
        self.promote_ready(Instant::now());
        self.pending.pop_front()
    }

    /// Parks a request until `delay` has elapsed
    ///
    /// Depth and dedup checks are skipped; the request was accepted already.
    pub fn reenqueue(&mut self, request: CrawlRequest, delay: Duration) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.parked.push(ParkedRequest {
            eligible_at: Instant::now() + delay,
            seq,
            request,
        });
    }

    /// Waits for the next request
    ///
    /// Suspends until a parked request becomes eligible when nothing is ready.
    /// Returns None only when both queues are empty.
    pub async fn next_request(&mut self) -> Option<CrawlRequest> {
        loop {
            if let Some(request) = self.dequeue() {
                return Some(request);
            }

            let eligible_at = self.parked.peek()?.eligible_at;
            tracing::debug!(
                "Waiting {:?} for {} parked request(s)",
                eligible_at.saturating_duration_since(Instant::now()),
                self.parked.len()
            );
            tokio::time::sleep_until(eligible_at).await;
        }
    }

    /// Marks a URL as seen without queueing or counting it
    pub fn mark_visited(&mut self, url: &Url) {
        if let Some(filter) = &mut self.filter {
            filter.mark(url);
        }
    }

    pub fn record_success(&mut self) {
        self.stats.count_output += 1;
    }

    pub fn record_error(&mut self) {
        self.stats.count_error += 1;
    }

    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn parked_len(&self) -> usize {
        self.parked.len()
    }

    /// True when no request is queued or parked
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.parked.is_empty()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn promote_ready(&mut self, now: Instant) {
        while self
            .parked
            .peek()
            .is_some_and(|parked| parked.eligible_at <= now)
        {
            if let Some(parked) = self.parked.pop() {
                self.pending.push_back(parked.request);
            }
        }
    }
}
