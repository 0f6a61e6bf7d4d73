// src/checker/pool.rs
// =============================================================================
// Runs liveness probes for a whole list of bookmarks with bounded concurrency.
//
// How it works:
// 1. Every record with an http(s) URL becomes a job tagged with its index
// 2. The jobs go through a stream with .buffer_unordered(N): at most N probes
//    are in flight, and a new one starts as soon as one finishes
// 3. Each finished probe writes its result into the slot for its index, so the
//    output order is the input order no matter which probe finishes first
// 4. If the `stop` future fires (deadline or Ctrl-C) the remaining probes are
//    dropped and their records come back as Unknown
//
// Everything runs on the calling task. There are no threads and no locks: the
// buffer size is the only limit, and no two probes ever share a slot.
// =============================================================================

use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use url::Url;

use super::{CheckError, LinkState, StatusResult};
use crate::bookmarks::FlatRecord;

/// Something that can decide whether a URL is alive
///
/// Implementations must not fail: every outcome is a StatusResult.
pub trait Probe: Sync {
    fn probe<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StatusResult>;
}

/// Counts of each outcome after a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub active: usize,
    pub down: usize,
    pub unknown: usize,
    /// Down records that answered 404 specifically
    pub not_found: usize,
    /// Records that were never probed (empty or non-http URL)
    pub skipped: usize,
}

impl CheckSummary {
    fn tally(records: &[FlatRecord], skipped: usize) -> Self {
        let mut summary = CheckSummary {
            skipped,
            ..CheckSummary::default()
        };
        for status in records.iter().filter_map(|r| r.status.as_ref()) {
            match status.state {
                LinkState::Active => summary.active += 1,
                LinkState::Down => summary.down += 1,
                LinkState::Unknown => summary.unknown += 1,
            }
            if status.code == Some(404) {
                summary.not_found += 1;
            }
        }
        summary
    }
}

/// Records with their statuses filled in, plus how the run went
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub records: Vec<FlatRecord>,
    pub summary: CheckSummary,
    /// Number of probes that finished before the run ended
    pub completed: usize,
    /// True when `stop` fired before every probe finished
    pub interrupted: bool,
}

/// Only http and https URLs are probed
pub fn is_probeable(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Probes every record's URL with at most `concurrency` probes in flight
///
/// Parameters:
///   records:     flattened bookmarks, returned in the same order
///   probe:       performs a single probe
///   concurrency: admission bound, must be at least 1
///   stop:        when this completes, in-flight probes are abandoned
///   on_result:   called once per finished probe (progress reporting)
///
/// Every returned record has `status` set. The only error is an invalid
/// concurrency bound; network failures are recorded per record.
pub async fn check_records<P, S, F>(
    mut records: Vec<FlatRecord>,
    probe: &P,
    concurrency: usize,
    stop: S,
    mut on_result: F,
) -> Result<CheckReport, CheckError>
where
    P: Probe + ?Sized,
    S: Future<Output = ()>,
    F: FnMut(&FlatRecord, &StatusResult),
{
    if concurrency == 0 {
        return Err(CheckError::InvalidConcurrency);
    }

    // One slot per record, filled by index
    let mut slots: Vec<Option<StatusResult>> = vec![None; records.len()];
    let mut skipped = 0;
    let mut queue = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if is_probeable(&record.url) {
            queue.push((index, record.url.clone()));
        } else {
            log::debug!("not probing \"{}\" ({:?})", record.name, record.url);
            slots[index] = Some(StatusResult::unknown());
            skipped += 1;
        }
    }

    let mut in_flight = stream::iter(queue)
        .map(|(index, url)| async move {
            let result = probe.probe(&url).await;
            (index, result)
        })
        .buffer_unordered(concurrency);

    tokio::pin!(stop);
    let mut completed = 0;
    let mut interrupted = false;

    loop {
        tokio::select! {
            next = in_flight.next() => match next {
                Some((index, result)) => {
                    on_result(&records[index], &result);
                    slots[index] = Some(result);
                    completed += 1;
                }
                None => break,
            },
            _ = &mut stop => {
                interrupted = true;
                break;
            }
        }
    }

    // Abandon whatever is still running
    drop(in_flight);

    for (record, slot) in records.iter_mut().zip(slots) {
        record.status = Some(slot.unwrap_or_else(StatusResult::unknown));
    }

    let summary = CheckSummary::tally(&records, skipped);
    Ok(CheckReport {
        records,
        summary,
        completed,
        interrupted,
    })
}
