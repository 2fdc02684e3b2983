//! Background event loading.
//!
//! Loads run on a worker thread and are polled from the UI loop. Every
//! request gets a ticket; issuing a newer request or cancelling makes older
//! tickets stale, and stale results are reported as cancelled instead of
//! being delivered.

mod source;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::models::event::Event;

pub use source::{EventRecord, EventSource, JsonEventSource, StaticEventSource};

/// Identifies one load request.
pub type LoadTicket = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("event source failed: {0}")]
    Source(String),
    #[error("event loader worker has stopped")]
    WorkerStopped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded {
        ticket: LoadTicket,
        first_day: i32,
        num_days: u32,
        events: Vec<Event>,
    },
    Cancelled {
        ticket: LoadTicket,
    },
    Failed {
        ticket: LoadTicket,
        error: LoadError,
    },
}

impl LoadOutcome {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            LoadOutcome::Loaded { ticket, .. }
            | LoadOutcome::Cancelled { ticket }
            | LoadOutcome::Failed { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LoadRequest {
    ticket: LoadTicket,
    first_day: i32,
    num_days: u32,
}

pub struct EventLoader {
    requests: Option<Sender<LoadRequest>>,
    outcomes: Receiver<LoadOutcome>,
    sequence: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl EventLoader {
    /// Start a worker thread that serves requests from `source`.
    pub fn spawn<S: EventSource>(source: S) -> Self {
        let (request_tx, request_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let sequence = Arc::new(AtomicU64::new(0));

        let worker_sequence = Arc::clone(&sequence);
        let worker = thread::spawn(move || {
            run_worker(source, request_rx, outcome_tx, worker_sequence);
        });

        Self {
            requests: Some(request_tx),
            outcomes: outcome_rx,
            sequence,
            worker: Some(worker),
        }
    }

    /// Queue a load of `num_days` days starting at `first_day`.
    ///
    /// Any request still outstanding becomes stale.
    pub fn request(&self, first_day: i32, num_days: u32) -> Result<LoadTicket, LoadError> {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let request = LoadRequest {
            ticket,
            first_day,
            num_days,
        };

        self.requests
            .as_ref()
            .ok_or(LoadError::WorkerStopped)?
            .send(request)
            .map_err(|_| LoadError::WorkerStopped)?;

        log::debug!(
            "Requested events for {} day(s) from {} (ticket {})",
            num_days,
            first_day,
            ticket
        );
        Ok(ticket)
    }

    /// Make every outstanding request stale.
    pub fn cancel_all(&self) {
        self.sequence.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket
    }

    /// Next finished outcome, if any. Call once per frame.
    pub fn poll(&self) -> Option<LoadOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Event loader worker disconnected unexpectedly");
                None
            }
        }
    }

    /// Stop the worker and wait for it to finish its current load.
    pub fn shutdown(&mut self) {
        self.cancel_all();
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Event loader worker panicked");
            }
        }
    }
}

impl Drop for EventLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<S: EventSource>(
    mut source: S,
    requests: Receiver<LoadRequest>,
    outcomes: Sender<LoadOutcome>,
    sequence: Arc<AtomicU64>,
) {
    while let Ok(mut request) = requests.recv() {
        // Only the newest queued request matters.
        while let Ok(newer) = requests.try_recv() {
            let skipped = LoadOutcome::Cancelled {
                ticket: request.ticket,
            };
            if outcomes.send(skipped).is_err() {
                return;
            }
            request = newer;
        }

        let outcome = serve(&mut source, request, &sequence);
        if outcomes.send(outcome).is_err() {
            return;
        }
    }
    log::debug!("Event loader worker exiting");
}

fn serve<S: EventSource>(
    source: &mut S,
    request: LoadRequest,
    sequence: &AtomicU64,
) -> LoadOutcome {
    let is_stale = || sequence.load(Ordering::SeqCst) != request.ticket;
    if is_stale() {
        return LoadOutcome::Cancelled {
            ticket: request.ticket,
        };
    }

    let loaded = source.load(request.first_day, request.num_days);
    if is_stale() {
        return LoadOutcome::Cancelled {
            ticket: request.ticket,
        };
    }

    match loaded {
        Ok(events) => LoadOutcome::Loaded {
            ticket: request.ticket,
            first_day: request.first_day,
            num_days: request.num_days,
            events: in_range_sorted(events, request.first_day, request.num_days),
        },
        Err(err) => {
            log::error!("Failed to load events: {:#}", err);
            LoadOutcome::Failed {
                ticket: request.ticket,
                error: LoadError::Source(format!("{:#}", err)),
            }
        }
    }
}

/// Keep events overlapping `first_day..first_day + num_days`, in display order.
pub fn in_range_sorted(events: Vec<Event>, first_day: i32, num_days: u32) -> Vec<Event> {
    let last_day = first_day + num_days.max(1) as i32 - 1;
    let mut events: Vec<Event> = events
        .into_iter()
        .filter(|event| event.start_day <= last_day && event.end_day >= first_day)
        .collect();
    events.sort_by(|a, b| a.display_cmp(b));
    events
}
