// src/crawl/queue.rs
// =============================================================================
// This module holds the crawl frontier: addresses found but not yet visited.
//
// Two implementations share the `Frontier` trait:
//
// FifoQueue (sequential crawl)
// - one worker, strict first-in first-out order
// - a HashSet rejects addresses that were ever queued before
// - "done" simply means the queue is empty
//
// TaskQueue (parallel crawl)
// - many workers push and pull at the same time
// - a concurrent set claims each address the first time anyone sees it
// - an outstanding-work counter tracks queued-but-unfinished addresses;
//   when it reaches zero the queue closes and every waiting worker wakes up
//   with None
// - the channel is bounded, but pushing never blocks: when it is full the
//   address goes to an unbounded spill queue instead, so workers can't
//   deadlock waiting on each other
//
// The one ordering rule that makes completion safe:
//   a page's children are enqueued (counter +1 each) BEFORE the page
//   itself is finished (counter -1). The counter can't touch zero while
//   any worker still holds work that might produce more.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashSet;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tracing::debug;

use crate::scope::Address;

/// Work list of addresses that still need visiting.
#[async_trait]
pub trait Frontier: Send + Sync {
    /// Queues an address. Returns true only the first time this address
    /// (by dedup key) is ever offered.
    fn try_enqueue(&self, address: Address) -> bool;

    /// Next address to visit, or None once the crawl is complete.
    async fn next_or_done(&self) -> Option<Address>;

    /// Stops accepting and handing out work.
    fn close(&self);
}

// -----------------------------------------------------------------------------
// FifoQueue
// -----------------------------------------------------------------------------

#[derive(Default)]
struct FifoState {
    elements: VecDeque<Address>,
    seen: HashSet<String>,
    closed: bool,
}

/// Insertion-ordered frontier for a single worker.
#[derive(Default)]
pub struct FifoQueue {
    // Uncontended: the sequential crawl has exactly one caller.
    state: Mutex<FifoState>,
}

impl FifoQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Frontier for FifoQueue {
    fn try_enqueue(&self, address: Address) -> bool {
        let mut state = self.state.lock();
        if state.closed || !state.seen.insert(address.key().to_string()) {
            return false;
        }
        state.elements.push_back(address);
        true
    }

    async fn next_or_done(&self) -> Option<Address> {
        self.state.lock().elements.pop_front()
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.elements.clear();
    }
}

// -----------------------------------------------------------------------------
// TaskQueue
// -----------------------------------------------------------------------------

/// Shared frontier for the parallel crawl.
///
/// No visit order is promised; every address is handed out exactly once.
pub struct TaskQueue {
    // Taken (dropped) on close, which ends the channel for every receiver.
    sender: Mutex<Option<mpsc::Sender<Address>>>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<Address>>,
    spill: Mutex<VecDeque<Address>>,
    spilled: Notify,
    queued: DashSet<String>,
    started: DashSet<String>,
    outstanding: AtomicUsize,
    closed: AtomicBool,
}

impl TaskQueue {
    /// Creates the queue with `seed` already queued and counted.
    pub fn new(seed: Address, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let queue = Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            spill: Mutex::new(VecDeque::new()),
            spilled: Notify::new(),
            queued: DashSet::new(),
            started: DashSet::new(),
            outstanding: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        };
        queue.try_enqueue(seed);
        queue
    }

    /// Addresses queued but not yet finished.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Addresses currently waiting in the overflow queue.
    #[cfg(test)]
    pub fn spilled(&self) -> usize {
        self.spill.lock().len()
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Takes exclusive ownership of an address before fetching it.
    ///
    /// Enqueue already claims atomically, so this only fails if the same
    /// address was somehow handed out twice.
    pub fn claim(&self, address: &Address) -> bool {
        self.started.insert(address.key().to_string())
    }

    /// Marks one dequeued address as fully processed.
    ///
    /// Must be called exactly once per address handed out by
    /// `next_or_done`, after its children were enqueued. Prefer
    /// `in_flight`, which calls this on drop.
    pub fn finish(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "finish called more often than enqueue");
        if previous == 1 {
            debug!("outstanding work reached zero, closing queue");
            self.close();
        }
    }

    /// Guard that finishes the current address when dropped, even if the
    /// worker panics while processing it.
    pub fn in_flight(&self) -> InFlight<'_> {
        InFlight { queue: self }
    }
}

#[async_trait]
impl Frontier for TaskQueue {
    fn try_enqueue(&self, address: Address) -> bool {
        // Nothing goes in once the crawl has finished
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        // DashSet::insert is atomic: of two workers finding the same link,
        // exactly one gets true here
        if !self.queued.insert(address.key().to_string()) {
            return false;
        }

        // Count it before any consumer can see it.
        self.outstanding.fetch_add(1, Ordering::SeqCst);

        // Clone the sender so the lock isn't held while sending
        // None means the queue was closed in the meantime
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else {
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
            return false;
        };

        // Never wait for a free slot: a worker blocked here could be the one
        // that would have drained the channel
        match sender.try_send(address) {
            Ok(()) => true,
            Err(TrySendError::Full(address)) => {
                debug!(url = %address, "queue full, spilling");
                self.spill.lock().push_back(address);
                self.spilled.notify_one();
                true
            }
            Err(TrySendError::Closed(_)) => {
                self.outstanding.fetch_sub(1, Ordering::SeqCst);
                false
            }
        }
    }

    async fn next_or_done(&self) -> Option<Address> {
        loop {
            // Check the overflow queue first
            let spilled = self.spill.lock().pop_front();
            if let Some(address) = spilled {
                return Some(address);
            }

            // One worker at a time waits on the channel; the rest queue up
            // on this lock. recv() gives None once every sender is dropped
            let mut receiver = self.receiver.lock().await;
            tokio::select! {
                address = receiver.recv() => return address,
                // something landed in the spill queue; go look there first
                _ = self.spilled.notified() => continue,
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.sender.lock().take();
    }
}

/// Finishes one unit of outstanding work on drop.
pub struct InFlight<'a> {
    queue: &'a TaskQueue,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.queue.finish();
    }
}
