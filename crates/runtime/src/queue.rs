//! Tick-ordered network queue.
//!
//! Entries are keyed by `(tick, arrival sequence)` and never reordered once
//! accepted. The transport thread hands entries over through a
//! [`QueueSender`]; the tick thread drains that inbox at the start of every
//! [`ActionQueue::process`] call and is the only place entries are applied.

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::mpsc;

use park_core::{Action, ActionResult, CommandKind, NetworkId, Tick, decode};

use crate::error::{Result, RuntimeError};

/// Completion callback, invoked exactly once with the Execute result.
pub type Completion = Box<dyn FnOnce(&Action, &ActionResult) + Send>;

/// Entry handed over by the transport thread.
#[derive(Debug)]
struct Inbound {
    tick: Tick,
    action: Action,
}

/// Producer half of the queue inbox. Cheap to clone; send from any thread.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl QueueSender {
    /// Hands a decoded action to the queue.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InboxClosed`] once the queue has been dropped.
    pub fn send(&self, tick: Tick, action: Action) -> Result<()> {
        self.tx
            .send(Inbound { tick, action })
            .map_err(|_| RuntimeError::InboxClosed)
    }

    /// Decodes a wire payload and hands it to the queue.
    ///
    /// # Errors
    ///
    /// Fails on undecodable bytes or a closed inbox; nothing is queued then.
    pub fn send_encoded(&self, tick: Tick, bytes: &[u8]) -> Result<()> {
        let action = decode(bytes)?;
        self.send(tick, action)
    }
}

/// An accepted entry waiting for its tick.
pub struct QueuedAction {
    pub tick: Tick,
    pub sequence: u64,
    pub action: Action,
    callback: Option<Completion>,
}

impl fmt::Debug for QueuedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedAction")
            .field("tick", &self.tick)
            .field("sequence", &self.sequence)
            .field("action", &self.action)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// An entry that was applied during a processing pass.
#[derive(Debug, Clone)]
pub struct AppliedEntry {
    pub tick: Tick,
    pub sequence: u64,
    pub action: Action,
    pub result: ActionResult,
}

/// Entry dropped because its tick had already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscardedEntry {
    pub tick: Tick,
    pub kind: CommandKind,
    pub network_id: Option<NetworkId>,
}

/// Outcome of one [`ActionQueue::process`] call.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub applied: Vec<AppliedEntry>,
    pub discarded: Vec<DiscardedEntry>,
}

impl ProcessReport {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.discarded.is_empty()
    }
}

#[derive(Debug)]
pub struct ActionQueue {
    entries: BTreeMap<(Tick, u64), QueuedAction>,
    next_sequence: u64,
    suspended: bool,
    discard_stale: bool,
    inbox: mpsc::UnboundedReceiver<Inbound>,
    inbox_tx: mpsc::UnboundedSender<Inbound>,
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ActionQueue {
    /// Creates an empty, running queue.
    ///
    /// With `discard_stale`, inbox entries whose tick is already behind the
    /// processing tick are dropped instead of applied late.
    pub fn new(discard_stale: bool) -> Self {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        Self {
            entries: BTreeMap::new(),
            next_sequence: 0,
            suspended: false,
            discard_stale,
            inbox,
            inbox_tx,
        }
    }

    /// Producer handle for the transport thread.
    pub fn sender(&self) -> QueueSender {
        QueueSender {
            tx: self.inbox_tx.clone(),
        }
    }

    /// Accepts an entry; returns its arrival sequence number.
    pub fn enqueue(&mut self, tick: Tick, action: Action, callback: Option<Completion>) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        tracing::trace!(
            target: "park::queue",
            %tick,
            sequence,
            kind = %action.kind(),
            "entry accepted"
        );
        self.entries.insert(
            (tick, sequence),
            QueuedAction {
                tick,
                sequence,
                action,
                callback,
            },
        );
        sequence
    }

    /// Applies every entry due at or before `current_tick`, in order.
    ///
    /// `apply` is the Execute path; its result is passed to the entry's
    /// callback and recorded in the report. While suspended the inbox is still
    /// drained but nothing is applied.
    pub fn process<F>(&mut self, current_tick: Tick, mut apply: F) -> ProcessReport
    where
        F: FnMut(&Action) -> ActionResult,
    {
        let mut report = ProcessReport {
            discarded: self.drain_inbox(current_tick),
            ..ProcessReport::default()
        };
        if self.suspended {
            return report;
        }

        while let Some(entry) = self.entries.first_entry() {
            if entry.key().0 > current_tick {
                break;
            }
            let QueuedAction {
                tick,
                sequence,
                action,
                callback,
            } = entry.remove();

            let result = apply(&action);
            if let Some(callback) = callback {
                callback(&action, &result);
            }
            report.applied.push(AppliedEntry {
                tick,
                sequence,
                action,
                result,
            });
        }
        report
    }

    fn drain_inbox(&mut self, current_tick: Tick) -> Vec<DiscardedEntry> {
        let mut discarded = Vec::new();
        while let Ok(Inbound { tick, action }) = self.inbox.try_recv() {
            if self.discard_stale && tick < current_tick {
                tracing::warn!(
                    target: "park::queue",
                    %tick,
                    %current_tick,
                    kind = %action.kind(),
                    "discarding stale entry"
                );
                discarded.push(DiscardedEntry {
                    tick,
                    kind: action.kind(),
                    network_id: action.network_id,
                });
                continue;
            }
            self.enqueue(tick, action, None);
        }
        discarded
    }

    /// Stops applying entries. Arrivals keep their order.
    pub fn suspend(&mut self) {
        if !self.suspended {
            tracing::info!(target: "park::queue", pending = self.entries.len(), "queue suspended");
        }
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        if self.suspended {
            tracing::info!(target: "park::queue", pending = self.entries.len(), "queue resumed");
        }
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Drops every pending entry without applying it or calling back.
    ///
    /// Entries still in the inbox are dropped too. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let mut dropped = self.entries.len();
        self.entries.clear();
        while self.inbox.try_recv().is_ok() {
            dropped += 1;
        }
        tracing::info!(target: "park::queue", dropped, "queue cleared");
        dropped
    }

    /// Accepted entries not yet applied; the inbox is not counted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tick of the earliest pending entry.
    pub fn next_tick(&self) -> Option<Tick> {
        self.entries.keys().next().map(|(tick, _)| *tick)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedAction> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use park_core::{CheatKind, CheatSet, Status, TogglePause, encode};

    use super::*;

    fn marker(amount: i32) -> Action {
        Action::new(CheatSet::new(CheatKind::AddMoney, amount))
    }

    fn amount(action: &Action) -> i32 {
        match action.body() {
            park_core::ActionBody::CheatSet(cheat) => cheat.param1,
            _ => -1,
        }
    }

    fn record(log: &Arc<Mutex<Vec<i32>>>) -> impl FnMut(&Action) -> ActionResult + '_ {
        move |action| {
            log.lock().expect("log").push(amount(action));
            ActionResult::ok()
        }
    }

    #[test]
    fn applies_in_tick_then_arrival_order() {
        let mut queue = ActionQueue::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        queue.enqueue(Tick(5), marker(3), None);
        queue.enqueue(Tick(2), marker(1), None);
        queue.enqueue(Tick(5), marker(4), None);
        queue.enqueue(Tick(2), marker(2), None);

        let report = queue.process(Tick(5), record(&log));

        assert_eq!(*log.lock().expect("log"), vec![1, 2, 3, 4]);
        assert_eq!(report.applied.len(), 4);
        assert!(queue.is_empty());
    }

    #[test]
    fn future_entries_wait_for_their_tick() {
        let mut queue = ActionQueue::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        queue.enqueue(Tick(1), marker(1), None);
        queue.enqueue(Tick(3), marker(3), None);

        queue.process(Tick(1), record(&log));
        assert_eq!(*log.lock().expect("log"), vec![1]);
        assert_eq!(queue.next_tick(), Some(Tick(3)));

        queue.process(Tick(2), record(&log));
        assert_eq!(queue.len(), 1);

        queue.process(Tick(3), record(&log));
        assert_eq!(*log.lock().expect("log"), vec![1, 3]);
    }

    #[test]
    fn callbacks_fire_exactly_once_with_the_result() {
        let mut queue = ActionQueue::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        queue.enqueue(
            Tick(0),
            Action::new(TogglePause),
            Some(Box::new(move |action, result| {
                sink.lock()
                    .expect("sink")
                    .push((action.kind(), result.status));
            })),
        );

        queue.process(Tick(0), |_| ActionResult::ok());
        queue.process(Tick(1), |_| ActionResult::ok());

        assert_eq!(
            *seen.lock().expect("seen"),
            vec![(CommandKind::TogglePause, Status::Ok)]
        );
    }

    #[test]
    fn suspended_queue_holds_entries_in_order() {
        let mut queue = ActionQueue::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        queue.suspend();
        queue.enqueue(Tick(1), marker(1), None);
        queue.enqueue(Tick(2), marker(2), None);
        let report = queue.process(Tick(10), record(&log));
        assert!(report.is_empty());
        assert_eq!(queue.len(), 2);

        queue.resume();
        queue.process(Tick(10), record(&log));
        assert_eq!(*log.lock().expect("log"), vec![1, 2]);
    }

    #[test]
    fn clear_drops_without_calling_back() {
        let mut queue = ActionQueue::default();
        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);
        queue.enqueue(
            Tick(0),
            marker(1),
            Some(Box::new(move |_, _| *flag.lock().expect("flag") = true)),
        );
        queue.sender().send(Tick(0), marker(2)).expect("send");

        assert_eq!(queue.clear(), 2);
        queue.process(Tick(0), |_| ActionResult::ok());

        assert!(!*called.lock().expect("called"));
    }

    #[test]
    fn inbox_entries_join_after_local_ones() {
        let mut queue = ActionQueue::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sender = queue.sender();

        queue.enqueue(Tick(1), marker(1), None);
        sender
            .send_encoded(Tick(1), &encode(&marker(2)).expect("encode"))
            .expect("send");

        queue.process(Tick(1), record(&log));
        assert_eq!(*log.lock().expect("log"), vec![1, 2]);
    }

    #[test]
    fn stale_inbox_entries_apply_late_unless_discarding() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut lenient = ActionQueue::new(false);
        lenient.sender().send(Tick(1), marker(1)).expect("send");
        let report = lenient.process(Tick(4), record(&log));
        assert_eq!(report.applied.len(), 1);

        let mut strict = ActionQueue::new(true);
        strict.sender().send(Tick(1), marker(2)).expect("send");
        strict.sender().send(Tick(4), marker(3)).expect("send");
        let report = strict.process(Tick(4), record(&log));
        assert_eq!(report.discarded.len(), 1);
        assert_eq!(report.discarded[0].tick, Tick(1));

        assert_eq!(*log.lock().expect("log"), vec![1, 3]);
    }

    #[test]
    fn garbage_bytes_are_not_queued() {
        let mut queue = ActionQueue::default();
        let result = queue.sender().send_encoded(Tick(0), &[0xff, 0xff]);
        assert!(matches!(result, Err(RuntimeError::Codec(_))));
        assert!(queue.process(Tick(0), |_| ActionResult::ok()).is_empty());
    }
}
