//! Outbound selection sync with an external visualization process
//!
//! The engine publishes the selected ids after every recomputation. The
//! path is optional and best-effort: a missing publisher is a no-op and a
//! failing one is logged and otherwise ignored.
//!
//! [`SelectionSyncQueue`] is the in-process publisher: it buffers payloads
//! for a transport (socket, IPC, URL scheme) to drain at its own pace.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{SyncError, SyncResult};
use crate::selection::Selection;
use crate::store::EntityId;

/// Payload sent to the external controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionSyncPayload {
    /// Selected ids; empty when no filter is active
    pub selected_ids: Vec<EntityId>,

    /// When the selection was computed (RFC 3339)
    pub sent_at: String,
}

impl SelectionSyncPayload {
    /// Build the payload for a selection
    pub fn from_selection(selection: &Selection) -> Self {
        let selected_ids = if selection.is_filtered() {
            selection.to_vec()
        } else {
            Vec::new()
        };

        Self {
            selected_ids,
            sent_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Encode as JSON
    pub fn to_json(&self) -> SyncResult<String> {
        serde_json::to_string(self).map_err(|e| SyncError::Encode(e.to_string()))
    }
}

/// Receiver of outbound selection updates
pub trait SelectionPublisher {
    /// Hand off a payload; must not block
    fn publish(&mut self, payload: SelectionSyncPayload) -> SyncResult<()>;
}

impl<F> SelectionPublisher for F
where
    F: FnMut(SelectionSyncPayload) -> SyncResult<()>,
{
    fn publish(&mut self, payload: SelectionSyncPayload) -> SyncResult<()> {
        self(payload)
    }
}

/// Bounded buffer of outbound payloads
///
/// Clones share the same buffer: hand one clone to the engine as its
/// publisher and keep another to drain from the transport side.
#[derive(Debug, Clone)]
pub struct SelectionSyncQueue {
    inner: Rc<RefCell<QueueState>>,
}

#[derive(Debug)]
struct QueueState {
    pending: VecDeque<SelectionSyncPayload>,
    max_pending: usize,
    published: u64,
    dropped: u64,
}

/// Counters for a sync queue
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub published: u64,
    pub dropped: u64,
    pub pending: usize,
}

impl SelectionSyncQueue {
    /// Create a queue holding at most `max_pending` payloads
    pub fn new(max_pending: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueState {
                pending: VecDeque::new(),
                max_pending: max_pending.max(1),
                published: 0,
                dropped: 0,
            })),
        }
    }

    /// Take every pending payload, oldest first
    pub fn drain(&self) -> Vec<SelectionSyncPayload> {
        self.inner.borrow_mut().pending.drain(..).collect()
    }

    /// Most recent payload, if any
    pub fn latest(&self) -> Option<SelectionSyncPayload> {
        self.inner.borrow().pending.back().cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn stats(&self) -> SyncStats {
        let state = self.inner.borrow();
        SyncStats {
            published: state.published,
            dropped: state.dropped,
            pending: state.pending.len(),
        }
    }
}

impl Default for SelectionSyncQueue {
    fn default() -> Self {
        Self::new(64)
    }
}

impl SelectionPublisher for SelectionSyncQueue {
    fn publish(&mut self, payload: SelectionSyncPayload) -> SyncResult<()> {
        let mut state = self.inner.borrow_mut();
        state.pending.push_back(payload);
        state.published += 1;

        // Only the newest selections matter to the consumer
        while state.pending.len() > state.max_pending {
            state.pending.pop_front();
            state.dropped += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(ids: &[EntityId]) -> SelectionSyncPayload {
        SelectionSyncPayload {
            selected_ids: ids.to_vec(),
            sent_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_unfiltered_selection_sends_empty() {
        let payload = SelectionSyncPayload::from_selection(&Selection::default());
        assert!(payload.selected_ids.is_empty());
    }

    #[test]
    fn test_payload_json() {
        let json = payload(&[3, 5]).to_json().unwrap();
        assert!(json.contains("\"selected_ids\":[3,5]"));
        assert!(json.contains("sent_at"));
    }

    #[test]
    fn test_queue_publish_and_drain() {
        let mut queue = SelectionSyncQueue::new(8);
        queue.publish(payload(&[1])).unwrap();
        queue.publish(payload(&[1, 2])).unwrap();

        assert_eq!(queue.pending_count(), 2);
        assert_eq!(queue.latest().unwrap().selected_ids, vec![1, 2]);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].selected_ids, vec![1]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_queue_clones_share_buffer() {
        let queue = SelectionSyncQueue::new(4);
        let mut engine_side = queue.clone();
        engine_side.publish(payload(&[7])).unwrap();
        assert_eq!(queue.pending_count(), 1);
    }

    #[test]
    fn test_queue_drops_oldest() {
        let mut queue = SelectionSyncQueue::new(2);
        for i in 0..5 {
            queue.publish(payload(&[i])).unwrap();
        }

        let stats = queue.stats();
        assert_eq!(stats.published, 5);
        assert_eq!(stats.dropped, 3);
        assert_eq!(stats.pending, 2);
        assert_eq!(queue.drain()[0].selected_ids, vec![3]);
    }

    #[test]
    fn test_closure_publisher() {
        let mut seen = Vec::new();
        {
            let mut publisher = |p: SelectionSyncPayload| -> SyncResult<()> {
                seen.push(p.selected_ids);
                Ok(())
            };
            publisher.publish(payload(&[9])).unwrap();
        }
        assert_eq!(seen, vec![vec![9]]);
    }
}
