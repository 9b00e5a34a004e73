//! Single-focus hover state shared by all views
//!
//! Two states: idle, or focused on exactly one entity. Each transition
//! returns the events it produced, in order, so the caller can broadcast
//! them. Views decide on their own how to draw "this id is focused".

use serde::{Deserialize, Serialize};

use crate::store::EntityId;

/// Broadcast payload for focus changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightEvent {
    Entered(EntityId),
    Left(EntityId),
}

impl HighlightEvent {
    pub fn id(&self) -> EntityId {
        match self {
            HighlightEvent::Entered(id) | HighlightEvent::Left(id) => *id,
        }
    }
}

/// Arbitrates the hover focus
#[derive(Debug, Clone, Default)]
pub struct HighlightCoordinator {
    active: Option<EntityId>,
}

impl HighlightCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently focused entity
    pub fn active(&self) -> Option<EntityId> {
        self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Pointer entered an entity in some view
    pub fn enter(&mut self, id: EntityId) -> Vec<HighlightEvent> {
        match self.active {
            Some(current) if current == id => Vec::new(),
            Some(current) => {
                // Pointer devices leave before entering, but a switch is
                // handled as leave + enter all the same
                self.active = Some(id);
                tracing::trace!(left = current, entered = id, "Highlight switched");
                vec![HighlightEvent::Left(current), HighlightEvent::Entered(id)]
            }
            None => {
                self.active = Some(id);
                tracing::trace!(entered = id, "Highlight entered");
                vec![HighlightEvent::Entered(id)]
            }
        }
    }

    /// Pointer left the focused entity
    pub fn leave(&mut self) -> Vec<HighlightEvent> {
        match self.active.take() {
            Some(id) => {
                tracing::trace!(left = id, "Highlight left");
                vec![HighlightEvent::Left(id)]
            }
            None => Vec::new(),
        }
    }

    /// Drop the focus without emitting anything
    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_from_idle() {
        let mut hl = HighlightCoordinator::new();
        assert_eq!(hl.enter(7), vec![HighlightEvent::Entered(7)]);
        assert_eq!(hl.active(), Some(7));
    }

    #[test]
    fn test_reenter_same_id_is_noop() {
        let mut hl = HighlightCoordinator::new();
        let mut events = hl.enter(7);
        events.extend(hl.enter(7));
        assert_eq!(events, vec![HighlightEvent::Entered(7)]);
    }

    #[test]
    fn test_switch_emits_leave_then_enter() {
        let mut hl = HighlightCoordinator::new();
        hl.enter(7);
        assert_eq!(
            hl.enter(9),
            vec![HighlightEvent::Left(7), HighlightEvent::Entered(9)]
        );
        assert_eq!(hl.active(), Some(9));
    }

    #[test]
    fn test_leave() {
        let mut hl = HighlightCoordinator::new();
        hl.enter(3);
        assert_eq!(hl.leave(), vec![HighlightEvent::Left(3)]);
        assert!(hl.is_idle());
        assert!(hl.leave().is_empty());
    }

    #[test]
    fn test_event_id() {
        assert_eq!(HighlightEvent::Left(4).id(), 4);
        assert_eq!(HighlightEvent::Entered(5).id(), 5);
    }
}
