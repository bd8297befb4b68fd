//! Passive surface-size observation.
//!
//! The host pushes size changes through a [`SizeEvents`] handle; events
//! coalesce into at most one pending resize (a new event supersedes a
//! still-pending one), applied on the renderer's next pump. The subscription
//! holds only a weak reference, so once the renderer releases its binding the
//! handle goes inert instead of leaking a listener.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingResize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct SizeState {
    pub(crate) pending: Option<PendingResize>,
}

/// Cloneable host-facing handle for surface-size events.
#[derive(Debug, Clone)]
pub struct SizeEvents {
    state: Weak<RefCell<SizeState>>,
}

impl SizeEvents {
    pub(crate) fn new(state: Weak<RefCell<SizeState>>) -> Self {
        Self { state }
    }

    /// Report a size change. Supersedes any resize still pending.
    pub fn emit(&self, width: Option<u32>, height: Option<u32>) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().pending = Some(PendingResize { width, height });
        }
    }

    /// Whether the subscription is still attached to a live binding.
    pub fn is_connected(&self) -> bool {
        self.state.strong_count() > 0
    }
}

pub(crate) fn new_state() -> Rc<RefCell<SizeState>> {
    Rc::new(RefCell::new(SizeState::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_coalesce_to_the_latest() {
        let state = new_state();
        let events = SizeEvents::new(Rc::downgrade(&state));

        events.emit(Some(100), Some(100));
        events.emit(Some(200), None);

        assert_eq!(
            state.borrow_mut().pending.take(),
            Some(PendingResize {
                width: Some(200),
                height: None
            })
        );
        assert_eq!(state.borrow().pending, None);
    }

    #[test]
    fn disconnected_handles_are_inert() {
        let state = new_state();
        let events = SizeEvents::new(Rc::downgrade(&state));
        assert!(events.is_connected());

        drop(state);
        assert!(!events.is_connected());
        events.emit(Some(1), Some(1)); // no-op, no panic
    }
}
