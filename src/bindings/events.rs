//! Change notifications from the binding manager.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

/// A net change to the binding manager's state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingManagerEvent {
    /// Scheme whose definition changed, if any.
    pub scheme_id: Option<String>,
    /// `Some(true)` if the scheme became defined, `Some(false)` if undefined.
    pub scheme_defined: Option<bool>,
    pub active_scheme_changed: bool,
    pub bindings_changed: bool,
    pub locale_changed: bool,
    pub platform_changed: bool,
}

impl BindingManagerEvent {
    pub fn bindings_changed() -> Self {
        Self {
            bindings_changed: true,
            ..Default::default()
        }
    }

    pub fn active_scheme_changed() -> Self {
        Self {
            active_scheme_changed: true,
            ..Default::default()
        }
    }

    pub fn scheme_changed(scheme_id: impl Into<String>, defined: Option<bool>) -> Self {
        Self {
            scheme_id: Some(scheme_id.into()),
            scheme_defined: defined,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&BindingManagerEvent)>;

/// Subscribers notified synchronously, in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Listener>,
}

impl ListenerRegistry {
    pub fn add(&mut self, listener: impl FnMut(&BindingManagerEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener. A panicking listener is logged and
    /// skipped; the remaining listeners still run.
    pub fn notify(&mut self, event: &BindingManagerEvent) {
        for (id, listener) in self.listeners.iter_mut() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
            if result.is_err() {
                warn!(listener_id = id.0, ?event, "Binding listener panicked");
            }
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_receive_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::default();

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            registry.add(move |event: &BindingManagerEvent| {
                seen.borrow_mut().push((tag, event.bindings_changed));
            });
        }

        registry.notify(&BindingManagerEvent::bindings_changed());
        assert_eq!(*seen.borrow(), vec![("first", true), ("second", true)]);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let count = Rc::new(RefCell::new(0));
        let mut registry = ListenerRegistry::default();
        let counter = Rc::clone(&count);
        let id = registry.add(move |_| *counter.borrow_mut() += 1);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        registry.notify(&BindingManagerEvent::active_scheme_changed());
        assert_eq!(*count.borrow(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn panicking_listener_does_not_stop_others() {
        let count = Rc::new(RefCell::new(0));
        let mut registry = ListenerRegistry::default();
        registry.add(|_| panic!("listener bug"));
        let counter = Rc::clone(&count);
        registry.add(move |_| *counter.borrow_mut() += 1);

        registry.notify(&BindingManagerEvent::scheme_changed("emacs", Some(true)));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(registry.len(), 2);
    }
}
