//! Ephemeral UI state shared across views.
//!
//! The store is created once and handed to consumers as `Rc<UiStateStore>`.
//! Listeners run synchronously after each change and must not mutate the
//! store from inside the callback.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Which form the quick-add modal shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuickAddTab {
    #[default]
    Task,
    Goal,
    Journal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub quick_add_open: bool,
    pub quick_add_tab: QuickAddTab,
    pub command_menu_open: bool,
}

type Listener = Rc<dyn Fn(&UiState)>;

#[derive(Default)]
pub struct UiStateStore {
    state: Cell<UiState>,
    next_listener: Cell<u64>,
    listeners: Rc<RefCell<BTreeMap<u64, Listener>>>,
}

impl UiStateStore {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn get(&self) -> UiState {
        self.state.get()
    }

    /// Opens quick-add on `tab`.
    pub fn open_quick_add(&self, tab: QuickAddTab) {
        self.update(|state| {
            state.quick_add_open = true;
            state.quick_add_tab = tab;
        });
    }

    pub fn close_quick_add(&self) {
        self.update(|state| state.quick_add_open = false);
    }

    pub fn set_quick_add_tab(&self, tab: QuickAddTab) {
        self.update(|state| state.quick_add_tab = tab);
    }

    pub fn set_command_menu_open(&self, open: bool) {
        self.update(|state| state.command_menu_open = open);
    }

    pub fn toggle_command_menu(&self) {
        self.update(|state| state.command_menu_open = !state.command_menu_open);
    }

    /// Calls `listener` after every change until the guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&UiState) + 'static) -> UiSubscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().insert(id, Rc::new(listener));
        UiSubscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    fn update(&self, change: impl FnOnce(&mut UiState)) {
        let before = self.state.get();
        let mut after = before;
        change(&mut after);
        if after == before {
            return;
        }
        self.state.set(after);

        let listeners: Vec<Listener> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(&after);
        }
    }
}

/// Unsubscribes its listener on drop.
pub struct UiSubscription {
    id: u64,
    listeners: Weak<RefCell<BTreeMap<u64, Listener>>>,
}

impl Drop for UiSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{QuickAddTab, UiStateStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_only_on_change_and_until_dropped() {
        let store = UiStateStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = store.subscribe(move |state| sink.borrow_mut().push(*state));

        store.open_quick_add(QuickAddTab::Goal);
        store.open_quick_add(QuickAddTab::Goal);
        store.toggle_command_menu();
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0].quick_add_tab, QuickAddTab::Goal);

        drop(subscription);
        store.close_quick_add();
        assert_eq!(seen.borrow().len(), 2);
        assert!(!store.get().quick_add_open);
        assert!(store.get().command_menu_open);
    }
}
