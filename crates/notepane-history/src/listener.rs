#![forbid(unsafe_code)]

//! Size-change listeners for [`DocumentHistory`](crate::DocumentHistory).
//!
//! Callbacks are held strongly by the [`HistorySubscription`] guard returned
//! to the subscriber and weakly by the history. Dropping the guard
//! unsubscribes; the dead entry is pruned on the next notification.
//!
//! Notification is synchronous and runs in registration order. Callbacks
//! receive a [`HistoryStatus`] value rather than a reference to the history,
//! so they cannot observe a half-updated stack.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::history::HistoryStatus;

type CallbackRc = Rc<dyn Fn(HistoryStatus)>;
type CallbackWeak = Weak<dyn Fn(HistoryStatus)>;

#[derive(Default)]
pub(crate) struct Listeners {
    callbacks: RefCell<Vec<CallbackWeak>>,
}

impl Listeners {
    pub(crate) fn subscribe(&self, callback: impl Fn(HistoryStatus) + 'static) -> HistorySubscription {
        let strong: CallbackRc = Rc::new(callback);
        self.callbacks.borrow_mut().push(Rc::downgrade(&strong));
        HistorySubscription { _callback: strong }
    }

    /// Registered entries, including dead ones not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub(crate) fn notify(&self, status: HistoryStatus) {
        // Collect first so a callback that subscribes does not hit a borrow conflict.
        let live: Vec<CallbackRc> = {
            let mut callbacks = self.callbacks.borrow_mut();
            callbacks.retain(|w| w.strong_count() > 0);
            callbacks.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &live {
            cb(status);
        }
    }
}

/// RAII guard for a history listener.
///
/// The callback stays registered for as long as this guard is alive.
#[must_use = "dropping the subscription unsubscribes the callback"]
pub struct HistorySubscription {
    _callback: CallbackRc,
}

impl fmt::Debug for HistorySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistorySubscription").finish_non_exhaustive()
    }
}
