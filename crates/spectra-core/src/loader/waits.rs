//! Cross-thread population ownership
//!
//! Records which thread is populating which node, and which node each
//! blocked thread is waiting for. A thread about to block on a node first
//! follows the owner/waiting chain from that node; if the chain leads back
//! to itself, blocking would deadlock and the caller must settle for the
//! partial node instead.

use crate::ident::TypeName;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::thread::{self, ThreadId};

#[derive(Default)]
struct WaitState {
    owners: FxHashMap<TypeName, ThreadId>,
    waiting: FxHashMap<ThreadId, TypeName>,
}

/// Wait-for graph between populating threads
#[derive(Default)]
pub(crate) struct WaitGraph {
    state: Mutex<WaitState>,
}

impl WaitGraph {
    /// Record the current thread as populating `name`
    pub(crate) fn acquire(&self, name: &TypeName) {
        self.state
            .lock()
            .owners
            .insert(name.clone(), thread::current().id());
    }

    pub(crate) fn release(&self, name: &TypeName) {
        self.state.lock().owners.remove(name);
    }

    /// Record the current thread as waiting for `name`
    ///
    /// Returns `false`, recording nothing, if `name` is populated by a
    /// thread that transitively waits for the current one.
    pub(crate) fn begin_wait(&self, name: &TypeName) -> bool {
        let me = thread::current().id();
        let mut state = self.state.lock();

        let mut next = name;
        for _ in 0..=state.waiting.len() {
            let Some(&owner) = state.owners.get(next) else {
                break;
            };
            if owner == me {
                return false;
            }
            match state.waiting.get(&owner) {
                Some(awaited) => next = awaited,
                None => break,
            }
        }

        state.waiting.insert(me, name.clone());
        true
    }

    pub(crate) fn end_wait(&self) {
        self.state.lock().waiting.remove(&thread::current().id());
    }
}
