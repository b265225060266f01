//! Lock-protected process queues.
//!
//! `ProcessQueue` backs both the ready queue and the I/O queue. It owns the
//! processes it holds; every operation moves a `Process` in or out.
//!
//! # Operations
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `push` | O(1) |
//! | `pop_head` | O(1) |
//! | `remove_at` / `take_selected` | O(n), remaining order preserved |
//! | `wait_take` | blocks until a process is selected or the queue closes |
//!
//! The lock is held only for the structural update. Callers simulate bursts
//! after the guard is dropped.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::{Process, ProcessId};

/// An ordered, lock-protected queue of processes.
#[derive(Debug)]
pub struct ProcessQueue {
    name: &'static str,
    items: Mutex<VecDeque<Process>>,
    available: Condvar,
    closed: AtomicBool,
}

impl ProcessQueue {
    /// Creates an empty, open queue.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Appends at the tail and wakes a waiting consumer.
    pub fn push(&self, process: Process) {
        let mut items = self.items.lock();
        items.push_back(process);
        self.available.notify_all();
    }

    /// Removes and returns the head.
    pub fn pop_head(&self) -> Option<Process> {
        self.items.lock().pop_front()
    }

    /// Removes the element at `index`, keeping the others in order.
    pub fn remove_at(&self, index: usize) -> Option<Process> {
        self.items.lock().remove(index)
    }

    /// Removes the element chosen by `select`, without blocking.
    ///
    /// `select` sees the queue in order and returns the index to remove.
    pub fn take_selected<F>(&self, mut select: F) -> Option<Process>
    where
        F: FnMut(&VecDeque<Process>) -> Option<usize>,
    {
        let mut items = self.items.lock();
        let index = select(&items)?;
        items.remove(index)
    }

    /// Blocks until `select` picks an element, then removes it.
    ///
    /// Returns `None` once the queue is closed.
    pub fn wait_take<F>(&self, mut select: F) -> Option<Process>
    where
        F: FnMut(&VecDeque<Process>) -> Option<usize>,
    {
        let mut items = self.items.lock();
        loop {
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            if let Some(index) = select(&items) {
                return items.remove(index);
            }
            self.available.wait(&mut items);
        }
    }

    /// Blocks until the queue has a head, then pops it.
    pub fn wait_pop(&self) -> Option<Process> {
        self.wait_take(|items| (!items.is_empty()).then_some(0))
    }

    /// Closes the queue and wakes every waiter.
    ///
    /// The flag is set before the lock is taken so a consumer that has
    /// checked it but not yet parked is still woken.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let items = self.items.lock();
        log::debug!("{} queue closed with {} processes", self.name, items.len());
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Ids in queue order.
    pub fn ids(&self) -> Vec<ProcessId> {
        self.items.lock().iter().map(Process::id).collect()
    }

    /// Empties the queue, returning what it held.
    pub fn drain(&self) -> Vec<Process> {
        self.items.lock().drain(..).collect()
    }
}
