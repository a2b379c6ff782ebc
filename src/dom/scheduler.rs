//! Virtual clock for timeouts and animation frames.
//!
//! Nothing here runs callbacks: the owner pops due tasks and executes them,
//! which keeps every mutation inside a single, synchronous dispatch.

use std::mem;

/// Handle returned by [`Scheduler::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    due: u64,
    task: T,
}

/// Timer and animation-frame queues over a millisecond clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: u64,
    next_id: u64,
    timers: Vec<Timer<T>>,
    frames: Vec<T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            timers: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Queues `task` to run `delay_ms` from now.
    pub fn set_timeout(&mut self, delay_ms: u64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now.saturating_add(delay_ms),
            task,
        });
        id
    }

    /// Cancels a pending timeout. Returns `false` if it already fired.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Queues `task` for the next animation frame.
    pub fn request_animation_frame(&mut self, task: T) {
        self.frames.push(task);
    }

    /// Removes the earliest timer due at or before `deadline` and moves the
    /// clock to its due time. Ties run in scheduling order.
    pub fn pop_due(&mut self, deadline: u64) -> Option<T> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= deadline)
            .min_by_key(|(_, timer)| (timer.due, timer.id.0))
            .map(|(index, _)| index)?;
        let timer = self.timers.remove(index);
        self.now = self.now.max(timer.due);
        Some(timer.task)
    }

    /// Moves the clock forward to `deadline` (never backwards).
    pub fn advance_clock(&mut self, deadline: u64) {
        self.now = self.now.max(deadline);
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Takes the callbacks queued for the current frame. Callbacks queued
    /// while these run belong to the following frame.
    pub fn take_frame(&mut self) -> Vec<T> {
        mem::take(&mut self.frames)
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of pending timeouts.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
