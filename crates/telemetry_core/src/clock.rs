//! Relógio monotônico em milissegundos desde o boot.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Relógio real baseado em [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    boot: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }
}

/// Relógio controlado manualmente. Clones compartilham o mesmo tempo.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();
        handle.advance(50);
        assert_eq!(clock.now_ms(), 150);
        clock.set(7);
        assert_eq!(handle.now_ms(), 7);
    }

    #[test]
    fn monotonic_clock_never_goes_back() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
