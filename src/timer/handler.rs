//! Timer event handlers
//!
//! The capability a timer slot calls from interrupt context when its event
//! count is reached, plus a few ready-made implementations.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use heapless::Vec;

use crate::hal::gpio::EdgeOutput;
use crate::types::TimerIndex;

/// Receiver of "target reached" events
///
/// Called from interrupt context. Implementations must return quickly and
/// must not block.
pub trait TimerEventHandler: Sync {
    /// A delay elapsed, or a PWM cycle completed, on `timer`
    fn on_timer_event(&self, timer: TimerIndex);
}

/// Plain function pointer as a handler
#[derive(Clone, Copy, Debug)]
pub struct FnHandler(pub fn(TimerIndex));

impl TimerEventHandler for FnHandler {
    fn on_timer_event(&self, timer: TimerIndex) {
        (self.0)(timer);
    }
}

/// Records which timers fired, oldest first
///
/// Once `N` events are stored further events are counted as dropped.
pub struct EventRecorder<const N: usize> {
    events: Mutex<RefCell<Vec<TimerIndex, N>>>,
    dropped: Mutex<Cell<u32>>,
}

impl<const N: usize> EventRecorder<N> {
    /// Empty recorder, usable in a `static`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Mutex::new(RefCell::new(Vec::new())),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Number of recorded events
    #[must_use]
    pub fn count(&self) -> usize {
        critical_section::with(|cs| self.events.borrow_ref(cs).len())
    }

    /// Number of recorded events for one timer
    #[must_use]
    pub fn count_for(&self, timer: TimerIndex) -> usize {
        critical_section::with(|cs| {
            self.events
                .borrow_ref(cs)
                .iter()
                .filter(|&&t| t == timer)
                .count()
        })
    }

    /// Copy of the recorded events
    #[must_use]
    pub fn events(&self) -> Vec<TimerIndex, N> {
        critical_section::with(|cs| self.events.borrow_ref(cs).clone())
    }

    /// Events that arrived while the recorder was full
    #[must_use]
    pub fn dropped(&self) -> u32 {
        critical_section::with(|cs| self.dropped.borrow(cs).get())
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        critical_section::with(|cs| {
            self.events.borrow_ref_mut(cs).clear();
            self.dropped.borrow(cs).set(0);
        });
    }
}

impl<const N: usize> Default for EventRecorder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TimerEventHandler for EventRecorder<N> {
    fn on_timer_event(&self, timer: TimerIndex) {
        critical_section::with(|cs| {
            if self.events.borrow_ref_mut(cs).push(timer).is_err() {
                let dropped = self.dropped.borrow(cs);
                dropped.set(dropped.get().saturating_add(1));
            }
        });
    }
}

/// Toggles an output on every event (LED blink)
#[derive(Debug)]
pub struct PinToggleHandler<P> {
    pin: P,
}

impl<P: EdgeOutput> PinToggleHandler<P> {
    /// Wrap an output
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }

    /// The wrapped output
    pub const fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: EdgeOutput> TimerEventHandler for PinToggleHandler<P> {
    fn on_timer_event(&self, _timer: TimerIndex) {
        // No error path out of interrupt context
        let _ = self.pin.toggle();
    }
}
