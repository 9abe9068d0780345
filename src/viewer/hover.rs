//! Leading-and-trailing throttle for hover hit tests.
//!
//! The first move in a quiet period runs its hit test immediately; moves
//! inside the throttle window are coalesced into one pending position that a
//! host timer flushes at the end of the window, so the pointer's final
//! resting place is always tested even when the stream of events stops.

/// What the host should do with one mouse-move event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleDecision {
    /// Outside the window: run the hit test for this position now.
    RunNow,
    /// First event inside the window: schedule a flush after `delay_ms`.
    Schedule { delay_ms: f64 },
    /// A flush is already scheduled; the position was coalesced into it.
    Coalesced,
}

#[derive(Debug)]
pub struct HoverThrottle {
    interval_ms: f64,
    last_run_ms: Option<f64>,
    pending: Option<(f64, f64)>,
    scheduled: bool,
}

impl HoverThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_run_ms: None,
            pending: None,
            scheduled: false,
        }
    }

    /// Record one mouse move at `now_ms` and decide how to handle it.
    pub fn on_move(&mut self, now_ms: f64, x: f64, y: f64) -> ThrottleDecision {
        match self.last_run_ms {
            Some(last) if now_ms - last < self.interval_ms => {
                self.pending = Some((x, y));
                if self.scheduled {
                    ThrottleDecision::Coalesced
                } else {
                    self.scheduled = true;
                    ThrottleDecision::Schedule {
                        delay_ms: self.interval_ms - (now_ms - last),
                    }
                }
            }
            _ => {
                self.last_run_ms = Some(now_ms);
                ThrottleDecision::RunNow
            }
        }
    }

    /// Flush the scheduled trailing test: returns the latest coalesced
    /// position, or `None` when it was cancelled in the meantime.
    pub fn fire(&mut self, now_ms: f64) -> Option<(f64, f64)> {
        self.scheduled = false;
        let position = self.pending.take();
        if position.is_some() {
            self.last_run_ms = Some(now_ms);
        }
        position
    }

    /// Drop any pending position; returns whether a host timer is still
    /// outstanding and should be cleared.
    pub fn cancel(&mut self) -> bool {
        self.pending = None;
        std::mem::take(&mut self.scheduled)
    }
}
