// src/common/timing.rs

use super::hal_traits::Clock;
use core::time::Duration;

// === Bus Command Timing ===

/// Pause after every command write before the device accepts the next transfer.
/// Also doubles as the soft-reset settle time on the SHT31.
pub const COMMAND_SETTLE: Duration = Duration::from_millis(1);

/// Tracks the earliest instant at which a device result may be read.
///
/// The deadline is "instant of the last command + measurement latency". It is
/// recomputed when the measurement mode changes ([`restart`](Self::restart))
/// and pushed forward after each read ([`advance`](Self::advance)), never
/// backwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReadScheduler<I> {
    next_allowed_read: Option<I>,
}

impl<I> Default for ReadScheduler<I> {
    fn default() -> Self {
        ReadScheduler { next_allowed_read: None }
    }
}

impl<I> ReadScheduler<I>
where
    I: Copy + Ord + core::ops::Add<Duration, Output = I> + core::ops::Sub<I, Output = Duration>,
{
    pub const fn new() -> Self {
        ReadScheduler { next_allowed_read: None }
    }

    /// Earliest instant the next read may be issued, if one is scheduled.
    pub fn next_allowed_read(&self) -> Option<I> {
        self.next_allowed_read
    }

    /// Starts a new measurement cycle: the deadline becomes `now + latency`
    /// regardless of what was scheduled before.
    pub fn restart(&mut self, now: I, latency: Duration) {
        self.next_allowed_read = Some(now + latency);
    }

    /// Schedules the next read `latency` after `now`. Keeps the current
    /// deadline if it is already later.
    pub fn advance(&mut self, now: I, latency: Duration) {
        let candidate = now + latency;
        self.next_allowed_read = Some(match self.next_allowed_read {
            Some(current) if current > candidate => current,
            _ => candidate,
        });
    }

    /// Drops the deadline; reads are allowed immediately.
    pub fn clear(&mut self) {
        self.next_allowed_read = None;
    }

    /// Time left until the deadline, `None` if a read is allowed at `now`.
    pub fn remaining(&self, now: I) -> Option<Duration> {
        match self.next_allowed_read {
            Some(deadline) if deadline > now => Some(deadline - now),
            _ => None,
        }
    }

    /// Blocks on `clock` until the deadline has passed.
    pub fn wait<C>(&self, clock: &mut C)
    where
        C: Clock<Instant = I>,
    {
        if let Some(left) = self.remaining(clock.now()) {
            trace!("waiting {} us for measurement cycle", left.as_micros() as u64);
            clock.delay(left);
        }
    }
}
