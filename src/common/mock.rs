// src/common/mock.rs

// Test doubles shared by the driver unit tests.

use super::hal_traits::{BusError, BusErrorKind, Clock, RegisterBus};
use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

// --- Mock Instant ---
/// Microseconds since the mock clock was created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockInstant(pub u64);

impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

// --- Mock Clock ---
/// Simulated clock: `delay` advances time instantly. Clones share state so a
/// test can keep a handle while the driver owns another.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now_us: Rc<Cell<u64>>,
    delays: Rc<RefCell<Vec<Duration>>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward without recording a delay.
    pub fn advance(&self, by: Duration) {
        self.now_us.set(self.now_us.get() + by.as_micros() as u64);
    }

    /// Every delay requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Clock for MockClock {
    type Instant = MockInstant;

    fn now(&self) -> MockInstant {
        MockInstant(self.now_us.get())
    }

    fn delay(&mut self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
        self.advance(duration);
    }
}

// --- Mock Bus Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockBusError(pub BusErrorKind);

impl BusError for MockBusError {
    fn kind(&self) -> BusErrorKind {
        self.0
    }
}

pub type Payload = heapless::Vec<u8, 8>;

/// One logged transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub address: u8,
    pub register: u8,
    pub payload: Payload,
}

// --- Mock Bus ---
/// Register file plus queued replies.
///
/// Reads first consume a queued reply for the same register, otherwise they
/// return consecutive bytes from the register file. Writes are logged and
/// stored into the register file.
#[derive(Debug)]
pub struct MockBus {
    pub registers: [u8; 256],
    replies: VecDeque<(u8, Vec<u8>)>,
    pub writes: heapless::Vec<Transfer, 128>,
    pub reads: heapless::Vec<(u8, usize), 128>,
    fail_next: Option<BusErrorKind>,
    fail_register: Option<(u8, BusErrorKind)>,
}

impl Default for MockBus {
    fn default() -> Self {
        MockBus {
            registers: [0; 256],
            replies: VecDeque::new(),
            writes: heapless::Vec::new(),
            reads: heapless::Vec::new(),
            fail_next: None,
            fail_register: None,
        }
    }
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the bytes returned by the next read of `register`.
    pub fn queue_reply(&mut self, register: u8, bytes: &[u8]) {
        self.replies.push_back((register, bytes.to_vec()));
    }

    /// Fails the next transfer of any kind.
    pub fn fail_next(&mut self, kind: BusErrorKind) {
        self.fail_next = Some(kind);
    }

    /// Fails every transfer that addresses `register`.
    pub fn fail_register(&mut self, register: u8, kind: BusErrorKind) {
        self.fail_register = Some((register, kind));
    }

    /// Logged writes as `(register, payload)` pairs.
    pub fn written(&self) -> Vec<(u8, Vec<u8>)> {
        self.writes.iter().map(|t| (t.register, t.payload.to_vec())).collect()
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.reads.clear();
    }

    fn check_failure(&mut self, register: u8) -> Result<(), MockBusError> {
        if let Some(kind) = self.fail_next.take() {
            return Err(MockBusError(kind));
        }
        match self.fail_register {
            Some((reg, kind)) if reg == register => Err(MockBusError(kind)),
            _ => Ok(()),
        }
    }

    fn take_reply(&mut self, register: u8) -> Option<Vec<u8>> {
        let index = self.replies.iter().position(|(reg, _)| *reg == register)?;
        self.replies.remove(index).map(|(_, bytes)| bytes)
    }
}

impl RegisterBus for MockBus {
    type Error = MockBusError;

    fn read_bytes(&mut self, _address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.check_failure(register)?;
        self.reads.push((register, buffer.len())).expect("read log full");
        match self.take_reply(register) {
            Some(reply) => buffer.copy_from_slice(&reply[..buffer.len()]),
            None => {
                for (i, byte) in buffer.iter_mut().enumerate() {
                    *byte = self.registers[register.wrapping_add(i as u8) as usize];
                }
            }
        }
        Ok(())
    }

    fn write_bytes(&mut self, address: u8, register: u8, payload: &[u8]) -> Result<(), Self::Error> {
        self.check_failure(register)?;
        let payload = Payload::from_slice(payload).expect("payload too long for mock");
        for (i, byte) in payload.iter().enumerate() {
            self.registers[register.wrapping_add(i as u8) as usize] = *byte;
        }
        self.writes.push(Transfer { address, register, payload }).expect("write log full");
        Ok(())
    }

    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        let mut word = [0u8; 2];
        self.read_bytes(address, register, &mut word)?;
        Ok(u16::from_le_bytes(word))
    }

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        self.write_bytes(address, register, &value.to_le_bytes())
    }
}
