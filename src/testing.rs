//! Testing utilities and mock implementations
//!
//! Host-side stand-ins for the RP2040 peripherals and the host stack, so the
//! frame pipelines, MDIO protocol and poll loop run under `cargo test`.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU32, Ordering};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec;
use std::vec::Vec;

use crate::driver::error::{IoError, IoResult, Result};
use crate::driver::netif::NetStack;
use crate::hal::clock::Clock;
use crate::hal::mdio::{MdioBus, MdioPins, bmsr, phy_reg};
use crate::hal::sequencer::{CaptureChannel, TransmitChannel};

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// Register-level MDIO mock
///
/// Addresses with no register set behave as if no PHY answers (all ones).
#[derive(Debug, Default)]
pub struct MockMdioBus {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: RefCell<HashMap<(u8, u8), u16>>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: RefCell<Vec<(u8, u8, u16)>>,
    reads: Cell<usize>,
}

impl MockMdioBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers.borrow_mut().insert((phy_addr, reg_addr), value);
    }

    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.borrow().get(&(phy_addr, reg_addr)).copied()
    }

    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.write_log.borrow().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Populate a LAN8720A-like PHY at `phy_addr`, link down
    pub fn setup_phy(&self, phy_addr: u8) {
        self.set_register(phy_addr, phy_reg::BMCR, 0x3100);
        self.set_register(phy_addr, phy_reg::BMSR, 0x7809);
        self.set_register(phy_addr, phy_reg::PHYIDR1, 0x0007);
        self.set_register(phy_addr, phy_reg::PHYIDR2, 0xC0F1);
        self.set_register(phy_addr, phy_reg::ANAR, 0x01E1);
    }

    pub fn set_link(&self, phy_addr: u8, up: bool) {
        let value = self.get_register(phy_addr, phy_reg::BMSR).unwrap_or(0);
        let value = if up {
            value | bmsr::LINK_STATUS
        } else {
            value & !bmsr::LINK_STATUS
        };
        self.set_register(phy_addr, phy_reg::BMSR, value);
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.reads.set(self.reads.get() + 1);
        let registers = self.registers.borrow();
        let present = registers.keys().any(|&(addr, _)| addr == phy_addr);
        let value = registers.get(&(phy_addr, reg_addr)).copied();
        Ok(value.unwrap_or(if present { 0 } else { 0xFFFF }))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.write_log.borrow_mut().push((phy_addr, reg_addr, value));
        self.registers.borrow_mut().insert((phy_addr, reg_addr), value);
        Ok(())
    }
}

// =============================================================================
// Simulated PHY (bit level)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhyState {
    Preamble(u32),
    Start,
    Header { bits: u16, count: u32 },
    ReadTurnaround { selected: bool, reg: u8, edges: u32 },
    ReadData { selected: bool, value: u16, index: u32 },
    WriteTurnaround { selected: bool, reg: u8, count: u32 },
    WriteData { selected: bool, reg: u8, value: u16, count: u32 },
}

/// Clause-22 PHY decoded from MDC/MDIO edges
///
/// Samples the host's data line on each rising MDC edge, answers reads by
/// driving the line after the turnaround, and applies writes at the end of
/// the data phase. When nobody drives the line the pull-up wins.
#[derive(Debug)]
pub struct SimulatedPhy {
    address: u8,
    registers: [u16; 32],
    mdc: bool,
    host_driving: bool,
    host_level: bool,
    phy_level: Option<bool>,
    driven: Vec<bool>,
    state: PhyState,
}

impl SimulatedPhy {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 32],
            mdc: false,
            host_driving: false,
            host_level: true,
            phy_level: None,
            driven: Vec::new(),
            state: PhyState::Preamble(0),
        }
    }

    pub fn set_register(&mut self, reg: u8, value: u16) {
        self.registers[reg as usize] = value;
    }

    pub fn register(&self, reg: u8) -> u16 {
        self.registers[reg as usize]
    }

    pub fn set_link(&mut self, up: bool) {
        let reg = &mut self.registers[phy_reg::BMSR as usize];
        if up {
            *reg |= bmsr::LINK_STATUS;
        } else {
            *reg &= !bmsr::LINK_STATUS;
        }
    }

    /// Every bit the host drove, in order
    pub fn driven_bits(&self) -> &[bool] {
        &self.driven
    }

    pub fn is_driving(&self) -> bool {
        self.host_driving
    }

    fn rising_edge(&mut self) {
        let bit = self.host_driving.then_some(self.host_level);
        if let Some(b) = bit {
            self.driven.push(b);
        }

        self.state = match (self.state, bit) {
            (PhyState::Preamble(ones), Some(true)) => PhyState::Preamble(ones.saturating_add(1)),
            (PhyState::Preamble(ones), Some(false)) if ones >= 32 => PhyState::Start,
            (PhyState::Start, Some(true)) => PhyState::Header { bits: 0, count: 0 },
            (PhyState::Header { bits, count }, Some(b)) => {
                let bits = (bits << 1) | u16::from(b);
                if count + 1 < 12 {
                    PhyState::Header { bits, count: count + 1 }
                } else {
                    let op = bits >> 10;
                    let selected = ((bits >> 5) & 0x1F) as u8 == self.address;
                    let reg = (bits & 0x1F) as u8;
                    match op {
                        0b10 => PhyState::ReadTurnaround { selected, reg, edges: 0 },
                        0b01 => PhyState::WriteTurnaround { selected, reg, count: 0 },
                        _ => PhyState::Preamble(0),
                    }
                }
            }
            (PhyState::ReadTurnaround { selected, reg, edges }, _) => {
                if edges == 0 {
                    PhyState::ReadTurnaround { selected, reg, edges: 1 }
                } else {
                    // Second turnaround bit: the PHY pulls the line low
                    self.phy_level = selected.then_some(false);
                    PhyState::ReadData { selected, value: self.registers[reg as usize], index: 0 }
                }
            }
            (PhyState::ReadData { selected, value, index }, _) => {
                self.phy_level = selected.then_some((value >> (15 - index)) & 1 != 0);
                if index + 1 < 16 {
                    PhyState::ReadData { selected, value, index: index + 1 }
                } else {
                    PhyState::Preamble(0)
                }
            }
            (PhyState::WriteTurnaround { selected, reg, count }, Some(_)) => {
                if count == 0 {
                    PhyState::WriteTurnaround { selected, reg, count: 1 }
                } else {
                    PhyState::WriteData { selected, reg, value: 0, count: 0 }
                }
            }
            (PhyState::WriteData { selected, reg, value, count }, Some(b)) => {
                let value = (value << 1) | u16::from(b);
                if count + 1 < 16 {
                    PhyState::WriteData { selected, reg, value, count: count + 1 }
                } else {
                    if selected {
                        self.registers[reg as usize] = value;
                    }
                    PhyState::Preamble(0)
                }
            }
            _ => PhyState::Preamble(0),
        };

        if !matches!(
            self.state,
            PhyState::ReadData { .. } | PhyState::Preamble(0)
        ) || self.host_driving
        {
            self.phy_level = None;
        }
    }
}

impl MdioPins for SimulatedPhy {
    fn set_mdc(&mut self, high: bool) {
        if high && !self.mdc {
            self.mdc = true;
            self.rising_edge();
        }
        self.mdc = high;
    }

    fn set_mdio(&mut self, high: bool) {
        self.host_level = high;
    }

    fn mdio_output(&mut self) {
        self.host_driving = true;
    }

    fn mdio_input(&mut self) {
        self.host_driving = false;
    }

    fn read_mdio(&mut self) -> bool {
        if self.host_driving {
            self.host_level
        } else {
            self.phy_level.unwrap_or(true)
        }
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: RefCell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Mock Clock
// =============================================================================

/// Microsecond clock that only moves when told to, or by a fixed step per
/// read
#[derive(Debug, Default)]
pub struct MockClock {
    now: AtomicU32,
    step: AtomicU32,
}

impl MockClock {
    /// Clock frozen at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock advancing `step` µs on every read
    pub fn auto(step: u32) -> Self {
        Self {
            now: AtomicU32::new(0),
            step: AtomicU32::new(step),
        }
    }

    pub fn advance(&self, us: u32) {
        self.now.fetch_add(us, Ordering::SeqCst);
    }

    pub fn set(&self, us: u32) {
        self.now.store(us, Ordering::SeqCst);
    }

    /// Current time without advancing
    pub fn peek(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u32 {
        let step = self.step.load(Ordering::SeqCst);
        self.now.fetch_add(step, Ordering::SeqCst)
    }
}

// =============================================================================
// Mock Capture Channel
// =============================================================================

#[derive(Debug, Default)]
struct CaptureState {
    dst: usize,
    capacity: usize,
    written: usize,
    pending: bool,
    arms: usize,
    restarts: usize,
    force_clears: usize,
}

/// Capture state machine + DMA channel
///
/// Clones share state: keep one in the test to play the wire, hand the
/// other to the producer.
#[derive(Debug, Clone, Default)]
pub struct MockCapture {
    state: Arc<Mutex<CaptureState>>,
}

impl MockCapture {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Capture `frame` into the armed destination and raise the wrap
    ///
    /// Returns `false` (frame missed) while a previous wrap is unserviced or
    /// nothing is armed.
    pub fn deliver(&self, frame: &[u8]) -> bool {
        let mut state = self.lock();
        if state.pending || state.dst == 0 {
            return false;
        }
        let n = frame.len().min(state.capacity);
        // SAFETY: the producer armed `dst` for `capacity` bytes and does not
        // touch it until the wrap below is serviced.
        unsafe { core::ptr::copy_nonoverlapping(frame.as_ptr(), state.dst as *mut u8, n) };
        state.written = n;
        state.pending = true;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub fn last_captured_len(&self) -> usize {
        self.lock().written
    }

    pub fn arms(&self) -> usize {
        self.lock().arms
    }

    pub fn restarts(&self) -> usize {
        self.lock().restarts
    }

    pub fn force_clears(&self) -> usize {
        self.lock().force_clears
    }
}

impl CaptureChannel for MockCapture {
    fn wrap_pending(&self) -> bool {
        self.lock().pending
    }

    fn captured_len(&self) -> usize {
        self.lock().written
    }

    unsafe fn arm(&mut self, dst: *mut u8, capacity: usize) {
        let mut state = self.lock();
        state.dst = dst as usize;
        state.capacity = capacity;
        state.arms += 1;
    }

    fn restart(&mut self) {
        let mut state = self.lock();
        state.pending = false;
        state.restarts += 1;
    }

    fn force_clear_wrap(&mut self) {
        let mut state = self.lock();
        state.pending = false;
        state.written = 0;
        state.force_clears += 1;
    }
}

// =============================================================================
// Mock Transmit Channel
// =============================================================================

/// Transmit state machine + DMA channel recording every frame
#[derive(Debug, Default)]
pub struct MockTransmit {
    frames: Vec<Vec<u8>>,
    busy_polls: u32,
    remaining_busy: Cell<u32>,
    busy_seen: Cell<u32>,
}

impl MockTransmit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report busy for `polls` checks after every start
    pub fn with_busy_polls(polls: u32) -> Self {
        Self {
            busy_polls: polls,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Vec<u8> {
        self.frames.last().cloned().unwrap_or_default()
    }

    pub fn busy_polls_seen(&self) -> u32 {
        self.busy_seen.get()
    }
}

impl TransmitChannel for MockTransmit {
    fn is_busy(&self) -> bool {
        let remaining = self.remaining_busy.get();
        if remaining == 0 {
            return false;
        }
        self.remaining_busy.set(remaining - 1);
        self.busy_seen.set(self.busy_seen.get() + 1);
        true
    }

    unsafe fn start(&mut self, src: *const u8, len: usize) {
        assert_eq!(self.remaining_busy.get(), 0, "started while busy");
        // SAFETY: the caller guarantees `src` is valid for `len` bytes.
        let frame = unsafe { core::slice::from_raw_parts(src, len) };
        self.frames.push(frame.to_vec());
        self.remaining_busy.set(self.busy_polls);
    }
}

// =============================================================================
// Mock Host Stack
// =============================================================================

/// Host stack recording deliveries and notifications
#[derive(Debug, Default)]
pub struct MockStack {
    pub delivered: Vec<Vec<u8>>,
    pub fail_alloc: bool,
    pub reject: bool,
    pub link_ups: usize,
    pub link_downs: usize,
    pub timer_runs: usize,
}

impl MockStack {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetStack for MockStack {
    type Buffer = Vec<u8>;

    fn alloc_rx(&mut self, len: usize) -> IoResult<Vec<u8>> {
        if self.fail_alloc {
            return Err(IoError::NoBuffer);
        }
        Ok(vec![0; len])
    }

    fn input(&mut self, mut frame: Vec<u8>, len: usize) -> IoResult<()> {
        if self.reject {
            return Err(IoError::Rejected);
        }
        frame.truncate(len);
        self.delivered.push(frame);
        Ok(())
    }

    fn link_up(&mut self) {
        self.link_ups += 1;
    }

    fn link_down(&mut self) {
        self.link_downs += 1;
    }

    fn service_timers(&mut self) {
        self.timer_runs += 1;
    }
}

// =============================================================================
// Frame Helpers
// =============================================================================

/// `body` followed by its FCS, computed independently
pub fn frame_with_fcs(body: &[u8]) -> Vec<u8> {
    let mut frame = body.to_vec();
    frame.extend_from_slice(&crc32fast::hash(body).to_le_bytes());
    frame
}

/// Frame with a `len`-byte body starting with `seq` (little-endian)
pub fn numbered_frame(seq: u32, len: usize) -> Vec<u8> {
    let mut body: Vec<u8> = (0..len).map(|i| (i as u8) ^ (seq as u8)).collect();
    let tag = seq.to_le_bytes();
    let n = tag.len().min(len);
    body[..n].copy_from_slice(&tag[..n]);
    frame_with_fcs(&body)
}

/// Small deterministic generator for interleaving tests
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_mdio_absent_phy_reads_ones() {
        let mut mdio = MockMdioBus::new();
        assert_eq!(mdio.read(3, phy_reg::BMCR), Ok(0xFFFF));
        mdio.set_register(3, phy_reg::BMSR, 0x7809);
        assert_eq!(mdio.read(3, phy_reg::BMCR), Ok(0));
        assert_eq!(mdio.read_count(), 2);
    }

    #[test]
    fn mock_mdio_write_is_logged() {
        let mut mdio = MockMdioBus::new();
        mdio.write(0, 1, 0x5678).unwrap();
        assert_eq!(mdio.read(0, 1), Ok(0x5678));
        assert_eq!(mdio.get_writes(), vec![(0, 1, 0x5678)]);
    }

    #[test]
    fn mock_delay_tracking() {
        let mut delay = MockDelay::new();
        embedded_hal::delay::DelayNs::delay_us(&mut delay, 3);
        assert_eq!(delay.total_ns(), 3_000);
        assert_eq!(delay.total_us(), 3);
    }

    #[test]
    fn mock_clock_steps() {
        let clock = MockClock::auto(5);
        assert_eq!(clock.now_us(), 0);
        assert_eq!(clock.now_us(), 5);
        clock.advance(100);
        assert_eq!(clock.peek(), 110);
    }

    #[test]
    fn numbered_frame_layout() {
        let frame = numbered_frame(0x0102_0304, 10);
        assert_eq!(frame.len(), 14);
        assert_eq!(&frame[..4], &[4, 3, 2, 1]);
        assert!(crate::frame::crc::verify(&frame));
    }

    #[test]
    fn capture_refuses_while_pending() {
        let mut capture = MockCapture::new();
        let mut buf = [0u8; 8];
        assert!(!capture.deliver(&[1]));
        // SAFETY: `buf` outlives every delivery below.
        unsafe { capture.arm(buf.as_mut_ptr(), buf.len()) };
        assert!(capture.deliver(&[1, 2, 3]));
        assert!(!capture.deliver(&[4]));
        capture.restart();
        assert!(capture.deliver(&[5; 20]));
        assert_eq!(capture.captured_len(), 8);
        assert_eq!(buf, [5; 8]);
    }
}
