#![allow(dead_code)]

use core::convert::Infallible;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind, SpiBus};
use max2769::config::SlaveBusConfig;
use max2769::wire_frame::WireFrame;
use max2769::{CaptureConfig, Max2769, SlaveReceiver};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Pin(&'static str, bool),
    Frame([u8; 4]),
    BusFault,
}

pub type Log = Rc<RefCell<Vec<Event>>>;

/// Output pin that records every level change.
pub struct RecordingPin {
    name: &'static str,
    level: Rc<Cell<bool>>,
    log: Log,
}

impl RecordingPin {
    pub fn new(name: &'static str, log: &Log) -> (Self, Rc<Cell<bool>>) {
        let level = Rc::new(Cell::new(false));
        (
            RecordingPin {
                name,
                level: level.clone(),
                log: log.clone(),
            },
            level,
        )
    }

    fn drive(&mut self, high: bool) {
        self.level.set(high);
        self.log.borrow_mut().push(Event::Pin(self.name, high));
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}

/// Master bus that records 4-octet frames. It can be told to fail the
/// n-th transfer (0-based).
pub struct RecordingSpi {
    log: Log,
    transfers: usize,
    pub fail_on: Option<usize>,
}

impl RecordingSpi {
    pub fn new(log: &Log) -> Self {
        RecordingSpi {
            log: log.clone(),
            transfers: 0,
            fail_on: None,
        }
    }

    fn record(&mut self, words: &[u8]) -> Result<(), ErrorKind> {
        let n = self.transfers;
        self.transfers += 1;
        if self.fail_on == Some(n) {
            self.log.borrow_mut().push(Event::BusFault);
            return Err(ErrorKind::Overrun);
        }
        let frame: [u8; 4] = words.try_into().expect("register writes are 4 octets");
        self.log.borrow_mut().push(Event::Frame(frame));
        Ok(())
    }
}

impl spi::ErrorType for RecordingSpi {
    type Error = ErrorKind;
}

impl SpiBus<u8> for RecordingSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), ErrorKind> {
        self.record(words)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), ErrorKind> {
        read.fill(0);
        self.record(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        let copy = words.to_vec();
        self.record(&copy)
    }

    fn flush(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

/// Free-running clock/data source feeding a slave receiver. Octets only
/// shift in while the synthesized select (`select_level`) is low.
pub struct StreamReceiver {
    select_level: Rc<Cell<bool>>,
    pub state: Rc<RefCell<StreamState>>,
}

#[derive(Default)]
pub struct StreamState {
    pub configured: Option<SlaveBusConfig>,
    pub prepared: Vec<usize>,
    pub acknowledged: usize,
    /// Octets shifted per poll.
    pub octets_per_poll: usize,
    /// Total octets the source produces before its clock stops.
    pub clock_budget: Option<usize>,
    pub shifted: usize,
    pub armed: usize,
    pub filled: usize,
    pub next_sample: u8,
    pub polls_with_select_high: usize,
    pub fault: bool,
}

impl StreamReceiver {
    pub fn new(select_level: Rc<Cell<bool>>) -> (Self, Rc<RefCell<StreamState>>) {
        let state = Rc::new(RefCell::new(StreamState {
            octets_per_poll: 512,
            next_sample: 0xA5,
            ..Default::default()
        }));
        (
            StreamReceiver {
                select_level,
                state: state.clone(),
            },
            state,
        )
    }
}

impl SlaveReceiver for StreamReceiver {
    type Error = ErrorKind;

    fn configure(&mut self, config: &SlaveBusConfig) -> Result<(), ErrorKind> {
        self.state.borrow_mut().configured = Some(*config);
        Ok(())
    }

    fn prepare(&mut self, len: usize) -> Result<(), ErrorKind> {
        let mut s = self.state.borrow_mut();
        s.prepared.push(len);
        s.armed = len;
        s.filled = 0;
        Ok(())
    }

    fn poll_complete(&mut self, buffer: &mut [u8]) -> nb::Result<(), ErrorKind> {
        let mut s = self.state.borrow_mut();
        if s.fault {
            return Err(nb::Error::Other(ErrorKind::FrameFormat));
        }
        if self.select_level.get() {
            s.polls_with_select_high += 1;
            return Err(nb::Error::WouldBlock);
        }
        let mut budget = s.octets_per_poll;
        if let Some(limit) = s.clock_budget {
            budget = budget.min(limit.saturating_sub(s.shifted));
        }
        let take = budget.min(s.armed - s.filled);
        for _ in 0..take {
            let i = s.filled;
            buffer[i] = s.next_sample;
            s.next_sample = s.next_sample.rotate_left(1) ^ 0x3C;
            s.filled += 1;
            s.shifted += 1;
        }
        if s.filled == s.armed {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn acknowledge(&mut self) {
        self.state.borrow_mut().acknowledged += 1;
    }
}

#[derive(Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

#[derive(Default)]
pub struct Serial(pub String);

impl ufmt::uWrite for Serial {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}

pub type Driver = Max2769<RecordingSpi, RecordingPin, RecordingPin, StreamReceiver, RecordingPin>;

pub struct Rig {
    pub driver: Driver,
    pub log: Log,
    pub enable: Rc<Cell<bool>>,
    pub snapshot_cs: Rc<Cell<bool>>,
    pub stream: Rc<RefCell<StreamState>>,
}

impl Rig {
    pub fn new(config: &CaptureConfig) -> Self {
        Self::with_spi(config, |_| {})
    }

    pub fn with_spi(config: &CaptureConfig, tweak: impl FnOnce(&mut RecordingSpi)) -> Self {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut spi = RecordingSpi::new(&log);
        tweak(&mut spi);
        let (cs, _) = RecordingPin::new("cfg_cs", &log);
        let (enable_pin, enable) = RecordingPin::new("enable", &log);
        let (snap_pin, snapshot_cs) = RecordingPin::new("snap_cs", &log);
        let (receiver, stream) = StreamReceiver::new(snapshot_cs.clone());
        let driver = Max2769::new(spi, cs, enable_pin, receiver, snap_pin, config)
            .expect("mock receiver accepts configuration");
        log.borrow_mut().clear();
        Rig {
            driver,
            log,
            enable,
            snapshot_cs,
            stream,
        }
    }

    /// Frames sent since the last call.
    pub fn take_frames(&self) -> Vec<WireFrame> {
        let events: Vec<Event> = self.log.borrow_mut().drain(..).collect();
        events
            .into_iter()
            .filter_map(|e| match e {
                Event::Frame(bytes) => Some(WireFrame::from(bytes)),
                _ => None,
            })
            .collect()
    }

    pub fn take_events(&self) -> Vec<Event> {
        self.log.borrow_mut().drain(..).collect()
    }
}
