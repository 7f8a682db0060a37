// src/capture.rs
//
// The sample stream is a free-running clock plus one data line and has no
// chip-select of its own. The receiver runs in slave mode and we drive its
// select input ourselves: low opens the capture window, high closes it.

use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::Error as _;

use crate::config::{CaptureConfig, SlaveBusConfig, CAPTURE_POLL_INTERVAL_US};
use crate::errors::Max2769Error;
use crate::select_line::SelectLine;

/// A slave-mode serial receiver that shifts octets in while its select
/// input is held low.
pub trait SlaveReceiver {
    type Error: embedded_hal::spi::Error;

    /// Applies mode and filler octets. Called once at construction.
    fn configure(&mut self, config: &SlaveBusConfig) -> Result<(), Self::Error>;

    /// Arms the receiver to accept exactly `len` octets.
    fn prepare(&mut self, len: usize) -> Result<(), Self::Error>;

    /// Completes once the armed number of octets has been shifted into
    /// `buffer`, `WouldBlock` until then.
    fn poll_complete(&mut self, buffer: &mut [u8]) -> nb::Result<(), Self::Error>;

    /// Disarms the receiver and clears its end-of-receive event. Called
    /// after every armed window closes, completed or not.
    fn acknowledge(&mut self);
}

/// Carves fixed-size snapshots out of the sample stream.
pub struct CaptureController<RX, CS> {
    receiver: RX,
    select: SelectLine<CS>,
    capacity: usize,
    bits_per_sample: u8,
    max_wait_us: u32,
}

impl<RX, CS> CaptureController<RX, CS>
where
    RX: SlaveReceiver,
    CS: OutputPin<Error = Infallible>,
{
    pub fn new(
        mut receiver: RX,
        select: CS,
        bus: &SlaveBusConfig,
        config: &CaptureConfig,
    ) -> Result<Self, Max2769Error> {
        let select = SelectLine::new(select);
        receiver
            .configure(bus)
            .map_err(|e| Max2769Error::Receiver(e.kind()))?;
        Ok(CaptureController {
            receiver,
            select,
            capacity: config.length_bytes(),
            bits_per_sample: config.bits_per_sample,
            max_wait_us: config.max_wait_us(),
        })
    }

    /// Snapshot size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// ADC resolution the snapshot size was computed for.
    pub fn bits_per_sample(&self) -> u8 {
        self.bits_per_sample
    }

    /// Fills `buffer` with exactly `length_bytes` octets from the stream.
    ///
    /// `length_bytes` and `buffer.len()` must both equal the configured
    /// capacity; anything else is rejected before the receiver is touched.
    /// The select line is high again and the receiver disarmed whenever
    /// this returns.
    pub fn capture<D: DelayNs>(
        &mut self,
        buffer: &mut [u8],
        length_bytes: usize,
        delay: &mut D,
    ) -> Result<(), Max2769Error> {
        if length_bytes != self.capacity || buffer.len() != self.capacity {
            let got = if length_bytes != self.capacity {
                length_bytes
            } else {
                buffer.len()
            };
            return Err(Max2769Error::BufferLengthMismatch {
                expected: self.capacity,
                got,
            });
        }

        self.receiver
            .prepare(length_bytes)
            .map_err(|e| Max2769Error::Receiver(e.kind()))?;

        let outcome = {
            let _window = self.select.assert();
            wait_for_window(&mut self.receiver, buffer, delay, self.max_wait_us)
        };
        self.receiver.acknowledge();
        outcome
    }

    pub fn release(self) -> (RX, CS) {
        (self.receiver, self.select.release())
    }
}

/// Polls until the window is full, the receiver faults or `max_wait_us`
/// has passed.
fn wait_for_window<RX: SlaveReceiver, D: DelayNs>(
    receiver: &mut RX,
    buffer: &mut [u8],
    delay: &mut D,
    max_wait_us: u32,
) -> Result<(), Max2769Error> {
    let mut waited_us = 0u32;
    loop {
        match receiver.poll_complete(buffer) {
            Ok(()) => return Ok(()),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(e)) => return Err(Max2769Error::Receiver(e.kind())),
        }
        if waited_us >= max_wait_us {
            return Err(Max2769Error::CaptureStalled { waited_us });
        }
        delay.delay_us(CAPTURE_POLL_INTERVAL_US);
        waited_us = waited_us.saturating_add(CAPTURE_POLL_INTERVAL_US);
    }
}
