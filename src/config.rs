// src/config.rs

use embedded_hal::spi::{Mode, MODE_0, MODE_1};
use fugit::{HertzU32 as Hertz, MicrosDurationU32};

/// Wait after asserting the enable line before the first register write.
pub const POWER_UP_SETTLE_US: u32 = 200;
/// Wait after configuration before the front end output is usable.
pub const CONFIGURE_SETTLE_US: u32 = 800;
/// Delay between completion polls while a capture window is open.
pub const CAPTURE_POLL_INTERVAL_US: u32 = 10;
/// Slack added on top of twice the nominal capture duration.
pub const CAPTURE_STALL_MARGIN_US: u32 = 1_000;

/// 4.092 MHz * 12 ms * 1 bit / 8
pub const SNAPSHOT_SIZE_BYTES: usize = 6138;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitOrder {
    LsbFirst,
    MsbFirst,
}

/// Settings the caller should program into the configuration (master) bus.
#[derive(Copy, Clone, Debug)]
pub struct MasterBusConfig {
    pub mode: Mode,
    pub bit_order: BitOrder,
    pub frequency: Hertz,
}

impl Default for MasterBusConfig {
    fn default() -> Self {
        Self {
            mode: MODE_0,
            bit_order: BitOrder::MsbFirst,
            frequency: Hertz::kHz(500),
        }
    }
}

/// Settings for the slave-mode capture receiver.
#[derive(Copy, Clone, Debug)]
pub struct SlaveBusConfig {
    pub mode: Mode,
    pub bit_order: BitOrder,
    /// Clocked out when the master reads past the transmit buffer
    pub over_read: u8,
    /// Clocked out while the receiver does not own its buffer
    pub default_char: u8,
}

impl Default for SlaveBusConfig {
    fn default() -> Self {
        Self {
            mode: MODE_1,
            bit_order: BitOrder::MsbFirst,
            over_read: 0x01,
            default_char: 0x99,
        }
    }
}

/// Size and timing of one snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub sampling_frequency: Hertz,
    pub duration: MicrosDurationU32,
    pub bits_per_sample: u8,
}

impl CaptureConfig {
    pub const fn new(sampling_frequency: Hertz, duration: MicrosDurationU32, bits_per_sample: u8) -> Self {
        CaptureConfig {
            sampling_frequency,
            duration,
            bits_per_sample,
        }
    }

    /// 4.092 MHz for 12 ms at 1 bit per sample.
    pub const fn reference() -> Self {
        Self::new(Hertz::Hz(4_092_000), MicrosDurationU32::millis(12), 1)
    }

    pub fn length_bytes(&self) -> usize {
        let bits = u64::from(self.sampling_frequency.to_Hz())
            * u64::from(self.duration.to_micros())
            * u64::from(self.bits_per_sample);
        (bits / (8 * 1_000_000)) as usize
    }

    /// Longest a capture may block before it counts as stalled.
    pub fn max_wait_us(&self) -> u32 {
        self.duration
            .to_micros()
            .saturating_mul(2)
            .saturating_add(CAPTURE_STALL_MARGIN_US)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::reference()
    }
}
