use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use ufmt::uWrite;

use crate::capture::{CaptureController, SlaveReceiver};
use crate::config::{CaptureConfig, SlaveBusConfig, CONFIGURE_SETTLE_US, POWER_UP_SETTLE_US};
use crate::errors::Max2769Error;
use crate::profile::Profile;
use crate::registers::RegisterBank;
use crate::sequencer::{PowerSequencer, PowerState, Written};

/// MAX2769 front end: configuration bus, enable line and snapshot receiver.
pub struct Max2769<SPI, CS, EN, RX, SCS> {
    sequencer: PowerSequencer<SPI, CS, EN>,
    snapshot: CaptureController<RX, SCS>,
}

impl<SPI, CS, EN, RX, SCS> Max2769<SPI, CS, EN, RX, SCS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin<Error = Infallible>,
    EN: OutputPin<Error = Infallible>,
    RX: SlaveReceiver,
    SCS: OutputPin<Error = Infallible>,
{
    /// `spi`/`cs` form the configuration bus, `enable` gates power,
    /// shutdown and idle, `receiver`/`snapshot_cs` take the sample stream.
    pub fn new(
        spi: SPI,
        cs: CS,
        enable: EN,
        receiver: RX,
        snapshot_cs: SCS,
        capture_config: &CaptureConfig,
    ) -> Result<Self, Max2769Error> {
        let snapshot = CaptureController::new(
            receiver,
            snapshot_cs,
            &SlaveBusConfig::default(),
            capture_config,
        )?;
        Ok(Max2769 {
            sequencer: PowerSequencer::new(spi, cs, enable),
            snapshot,
        })
    }

    pub fn state(&self) -> PowerState {
        self.sequencer.state()
    }

    pub fn registers(&self) -> &RegisterBank {
        self.sequencer.bank()
    }

    pub fn snapshot_len(&self) -> usize {
        self.snapshot.capacity()
    }

    pub fn sequencer_mut(&mut self) -> &mut PowerSequencer<SPI, CS, EN> {
        &mut self.sequencer
    }

    pub fn enable<W: uWrite>(&mut self, serial: &mut W) -> Result<(), Max2769Error> {
        self.sequencer.enable()?;
        ufmt::uwriteln!(serial, "MAX2769 powered").ok();
        Ok(())
    }

    /// Programs `profile`. Its ADC resolution must match the capture
    /// configuration the driver was built with.
    pub fn configure<W: uWrite>(
        &mut self,
        profile: &Profile,
        serial: &mut W,
    ) -> Result<Written, Max2769Error> {
        let result = self
            .check_resolution(profile)
            .and_then(|()| self.sequencer.configure(profile));
        match result {
            Ok(written) => {
                for (register, value) in written.iter() {
                    ufmt::uwriteln!(serial, "{:?} <- 0x{:X}", *register, *value).ok();
                }
                Ok(written)
            }
            Err(e) => {
                ufmt::uwriteln!(serial, "Configuration failed: {:?}", e).ok();
                Err(e)
            }
        }
    }

    fn check_resolution(&self, profile: &Profile) -> Result<(), Max2769Error> {
        let profile_bits = profile.adc_resolution.bits_per_sample();
        let capture_bits = self.snapshot.bits_per_sample();
        if profile_bits != capture_bits {
            return Err(Max2769Error::ResolutionMismatch {
                profile_bits,
                capture_bits,
            });
        }
        Ok(())
    }

    /// Takes one snapshot. The front end must be configured (`Ready`).
    pub fn capture<D: DelayNs, W: uWrite>(
        &mut self,
        buffer: &mut [u8],
        length_bytes: usize,
        delay: &mut D,
        serial: &mut W,
    ) -> Result<(), Max2769Error> {
        self.sequencer.begin_capture()?;
        let result = self.snapshot.capture(buffer, length_bytes, delay);
        self.sequencer.end_capture();
        match result {
            Ok(()) => {
                ufmt::uwriteln!(serial, "Captured {} bytes", length_bytes).ok();
            }
            Err(e) => {
                ufmt::uwriteln!(serial, "Capture failed: {:?}", e).ok();
            }
        }
        result
    }

    pub fn disable<W: uWrite>(&mut self, serial: &mut W) {
        self.sequencer.disable();
        ufmt::uwriteln!(serial, "MAX2769 off").ok();
    }

    /// One full duty cycle: power up, configure, take a snapshot, power down.
    /// The device is off again when this returns, error or not.
    pub fn run_cycle<D: DelayNs, W: uWrite>(
        &mut self,
        profile: &Profile,
        buffer: &mut [u8],
        delay: &mut D,
        serial: &mut W,
    ) -> Result<(), Max2769Error> {
        let result = self.power_and_capture(profile, buffer, delay, serial);
        self.disable(serial);
        result
    }

    fn power_and_capture<D: DelayNs, W: uWrite>(
        &mut self,
        profile: &Profile,
        buffer: &mut [u8],
        delay: &mut D,
        serial: &mut W,
    ) -> Result<(), Max2769Error> {
        self.enable(serial)?;
        delay.delay_us(POWER_UP_SETTLE_US);
        self.configure(profile, serial)?;
        delay.delay_us(CONFIGURE_SETTLE_US);
        let len = buffer.len();
        self.capture(buffer, len, delay, serial)
    }

    pub fn release(self) -> (SPI, CS, EN, RX, SCS) {
        let (spi, cs, enable) = self.sequencer.release();
        let (receiver, snapshot_cs) = self.snapshot.release();
        (spi, cs, enable, receiver, snapshot_cs)
    }
}

/// Writes a snapshot one byte per line as two hex digits.
pub fn dump_snapshot<W: uWrite>(buffer: &[u8], serial: &mut W) {
    for &byte in buffer {
        ufmt::uwriteln!(serial, "{:02X}", byte).ok();
    }
}
