// src/sequencer.rs

use core::convert::Infallible;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use ufmt::derive::uDebug;

use crate::errors::Max2769Error;
use crate::profile::Profile;
use crate::protocol::ConfigurationProtocol;
use crate::registers::{Field, Register, RegisterBank};

/// Registers a profile may touch, in the order they are written.
const PROFILE_ORDER: [Register; 4] = [
    Register::Conf1,
    Register::Conf2,
    Register::Conf3,
    Register::PllConf,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum PowerState {
    Off,
    Enabling,
    Configuring,
    Ready,
    Capturing,
}

/// Registers written by one `configure` call, with the values sent.
pub type Written = heapless::Vec<(Register, u32), 4>;

/// Owns the enable line and the register shadow, and walks the device
/// through power-up, configuration and power-down.
///
/// Nothing here waits. The caller keeps the settle intervals between
/// `enable`, `configure` and the first capture.
pub struct PowerSequencer<SPI, CS, EN> {
    bank: RegisterBank,
    protocol: ConfigurationProtocol<SPI, CS>,
    enable: EN,
    state: PowerState,
}

impl<SPI, CS, EN> PowerSequencer<SPI, CS, EN>
where
    SPI: SpiBus<u8>,
    CS: OutputPin<Error = Infallible>,
    EN: OutputPin<Error = Infallible>,
{
    /// Takes the bus, its select line and the enable line. The device is
    /// held off.
    pub fn new(spi: SPI, cs: CS, mut enable: EN) -> Self {
        enable.set_low().ok();
        PowerSequencer {
            bank: RegisterBank::new(),
            protocol: ConfigurationProtocol::new(spi, cs),
            enable,
            state: PowerState::Off,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn bank(&self) -> &RegisterBank {
        &self.bank
    }

    /// Powers the front end. The device comes up at its defaults, so the
    /// shadow is reset to match.
    pub fn enable(&mut self) -> Result<(), Max2769Error> {
        if self.state != PowerState::Off {
            return Err(Max2769Error::InvalidState { state: self.state });
        }
        self.enable.set_high().ok();
        self.bank.reset();
        self.state = PowerState::Enabling;
        Ok(())
    }

    /// Writes every register `profile` touches, CONF1 first and PLLCONF last.
    ///
    /// All field values are checked before the first frame goes out. On a
    /// bus failure the shadow keeps the last value that made it out, the
    /// state stays `Configuring` and the caller should `disable()` and
    /// start over.
    pub fn configure(&mut self, profile: &Profile) -> Result<Written, Max2769Error> {
        match self.state {
            PowerState::Enabling | PowerState::Ready => {}
            state => return Err(Max2769Error::InvalidState { state }),
        }

        let mut staged = self.bank.clone();
        let mut touched = [false; 4];
        for write in profile.field_writes() {
            staged.set_field(write.register, write.field, write.value)?;
            if let Some(slot) = PROFILE_ORDER.iter().position(|r| *r == write.register) {
                touched[slot] = true;
            }
        }

        self.state = PowerState::Configuring;
        let mut written = Written::new();
        for (slot, register) in PROFILE_ORDER.iter().enumerate() {
            if !touched[slot] {
                continue;
            }
            let value = staged.get(*register);
            self.commit(*register, value)?;
            written.push((*register, value)).ok();
        }
        self.state = PowerState::Ready;
        Ok(written)
    }

    /// Sets a single field and sends its register right away.
    pub fn write_field(
        &mut self,
        register: Register,
        field: Field,
        value: u32,
    ) -> Result<u32, Max2769Error> {
        if self.state == PowerState::Off {
            return Err(Max2769Error::InvalidState { state: self.state });
        }
        let updated = field.insert(self.bank.get(register), value)?;
        self.commit(register, updated)?;
        Ok(updated)
    }

    /// Drops power. Register contents are gone after this.
    pub fn disable(&mut self) {
        self.enable.set_low().ok();
        self.state = PowerState::Off;
    }

    pub fn release(self) -> (SPI, CS, EN) {
        let (spi, cs) = self.protocol.release();
        (spi, cs, self.enable)
    }

    pub(crate) fn begin_capture(&mut self) -> Result<(), Max2769Error> {
        if self.state != PowerState::Ready {
            return Err(Max2769Error::InvalidState { state: self.state });
        }
        self.state = PowerState::Capturing;
        Ok(())
    }

    pub(crate) fn end_capture(&mut self) {
        if self.state == PowerState::Capturing {
            self.state = PowerState::Ready;
        }
    }

    // Shadow first, then the bus. A failed write puts the old value back.
    fn commit(&mut self, register: Register, value: u32) -> Result<(), Max2769Error> {
        let previous = self.bank.get(register);
        self.bank.store(register, value);
        if let Err(e) = self.protocol.apply(&self.bank, register) {
            self.bank.store(register, previous);
            return Err(e);
        }
        Ok(())
    }
}
