// src/protocol.rs

use core::convert::Infallible;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error as _, SpiBus};

use crate::errors::Max2769Error;
use crate::registers::{Register, RegisterBank};
use crate::select_line::SelectLine;
use crate::wire_frame::{WireFrame, FRAME_LEN};

/// Pushes register writes to the device over the master bus.
///
/// The device never answers, so a completed bus transfer is the only
/// confirmation there is.
pub struct ConfigurationProtocol<SPI, CS> {
    spi: SPI,
    cs: SelectLine<CS>,
    tx_buf: [u8; FRAME_LEN],
}

impl<SPI, CS> ConfigurationProtocol<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin<Error = Infallible>,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        ConfigurationProtocol {
            spi,
            cs: SelectLine::new(cs),
            tx_buf: [0; FRAME_LEN],
        }
    }

    /// Sends one full register. Blocks until the bus is idle again.
    pub fn write_register(&mut self, register: Register, value: u32) -> Result<(), Max2769Error> {
        self.tx_buf = *WireFrame::encode(register, value).as_bytes();

        let _frame = self.cs.assert();
        self.spi
            .transfer(&mut [], &self.tx_buf)
            .and_then(|_| self.spi.flush())
            .map_err(|e| Max2769Error::ConfigurationFailed {
                register: register.address(),
                kind: e.kind(),
            })
    }

    /// Sends the bank's current value for `register`.
    pub fn apply(&mut self, bank: &RegisterBank, register: Register) -> Result<(), Max2769Error> {
        self.write_register(register, bank.get(register))
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs.release())
    }
}
