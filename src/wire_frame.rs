// src/wire_frame.rs

use crate::registers::{Register, VALUE_MASK};

pub const FRAME_LEN: usize = 4;

/// One register write as it goes out on the configuration bus.
///
/// Bits [31:4] carry the 28-bit register value, bits [3:0] the register
/// address. Octets are sent most significant first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireFrame([u8; FRAME_LEN]);

impl WireFrame {
    pub fn encode(register: Register, value: u32) -> Self {
        let word = ((value & VALUE_MASK) << 4) | u32::from(register.address() & 0x0F);
        WireFrame(word.to_be_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn address(&self) -> u8 {
        self.0[3] & 0x0F
    }

    pub fn value(&self) -> u32 {
        u32::from_be_bytes(self.0) >> 4
    }
}

impl From<[u8; FRAME_LEN]> for WireFrame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        WireFrame(bytes)
    }
}
