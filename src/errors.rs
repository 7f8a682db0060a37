use core::fmt::{Debug, Formatter, Result};
use embedded_hal::spi::ErrorKind;
use ufmt::{uDebug, uWrite};

use crate::sequencer::PowerState;

/// A value did not fit the bit width of the field it was meant for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldOverflowError {
    pub field: &'static str,
    pub value: u32,
    pub width: u8,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Max2769Error {
    /// Rejected locally, nothing was sent.
    FieldOverflow(FieldOverflowError),
    /// The master bus failed while writing `register` (4-bit address).
    ConfigurationFailed { register: u8, kind: ErrorKind },
    /// Operation not allowed in the current power state.
    InvalidState { state: PowerState },
    BufferLengthMismatch { expected: usize, got: usize },
    /// The profile's ADC resolution differs from the one the snapshot
    /// size was computed for. Rejected before any bus traffic.
    ResolutionMismatch { profile_bits: u8, capture_bits: u8 },
    /// The stream did not fill the capture window in time.
    CaptureStalled { waited_us: u32 },
    /// The slave receiver reported a fault.
    Receiver(ErrorKind),
}

impl From<FieldOverflowError> for Max2769Error {
    fn from(err: FieldOverflowError) -> Self {
        Max2769Error::FieldOverflow(err)
    }
}

impl Debug for Max2769Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Max2769Error::FieldOverflow(e) => write!(
                f,
                "FieldOverflow: {} = {} exceeds {} bits",
                e.field, e.value, e.width
            ),
            Max2769Error::ConfigurationFailed { register, kind } => {
                write!(f, "ConfigurationFailed: register {} ({:?})", register, kind)
            }
            Max2769Error::InvalidState { state } => write!(f, "InvalidState: {:?}", state),
            Max2769Error::BufferLengthMismatch { expected, got } => {
                write!(f, "BufferLengthMismatch: expected {}, got {}", expected, got)
            }
            Max2769Error::ResolutionMismatch {
                profile_bits,
                capture_bits,
            } => write!(
                f,
                "ResolutionMismatch: profile {} bits, capture {} bits",
                profile_bits, capture_bits
            ),
            Max2769Error::CaptureStalled { waited_us } => {
                write!(f, "CaptureStalled after {}us", waited_us)
            }
            Max2769Error::Receiver(kind) => write!(f, "Receiver: {:?}", kind),
        }
    }
}

fn kind_str(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Overrun => "Overrun",
        ErrorKind::ModeFault => "ModeFault",
        ErrorKind::FrameFormat => "FrameFormat",
        ErrorKind::ChipSelectFault => "ChipSelectFault",
        _ => "Other",
    }
}

impl uDebug for Max2769Error {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            Max2769Error::FieldOverflow(e) => ufmt::uwrite!(
                f,
                "FieldOverflow: {} = {} exceeds {} bits",
                e.field,
                e.value,
                e.width
            ),
            Max2769Error::ConfigurationFailed { register, kind } => ufmt::uwrite!(
                f,
                "ConfigurationFailed: register {} ({})",
                register,
                kind_str(kind)
            ),
            Max2769Error::InvalidState { state } => ufmt::uwrite!(f, "InvalidState: {:?}", state),
            Max2769Error::BufferLengthMismatch { expected, got } => ufmt::uwrite!(
                f,
                "BufferLengthMismatch: expected {}, got {}",
                expected,
                got
            ),
            Max2769Error::ResolutionMismatch {
                profile_bits,
                capture_bits,
            } => ufmt::uwrite!(
                f,
                "ResolutionMismatch: profile {} bits, capture {} bits",
                profile_bits,
                capture_bits
            ),
            Max2769Error::CaptureStalled { waited_us } => {
                ufmt::uwrite!(f, "CaptureStalled after {}us", waited_us)
            }
            Max2769Error::Receiver(kind) => ufmt::uwrite!(f, "Receiver: {}", kind_str(kind)),
        }
    }
}
