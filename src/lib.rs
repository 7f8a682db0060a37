#![cfg_attr(not(test), no_std)]
// src/lib.rs

pub mod registers;
pub mod wire_frame;
pub mod select_line;
pub mod protocol;
pub mod profile;
pub mod config;
pub mod sequencer;
pub mod capture;
pub mod errors;
pub mod max2769;

pub use capture::{CaptureController, SlaveReceiver};
pub use config::{CaptureConfig, SNAPSHOT_SIZE_BYTES};
pub use errors::{FieldOverflowError, Max2769Error};
pub use max2769::{dump_snapshot, Max2769};
pub use profile::Profile;
pub use registers::{Register, RegisterBank};
pub use sequencer::{PowerSequencer, PowerState};
