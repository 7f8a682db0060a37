//! One duty cycle against a simulated front end.
//!
//! The configuration bus prints every frame it is handed, and the sample
//! stream is a counter that only shifts while the snapshot select is low.
//!
//! Run with: `cargo run --example duty_cycle`

use core::convert::Infallible;
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind, SpiBus};
use max2769::config::{MasterBusConfig, SlaveBusConfig};
use max2769::profile::{AdcResolution, ReferenceDivider};
use max2769::{dump_snapshot, CaptureConfig, Max2769, Profile, SlaveReceiver, SNAPSHOT_SIZE_BYTES};

struct Stdout;

impl ufmt::uWrite for Stdout {
    type Error = std::io::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        std::io::stdout().write_all(s.as_bytes())
    }
}

struct PrintingSpi;

impl PrintingSpi {
    fn new(config: &MasterBusConfig) -> Self {
        println!(
            "  master bus: {:?}, {:?}, {} Hz",
            config.mode,
            config.bit_order,
            config.frequency.to_Hz()
        );
        PrintingSpi
    }
}

impl spi::ErrorType for PrintingSpi {
    type Error = ErrorKind;
}

impl SpiBus<u8> for PrintingSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), ErrorKind> {
        println!("  -> SPI {:02X?}", words);
        Ok(())
    }

    fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), ErrorKind> {
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), ErrorKind> {
        println!("  -> SPI {:02X?}", words);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

struct Line {
    name: &'static str,
    level: Rc<Cell<bool>>,
}

impl digital::ErrorType for Line {
    type Error = Infallible;
}

impl OutputPin for Line {
    fn set_low(&mut self) -> Result<(), Infallible> {
        if self.name != "cfg_cs" {
            println!("  {} LOW", self.name);
        }
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        if self.name != "cfg_cs" {
            println!("  {} HIGH", self.name);
        }
        self.level.set(true);
        Ok(())
    }
}

fn line(name: &'static str) -> (Line, Rc<Cell<bool>>) {
    let level = Rc::new(Cell::new(false));
    (Line { name, level: level.clone() }, level)
}

/// Counter stream; 64 octets per poll while selected.
struct CounterStream {
    select: Rc<Cell<bool>>,
    armed: usize,
    filled: usize,
    next: u8,
}

impl SlaveReceiver for CounterStream {
    type Error = ErrorKind;

    fn configure(&mut self, config: &SlaveBusConfig) -> Result<(), ErrorKind> {
        println!("  receiver configured: {:?}", config);
        Ok(())
    }

    fn prepare(&mut self, len: usize) -> Result<(), ErrorKind> {
        self.armed = len;
        self.filled = 0;
        Ok(())
    }

    fn poll_complete(&mut self, buffer: &mut [u8]) -> nb::Result<(), ErrorKind> {
        if self.select.get() {
            return Err(nb::Error::WouldBlock);
        }
        let end = (self.filled + 64).min(self.armed);
        for byte in &mut buffer[self.filled..end] {
            *byte = self.next;
            self.next = self.next.wrapping_add(1);
        }
        self.filled = end;
        if self.filled == self.armed {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn acknowledge(&mut self) {}
}

struct SleepDelay;

impl DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

fn main() {
    println!("=== MAX2769 duty cycle (simulated) ===");

    let (cfg_cs, _) = line("cfg_cs");
    let (enable, _) = line("enable");
    let (snap_cs, snap_level) = line("snap_cs");
    let stream = CounterStream {
        select: snap_level,
        armed: 0,
        filled: 0,
        next: 0,
    };

    let spi = PrintingSpi::new(&MasterBusConfig::default());
    let capture = CaptureConfig::reference();
    let mut front_end = match Max2769::new(spi, cfg_cs, enable, stream, snap_cs, &capture) {
        Ok(front_end) => front_end,
        Err(e) => {
            println!("init failed: {:?}", e);
            return;
        }
    };

    let profile = Profile::new(ReferenceDivider::Quarter, AdcResolution::OneBit);
    let mut buffer = [0u8; SNAPSHOT_SIZE_BYTES];
    let mut serial = Stdout;

    match front_end.run_cycle(&profile, &mut buffer, &mut SleepDelay, &mut serial) {
        Ok(()) => {
            println!("first 8 bytes:");
            dump_snapshot(&buffer[..8], &mut serial);
        }
        Err(e) => println!("cycle failed: {:?}", e),
    }
}
