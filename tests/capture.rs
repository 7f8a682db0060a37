mod common;

use common::{CountingDelay, Event, Rig, Serial};
use embedded_hal::spi::ErrorKind;
use fugit::{HertzU32, MicrosDurationU32};
use max2769::profile::{AdcResolution, ReferenceDivider};
use max2769::{CaptureConfig, Max2769Error, PowerState, Profile, SNAPSHOT_SIZE_BYTES};

fn ready(config: &CaptureConfig) -> (Rig, Serial) {
    let resolution = match config.bits_per_sample {
        2 => AdcResolution::TwoBit,
        _ => AdcResolution::OneBit,
    };
    let mut rig = Rig::new(config);
    let mut serial = Serial::default();
    rig.driver.enable(&mut serial).unwrap();
    rig.driver
        .configure(&Profile::new(ReferenceDivider::Quarter, resolution), &mut serial)
        .unwrap();
    rig.take_events();
    (rig, serial)
}

fn expected_stream(len: usize) -> Vec<u8> {
    let mut sample = 0xA5u8;
    (0..len)
        .map(|_| {
            let out = sample;
            sample = sample.rotate_left(1) ^ 0x3C;
            out
        })
        .collect()
}

fn snapshot_cs_events(events: &[Event]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Pin("snap_cs", level) => Some(*level),
            _ => None,
        })
        .collect()
}

#[test]
fn reference_snapshot_fills_every_byte_inside_one_window() {
    let (mut rig, mut serial) = ready(&CaptureConfig::reference());
    let mut buffer = [0u8; SNAPSHOT_SIZE_BYTES];
    let mut delay = CountingDelay::default();

    rig.driver
        .capture(&mut buffer, SNAPSHOT_SIZE_BYTES, &mut delay, &mut serial)
        .unwrap();

    assert_eq!(buffer.to_vec(), expected_stream(SNAPSHOT_SIZE_BYTES));
    assert!(rig.snapshot_cs.get(), "select released");
    assert_eq!(snapshot_cs_events(&rig.take_events()), vec![false, true]);

    let stream = rig.stream.borrow();
    assert_eq!(stream.prepared, vec![SNAPSHOT_SIZE_BYTES]);
    assert_eq!(stream.shifted, SNAPSHOT_SIZE_BYTES);
    assert_eq!(stream.polls_with_select_high, 0);
    assert_eq!(stream.acknowledged, 1);
    assert_eq!(rig.driver.state(), PowerState::Ready);
    assert!(serial.0.contains("Captured 6138 bytes"));
}

#[test]
fn window_size_follows_the_capture_config() {
    let configs = [
        (HertzU32::MHz(1), MicrosDurationU32::millis(8), 1, 1000),
        (HertzU32::Hz(8_184_000), MicrosDurationU32::millis(4), 1, 4092),
        (HertzU32::Hz(4_092_000), MicrosDurationU32::millis(12), 2, 12276),
    ];
    for (fs, duration, bits, len) in configs {
        let config = CaptureConfig::new(fs, duration, bits);
        assert_eq!(config.length_bytes(), len);

        let (mut rig, mut serial) = ready(&config);
        let mut buffer = vec![0u8; len];
        rig.driver
            .capture(&mut buffer, len, &mut CountingDelay::default(), &mut serial)
            .unwrap();

        assert_eq!(buffer, expected_stream(len));
        assert!(rig.snapshot_cs.get());
    }
}

#[test]
fn wrong_length_is_rejected_before_the_receiver_is_armed() {
    let (mut rig, mut serial) = ready(&CaptureConfig::reference());
    let mut buffer = [0u8; SNAPSHOT_SIZE_BYTES];

    let err = rig
        .driver
        .capture(&mut buffer, 100, &mut CountingDelay::default(), &mut serial)
        .unwrap_err();
    assert_eq!(
        err,
        Max2769Error::BufferLengthMismatch {
            expected: SNAPSHOT_SIZE_BYTES,
            got: 100
        }
    );

    let mut short = [0u8; 100];
    let err = rig
        .driver
        .capture(&mut short, SNAPSHOT_SIZE_BYTES, &mut CountingDelay::default(), &mut serial)
        .unwrap_err();
    assert_eq!(
        err,
        Max2769Error::BufferLengthMismatch {
            expected: SNAPSHOT_SIZE_BYTES,
            got: 100
        }
    );

    assert!(rig.stream.borrow().prepared.is_empty());
    assert!(snapshot_cs_events(&rig.take_events()).is_empty());
    assert_eq!(rig.driver.state(), PowerState::Ready);
}

#[test]
fn capture_needs_a_configured_front_end() {
    let mut rig = Rig::new(&CaptureConfig::reference());
    let mut serial = Serial::default();
    let mut buffer = [0u8; SNAPSHOT_SIZE_BYTES];

    let err = rig
        .driver
        .capture(&mut buffer, SNAPSHOT_SIZE_BYTES, &mut CountingDelay::default(), &mut serial)
        .unwrap_err();
    assert_eq!(err, Max2769Error::InvalidState { state: PowerState::Off });

    rig.driver.enable(&mut serial).unwrap();
    let err = rig
        .driver
        .capture(&mut buffer, SNAPSHOT_SIZE_BYTES, &mut CountingDelay::default(), &mut serial)
        .unwrap_err();
    assert_eq!(
        err,
        Max2769Error::InvalidState {
            state: PowerState::Enabling
        }
    );
    assert!(rig.stream.borrow().prepared.is_empty());
}

#[test]
fn stalled_clock_times_out_and_disarms_the_receiver() {
    let (mut rig, mut serial) = ready(&CaptureConfig::reference());
    rig.stream.borrow_mut().clock_budget = Some(1000);
    let mut buffer = [0u8; SNAPSHOT_SIZE_BYTES];
    let mut delay = CountingDelay::default();

    let err = rig
        .driver
        .capture(&mut buffer, SNAPSHOT_SIZE_BYTES, &mut delay, &mut serial)
        .unwrap_err();

    assert_eq!(err, Max2769Error::CaptureStalled { waited_us: 25_000 });
    assert_eq!(delay.total_ns, 25_000 * 1_000);
    assert!(rig.snapshot_cs.get());
    assert_eq!(snapshot_cs_events(&rig.take_events()), vec![false, true]);
    assert_eq!(rig.stream.borrow().acknowledged, 1);
    assert_eq!(rig.driver.state(), PowerState::Ready);
    assert!(serial.0.contains("Capture failed"));

    // The next window starts from a disarmed receiver and fills completely.
    rig.stream.borrow_mut().clock_budget = None;
    rig.driver
        .capture(&mut buffer, SNAPSHOT_SIZE_BYTES, &mut CountingDelay::default(), &mut serial)
        .unwrap();
    let stream = rig.stream.borrow();
    assert_eq!(stream.prepared, vec![SNAPSHOT_SIZE_BYTES, SNAPSHOT_SIZE_BYTES]);
    assert_eq!(stream.acknowledged, 2);
    assert_eq!(stream.filled, SNAPSHOT_SIZE_BYTES);
}

#[test]
fn receiver_fault_still_releases_select() {
    let (mut rig, mut serial) = ready(&CaptureConfig::reference());
    rig.stream.borrow_mut().fault = true;
    let mut buffer = [0u8; SNAPSHOT_SIZE_BYTES];

    let err = rig
        .driver
        .capture(&mut buffer, SNAPSHOT_SIZE_BYTES, &mut CountingDelay::default(), &mut serial)
        .unwrap_err();

    assert_eq!(err, Max2769Error::Receiver(ErrorKind::FrameFormat));
    assert!(rig.snapshot_cs.get());
    assert_eq!(rig.stream.borrow().acknowledged, 1);
}

#[test]
fn back_to_back_captures_reuse_the_buffer() {
    let (mut rig, mut serial) = ready(&CaptureConfig::reference());
    let mut buffer = [0u8; SNAPSHOT_SIZE_BYTES];

    for _ in 0..2 {
        rig.driver
            .capture(&mut buffer, SNAPSHOT_SIZE_BYTES, &mut CountingDelay::default(), &mut serial)
            .unwrap();
    }

    let stream = expected_stream(2 * SNAPSHOT_SIZE_BYTES);
    assert_eq!(buffer.to_vec(), stream[SNAPSHOT_SIZE_BYTES..].to_vec());
    assert_eq!(rig.stream.borrow().acknowledged, 2);
}

#[test]
fn receiver_is_programmed_for_mode_1_with_filler_octets() {
    let rig = Rig::new(&CaptureConfig::reference());
    let stream = rig.stream.borrow();
    let config = stream.configured.expect("configured at construction");

    assert_eq!(config.mode, embedded_hal::spi::MODE_1);
    assert_eq!(config.over_read, 0x01);
    assert_eq!(config.default_char, 0x99);
    assert!(rig.snapshot_cs.get(), "select idles high");
}
