#![cfg(feature = "host")]

use synclink::{
    frame::LinkWord,
    host::{LinkBus, Receiver, Transmitter, Watchdog},
    programs::{FRAME_SLOTS, SLOT_CYCLES},
    seq::LineId,
    };


// 40 kHz model clock: one slot per millisecond, one liveness tick per millisecond
const CORE_HZ: u32 = 40_000;
const MS: u64 = 40;
const SLOT: u64 = SLOT_CYCLES as u64;
const FRAME: u64 = FRAME_SLOTS as u64 * SLOT;

const CLOCK: LineId = LineId(0);
const DATA: LineId = LineId(1);
const PULSE: LineId = LineId(2);
const NERROR: LineId = LineId(3);

/// one endpoint looped onto itself, in the order that keeps the transmitter
/// ahead of the start flags
fn link(bus: &LinkBus) -> (Transmitter, Watchdog, Receiver) {
    let xmit = bus.transmitter(1, DATA, PULSE, CLOCK).unwrap();
    let wdog = bus.watchdog(0, NERROR).unwrap();
    let recv = bus.receiver(2, DATA, PULSE, CLOCK).unwrap();
    (xmit, wdog, recv)
}


#[test]
fn round_trip_masks_to_payload() {
    let bus = LinkBus::new(CORE_HZ);
    let (xmit, wdog, recv) = link(&bus);

    xmit.write_blocking(0xffff_ffff);
    wdog.pet_blocking(1);

    assert_eq!(recv.read_blocking(), LinkWord::mask(0xffff_ffff));
    // never re-sent: a drained FIFO goes stale on the wire, not repetitive
    assert_eq!(recv.read(), None);
}

#[test]
fn words_arrive_in_order() {
    let bus = LinkBus::new(CORE_HZ);
    let (xmit, _wdog, recv) = link(&bus);

    let words = [1u32, 0x2a5a_0000, 0x3fff_fffe, 0xdead_beef, 42];
    xmit.write_array_blocking(&words);

    let mut got = [0u32; 5];
    assert_eq!(recv.read_array_blocking(&mut got), 5);
    assert_eq!(got, words.map(LinkWord::mask));
}

#[test]
fn nonblocking_write_bounds_at_fifo_depth() {
    // no watchdog: the transmitter stays parked and the FIFO never drains
    let bus = LinkBus::new(CORE_HZ);
    let xmit = bus.transmitter(1, DATA, PULSE, CLOCK).unwrap();

    for n in 0 .. 8 {
        assert_eq!(xmit.write(n), 1);
    }
    assert_eq!(xmit.write(8), 0, "depth is 8, via join");
    assert_eq!(xmit.write_array(&[9, 10]), 0);
}

#[test]
fn nonblocking_write_array_reports_short_counts() {
    let bus = LinkBus::new(CORE_HZ);
    let xmit = bus.transmitter(1, DATA, PULSE, CLOCK).unwrap();

    let words: [u32; 10] = core::array::from_fn(|i| i as u32);
    assert_eq!(xmit.write_array(&words), 8);
    assert_eq!(xmit.write_array(&words[8 ..]), 0);
}

#[test]
fn invalid_bits_drop_the_whole_frame() {
    let bus = LinkBus::new(CORE_HZ);
    let (xmit, wdog, recv) = link(&bus);
    wdog.pet_blocking(-1);

    // hold /pulse low across the first word's whole frame
    bus.hold_low(PULSE);
    xmit.write_blocking(0x1234_5678);
    bus.wait_cycles(4 * FRAME);
    assert_eq!(recv.read(), None, "a poisoned frame reached the fifo");

    // a clean word after release still goes through, the poisoned one is
    // gone for good: absent, never corrupted
    bus.release(PULSE);
    xmit.write_blocking(0x0f0f_0f0f);
    assert_eq!(recv.read_blocking(), 0x0f0f_0f0f);
    assert_eq!(recv.read(), None);
}

#[test]
fn receive_overflow_drops_newest_words() {
    let bus = LinkBus::new(CORE_HZ);
    let (xmit, wdog, recv) = link(&bus);
    wdog.pet_blocking(-1);

    let words: [u32; 10] = core::array::from_fn(|i| 0x100 + i as u32);
    xmit.write_array_blocking(&words);
    bus.wait_cycles(13 * FRAME);

    // the receive fifo holds eight; words nine and ten were dropped silently
    let mut got = [0u32; 10];
    assert_eq!(recv.read_array(&mut got), 8);
    assert_eq!(got[.. 8], words[.. 8]);
    assert_eq!(recv.read(), None);
}

#[test]
fn tripped_watchdog_silences_the_link() {
    let bus = LinkBus::new(CORE_HZ);
    let (xmit, _wdog, recv) = link(&bus);

    // no pets beyond the construction grace
    bus.wait_cycles(5500 * MS);
    assert!(!bus.line(NERROR));

    // the word queues but the lane is starved of its cadence
    assert_eq!(xmit.write(0x55), 1);
    bus.wait_cycles(100 * SLOT);
    assert_eq!(recv.read(), None);
}

#[test]
fn sustained_echo_loop() {
    let bus = LinkBus::new(CORE_HZ);
    let (xmit, wdog, recv) = link(&bus);

    xmit.write_blocking(0xffff_ffff);
    wdog.pet_blocking(1);

    assert_eq!(recv.read_blocking(), 0x3fff_ffff);
    let mut n = 5u32;
    for _ in 0 .. 20 {
        n += 1;
        wdog.pet(3, 100);
        xmit.write_blocking(0x2a5a_0000 + n);
        assert_eq!(recv.read_blocking(), 0x2a5a_0000 + n);
    }
    assert!(bus.line(NERROR), "the loop fell behind the watchdog");
}
