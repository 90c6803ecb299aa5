#![cfg(feature = "host")]

use synclink::{host::LinkBus, seq::LineId};


// 40 kHz model clock: one liveness tick per millisecond
const CORE_HZ: u32 = 40_000;
// core cycles per millisecond at that clock
const MS: u64 = 40;

const NERROR: LineId = LineId(3);


#[test]
fn grace_period_then_trip_latches() {
    let bus = LinkBus::new(CORE_HZ);
    let wdog = bus.watchdog(0, NERROR).unwrap();

    // halfway through the construction grace: still counting
    bus.wait_cycles(2500 * MS);
    assert!(bus.line(NERROR), "tripped during the grace period");

    // well past it: tripped
    bus.wait_cycles(3000 * MS);
    assert!(!bus.line(NERROR), "missed refill did not trip");

    // and latched for good, pets or not
    wdog.pet(8, 1000);
    bus.wait_cycles(2000 * MS);
    assert!(!bus.line(NERROR), "a tripped watchdog came back");
}

#[test]
fn queued_pets_extend_the_deadline() {
    let bus = LinkBus::new(CORE_HZ);
    let wdog = bus.watchdog(0, NERROR).unwrap();
    wdog.pet_blocking(100);
    wdog.pet_blocking(1000);

    // grace + both pets = 6100 ms of cover in total
    bus.wait_cycles(5900 * MS);
    assert!(bus.line(NERROR), "tripped before the queued timeouts elapsed");
    bus.wait_cycles(400 * MS);
    assert!(!bus.line(NERROR), "missed refill did not trip");
}

#[test]
fn zero_timeout_still_counts_as_a_pet() {
    let bus = LinkBus::new(CORE_HZ);
    let wdog = bus.watchdog(0, NERROR).unwrap();
    wdog.pet_blocking(0);
    wdog.pet_blocking(500);

    bus.wait_cycles(5300 * MS);
    assert!(bus.line(NERROR), "a zero timeout tripped the watchdog early");
    bus.wait_cycles(500 * MS);
    assert!(!bus.line(NERROR));
}

#[test]
fn pet_tops_up_to_level_and_saturates() {
    let bus = LinkBus::new(CORE_HZ);
    let wdog = bus.watchdog(0, NERROR).unwrap();

    // queue the long disable behind the grace word, then let both the grace
    // expire and the disable get pulled: the lane now naps for ~21 minutes
    // of model time and the queue is all ours
    wdog.pet_blocking(-1);
    bus.wait_cycles(5100 * MS);
    assert!(bus.line(NERROR), "negative timeout did not disable the watchdog");

    assert_eq!(wdog.pet(3, 1000), 3);
    assert_eq!(wdog.pet(3, 1000), 0, "already at level");
    assert_eq!(wdog.pet(2, 1000), 0, "a level below the fill adds nothing");
    assert_eq!(wdog.pet(8, 1000), 5);
    assert_eq!(wdog.pet(8, 1000), 0, "saturated");
    assert_eq!(wdog.pet(20, 1000), 0, "the queue holds eight at most");

    // still alive: the disable word is doing the covering
    assert!(bus.line(NERROR));
}
