use std::{thread, time::Duration};
use synclink::{host::LinkBus, seq::LineId};

fn main() {
    env_logger::init();

    let nerror = LineId(0);
    let bus = LinkBus::new(40_000);
    let wdog = bus.watchdog(0, nerror).unwrap();

    // three short leashes on top of the construction grace, then silence
    for n in 0 .. 3 {
        wdog.pet_blocking(200);
        println!("pet {}", n);
    }
    while bus.line(nerror) {
        thread::yield_now();
    }
    println!("watchdog tripped after {} model cycles", bus.cycles());

    // the error line is latched: no amount of late petting recovers it
    wdog.pet(8, 1000);
    thread::sleep(Duration::from_millis(50));
    assert!(!bus.line(nerror));
    println!("still tripped, as designed");
}
