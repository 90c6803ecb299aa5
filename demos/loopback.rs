use synclink::{host::LinkBus, seq::LineId};

fn main() {
    env_logger::init();

    // one endpoint looped onto itself: the transmit lanes drive the lines
    // the receive lane samples
    let clock = LineId(0);
    let data = LineId(1);
    let pulse = LineId(2);
    let nerror = LineId(3);

    // 40 kHz model clock: one liveness tick per millisecond
    let bus = LinkBus::new(40_000);

    // the transmitter first, so it is parked on the start flag before the
    // watchdog begins pacing
    let xmit = bus.transmitter(1, data, pulse, clock).unwrap();
    let wdog = bus.watchdog(0, nerror).unwrap();
    let recv = bus.receiver(2, data, pulse, clock).unwrap();

    xmit.write_blocking(u32::MAX);
    wdog.pet_blocking(1);

    let mut n = 5u32;
    loop {
        let word = recv.read_blocking();
        println!("get: {:#010x}", word);
        n += 1;
        wdog.pet(3, 100);
        xmit.write_blocking(0x2a5a_0000 + n);   // 30 bits
        println!("put: {}", n);
    }
}
