/*!
    the three lane programs and their timing contract

    one wire slot is 40 core cycles and carries one rising clock edge. a frame
    is 32 slots: a stop slot and a start slot (both presented invalid on the
    /pulse line, so the receiver clears any partial word on every frame
    boundary) followed by the 30 payload bits, MSB first.

    the watchdog runs at one quarter of the core clock and raises the start
    flag once per 10 of its cycles, which is exactly one slot: it is the
    transmitter's metronome. a barking watchdog stops raising the flag and the
    transmitter freezes mid-wait with the clock parked low: a tripped device
    goes silent on the wire.

    the `t=` annotations count core cycles from the slot's rising edge as the
    transmitter sees them; the receiver observes each drive one cycle later.
*/

use crate::instr::*;


/// core-clock cycles per wire slot
pub const SLOT_CYCLES: u32 = 40;
/// slots per frame: stop + start + 30 payload bits
pub const FRAME_SLOTS: u32 = 32;
/// clock divisor of the watchdog lane
pub const WATCHDOG_DIV: u16 = 4;
/// core-clock cycles per liveness tick (one countdown pass, 10 quarter-clock cycles)
pub const TICK_CYCLES: u32 = 40;

/// liveness ticks per millisecond at a given core clock
pub const fn ticks_per_ms(core_hz: u32) -> u32 {
    core_hz / (TICK_CYCLES * 1000)
}


const WDOG_NAPPING: u8 = 4;
const WDOG_BARKING: u8 = 6;

/// liveness monitor and transmitter metronome, 20 cycles per outer pass
pub static WATCHDOG: Program = Program {
    ops: &[
        // raise the start flag, no wait for consumption
        Instr::of(Op::Irq).delay(3),
        // fresh count, or the X copy-back when starved
        Instr::of(Op::Pull {block: false}),
        // flip bits to get the count
        Instr::of(Op::Mov {dst: MovDst::X, src: MovSrc::Osr, invert: true}),
        // a spent or reused count trips immediately
        Instr::of(Op::Jmp {cond: Cond::XZero, target: WDOG_BARKING}).delay(3),
        // napping: keep the cadence going, one tick per 10 cycles
        Instr::of(Op::Irq).delay(4),
        Instr::of(Op::Jmp {cond: Cond::XDec, target: WDOG_NAPPING}).delay(4),
        // barking: latch /error low and spin forever
        Instr::of(Op::Set {dst: WriteDst::PinDirs, value: 1}),
        Instr::of(Op::Jmp {cond: Cond::Always, target: WDOG_BARKING}),
    ],
    wrap_start: 0,
    wrap_end: 5,
    side_set: 0,
    side_init: false,
};

/// run once before the watchdog starts
pub static WATCHDOG_INIT: Program = Program {
    ops: &[
        // release /error
        Instr::of(Op::Set {dst: WriteDst::PinDirs, value: 0}),
        // poison the count so an unpetted unit trips on its first pass
        Instr::of(Op::Mov {dst: MovDst::X, src: MovSrc::Null, invert: true}),
    ],
    wrap_start: 0,
    wrap_end: 1,
    side_set: 0,
    side_init: false,
};


const RX_VALID: u8 = 9;
const RX_TAIL: u8 = 11;

/// sampler and validity gate, externally clocked
pub static RECEIVER: Program = Program {
    ops: &[
        // synch to the 0->1 clock edge
        Instr::of(Op::Wait {on: WaitOn::Line, high: true}),
        Instr::of(Op::Nop).delay(8),
        // t=10 snapshot the lines mid-high-phase
        Instr::of(Op::Mov {dst: MovDst::Osr, src: MovSrc::Pins, invert: true}),
        // t=11 skip the data bit
        Instr::of(Op::Out {dst: OutDst::Null, count: 1}),
        // t=12 acknowledge an invalid bit on /pulse
        Instr::of(Op::Out {dst: OutDst::PinDirs, count: 1}).delay(1),
        // t=14 hand the cadence to the transmitter lane
        Instr::of(Op::Irq),
        // t=15 /pulse still high: the bit is good
        Instr::of(Op::Jmp {cond: Cond::PinHigh, target: RX_VALID}).delay(5),
        // t=21 drop any partial word
        Instr::of(Op::Mov {dst: MovDst::Isr, src: MovSrc::Null, invert: false}),
        Instr::of(Op::Jmp {cond: Cond::Always, target: RX_TAIL}),
        // t=21 clock-low phase, data is stable
        Instr::of(Op::In {count: 1}),
        // t=22 full words to the receive fifo
        Instr::of(Op::Push {if_full: true, block: false}),
        // t=23 release the acknowledge before the next sample
        Instr::of(Op::Set {dst: WriteDst::PinDirs, value: 0}),
    ],
    wrap_start: 0,
    wrap_end: 11,
    side_set: 0,
    side_init: false,
};

/// run once before the receiver starts
pub static RECEIVER_INIT: Program = Program {
    ops: &[
        // release /pulse
        Instr::of(Op::Set {dst: WriteDst::PinDirs, value: 0}),
        // observe the clock low once, avoiding some cases of misalignment
        Instr::of(Op::Wait {on: WaitOn::Line, high: false}),
    ],
    wrap_start: 0,
    wrap_end: 1,
    side_set: 0,
    side_init: false,
};


const TX_DATA: u8 = 13;

/// clock and data driver, timing master of the link
pub static TRANSMITTER: Program = Program {
    ops: &[
        // bit cadence from the watchdog/receiver lane
        Instr::of(Op::Wait {on: WaitOn::Flag, high: true}).side(false),
        // bits left in the current word?
        Instr::of(Op::Jmp {cond: Cond::OsrNotEmpty, target: TX_DATA}).side(false),

        // stop slot
        // t=0 rising edge, stop marker on data
        Instr::of(Op::Set {dst: WriteDst::Pins, value: 0}).side(true),
        // t=1 /pulse low: the receiver drops partials on it
        Instr::of(Op::Set {dst: WriteDst::PinDirs, value: 1}).side(true).delay(8),
        // t=10 all-ones while the transmit fifo is empty
        Instr::of(Op::Mov {dst: MovDst::X, src: MovSrc::Status, invert: true}).side(true).delay(7),
        // t=18 falling edge; nothing to send, repeat the stop slot
        Instr::of(Op::Jmp {cond: Cond::XZero, target: 0}).side(false).delay(1),
        // t=20 reload the shift register
        Instr::of(Op::Pull {block: true}).side(false),
        // t=21 drop the framing bits, the payload is 30 wide
        Instr::of(Op::Out {dst: OutDst::Null, count: 2}).side(false),

        // start slot
        Instr::of(Op::Wait {on: WaitOn::Flag, high: true}).side(false),
        // t=0 rising edge, data high = start marker
        Instr::of(Op::Set {dst: WriteDst::Pins, value: 1}).side(true).delay(9),
        // t=10 falling edge
        Instr::of(Op::Nop).side(false).delay(7),
        // t=18 release /pulse: the payload follows
        Instr::of(Op::Set {dst: WriteDst::PinDirs, value: 0}).side(false),
        Instr::of(Op::Jmp {cond: Cond::Always, target: 0}).side(false),

        // data slot
        // t=0 rising edge, data bit on the line
        Instr::of(Op::Out {dst: OutDst::Pins, count: 1}).side(true),
        // t=1 sample the /pulse input
        Instr::of(Op::Mov {dst: MovDst::Y, src: MovSrc::Pins, invert: true}).side(true),
        // t=2 relay it onto the /pulse output, latching an abort until the
        // next frame boundary releases it
        Instr::of(Op::Mov {dst: MovDst::PinDirs, src: MovSrc::Y, invert: false}).side(true).delay(7),
        // t=10 falling edge, hold the data level for the sampler
        Instr::of(Op::Nop).side(false).delay(9),
    ],
    wrap_start: 0,
    wrap_end: 16,
    side_set: 1,
    side_init: false,
};

/// run once before the transmitter starts
pub static TRANSMITTER_INIT: Program = Program {
    ops: &[
        // data idle low; the lane then parks on the start flag until the
        // watchdog or receiver lane is brought up
        Instr::of(Op::Set {dst: WriteDst::Pins, value: 0}),
    ],
    wrap_start: 0,
    wrap_end: 0,
    side_set: 0,
    side_init: false,
};
