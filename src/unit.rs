/*!
    execution units: independently clocked interpreters of sequencer programs

    a unit owns its whole execution state (program counter, scratch and shift
    registers, FIFOs, output drives) and nothing else may touch it. all the
    unit sees of the outside world is the line snapshot and the start flags it
    is handed on each step.
*/

use heapless::Deque;
use log::*;

use crate::{
    instr::*,
    seq::{LineId, MAX_LINES, START_FLAGS},
    };


/// words one joined FIFO can hold
pub const FIFO_DEPTH: usize = 8;

/// shift direction of a 32-bit shift register. `Left` shifts the MSB first
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShiftDir {
    Left,
    Right,
}

/// how the unit's two FIFOs are arranged
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FifoJoin {
    /// 4 words each way
    Split,
    /// all 8 words on the transmit side
    TxOnly,
    /// all 8 words on the receive side
    RxOnly,
}

/// the unit's line attachments. push-pull levels and open-drain output
/// enables are separate outputs: `set pins`/`out pins` drive `level`,
/// `set pindirs`/`out pindirs`/`mov pindirs` drive `drain`
#[derive(Copy, Clone, Debug, Default)]
pub struct Bindings {
    /// driven alongside every instruction carrying a side value
    pub side: Option<LineId>,
    /// push-pull level output
    pub level: Option<LineId>,
    /// open-drain output: pulls the line low while enabled
    pub drain: Option<LineId>,
    /// input group read by `in`/`mov pins`, LSB first
    pub inputs: [Option<LineId>; 4],
    /// line tested by `jmp pin`
    pub branch: Option<LineId>,
    /// line tested by `wait`
    pub gate: Option<LineId>,
}

/// immutable per-unit configuration, set once at construction
#[derive(Copy, Clone, Debug)]
pub struct UnitConfig {
    /// ratio of the core clock this unit runs at
    pub clock_div: u16,
    pub out_shift: ShiftDir,
    pub in_shift: ShiftDir,
    /// bits after which the output shift register reads as empty
    pub pull_threshold: u8,
    /// bits after which `push iffull` fires
    pub push_threshold: u8,
    pub join: FifoJoin,
    /// `mov status` reads all-ones while the transmit FIFO holds fewer
    /// words than this, zero otherwise. fixed at install time
    pub tx_status_level: u8,
    pub bindings: Bindings,
}

enum Outcome {
    Done(Option<u8>),
    Stall,
}

pub struct Unit {
    index: u8,
    config: UnitConfig,
    program: &'static Program,
    pc: u8,
    x: u32,
    y: u32,
    osr: u32,
    /// bits already shifted out; starts fully shifted so a fresh unit reads empty
    osr_count: u8,
    isr: u32,
    isr_count: u8,
    delay: u8,
    running: bool,
    /// instructions forced ahead of the program, used by the init sequences
    exec: Deque<Instr, 4>,
    tx: Deque<u32, FIFO_DEPTH>,
    rx: Deque<u32, FIFO_DEPTH>,
    side_level: bool,
    out_level: bool,
    drain_on: bool,
}

impl Unit {
    pub fn new(index: u8, config: UnitConfig, program: &'static Program) -> Self {
        Self {
            index, config, program,
            pc: program.wrap_start,
            x: 0, y: 0,
            osr: 0, osr_count: 32,
            isr: 0, isr_count: 0,
            delay: 0,
            running: false,
            exec: Deque::new(),
            tx: Deque::new(),
            rx: Deque::new(),
            side_level: program.side_init,
            out_level: false,
            drain_on: false,
        }
    }

    pub fn index(&self) -> u8 {self.index}
    pub fn clock_div(&self) -> u16 {self.config.clock_div}
    pub fn program(&self) -> &'static Program {self.program}
    pub(crate) fn bindings(&self) -> &Bindings {&self.config.bindings}

    /// queue an instruction to run ahead of the program, even when stopped
    pub fn force(&mut self, instr: Instr) {
        self.exec.push_back(instr).expect("forced instruction queue overflow");
    }
    /// begin executing the program from its wrap start
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn tx_capacity(&self) -> usize {
        match self.config.join {
            FifoJoin::TxOnly => FIFO_DEPTH,
            FifoJoin::Split => FIFO_DEPTH / 2,
            FifoJoin::RxOnly => 0,
        }
    }
    pub fn rx_capacity(&self) -> usize {
        match self.config.join {
            FifoJoin::RxOnly => FIFO_DEPTH,
            FifoJoin::Split => FIFO_DEPTH / 2,
            FifoJoin::TxOnly => 0,
        }
    }
    pub fn tx_level(&self) -> usize {self.tx.len()}
    pub fn rx_level(&self) -> usize {self.rx.len()}

    /// host push into the transmit FIFO; false when at capacity
    pub fn tx_push(&mut self, word: u32) -> bool {
        if self.tx.len() >= self.tx_capacity()
            {return false}
        self.tx.push_back(word).ok();
        true
    }
    /// host pop from the receive FIFO
    pub fn rx_pop(&mut self) -> Option<u32> {
        self.rx.pop_front()
    }

    /// contribute this unit's drives to the wired-AND line levels
    pub(crate) fn apply_drives(&self, levels: &mut [bool; MAX_LINES]) {
        let b = &self.config.bindings;
        if let Some(id) = b.side {
            levels[usize::from(id.0)] &= self.side_level;
        }
        if let Some(id) = b.level {
            levels[usize::from(id.0)] &= self.out_level;
        }
        if let Some(id) = b.drain {
            if self.drain_on {
                levels[usize::from(id.0)] = false;
            }
        }
    }

    /// advance by one cycle of this unit's divided clock
    pub(crate) fn step(&mut self, lines: &[bool; MAX_LINES], flags: &mut [bool; START_FLAGS]) {
        if self.delay > 0 {
            self.delay -= 1;
            return;
        }
        let (instr, forced) = match self.exec.front() {
            Some(i) => (*i, true),
            None if self.running => (self.program.ops[usize::from(self.pc)], false),
            None => return,
        };
        // the side output is driven from the first attempt, stalled or not
        if let Some(level) = instr.side {
            self.side_level = level;
        }
        match self.execute(instr.op, lines, flags) {
            Outcome::Stall => (),
            Outcome::Done(jump) => {
                self.delay = instr.delay;
                if forced {
                    self.exec.pop_front();
                    return;
                }
                self.pc = match jump {
                    Some(target) => target,
                    None if self.pc == self.program.wrap_end => self.program.wrap_start,
                    None => self.pc + 1,
                };
            }
        }
    }

    fn execute(&mut self, op: Op, lines: &[bool; MAX_LINES], flags: &mut [bool; START_FLAGS]) -> Outcome {
        let flag = usize::from(self.index / 2);
        match op {
            Op::Nop => Outcome::Done(None),

            Op::Wait {on: WaitOn::Line, high} => {
                if self.line(self.config.bindings.gate, lines) == high
                    {Outcome::Done(None)}
                else
                    {Outcome::Stall}
            }
            Op::Wait {on: WaitOn::Flag, high} => {
                if flags[flag] == high {
                    // consuming the flag clears it
                    flags[flag] = false;
                    Outcome::Done(None)
                }
                else {Outcome::Stall}
            }
            Op::Irq => {
                flags[flag] = true;
                Outcome::Done(None)
            }

            Op::Pull {block} => {
                match self.tx.pop_front() {
                    Some(word) => {
                        trace!("unit {}: reloaded {:#010x}", self.index, word);
                        self.osr = word;
                        self.osr_count = 0;
                        Outcome::Done(None)
                    }
                    None if block => Outcome::Stall,
                    None => {
                        // starved non-blocking pull copies X back instead
                        self.osr = self.x;
                        self.osr_count = 0;
                        Outcome::Done(None)
                    }
                }
            }
            Op::Push {if_full, block} => {
                if if_full && self.isr_count < self.config.push_threshold
                    {return Outcome::Done(None)}
                if self.rx.len() < self.rx_capacity() {
                    trace!("unit {}: pushed {:#010x}", self.index, self.isr);
                    self.rx.push_back(self.isr).ok();
                }
                else if block {
                    return Outcome::Stall;
                }
                else {
                    debug!("unit {}: receive fifo full, word dropped", self.index);
                }
                self.isr = 0;
                self.isr_count = 0;
                Outcome::Done(None)
            }

            Op::Mov {dst, src, invert} => {
                let value = match src {
                    MovSrc::X => self.x,
                    MovSrc::Y => self.y,
                    MovSrc::Osr => self.osr,
                    MovSrc::Pins => self.input_word(lines),
                    MovSrc::Status =>
                        if (self.tx.len() as u8) < self.config.tx_status_level {u32::MAX} else {0},
                    MovSrc::Null => 0,
                };
                let value = if invert {!value} else {value};
                match dst {
                    MovDst::X => self.x = value,
                    MovDst::Y => self.y = value,
                    MovDst::Osr => {
                        self.osr = value;
                        self.osr_count = 0;
                    }
                    MovDst::Isr => {
                        self.isr = value;
                        self.isr_count = 0;
                    }
                    MovDst::PinDirs => self.drain_on = value & 1 != 0,
                }
                Outcome::Done(None)
            }
            Op::Set {dst, value} => {
                match dst {
                    WriteDst::Pins => self.out_level = value & 1 != 0,
                    WriteDst::PinDirs => self.drain_on = value & 1 != 0,
                }
                Outcome::Done(None)
            }

            Op::Out {dst, count} => {
                let n = u32::from(count.min(32));
                let bits = match self.config.out_shift {
                    ShiftDir::Left => {
                        let b = if n == 32 {self.osr} else {self.osr >> (32 - n)};
                        self.osr = if n == 32 {0} else {self.osr << n};
                        b
                    }
                    ShiftDir::Right => {
                        let b = if n == 32 {self.osr} else {self.osr & ((1u32 << n) - 1)};
                        self.osr = if n == 32 {0} else {self.osr >> n};
                        b
                    }
                };
                self.osr_count = (self.osr_count.saturating_add(count)).min(32);
                match dst {
                    OutDst::Pins => self.out_level = bits & 1 != 0,
                    OutDst::PinDirs => self.drain_on = bits & 1 != 0,
                    OutDst::Null => (),
                }
                Outcome::Done(None)
            }
            Op::In {count} => {
                let n = u32::from(count.min(32));
                let word = self.input_word(lines) & if n == 32 {u32::MAX} else {(1u32 << n) - 1};
                match self.config.in_shift {
                    ShiftDir::Left =>
                        self.isr = if n == 32 {word} else {(self.isr << n) | word},
                    ShiftDir::Right =>
                        self.isr = if n == 32 {word} else {(self.isr >> n) | (word << (32 - n))},
                }
                self.isr_count = (self.isr_count.saturating_add(count)).min(32);
                Outcome::Done(None)
            }

            Op::Jmp {cond, target} => {
                let taken = match cond {
                    Cond::Always => true,
                    Cond::XZero => self.x == 0,
                    Cond::XDec => {
                        let taken = self.x != 0;
                        // post-decrement regardless, wrapping through zero
                        self.x = self.x.wrapping_sub(1);
                        taken
                    }
                    Cond::OsrNotEmpty => self.osr_count < self.config.pull_threshold,
                    Cond::PinHigh => self.line(self.config.bindings.branch, lines),
                };
                Outcome::Done(if taken {Some(target)} else {None})
            }
        }
    }

    /// the input group packed LSB-first. unbound inputs read pulled-up high
    fn input_word(&self, lines: &[bool; MAX_LINES]) -> u32 {
        let mut word = 0;
        for (bit, input) in self.config.bindings.inputs.iter().enumerate() {
            if self.line(*input, lines) {
                word |= 1 << bit;
            }
        }
        word
    }
    fn line(&self, id: Option<LineId>, lines: &[bool; MAX_LINES]) -> bool {
        match id {
            Some(id) => lines[usize::from(id.0)],
            None => true,
        }
    }
}
