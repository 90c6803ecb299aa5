/*!
    micro-operations and program descriptors for the sequencer lanes

    a program is a fixed, position-addressed sequence of [Instr], each carrying
    an optional 1-bit side output driven alongside the operation and a delay
    consumed after it completes. programs are immutable once defined and shared
    read-only by every unit running the same role.
*/


/// instruction memory available to one unit
pub const PROGRAM_MEMORY: usize = 32;

/// one micro-operation with its side output and post-completion delay
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Instr {
    pub op: Op,
    /// level driven on the side output while this instruction runs
    pub side: Option<bool>,
    /// extra cycles spent after the operation completes
    pub delay: u8,
}

impl Instr {
    pub const fn of(op: Op) -> Self {
        Self { op, side: None, delay: 0 }
    }
    pub const fn side(mut self, level: bool) -> Self {
        self.side = Some(level);
        self
    }
    pub const fn delay(mut self, cycles: u8) -> Self {
        self.delay = cycles;
        self
    }
}

/// the sequencer operation set
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Op {
    Nop,
    /// stall until a line or the lane-pair start flag reaches the wanted level.
    /// waiting on the flag consumes it
    Wait { on: WaitOn, high: bool },
    /// raise the lane-pair start flag, without waiting for its consumption
    Irq,
    /// move the next transmit-FIFO word into the output shift register.
    /// non-blocking on an empty FIFO copies the X scratch register instead
    Pull { block: bool },
    /// move the input shift register into the receive FIFO.
    /// `if_full` makes it a no-op below the autopush threshold; non-blocking
    /// on a full FIFO discards the word
    Push { if_full: bool, block: bool },
    Mov { dst: MovDst, src: MovSrc, invert: bool },
    /// write an immediate to an output
    Set { dst: WriteDst, value: u8 },
    /// shift `count` bits out of the output shift register
    Out { dst: OutDst, count: u8 },
    /// shift `count` bits from the input lines into the input shift register
    In { count: u8 },
    Jmp { cond: Cond, target: u8 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WaitOn {
    /// the unit's wait-line binding
    Line,
    /// the lane-pair start flag
    Flag,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MovDst {
    X,
    Y,
    /// refills the register, resetting its shift counter
    Osr,
    /// overwrites accumulated input, resetting its shift counter
    Isr,
    /// bit 0 drives the open-drain output enable
    PinDirs,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MovSrc {
    X,
    Y,
    Osr,
    /// the input line group, LSB first
    Pins,
    /// all-ones while the transmit FIFO holds fewer words than the
    /// configured status level, zero otherwise
    Status,
    Null,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WriteDst {
    /// the push-pull level output
    Pins,
    /// the open-drain output enable
    PinDirs,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OutDst {
    Pins,
    PinDirs,
    /// discard, advancing the shift counter only
    Null,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Cond {
    Always,
    /// X is zero
    XZero,
    /// X is non-zero prior to a post-decrement; X wraps through zero, which
    /// the watchdog relies on to detect a spent count
    XDec,
    /// the output shift register still holds unshifted bits
    OsrNotEmpty,
    /// the branch-test line is high
    PinHigh,
}

/// an immutable program: its ops, the hardware loop region, and how many
/// side-set bits its instructions drive
#[derive(Copy, Clone, Debug)]
pub struct Program {
    pub ops: &'static [Instr],
    pub wrap_start: u8,
    pub wrap_end: u8,
    pub side_set: u8,
    /// level of the side output before the first instruction drives it
    pub side_init: bool,
}

impl Program {
    /// whether this program fits a unit's instruction memory
    pub fn fits(&self) -> bool {
        self.ops.len() <= PROGRAM_MEMORY
            && usize::from(self.wrap_end) < self.ops.len()
            && self.wrap_start <= self.wrap_end
    }
}
