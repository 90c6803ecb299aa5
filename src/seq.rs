/*!
    the sequencer block: the shared substrate the lanes run on

    it holds the open-drain line pool, the cross-lane start flags and up to
    eight execution units, and steps everything in lockstep from one core
    clock. every cycle all due units read the same line snapshot and their
    drives commit together, which gives the lanes synchronous-logic
    concurrency: a drive becomes visible to the other lanes on the next
    cycle, never mid-cycle.
*/

use log::*;

use crate::unit::Unit;


pub const MAX_LINES: usize = 16;
pub const MAX_UNITS: usize = 8;
/// one start flag per unit pair `2k / 2k+1`
pub const START_FLAGS: usize = MAX_UNITS / 2;

/// index into the block's line pool
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineId(pub u8);

pub struct Sequencer {
    units: [Option<Unit>; MAX_UNITS],
    /// external open-drain drivers (host or test harness) holding lines low
    held_low: [bool; MAX_LINES],
    /// edge-triggered start flags: raised by the even lane of a pair,
    /// consumed-and-cleared by a waiting odd lane. raising an already
    /// pending flag coalesces
    flags: [bool; START_FLAGS],
    cycle: u64,
    core_hz: u32,
}

impl Sequencer {
    pub fn new(core_hz: u32) -> Self {
        Self {
            units: core::array::from_fn(|_| None),
            held_low: [false; MAX_LINES],
            flags: [false; START_FLAGS],
            cycle: 0,
            core_hz,
        }
    }

    pub fn core_hz(&self) -> u32 {self.core_hz}
    pub fn cycle(&self) -> u64 {self.cycle}

    /// claim a unit slot. misconfiguration is rejected here, never at runtime
    pub fn install(&mut self, unit: Unit) -> Result<(), &'static str> {
        let index = usize::from(unit.index());
        if index >= MAX_UNITS
            {return Err("unit index out of range")}
        if self.units[index].is_some()
            {return Err("unit slot already taken")}
        if !unit.program().fits()
            {return Err("program does not fit instruction memory")}
        let b = unit.bindings();
        for line in [b.side, b.level, b.drain, b.branch, b.gate]
            .into_iter().chain(b.inputs).flatten()
        {
            if usize::from(line.0) >= MAX_LINES
                {return Err("line out of range")}
        }
        debug!("unit {} installed", index);
        self.units[index] = Some(unit);
        Ok(())
    }

    pub fn unit(&self, index: u8) -> Option<&Unit> {
        self.units.get(usize::from(index))?.as_ref()
    }
    pub fn unit_mut(&mut self, index: u8) -> Option<&mut Unit> {
        self.units.get_mut(usize::from(index))?.as_mut()
    }

    /// current level of a line
    pub fn line(&self, id: LineId) -> bool {
        self.levels()[usize::from(id.0)]
    }
    /// attach an external open-drain driver pulling the line low
    pub fn hold_low(&mut self, id: LineId) {
        self.held_low[usize::from(id.0)] = true;
    }
    /// release the external driver
    pub fn release(&mut self, id: LineId) {
        self.held_low[usize::from(id.0)] = false;
    }

    /// advance the block by one core-clock cycle
    pub fn step(&mut self) {
        let levels = self.levels();
        let cycle = self.cycle;
        for slot in &mut self.units {
            if let Some(unit) = slot {
                if cycle % u64::from(unit.clock_div()) == 0 {
                    unit.step(&levels, &mut self.flags);
                }
            }
        }
        self.cycle += 1;
    }

    pub fn step_many(&mut self, cycles: u32) {
        for _ in 0 .. cycles {
            self.step();
        }
    }

    /// wired-AND of every enabled driver, pulled up when undriven
    fn levels(&self) -> [bool; MAX_LINES] {
        let mut levels = [true; MAX_LINES];
        for (level, held) in levels.iter_mut().zip(self.held_low) {
            *level &= !held;
        }
        for unit in self.units.iter().flatten() {
            unit.apply_drives(&mut levels);
        }
        levels
    }
}
