use std::{sync::Arc, thread};
use log::*;

use crate::{
    programs::{self, WATCHDOG, WATCHDOG_INIT},
    seq::LineId,
    unit::{Bindings, FifoJoin, ShiftDir, Unit, UnitConfig},
    };
use super::{Error, LinkBus, bus::Shared};


/// grace period queued at construction, the five second rule
const GRACE_MS: i32 = 5000;
/// what a negative timeout queues instead. the joined FIFO can be preloaded
/// with it to effectively disable the watchdog for over 2 hours
const DISABLE_MS: i32 = 21 * 60 * 1000;


impl LinkBus {
    /// claim a lane for a liveness monitor asserting `error_line` (open
    /// drain, latched low forever once tripped)
    pub fn watchdog(&self, index: u8, error_line: LineId) -> Result<Watchdog, Error> {
        assert!(index % 2 == 0, "watchdogs occupy even unit indices");
        let config = UnitConfig {
            clock_div: programs::WATCHDOG_DIV,
            out_shift: ShiftDir::Left,
            in_shift: ShiftDir::Left,
            pull_threshold: 32,
            push_threshold: 32,
            join: FifoJoin::TxOnly,
            tx_status_level: 0,
            bindings: Bindings {
                drain: Some(error_line),
                .. Default::default()
            },
        };
        let new = Watchdog {
            shared: self.shared.clone(),
            unit: index,
            core_hz: self.core_hz(),
        };
        {
            let mut seq = self.shared.seq.blocking_lock();
            seq.install(Unit::new(index, config, &WATCHDOG)).map_err(Error::Config)?;
            let unit = seq.unit_mut(index).unwrap();
            for instr in WATCHDOG_INIT.ops {
                unit.force(*instr);
            }
            unit.tx_push(new.count(GRACE_MS));
            unit.start();
        }
        debug!("watchdog on unit {}", index);
        Ok(new)
    }
}

/**
    driver for the liveness monitor lane

    the lane counts down the queued timeouts one by one; once it runs dry it
    trips, latches the error line low and goes silent for good. there is no
    soft recovery: only tearing down the whole bus resets it.
*/
pub struct Watchdog {
    shared: Arc<Shared>,
    unit: u8,
    core_hz: u32,
}

impl Watchdog {
    /// queue one timeout, spinning while the FIFO is full
    pub fn pet_blocking(&self, timeout_ms: i32) {
        let word = self.count(timeout_ms);
        loop {
            {
                let mut seq = self.shared.seq.blocking_lock();
                let unit = seq.unit_mut(self.unit).unwrap();
                if unit.tx_push(word)
                    {return}
            }
            thread::yield_now();
        }
    }

    /// top the queue up to `level` timeouts without blocking, returning how
    /// many were added. the returned count is the caller's only signal that
    /// it is falling behind
    pub fn pet(&self, level: usize, timeout_ms: i32) -> usize {
        let word = self.count(timeout_ms);
        let mut seq = self.shared.seq.blocking_lock();
        let unit = seq.unit_mut(self.unit).unwrap();
        let mut added = 0;
        while unit.tx_level() < level && unit.tx_push(word) {
            added += 1;
        }
        added
    }

    /// the inverted tick count for a timeout. clamped to one tick so a zero
    /// timeout still counts as a pet rather than an instant trip
    fn count(&self, timeout_ms: i32) -> u32 {
        let ms = if timeout_ms < 0 {DISABLE_MS} else {timeout_ms};
        let ticks = u64::from(self.core_hz) * ms as u64
            / (u64::from(programs::TICK_CYCLES) * 1000);
        !(ticks.clamp(1, u64::from(u32::MAX)) as u32)
    }
}
