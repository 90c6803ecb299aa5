use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, AtomicU64, Ordering::*},
    thread,
    };
use log::*;

use crate::{
    mutex::BusyMutex,
    seq::{LineId, Sequencer},
    };


/// cycles stepped per lock acquisition, so driver calls interleave promptly
const BURST: u32 = 256;

pub(super) struct Shared {
    pub(super) seq: BusyMutex<Sequencer>,
    /// mirror of the model cycle counter for lock-free reads
    cycle: AtomicU64,
    running: AtomicBool,
}

/**
    the sequencer block and the thread that keeps it clocked

    driver handles stay valid as long as the bus lives; dropping the bus
    stops the clock, which is the only way out of the watchdog's tripped
    state.
*/
pub struct LinkBus {
    pub(super) shared: Arc<Shared>,
    core_hz: u32,
    stepper: Option<thread::JoinHandle<()>>,
}

impl LinkBus {
    /// bring up an empty block clocked at `core_hz` model hertz
    pub fn new(core_hz: u32) -> Self {
        let shared = Arc::new(Shared {
            seq: BusyMutex::new(Sequencer::new(core_hz)),
            cycle: AtomicU64::new(0),
            running: AtomicBool::new(true),
        });
        let stepper = thread::spawn({
            let shared = shared.clone();
            move || {
                while shared.running.load(Relaxed) {
                    {
                        let mut seq = shared.seq.blocking_lock();
                        seq.step_many(BURST);
                        shared.cycle.store(seq.cycle(), Relaxed);
                    }
                    // leave the lock free for driver calls
                    thread::yield_now();
                }
            }
        });
        info!("link bus clocked at {} Hz", core_hz);
        Self {
            shared,
            core_hz,
            stepper: Some(stepper),
        }
    }

    pub fn core_hz(&self) -> u32 {self.core_hz}

    /// core cycles stepped so far
    pub fn cycles(&self) -> u64 {
        self.shared.cycle.load(Relaxed)
    }
    /// spin until the model has advanced by another `cycles` cycles
    pub fn wait_cycles(&self, cycles: u64) {
        let target = self.cycles() + cycles;
        while self.cycles() < target {
            thread::yield_now();
        }
    }

    /// current level of a line
    pub fn line(&self, id: LineId) -> bool {
        self.shared.seq.blocking_lock().line(id)
    }
    /// pull a line low from outside the block, as a fault or a wiring test
    pub fn hold_low(&self, id: LineId) {
        self.shared.seq.blocking_lock().hold_low(id);
    }
    /// release the external pull
    pub fn release(&self, id: LineId) {
        self.shared.seq.blocking_lock().release(id);
    }
}

impl Drop for LinkBus {
    fn drop(&mut self) {
        self.shared.running.store(false, Relaxed);
        if let Some(stepper) = self.stepper.take() {
            stepper.join().ok();
        }
    }
}
