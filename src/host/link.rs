use std::{sync::Arc, thread};
use log::*;

use crate::{
    frame,
    programs::{RECEIVER, RECEIVER_INIT, TRANSMITTER, TRANSMITTER_INIT},
    seq::LineId,
    unit::{Bindings, FifoJoin, ShiftDir, Unit, UnitConfig},
    };
use super::{Error, LinkBus, bus::Shared};


impl LinkBus {
    /// claim a lane sampling `data` against the externally driven `clock`,
    /// with `pulse` as the open-drain validity line
    pub fn receiver(&self, index: u8, data: LineId, pulse: LineId, clock: LineId) -> Result<Receiver, Error> {
        assert!(index % 2 == 0, "receivers occupy even unit indices");
        let config = UnitConfig {
            clock_div: 1,
            // data arrives MSB first
            in_shift: ShiftDir::Left,
            push_threshold: frame::PAYLOAD_BITS as u8,
            // the snapshot is picked apart LSB first
            out_shift: ShiftDir::Right,
            pull_threshold: 32,
            join: FifoJoin::RxOnly,
            tx_status_level: 0,
            bindings: Bindings {
                inputs: [Some(data), Some(pulse), Some(clock), None],
                gate: Some(clock),
                branch: Some(pulse),
                drain: Some(pulse),
                .. Default::default()
            },
        };
        {
            let mut seq = self.shared.seq.blocking_lock();
            seq.install(Unit::new(index, config, &RECEIVER)).map_err(Error::Config)?;
            let unit = seq.unit_mut(index).unwrap();
            for instr in RECEIVER_INIT.ops {
                unit.force(*instr);
            }
            unit.start();
        }
        debug!("receiver on unit {}", index);
        Ok(Receiver {
            shared: self.shared.clone(),
            unit: index,
        })
    }

    /// claim a lane driving `clock` and `data`, with `pulse` as the
    /// open-drain validity line it both samples and relays
    pub fn transmitter(&self, index: u8, data: LineId, pulse: LineId, clock: LineId) -> Result<Transmitter, Error> {
        assert!(index % 2 == 1, "transmitters occupy odd unit indices");
        let config = UnitConfig {
            clock_div: 1,
            // data leaves MSB first
            out_shift: ShiftDir::Left,
            pull_threshold: 32,
            in_shift: ShiftDir::Left,
            push_threshold: 32,
            join: FifoJoin::TxOnly,
            // the stale test: status reads all-ones while the FIFO is empty
            tx_status_level: 1,
            bindings: Bindings {
                side: Some(clock),
                level: Some(data),
                drain: Some(pulse),
                inputs: [Some(pulse), None, None, None],
                .. Default::default()
            },
        };
        {
            let mut seq = self.shared.seq.blocking_lock();
            seq.install(Unit::new(index, config, &TRANSMITTER)).map_err(Error::Config)?;
            let unit = seq.unit_mut(index).unwrap();
            for instr in TRANSMITTER_INIT.ops {
                unit.force(*instr);
            }
            unit.start();
        }
        debug!("transmitter on unit {}", index);
        Ok(Transmitter {
            shared: self.shared.clone(),
            unit: index,
        })
    }
}


/// driver for a receiving lane
pub struct Receiver {
    shared: Arc<Shared>,
    unit: u8,
}

impl Receiver {
    /// next received word, if any
    pub fn read(&self) -> Option<u32> {
        // no stalled-clock detection here: a dead clock is a read that never returns
        let mut seq = self.shared.seq.blocking_lock();
        seq.unit_mut(self.unit).unwrap().rx_pop()
    }

    /// drain into `buf` without blocking, returning the words filled
    pub fn read_array(&self, buf: &mut [u32]) -> usize {
        let mut seq = self.shared.seq.blocking_lock();
        let unit = seq.unit_mut(self.unit).unwrap();
        for (filled, slot) in buf.iter_mut().enumerate() {
            match unit.rx_pop() {
                Some(word) => *slot = word,
                None => return filled,
            }
        }
        buf.len()
    }

    /// spin until a word arrives
    pub fn read_blocking(&self) -> u32 {
        loop {
            if let Some(word) = self.read()
                {return word}
            thread::yield_now();
        }
    }

    /// fill all of `buf`, spinning for each word
    pub fn read_array_blocking(&self, buf: &mut [u32]) -> usize {
        for slot in buf.iter_mut() {
            *slot = self.read_blocking();
        }
        buf.len()
    }
}


/// driver for a transmitting lane
pub struct Transmitter {
    shared: Arc<Shared>,
    unit: u8,
}

impl Transmitter {
    /// queue one word; 0 when the FIFO is full, 1 otherwise
    pub fn write(&self, word: u32) -> usize {
        let mut seq = self.shared.seq.blocking_lock();
        if seq.unit_mut(self.unit).unwrap().tx_push(word) {1} else {0}
    }

    /// queue words from `buf` until the FIFO fills, returning the words taken
    pub fn write_array(&self, buf: &[u32]) -> usize {
        let mut seq = self.shared.seq.blocking_lock();
        let unit = seq.unit_mut(self.unit).unwrap();
        for (written, word) in buf.iter().enumerate() {
            if !unit.tx_push(*word) {
                return written;
            }
        }
        buf.len()
    }

    /// spin until the word is queued
    pub fn write_blocking(&self, word: u32) {
        loop {
            if self.write(word) == 1
                {return}
            thread::yield_now();
        }
    }

    /// queue all of `buf`, spinning whenever the FIFO is full
    pub fn write_array_blocking(&self, buf: &[u32]) {
        for word in buf {
            self.write_blocking(*word);
        }
    }
}
