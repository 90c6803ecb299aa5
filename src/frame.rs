/*!
    the host-side encoding of one link word

    a FIFO word carries 30 payload bits in its low bits; the 2 high bits are
    reserved and consumed by the frame's stop/start slots, so they never reach
    the far side.
*/

use bilge::prelude::*;
use crate::pack_bilge;


pub const PAYLOAD_BITS: u32 = 30;
pub const PAYLOAD_MASK: u32 = 0x3fff_ffff;

/// one word as written to the transmit FIFO or read from the receive FIFO
#[bitsize(32)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq)]
pub struct LinkWord {
    pub payload: u30,
    /// consumed by framing, never transmitted
    pub reserved: u2,
}
pack_bilge!(LinkWord, u32);

impl LinkWord {
    /// what the far side will observe for a raw word
    pub const fn mask(raw: u32) -> u32 {
        raw & PAYLOAD_MASK
    }
}
