#![no_std]
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "host")]
mod mutex;
mod utils;


pub mod instr;
pub mod unit;
pub mod seq;
pub mod programs;
pub mod frame;
#[cfg(feature = "host")]
pub mod host;
