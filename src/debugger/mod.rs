//! Interactive debugger core: a clap-based command grammar and an
//! executor that drives a [`crate::Runner`] with breakpoints, single
//! stepping, memory dumps and disassembly. The TUI frontend lives in
//! `src/bin/dbg.rs`.

mod commands;
mod executor;

pub use commands::*;
pub use executor::*;
