//! A CHIP-8 virtual machine.
//!
//! The crate is split along the machine's components: [`Memory`] holds the
//! address space and loads ROMs, [`CallStack`] tracks subroutine returns,
//! [`Timers`] holds the two 60 Hz down-counters, [`Framebuffer`] owns the
//! 64x32 pixel grid and the XOR sprite compositor, and [`Vm`] ties them
//! together with the fetch/decode/execute engine. [`Runner`] paces the
//! whole machine against wall-clock time.
//!
//! Key input is injected: anything implementing [`KeyInput`] (a plain
//! `[bool; 16]` works) is lent to the machine for the duration of a tick.

pub mod debugger;

mod font;
mod framebuffer;
mod memory;
mod nibble;
mod opcode;
mod runner;
mod stack;
mod timers;
mod vm;

pub use framebuffer::{DISPLAY_HEIGHT, DISPLAY_WIDTH, Framebuffer, PixelGrid};
pub use memory::{LoadError, MEMORY_SIZE, Memory, ROM_CAPACITY, ROM_START};
pub use nibble::u4;
pub use opcode::{AluOp, Opcode};
pub use runner::{CPU_HZ, Runner, RunnerEvent, TIMER_HZ};
pub use stack::{CLASSIC_STACK_DEPTH, CallStack};
pub use timers::Timers;
pub use vm::{ExecError, KeyInput, Step, Vm};
