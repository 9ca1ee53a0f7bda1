use log::warn;

use crate::font::{FONT_START, GLYPH_SIZE};
use crate::framebuffer::Framebuffer;
use crate::memory::{LoadError, Memory, ROM_START};
use crate::nibble::u4;
use crate::opcode::{AluOp, Opcode};
use crate::stack::CallStack;
use crate::timers::Timers;

/// The key-input port: reports whether hex key `key` (0x0-0xF) is held.
///
/// The physical-key-to-hex mapping belongs to the frontend; the machine
/// only ever asks about hex codes. Implemented for `[bool; 16]` and for
/// closures so tests and frontends can inject whatever they keep state in.
pub trait KeyInput {
    fn is_pressed(&self, key: u8) -> bool;
}

impl KeyInput for [bool; 16] {
    fn is_pressed(&self, key: u8) -> bool {
        self[usize::from(key & 0x0F)]
    }
}

impl<F: Fn(u8) -> bool> KeyInput for F {
    fn is_pressed(&self, key: u8) -> bool {
        self(key & 0x0F)
    }
}

/// Fatal execution faults. Unknown opcodes are deliberately not here:
/// they are reported through the `log` facade and skipped.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("RET with an empty call stack at pc {pc:#05X}")]
    StackUnderflow { pc: u16 },
    #[error("call stack exceeded its limit of {limit} frames")]
    StackOverflow { limit: usize },
}

/// Outcome of a single instruction step.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// An instruction was executed.
    Ran,
    /// The machine is suspended on FX0A; no instruction was consumed and
    /// none will be until a key is pressed.
    AwaitingKey,
}

/// The CHIP-8 machine: register file, index, program counter and the
/// fetch/decode/execute engine, built over [`Memory`], [`CallStack`],
/// [`Timers`] and [`Framebuffer`].
pub struct Vm {
    memory: Memory,
    framebuffer: Framebuffer,
    stack: CallStack,
    timers: Timers,

    v: [u8; 16],
    i: u16,
    pc: u16,

    /// Destination register of a pending FX0A, if the machine is suspended.
    key_wait: Option<u4>,
    /// Last loaded ROM, kept so `reset` can re-apply it.
    rom: Vec<u8>,
}

impl Vm {
    /// A machine with an unbounded call stack and no program loaded.
    pub fn new() -> Self {
        Self::with_stack(CallStack::new())
    }

    /// A machine whose call stack overflows past a fixed bound, as the
    /// original hardware's did (see [`crate::CLASSIC_STACK_DEPTH`]).
    pub fn with_stack_limit(limit: usize) -> Self {
        Self::with_stack(CallStack::with_limit(limit))
    }

    fn with_stack(stack: CallStack) -> Self {
        Vm {
            memory: Memory::new(),
            framebuffer: Framebuffer::new(),
            stack,
            timers: Timers::new(),
            v: [0; 16],
            i: 0,
            pc: ROM_START,
            key_wait: None,
            rom: Vec::new(),
        }
    }

    /// Loads a ROM and resets the machine to run it from 0x200.
    ///
    /// On failure the previous program and machine state are untouched.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.memory.load(rom)?;
        self.rom = rom.to_vec();
        self.reset_state();
        Ok(())
    }

    /// Reinitializes every state block (registers, stack, timers,
    /// framebuffer, pending key wait) and re-applies the loaded ROM.
    pub fn reset(&mut self) {
        let rom = std::mem::take(&mut self.rom);
        self.memory
            .load(&rom)
            .expect("ROM size was validated when it was loaded");
        self.rom = rom;
        self.reset_state();
    }

    fn reset_state(&mut self) {
        self.framebuffer.clear();
        self.stack.clear();
        self.timers.reset();
        self.v = [0; 16];
        self.i = 0;
        self.pc = ROM_START;
        self.key_wait = None;
    }

    /// Executes one instruction, or resumes/continues an FX0A key wait.
    ///
    /// While suspended the machine re-polls `keys` on every call and
    /// consumes no instructions; the first pressed key (lowest hex code
    /// if several are down) lands in the waiting register and execution
    /// resumes with the PC already past the wait instruction.
    pub fn step(&mut self, keys: &dyn KeyInput) -> Result<Step, ExecError> {
        if let Some(x) = self.key_wait {
            let Some(key) = first_pressed(keys) else {
                return Ok(Step::AwaitingKey);
            };
            self.v[x] = key.value();
            self.key_wait = None;
        }

        let word = self.fetch();
        self.execute(Opcode::decode(word), keys)
    }

    /// One 60 Hz timer tick; see [`crate::Runner`] for pacing.
    pub fn timer_tick(&mut self) {
        self.timers.tick();
    }

    /// True while the sound timer is non-zero and a beep should play.
    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    /// Reads the big-endian instruction word at the PC, then advances the
    /// PC by two (masked into memory) before execution, so control-flow
    /// instructions simply overwrite it.
    fn fetch(&mut self) -> u16 {
        let high = self.memory.read(self.pc);
        let low = self.memory.read(self.pc.wrapping_add(1));
        self.pc = self.pc.wrapping_add(2) & 0x0FFF;

        u16::from_be_bytes([high, low])
    }

    fn execute(&mut self, opcode: Opcode, keys: &dyn KeyInput) -> Result<Step, ExecError> {
        match opcode {
            Opcode::ClearScreen => {
                self.framebuffer.clear();
            }
            Opcode::Return => {
                let at = self.pc.wrapping_sub(2) & 0x0FFF;
                self.pc = self.stack.pop(at)?;
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::Call { nnn } => {
                self.stack.push(self.pc)?;
                self.pc = nnn;
            }
            Opcode::SkipEqImm { x, nn } => {
                if self.v[x] == nn {
                    self.skip();
                }
            }
            Opcode::SkipNeImm { x, nn } => {
                if self.v[x] != nn {
                    self.skip();
                }
            }
            Opcode::SkipEqReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.skip();
                }
            }
            Opcode::SkipNeReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.skip();
                }
            }
            Opcode::LoadImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::Alu { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::LoadIndex { nnn } => {
                self.i = nnn;
            }
            Opcode::JumpV0 { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into()) & 0x0FFF;
            }
            Opcode::Random { x, nn } => {
                self.v[x] = rand::random::<u8>() & nn;
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n);
            }
            Opcode::SkipKeyPressed { x } => {
                if keys.is_pressed(self.v[x] & 0x0F) {
                    self.skip();
                }
            }
            Opcode::SkipKeyNotPressed { x } => {
                if !keys.is_pressed(self.v[x] & 0x0F) {
                    self.skip();
                }
            }
            Opcode::WaitKey { x } => {
                return Ok(self.execute_wait_key(x, keys));
            }
            Opcode::LoadDelay { x } => {
                self.v[x] = self.timers.delay;
            }
            Opcode::SetDelay { x } => {
                self.timers.delay = self.v[x];
            }
            Opcode::SetSound { x } => {
                self.timers.sound = self.v[x];
            }
            Opcode::AddIndex { x } => {
                self.i = self.i.wrapping_add(self.v[x].into()) & 0x0FFF;
            }
            Opcode::FontGlyph { x } => {
                self.i = FONT_START + u16::from(self.v[x]) * GLYPH_SIZE;
            }
            Opcode::StoreBcd { x } => {
                let value = self.v[x];
                self.memory.write(self.i, value / 100);
                self.memory.write(self.i.wrapping_add(1), (value / 10) % 10);
                self.memory.write(self.i.wrapping_add(2), value % 10);
            }
            Opcode::StoreRegs { x } => {
                for reg in 0..=usize::from(x) {
                    self.memory.write(self.i.wrapping_add(reg as u16), self.v[reg]);
                }
            }
            Opcode::LoadRegs { x } => {
                for reg in 0..=usize::from(x) {
                    self.v[reg] = self.memory.read(self.i.wrapping_add(reg as u16));
                }
            }
            Opcode::Unknown(word) => {
                let at = self.pc.wrapping_sub(2) & 0x0FFF;
                warn!("skipping unrecognized opcode {word:#06X} at {at:#05X}");
            }
        }

        Ok(Step::Ran)
    }

    /// The 8XYn group. Flags are computed from the operand values as they
    /// were before the operation, and VF is written before the destination,
    /// so a degenerate X=F encoding ends up holding the result.
    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        let vx = self.v[x];
        let vy = self.v[y];

        match op {
            AluOp::Load => self.v[x] = vy,
            AluOp::Or => self.v[x] = vx | vy,
            AluOp::And => self.v[x] = vx & vy,
            AluOp::Xor => self.v[x] = vx ^ vy,
            AluOp::Add => {
                let (sum, carry) = vx.overflowing_add(vy);
                self.v[u4::new(0xF)] = carry as u8;
                self.v[x] = sum;
            }
            AluOp::Sub => {
                let (diff, borrow) = vx.overflowing_sub(vy);
                self.v[u4::new(0xF)] = !borrow as u8;
                self.v[x] = diff;
            }
            AluOp::SubFrom => {
                let (diff, borrow) = vy.overflowing_sub(vx);
                self.v[u4::new(0xF)] = !borrow as u8;
                self.v[x] = diff;
            }
            AluOp::Shr => {
                self.v[u4::new(0xF)] = vx & 1;
                self.v[x] = vx >> 1;
            }
            AluOp::Shl => {
                self.v[u4::new(0xF)] = vx >> 7;
                self.v[x] = vx << 1;
            }
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) {
        let mut rows = [0u8; 15];
        let rows = &mut rows[..usize::from(n)];
        for (offset, row) in rows.iter_mut().enumerate() {
            *row = self.memory.read(self.i.wrapping_add(offset as u16));
        }

        let erased = self.framebuffer.draw_sprite(self.v[x], self.v[y], rows);
        self.v[u4::new(0xF)] = erased as u8;
    }

    /// FX0A. If a key is already down the wait resolves immediately;
    /// otherwise the machine suspends with the PC left past this
    /// instruction and [`Vm::step`] re-polls until a key arrives.
    fn execute_wait_key(&mut self, x: u4, keys: &dyn KeyInput) -> Step {
        match first_pressed(keys) {
            Some(key) => {
                self.v[x] = key.value();
                Step::Ran
            }
            None => {
                self.key_wait = Some(x);
                Step::AwaitingKey
            }
        }
    }

    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2) & 0x0FFF;
    }
}

/// Read-only views for frontends and the debugger, plus the handful of
/// pokes the debugger's `set` command needs.
impl Vm {
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    /// True while the machine is suspended on FX0A.
    pub fn awaiting_key(&self) -> bool {
        self.key_wait.is_some()
    }

    pub fn set_register(&mut self, x: u4, value: u8) {
        self.v[x] = value;
    }

    pub fn set_index(&mut self, value: u16) {
        self.i = value & 0x0FFF;
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value & 0x0FFF;
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowest pressed hex key, if any. Resolves simultaneous presses
/// deterministically in FX0A's favor of the smaller code.
fn first_pressed(keys: &dyn KeyInput) -> Option<u4> {
    u4::all().find(|&key| keys.is_pressed(key.value()))
}
