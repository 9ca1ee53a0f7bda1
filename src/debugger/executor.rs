use std::collections::HashSet;

use super::commands::{BreakpointAction, Command, CommandError, CommandResult, SetTarget};
use crate::nibble::u4;
use crate::opcode::Opcode;
use crate::runner::{Runner, RunnerEvent};
use crate::vm::{ExecError, Vm};

/// Drives a [`Runner`] on behalf of the debugger frontend: holds the
/// keypad state, the breakpoint set and the running/paused flag, and
/// turns parsed [`Command`]s into machine operations.
pub struct Executor {
    runner: Runner,
    breakpoints: HashSet<u16>,
    keypad: [bool; 16],
    is_running: bool,
}

impl Executor {
    pub fn new(runner: Runner) -> Self {
        Executor {
            runner,
            breakpoints: HashSet::new(),
            keypad: [false; 16],
            is_running: false,
        }
    }

    /// Advances the machine when in running mode. A breakpoint hit or an
    /// execution fault drops back to paused.
    pub fn poll(&mut self, dt: f32) -> Result<RunnerEvent, ExecError> {
        if !self.is_running {
            return Ok(RunnerEvent::Ran);
        }

        let result =
            self.runner
                .tick_with_breakpoints(dt, &self.keypad, Some(&self.breakpoints));

        if matches!(result, Err(_) | Ok(RunnerEvent::HitBreakpoint)) {
            self.is_running = false;
        }

        result
    }

    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        match command {
            Command::Run => {
                self.is_running = true;
                Ok(CommandResult::Ok)
            }
            Command::Pause => {
                self.pause();
                Ok(CommandResult::Ok)
            }
            Command::Step => {
                self.runner.vm_mut().step(&self.keypad)?;
                Ok(CommandResult::Ok)
            }
            Command::Breakpoint { action } => Ok(self.handle_breakpoint(action)),
            Command::Set { target, value } => self.handle_set(target, value),
            Command::Mem { start, len } => Ok(self.dump_memory(start, len)),
            Command::Disasm { start, len } => Ok(self.disassemble(start, len)),
            Command::Reset => {
                self.runner.vm_mut().reset();
                Ok(CommandResult::Ok)
            }
            Command::Quit => Ok(CommandResult::Quit),
        }
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    pub fn keypad(&self) -> &[bool; 16] {
        &self.keypad
    }

    pub fn vm(&self) -> &Vm {
        self.runner.vm()
    }

    fn handle_breakpoint(&mut self, action: BreakpointAction) -> CommandResult {
        match action {
            BreakpointAction::Set { addr } => {
                self.breakpoints.insert(addr);
            }
            BreakpointAction::Clear { addr } => {
                self.breakpoints.remove(&addr);
            }
            BreakpointAction::ClearAll => {
                self.breakpoints.clear();
            }
            BreakpointAction::List => {
                let mut breakpoints: Vec<u16> = self.breakpoints.iter().copied().collect();
                breakpoints.sort();
                return CommandResult::Breakpoints(breakpoints);
            }
        }

        CommandResult::Ok
    }

    fn handle_set(&mut self, target: SetTarget, value: u16) -> Result<CommandResult, CommandError> {
        let vm = self.runner.vm_mut();

        match target {
            SetTarget::V(reg) => {
                let value = u8::try_from(value).map_err(|_| CommandError::ValueOutOfRange)?;
                vm.set_register(reg, value);
            }
            SetTarget::I => {
                if value > 0x0FFF {
                    return Err(CommandError::ValueOutOfRange);
                }
                vm.set_index(value);
            }
            SetTarget::Pc => {
                if value > 0x0FFF {
                    return Err(CommandError::ValueOutOfRange);
                }
                vm.set_pc(value);
            }
        }

        Ok(CommandResult::Ok)
    }

    fn dump_memory(&self, start: u16, len: u16) -> CommandResult {
        let memory = self.runner.vm().memory();
        let data = (0..len)
            .map(|offset| memory.read(start.wrapping_add(offset)))
            .collect();

        CommandResult::MemDump {
            offset: start,
            data,
        }
    }

    fn disassemble(&self, start: u16, len: u16) -> CommandResult {
        let memory = self.runner.vm().memory();
        let listing = (0..len)
            .map(|n| {
                let addr = start.wrapping_add(n * 2);
                let word =
                    u16::from_be_bytes([memory.read(addr), memory.read(addr.wrapping_add(1))]);
                (word, Opcode::decode(word))
            })
            .collect();

        CommandResult::Disasm {
            offset: start,
            listing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor_with(words: &[u16]) -> Executor {
        let rom: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        let mut vm = Vm::new();
        vm.load(&rom).unwrap();
        Executor::new(Runner::new(vm))
    }

    #[test]
    fn step_executes_one_instruction_while_paused() {
        let mut executor = executor_with(&[0x6142]);
        executor.execute(Command::Step).unwrap();
        assert_eq!(executor.vm().registers()[0x1], 0x42);
        assert!(!executor.is_running());
    }

    #[test]
    fn poll_is_inert_while_paused() {
        let mut executor = executor_with(&[0x6142]);
        executor.poll(1.0).unwrap();
        assert_eq!(executor.vm().pc(), 0x200);
    }

    #[test]
    fn breakpoint_pauses_a_running_machine() {
        let mut executor = executor_with(&[0x6001, 0x6102, 0x1204]);
        executor
            .execute(Command::Breakpoint {
                action: BreakpointAction::Set { addr: 0x202 },
            })
            .unwrap();
        executor.execute(Command::Run).unwrap();

        let event = executor.poll(1.0).unwrap();
        assert_eq!(event, RunnerEvent::HitBreakpoint);
        assert!(!executor.is_running());
        assert_eq!(executor.vm().pc(), 0x202);
    }

    #[test]
    fn set_rejects_out_of_range_values() {
        let mut executor = executor_with(&[0x1200]);
        assert!(matches!(
            executor.execute(Command::Set {
                target: SetTarget::V(u4::new(0)),
                value: 0x100,
            }),
            Err(CommandError::ValueOutOfRange)
        ));
        assert!(matches!(
            executor.execute(Command::Set {
                target: SetTarget::Pc,
                value: 0x1000,
            }),
            Err(CommandError::ValueOutOfRange)
        ));
    }

    #[test]
    fn disasm_decodes_loaded_words() {
        let executor = executor_with(&[0x00E0, 0x1200]);
        let CommandResult::Disasm { offset, listing } = executor.disassemble(0x200, 2) else {
            panic!("expected a disassembly");
        };
        assert_eq!(offset, 0x200);
        assert_eq!(listing[0], (0x00E0, Opcode::ClearScreen));
        assert_eq!(listing[1], (0x1200, Opcode::Jump { nnn: 0x200 }));
    }
}
