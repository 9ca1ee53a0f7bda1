use std::collections::HashSet;

use crate::vm::{ExecError, KeyInput, Step, Vm};

/// Virtual instruction rate. Original hardware speed is not emulated;
/// this is the customary comfortable rate for base CHIP-8 programs.
pub const CPU_HZ: f32 = 700.0;
/// Timer decrement rate. This one is authoritative.
pub const TIMER_HZ: f32 = 60.0;

const CPU_TIME_STEP: f32 = 1.0 / CPU_HZ;
const TIMER_TIME_STEP: f32 = 1.0 / TIMER_HZ;

/// Paces a [`Vm`] against wall-clock time.
///
/// The host calls [`Runner::tick`] once per frame with the elapsed time.
/// Elapsed time accumulates into two budgets: the instruction budget runs
/// one instruction per 1/700 s of virtual time, and every 1/60 s crossing
/// of the timer budget decrements the timers exactly once, however many
/// instructions ran in between.
pub struct Runner {
    vm: Vm,
    cpu_budget: f32,
    timer_budget: f32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RunnerEvent {
    /// The tick ran to the end of its budget (or suspended on a key wait).
    Ran,
    /// Execution stopped early because the PC reached a breakpoint.
    HitBreakpoint,
}

impl Runner {
    pub fn new(vm: Vm) -> Self {
        Runner {
            vm,
            cpu_budget: 0.0,
            timer_budget: 0.0,
        }
    }

    /// Advances the machine by `dt` seconds of wall-clock time.
    pub fn tick(&mut self, dt: f32, keys: &dyn KeyInput) -> Result<RunnerEvent, ExecError> {
        self.tick_with_breakpoints(dt, keys, None)
    }

    /// Like [`Runner::tick`], but stops after any instruction that lands
    /// the PC on a breakpoint. Used by the debugger.
    pub fn tick_with_breakpoints(
        &mut self,
        dt: f32,
        keys: &dyn KeyInput,
        breakpoints: Option<&HashSet<u16>>,
    ) -> Result<RunnerEvent, ExecError> {
        self.cpu_budget += dt;
        self.timer_budget += dt;

        while self.timer_budget >= TIMER_TIME_STEP {
            self.timer_budget -= TIMER_TIME_STEP;
            self.vm.timer_tick();
        }

        while self.cpu_budget >= CPU_TIME_STEP {
            self.cpu_budget -= CPU_TIME_STEP;

            match self.vm.step(keys)? {
                Step::AwaitingKey => {
                    // Suspended on FX0A. Drop the rest of this tick's
                    // budget so resuming doesn't "catch up" in a burst.
                    self.cpu_budget = 0.0;
                    break;
                }
                Step::Ran => {}
            }

            if let Some(breakpoints) = breakpoints
                && breakpoints.contains(&self.vm.pc())
            {
                self.cpu_budget = 0.0;
                return Ok(RunnerEvent::HitBreakpoint);
            }
        }

        Ok(RunnerEvent::Ran)
    }

    /// True while the machine's sound timer is running.
    pub fn sound_active(&self) -> bool {
        self.vm.sound_active()
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }
}
