use clap::{Parser, Subcommand};
use clap_num::maybe_hex;

use crate::nibble::u4;
use crate::opcode::Opcode;

/// The debugger command line. `multicall` makes clap parse bare command
/// words ("step", "b set 0x200") instead of expecting a program name.
#[derive(Parser)]
#[command(multicall = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Resume free-running execution
    #[command(visible_alias = "r")]
    Run,

    /// Pause execution
    #[command(visible_alias = "p")]
    Pause,

    /// Execute a single instruction
    #[command(visible_alias = "s")]
    Step,

    /// Manage breakpoints
    #[command(visible_alias = "b")]
    Breakpoint {
        #[command(subcommand)]
        action: BreakpointAction,
    },

    /// Write a register (v0-vf, i or pc)
    Set {
        #[arg(value_parser = parse_set_target)]
        target: SetTarget,
        #[arg(value_parser = maybe_hex::<u16>)]
        value: u16,
    },

    /// Dump memory bytes
    #[command(visible_alias = "m")]
    Mem {
        #[arg(default_value = "0x200", value_parser = maybe_hex::<u16>)]
        start: u16,
        #[arg(default_value = "64", value_parser = maybe_hex::<u16>)]
        len: u16,
    },

    /// Disassemble instructions
    #[command(visible_alias = "d")]
    Disasm {
        #[arg(default_value = "0x200", value_parser = maybe_hex::<u16>)]
        start: u16,
        /// Number of instructions
        #[arg(default_value = "16", value_parser = maybe_hex::<u16>)]
        len: u16,
    },

    /// Reset the machine and reload the ROM
    Reset,

    #[command(visible_alias = "q")]
    Quit,
}

#[derive(Subcommand, Clone)]
pub enum BreakpointAction {
    #[command(visible_alias = "s")]
    Set {
        #[arg(value_parser = maybe_hex::<u16>)]
        addr: u16,
    },

    #[command(visible_alias = "c")]
    Clear {
        #[arg(value_parser = maybe_hex::<u16>)]
        addr: u16,
    },

    #[command(visible_alias = "l")]
    List,

    #[command(visible_alias = "ca")]
    ClearAll,
}

pub enum CommandResult {
    Ok,
    Breakpoints(Vec<u16>),
    MemDump {
        offset: u16,
        data: Vec<u8>,
    },
    Disasm {
        offset: u16,
        listing: Vec<(u16, Opcode)>,
    },
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("execution fault: {0}")]
    Exec(#[from] crate::vm::ExecError),
    #[error("value out of range for target")]
    ValueOutOfRange,
}

#[derive(Clone)]
pub enum SetTarget {
    V(u4),
    I,
    Pc,
}

fn parse_set_target(s: &str) -> Result<SetTarget, String> {
    let lower = s.to_lowercase();

    match lower.as_str() {
        "i" | "index" => Ok(SetTarget::I),
        "pc" => Ok(SetTarget::Pc),

        _ if lower.starts_with('v') => match u8::from_str_radix(&lower[1..], 16) {
            Ok(reg) if reg < 16 => Ok(SetTarget::V(u4::new(reg))),
            _ => Err(format!("invalid register: '{s}'")),
        },

        _ => Err(format!("unknown set target: '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, clap::Error> {
        Cli::try_parse_from(line.split_whitespace()).map(|cli| cli.command)
    }

    #[test]
    fn parses_aliases_and_hex_arguments() {
        assert!(matches!(parse("s").unwrap(), Command::Step));
        assert!(matches!(
            parse("b set 0x200").unwrap(),
            Command::Breakpoint {
                action: BreakpointAction::Set { addr: 0x200 }
            }
        ));
        assert!(matches!(
            parse("d 0x200 8").unwrap(),
            Command::Disasm {
                start: 0x200,
                len: 8
            }
        ));
    }

    #[test]
    fn parses_set_targets() {
        assert!(matches!(
            parse("set va 0xFF").unwrap(),
            Command::Set {
                target: SetTarget::V(x),
                value: 0xFF
            } if x == u4::new(0xA)
        ));
        assert!(matches!(
            parse("set pc 0x300").unwrap(),
            Command::Set {
                target: SetTarget::Pc,
                value: 0x300
            }
        ));
        assert!(parse("set vg 1").is_err());
    }
}
