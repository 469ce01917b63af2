//! Plain positional argument parsing: `<program-file> <cycle-count>`.
//! No flags, no derive-macro CLI framework — the driver takes exactly
//! two arguments and nothing else.

use crate::error::{SimulatorError, SimulatorResult};

pub struct Args {
    pub program_path: String,
    pub cycles: usize,
}

const USAGE: &str = "usage: sim <program-file> <cycle-count>";

pub fn parse(mut args: impl Iterator<Item = String>) -> SimulatorResult<Args> {
    args.next(); // argv[0]
    let program_path = args.next().ok_or_else(|| SimulatorError::Usage(USAGE.to_string()))?;
    let cycles_arg = args.next().ok_or_else(|| SimulatorError::Usage(USAGE.to_string()))?;
    let cycles: usize = cycles_arg
        .parse()
        .map_err(|_| SimulatorError::Usage(format!("cycle-count must be a non-negative integer, got '{cycles_arg}'")))?;
    Ok(Args { program_path, cycles })
}
