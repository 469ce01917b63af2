//! The four pipeline latches (§3). Each carries a copy of the
//! instruction record and control bundle; no latch references another
//! latch's storage (§9 design note).

use crate::control::Controls;
use crate::instruction::Instruction;

#[derive(Debug, Clone, Copy, Default)]
pub struct IfId {
    pub valid: bool,
    pub pc: u32,
    pub raw: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdEx {
    pub valid: bool,
    pub pc: u32,
    pub inst: Instruction,
    pub ctrl: Controls,
    pub read_data1: u32,
    pub read_data2: u32,
    pub imm: i32,
    /// Bookkeeping only: the branch/jump resolved this instruction's
    /// own ID cycle already applied; EX just carries the values
    /// through to EX/MEM (§4.6, §4.7).
    pub branch_taken: bool,
    pub branch_target: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExMem {
    pub valid: bool,
    pub pc: u32,
    pub inst: Instruction,
    pub ctrl: Controls,
    pub alu_result: u32,
    pub zero: bool,
    pub negative: bool,
    /// Forwarded `readData2`, used as the store-data path in MEM.
    pub store_data: u32,
    pub branch_taken: bool,
    pub branch_target: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemWb {
    pub valid: bool,
    pub pc: u32,
    pub inst: Instruction,
    pub ctrl: Controls,
    pub alu_result: u32,
    pub mem_data: u32,
}

/// The full set of latches as they stand at a point in time: either
/// "what the previous cycle produced" (consumed by this cycle's
/// stages) or "what this cycle produces" (consumed next cycle).
#[derive(Debug, Clone, Copy, Default)]
pub struct Latches {
    pub if_id: IfId,
    pub id_ex: IdEx,
    pub ex_mem: ExMem,
    pub mem_wb: MemWb,
}
