//! Hazard Detection Unit (§4.5): decides whether IF/ID and ID/EX must
//! stall this cycle so that ID does not read stale source operands.
//!
//! Two points here read differently than a literal transcription of a
//! generic forwarding writeup, because tracing them against the
//! worked scenarios is what actually disambiguates them:
//!
//! - MEM/WB is never a stall trigger, forwarding on or off. WB commits
//!   to the register file earlier in this cycle's reverse stage order
//!   than ID reads it (§2), so by the time ID runs, a MEM/WB producer's
//!   value is already visible through the plain register read. Stalling
//!   on it would be both redundant and one cycle too many.
//! - The branch/load-forwarding restriction (rule b) is keyed on a load
//!   sitting in EX/MEM, not MEM/WB: an EX/MEM load's `alu_result` is a
//!   memory address, not the loaded word, so it is not safe to forward
//!   into an ID-stage branch comparison (`forward::for_id_branch`
//!   already refuses that case) and the Hazard Detection Unit must
//!   stall for it instead.

use crate::instruction::Instruction;
use crate::latch::Latches;

fn sources(inst: &Instruction) -> (Option<u32>, Option<u32>) {
    let rs1 = if inst.uses_rs1() { Some(inst.rs1) } else { None };
    let rs2 = if inst.uses_rs2() { Some(inst.rs2) } else { None };
    (rs1, rs2)
}

fn matches_source(writer_rd: u32, writer_valid_write: bool, rs1: Option<u32>, rs2: Option<u32>) -> bool {
    writer_valid_write
        && writer_rd != 0
        && (rs1 == Some(writer_rd) || rs2 == Some(writer_rd))
}

/// Whether IF/ID and ID/EX must stall (and a bubble issue into EX)
/// this cycle.
pub fn should_stall(cur: &Latches, forwarding_enabled: bool) -> bool {
    if !cur.if_id.valid {
        return false;
    }
    let inst = crate::instruction::decode(cur.if_id.raw);
    let (rs1, rs2) = sources(&inst);

    let id_ex_is_load_use = cur.id_ex.valid
        && cur.id_ex.ctrl.mem_read
        && matches_source(cur.id_ex.inst.rd, cur.id_ex.ctrl.reg_write, rs1, rs2);
    if id_ex_is_load_use {
        return true;
    }

    if forwarding_enabled {
        if inst.is_branch_or_jump() {
            let ex_mem_load_use = cur.ex_mem.valid
                && cur.ex_mem.ctrl.mem_read
                && matches_source(cur.ex_mem.inst.rd, cur.ex_mem.ctrl.reg_write, rs1, rs2);
            if ex_mem_load_use {
                return true;
            }
            let id_ex_writer = matches_source(cur.id_ex.inst.rd, cur.id_ex.valid && cur.id_ex.ctrl.reg_write, rs1, rs2);
            if id_ex_writer {
                return true;
            }
        }
        false
    } else {
        let id_ex_writer = matches_source(cur.id_ex.inst.rd, cur.id_ex.valid && cur.id_ex.ctrl.reg_write, rs1, rs2);
        let ex_mem_writer = matches_source(cur.ex_mem.inst.rd, cur.ex_mem.valid && cur.ex_mem.ctrl.reg_write, rs1, rs2);
        id_ex_writer || ex_mem_writer
    }
}
