//! Forwarding Unit (§4.4): picks the freshest available value for a
//! source register among the register-file read, the in-flight EX/MEM
//! result, and the in-flight MEM/WB result.

use crate::latch::{ExMem, MemWb};

/// EX-stage forwarding: full two-level priority (EX/MEM, then MEM/WB,
/// then the plain register-file read captured in ID/EX).
pub fn for_ex(rs: u32, register_value: u32, ex_mem: &ExMem, mem_wb: &MemWb) -> u32 {
    if rs != 0 && ex_mem.valid && ex_mem.ctrl.reg_write && ex_mem.inst.rd == rs {
        return ex_mem.alu_result;
    }
    if rs != 0 && mem_wb.valid && mem_wb.ctrl.reg_write && mem_wb.inst.rd == rs {
        return if mem_wb.ctrl.mem_to_reg { mem_wb.mem_data } else { mem_wb.alu_result };
    }
    register_value
}

/// ID-stage forwarding for early branch/jump resolution (§4.6). Only
/// the EX/MEM level is forwardable here, and only when its producer is
/// not a load (a load's EX/MEM-resident result is an address, not
/// data — the Hazard Detection Unit stalls that case instead, §4.5).
/// A MEM/WB producer needs no forward at all: WB commits to the
/// register file earlier in this same cycle's reverse-order sequence
/// than ID reads it, so `register_value` already reflects it.
pub fn for_id_branch(rs: u32, register_value: u32, ex_mem: &ExMem) -> u32 {
    if rs != 0
        && ex_mem.valid
        && ex_mem.ctrl.reg_write
        && !ex_mem.ctrl.mem_read
        && ex_mem.inst.rd == rs
    {
        return ex_mem.alu_result;
    }
    register_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Controls;
    use crate::instruction::{decode, Instruction};

    fn writer_ex_mem(rd: u32, result: u32, is_load: bool) -> ExMem {
        ExMem {
            valid: true,
            inst: Instruction { rd, ..decode(0) },
            ctrl: Controls { reg_write: true, mem_read: is_load, ..Controls::default() },
            alu_result: result,
            ..ExMem::default()
        }
    }

    fn writer_mem_wb(rd: u32, alu_result: u32, mem_data: u32, mem_to_reg: bool) -> MemWb {
        MemWb {
            valid: true,
            inst: Instruction { rd, ..decode(0) },
            ctrl: Controls { reg_write: true, mem_to_reg, ..Controls::default() },
            alu_result,
            mem_data,
            ..MemWb::default()
        }
    }

    #[test]
    fn ex_mem_has_priority_over_mem_wb() {
        let ex_mem = writer_ex_mem(3, 10, false);
        let mem_wb = writer_mem_wb(3, 99, 99, false);
        assert_eq!(for_ex(3, 0, &ex_mem, &mem_wb), 10);
    }

    #[test]
    fn mem_wb_forward_prefers_loaded_data_when_mem_to_reg() {
        let ex_mem = ExMem::default();
        let mem_wb = writer_mem_wb(2, 5, 77, true);
        assert_eq!(for_ex(2, 0, &ex_mem, &mem_wb), 77);
    }

    #[test]
    fn no_match_falls_back_to_register_value() {
        let ex_mem = writer_ex_mem(3, 10, false);
        let mem_wb = MemWb::default();
        assert_eq!(for_ex(2, 123, &ex_mem, &mem_wb), 123);
    }

    #[test]
    fn register_zero_is_never_forwarded() {
        let ex_mem = writer_ex_mem(0, 10, false);
        let mem_wb = MemWb::default();
        assert_eq!(for_ex(0, 0, &ex_mem, &mem_wb), 0);
    }

    #[test]
    fn id_branch_forward_skips_a_load_in_ex_mem() {
        let ex_mem = writer_ex_mem(6, 1, true);
        assert_eq!(for_id_branch(6, 42, &ex_mem), 42);
    }

    #[test]
    fn id_branch_forward_uses_ex_mem_for_non_load() {
        let ex_mem = writer_ex_mem(6, 1, false);
        assert_eq!(for_id_branch(6, 0, &ex_mem), 1);
    }
}
