//! The pipeline engine (§4.6): five stages evaluated once per cycle in
//! reverse order (WB, MEM, EX, ID, IF). Each stage reads `cur`, the
//! latch values the previous cycle produced, and contributes one field
//! of `next`, which becomes `cur` at the end of the cycle. Running WB
//! before ID means a same-cycle register write is visible to ID's
//! same-cycle read (§2), which is why MEM/WB never needs forwarding or
//! hazard-stalling treatment anywhere in this module.

use crate::alu::{self, AluOp};
use crate::control;
use crate::disasm;
use crate::forward;
use crate::hazard;
use crate::instruction::{self, Function, Opcode};
use crate::latch::{ExMem, IdEx, IfId, Latches, MemWb};
use crate::memory::{DataMemory, InstructionMemory};
use crate::register::RegisterFile;
use crate::trace::{StageLabel, TraceRecorder};

pub struct Processor {
    regs: RegisterFile,
    imem: InstructionMemory,
    dmem: DataMemory,
    pc: u32,
    cur: Latches,
    forwarding: bool,
    verbose: bool,
    trace: TraceRecorder,
    cycle: usize,
}

impl Processor {
    pub fn new(program: Vec<u32>, cycles: usize, forwarding: bool, verbose: bool) -> Self {
        let instr_count = program.len();
        Processor {
            regs: RegisterFile::new(),
            imem: InstructionMemory::new(program),
            dmem: DataMemory::new(),
            pc: 0,
            cur: Latches::default(),
            forwarding,
            verbose,
            trace: TraceRecorder::new(instr_count, cycles),
            cycle: 0,
        }
    }

    pub fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.step();
        }
    }

    pub fn trace(&self) -> &TraceRecorder {
        &self.trace
    }

    pub fn disassembly(&self) -> Vec<String> {
        (0..self.imem.len())
            .map(|i| disasm::disassemble(&instruction::decode(self.imem.fetch((i * 4) as u32))))
            .collect()
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    fn log(&self, message: impl AsRef<str>) {
        if self.verbose {
            eprintln!("[cycle {}] {}", self.cycle, message.as_ref());
        }
    }

    pub fn step(&mut self) {
        let stall = hazard::should_stall(&self.cur, self.forwarding);

        self.writeback();
        let next_mem_wb = self.memory_stage();
        let next_ex_mem = self.execute();
        let (next_id_ex, branch) = self.decode(stall);
        let next_if_id = self.fetch(stall, branch);

        self.cur = Latches {
            if_id: next_if_id,
            id_ex: next_id_ex,
            ex_mem: next_ex_mem,
            mem_wb: next_mem_wb,
        };
        self.cycle += 1;
    }

    /// Commits the instruction in MEM/WB to the register file. Nothing
    /// carries forward from here — after WB the instruction leaves the
    /// pipeline.
    fn writeback(&mut self) {
        let latch = self.cur.mem_wb;
        if !latch.valid {
            return;
        }
        if latch.ctrl.reg_write {
            let value = if latch.ctrl.mem_to_reg { latch.mem_data } else { latch.alu_result };
            self.regs.write(latch.inst.rd, value);
        }
        self.trace.record(latch.pc, self.cycle, StageLabel::Wb);
        self.log(format!("WB pc={:#x}", latch.pc));
    }

    fn memory_stage(&mut self) -> MemWb {
        let latch = self.cur.ex_mem;
        if !latch.valid {
            return MemWb::default();
        }
        let mem_data = if latch.ctrl.mem_read {
            self.dmem.load(latch.inst.function, latch.alu_result)
        } else {
            latch.alu_result
        };
        if latch.ctrl.mem_write {
            self.dmem.store(latch.inst.function, latch.alu_result, latch.store_data);
        }
        self.trace.record(latch.pc, self.cycle, StageLabel::Mem);
        self.log(format!("MEM pc={:#x}", latch.pc));

        MemWb {
            valid: true,
            pc: latch.pc,
            inst: latch.inst,
            ctrl: latch.ctrl,
            alu_result: latch.alu_result,
            mem_data,
        }
    }

    fn execute(&mut self) -> ExMem {
        let latch = self.cur.id_ex;
        if !latch.valid {
            return ExMem::default();
        }
        let a = forward::for_ex(latch.inst.rs1, latch.read_data1, &self.cur.ex_mem, &self.cur.mem_wb);
        let b_reg = forward::for_ex(latch.inst.rs2, latch.read_data2, &self.cur.ex_mem, &self.cur.mem_wb);
        let b = if latch.ctrl.alu_src { latch.imm as u32 } else { b_reg };

        let (result, zero, negative) = match latch.inst.function {
            Function::Jal | Function::Jalr => (latch.pc.wrapping_add(4), false, false),
            Function::Lui => (latch.imm as u32, latch.imm == 0, latch.imm < 0),
            Function::Auipc => {
                let r = latch.pc.wrapping_add(latch.imm as u32);
                (r, r == 0, (r as i32) < 0)
            }
            _ => {
                let op = AluOp::for_function(latch.inst.function);
                let r = alu::execute(op, a, b);
                (r.result, r.zero, r.negative)
            }
        };

        self.trace.record(latch.pc, self.cycle, StageLabel::Ex);
        self.log(format!("EX pc={:#x}", latch.pc));

        ExMem {
            valid: true,
            pc: latch.pc,
            inst: latch.inst,
            ctrl: latch.ctrl,
            alu_result: result,
            zero,
            negative,
            store_data: b_reg,
            branch_taken: latch.branch_taken,
            branch_target: latch.branch_target,
        }
    }

    fn decode(&mut self, stall: bool) -> (IdEx, Option<(bool, u32)>) {
        if stall {
            if self.cur.if_id.valid {
                self.trace.record(self.cur.if_id.pc, self.cycle, StageLabel::Id);
            }
            self.log("stall");
            return (IdEx::default(), None);
        }
        let latch = self.cur.if_id;
        if !latch.valid {
            return (IdEx::default(), None);
        }

        let inst = instruction::decode(latch.raw);
        let ctrl = control::generate(&inst);
        let read_data1 = self.regs.read(inst.rs1);
        let read_data2 = self.regs.read(inst.rs2);

        let (taken, target) = match inst.opcode {
            Opcode::Branch => {
                let a = forward::for_id_branch(inst.rs1, read_data1, &self.cur.ex_mem);
                let b = forward::for_id_branch(inst.rs2, read_data2, &self.cur.ex_mem);
                let op = AluOp::for_function(inst.function);
                let taken = alu::execute(op, a, b).result == 1;
                (taken, latch.pc.wrapping_add(inst.imm as u32))
            }
            Opcode::Jal => (true, latch.pc.wrapping_add(inst.imm as u32)),
            Opcode::Jalr => {
                let base = forward::for_id_branch(inst.rs1, read_data1, &self.cur.ex_mem);
                (true, base.wrapping_add(inst.imm as u32) & !1)
            }
            _ => (false, 0),
        };

        self.trace.record(latch.pc, self.cycle, StageLabel::Id);
        self.log(format!("ID pc={:#x}", latch.pc));

        let id_ex = IdEx {
            valid: true,
            pc: latch.pc,
            inst,
            ctrl,
            read_data1,
            read_data2,
            imm: inst.imm,
            branch_taken: taken,
            branch_target: target,
        };
        let branch = if inst.is_branch_or_jump() { Some((taken, target)) } else { None };
        (id_ex, branch)
    }

    /// Fetches the next instruction, then applies any branch/jump this
    /// same cycle's ID resolved: the PC is overwritten after the fetch
    /// runs, and the word IF just (speculatively) fetched is discarded
    /// rather than latched (§4.6, §4.7).
    fn fetch(&mut self, stall: bool, branch: Option<(bool, u32)>) -> IfId {
        if stall {
            return self.cur.if_id;
        }

        let raw = self.imem.fetch(self.pc);
        let fetched_pc = self.pc;
        self.trace.record(fetched_pc, self.cycle, StageLabel::If);
        self.log(format!("IF pc={:#x}", fetched_pc));

        match branch {
            Some((true, target)) => {
                self.log(format!("squash pc={fetched_pc:#x} -> target={target:#x}"));
                self.pc = target;
                IfId::default()
            }
            _ => {
                self.pc = fetched_pc.wrapping_add(4);
                IfId { valid: true, pc: fetched_pc, raw }
            }
        }
    }
}
