//! Control-signal bundle: a pure function of the decoded instruction.

use crate::alu::AluOp;
use crate::instruction::{Instruction, Opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub reg_write: bool,
    pub mem_read: bool,
    pub mem_write: bool,
    pub mem_to_reg: bool,
    pub alu_src: bool,
    pub branch: bool,
    pub jump: bool,
    pub alu_op: AluOp,
}

/// Derive the control bundle for a decoded instruction (§4.2).
pub fn generate(inst: &Instruction) -> Controls {
    let alu_op = AluOp::for_function(inst.function);
    match inst.opcode {
        Opcode::Op => Controls { reg_write: true, alu_op, ..Controls::default() },
        Opcode::OpImm => {
            Controls { reg_write: true, alu_src: true, alu_op, ..Controls::default() }
        }
        Opcode::Load => Controls {
            reg_write: true,
            alu_src: true,
            mem_read: true,
            mem_to_reg: true,
            alu_op: AluOp::Add,
            ..Controls::default()
        },
        Opcode::Store => Controls {
            alu_src: true,
            mem_write: true,
            alu_op: AluOp::Add,
            ..Controls::default()
        },
        Opcode::Branch => Controls { branch: true, alu_op, ..Controls::default() },
        Opcode::Lui | Opcode::AuiPc => Controls {
            reg_write: true,
            alu_src: true,
            alu_op: AluOp::Add,
            ..Controls::default()
        },
        Opcode::Jal | Opcode::Jalr => Controls {
            reg_write: true,
            jump: true,
            alu_src: true,
            alu_op: AluOp::Add,
            ..Controls::default()
        },
        Opcode::Invalid => Controls::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::decode;

    #[test]
    fn r_type_only_writes_register() {
        let ctrl = generate(&decode(0x003101B3)); // add x3, x2, x3
        assert!(ctrl.reg_write);
        assert!(!ctrl.alu_src);
        assert!(!ctrl.mem_read && !ctrl.mem_write);
    }

    #[test]
    fn load_sets_mem_read_and_mem_to_reg() {
        let ctrl = generate(&decode(0x00002103)); // lw x2, 0(x0)
        assert!(ctrl.reg_write);
        assert!(ctrl.mem_read);
        assert!(ctrl.mem_to_reg);
        assert!(ctrl.alu_src);
    }

    #[test]
    fn store_does_not_write_register() {
        // sw x1, 0(x2)
        let ctrl = generate(&decode(0x0010_2023));
        assert!(!ctrl.reg_write);
        assert!(ctrl.mem_write);
    }

    #[test]
    fn branch_sets_only_branch() {
        let ctrl = generate(&decode(0x00030463)); // beq x6, x0, +8
        assert!(ctrl.branch);
        assert!(!ctrl.reg_write);
    }

    #[test]
    fn jal_sets_reg_write_and_jump() {
        let ctrl = generate(&decode(0x008000EF)); // jal x1, +8
        assert!(ctrl.reg_write);
        assert!(ctrl.jump);
    }

    #[test]
    fn invalid_is_all_false() {
        let ctrl = generate(&decode(0x0000_0000));
        assert_eq!(ctrl, Controls::default());
    }
}
