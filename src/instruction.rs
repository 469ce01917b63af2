//! Decoded instruction records for all RV32I encoding formats.

/// Which of the six RV32I encodings a word was decoded as, or the
/// catch-all tag for an encoding this simulator does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    R,
    I,
    S,
    B,
    U,
    J,
    #[default]
    Invalid,
}

/// The ~38 RV32I mnemonics this simulator executes, plus `Invalid` for
/// anything else (including the SYSTEM family, out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Function {
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
    Slli,
    Srli,
    Srai,
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    Lui,
    Auipc,
    Jal,
    Jalr,
    #[default]
    Invalid,
}

/// Which of R/I/S/B/U/J's two low-7-bit encodings a word falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Opcode {
    Op,
    OpImm,
    Load,
    Store,
    Branch,
    Lui,
    AuiPc,
    Jal,
    Jalr,
    #[default]
    Invalid,
}

/// A decoded instruction. `rs1`/`rs2`/`rd` use the sentinel `0` when the
/// format carries no such field (matching the architectural meaning of
/// index 0, per invariant 1 of the data model).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub raw: u32,
    pub opcode: Opcode,
    pub format: Format,
    pub function: Function,
    pub rs1: u32,
    pub rs2: u32,
    pub rd: u32,
    pub imm: i32,
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction {
            raw: 0,
            opcode: Opcode::Invalid,
            format: Format::Invalid,
            function: Function::Invalid,
            rs1: 0,
            rs2: 0,
            rd: 0,
            imm: 0,
        }
    }
}

impl Instruction {
    /// Whether this instruction reads `rs1` at all, per its format.
    pub fn uses_rs1(&self) -> bool {
        !matches!(self.format, Format::U | Format::J | Format::Invalid)
    }

    /// Whether this instruction reads `rs2` at all, per its format.
    pub fn uses_rs2(&self) -> bool {
        matches!(self.format, Format::R | Format::B | Format::S)
    }

    /// Branches and jumps resolve their target in ID rather than EX.
    pub fn is_branch_or_jump(&self) -> bool {
        matches!(self.opcode, Opcode::Branch | Opcode::Jal | Opcode::Jalr)
    }
}

fn sign_extend(value: u32, sign_bit: u32) -> i32 {
    let shift = 31 - sign_bit;
    (((value << shift) as i32) >> shift) as i32
}

fn opcode_and_format(low7: u32) -> (Opcode, Format) {
    match low7 {
        0b0110011 => (Opcode::Op, Format::R),
        0b0010011 => (Opcode::OpImm, Format::I),
        0b0000011 => (Opcode::Load, Format::I),
        0b0100011 => (Opcode::Store, Format::S),
        0b1100011 => (Opcode::Branch, Format::B),
        0b0110111 => (Opcode::Lui, Format::U),
        0b0010111 => (Opcode::AuiPc, Format::U),
        0b1101111 => (Opcode::Jal, Format::J),
        0b1100111 => (Opcode::Jalr, Format::I),
        _ => (Opcode::Invalid, Format::Invalid),
    }
}

fn function_for(opcode: Opcode, funct3: u32, funct7: u32) -> Function {
    match (opcode, funct3, funct7) {
        (Opcode::Op, 0x0, 0x00) => Function::Add,
        (Opcode::Op, 0x0, 0x20) => Function::Sub,
        (Opcode::Op, 0x1, _) => Function::Sll,
        (Opcode::Op, 0x2, _) => Function::Slt,
        (Opcode::Op, 0x3, _) => Function::Sltu,
        (Opcode::Op, 0x4, _) => Function::Xor,
        (Opcode::Op, 0x5, 0x00) => Function::Srl,
        (Opcode::Op, 0x5, 0x20) => Function::Sra,
        (Opcode::Op, 0x6, _) => Function::Or,
        (Opcode::Op, 0x7, _) => Function::And,
        (Opcode::OpImm, 0x0, _) => Function::Addi,
        (Opcode::OpImm, 0x2, _) => Function::Slti,
        (Opcode::OpImm, 0x3, _) => Function::Sltiu,
        (Opcode::OpImm, 0x4, _) => Function::Xori,
        (Opcode::OpImm, 0x6, _) => Function::Ori,
        (Opcode::OpImm, 0x7, _) => Function::Andi,
        (Opcode::OpImm, 0x1, _) => Function::Slli,
        (Opcode::OpImm, 0x5, 0x00) => Function::Srli,
        (Opcode::OpImm, 0x5, 0x20) => Function::Srai,
        (Opcode::Load, 0x0, _) => Function::Lb,
        (Opcode::Load, 0x1, _) => Function::Lh,
        (Opcode::Load, 0x2, _) => Function::Lw,
        (Opcode::Load, 0x4, _) => Function::Lbu,
        (Opcode::Load, 0x5, _) => Function::Lhu,
        (Opcode::Store, 0x0, _) => Function::Sb,
        (Opcode::Store, 0x1, _) => Function::Sh,
        (Opcode::Store, 0x2, _) => Function::Sw,
        (Opcode::Branch, 0x0, _) => Function::Beq,
        (Opcode::Branch, 0x1, _) => Function::Bne,
        (Opcode::Branch, 0x4, _) => Function::Blt,
        (Opcode::Branch, 0x5, _) => Function::Bge,
        (Opcode::Branch, 0x6, _) => Function::Bltu,
        (Opcode::Branch, 0x7, _) => Function::Bgeu,
        (Opcode::Lui, ..) => Function::Lui,
        (Opcode::AuiPc, ..) => Function::Auipc,
        (Opcode::Jal, ..) => Function::Jal,
        (Opcode::Jalr, ..) => Function::Jalr,
        _ => Function::Invalid,
    }
}

/// Decode a raw 32-bit word. Total: unrecognized encodings produce
/// `Opcode::Invalid` rather than an error (§4.1).
pub fn decode(raw: u32) -> Instruction {
    let low7 = raw & 0x7f;
    let (opcode, format) = opcode_and_format(low7);
    if format == Format::Invalid {
        return Instruction { raw, ..Instruction::default() };
    }

    let rd = (raw >> 7) & 0x1f;
    let funct3 = (raw >> 12) & 0x7;
    let rs1 = (raw >> 15) & 0x1f;
    let rs2 = (raw >> 20) & 0x1f;
    let funct7 = (raw >> 25) & 0x7f;
    let function = function_for(opcode, funct3, funct7);

    let imm = match format {
        Format::R => 0,
        Format::I => sign_extend(raw >> 20, 11),
        Format::S => {
            let lo = (raw >> 7) & 0x1f;
            let hi = (raw >> 25) & 0x7f;
            sign_extend((hi << 5) | lo, 11)
        }
        Format::B => {
            let b11 = (raw >> 7) & 0x1;
            let b4_1 = (raw >> 8) & 0xf;
            let b10_5 = (raw >> 25) & 0x3f;
            let b12 = (raw >> 31) & 0x1;
            let bits = (b12 << 12) | (b11 << 11) | (b10_5 << 5) | (b4_1 << 1);
            sign_extend(bits, 12)
        }
        Format::U => (raw & 0xfffff000) as i32,
        Format::J => {
            let b19_12 = (raw >> 12) & 0xff;
            let b11 = (raw >> 20) & 0x1;
            let b10_1 = (raw >> 21) & 0x3ff;
            let b20 = (raw >> 31) & 0x1;
            let bits = (b20 << 20) | (b19_12 << 12) | (b11 << 11) | (b10_1 << 1);
            sign_extend(bits, 20)
        }
        Format::Invalid => 0,
    };

    Instruction {
        raw,
        opcode,
        format,
        function,
        rs1: if format.uses_rs1_field() { rs1 } else { 0 },
        rs2: if format.uses_rs2_field() { rs2 } else { 0 },
        rd: if format.uses_rd_field() { rd } else { 0 },
        imm,
    }
}

impl Format {
    fn uses_rs1_field(self) -> bool {
        matches!(self, Format::R | Format::I | Format::S | Format::B)
    }
    fn uses_rs2_field(self) -> bool {
        matches!(self, Format::R | Format::S | Format::B)
    }
    fn uses_rd_field(self) -> bool {
        matches!(self, Format::R | Format::I | Format::U | Format::J)
    }
}

fn low7_for(opcode: Opcode) -> u32 {
    match opcode {
        Opcode::Op => 0b0110011,
        Opcode::OpImm => 0b0010011,
        Opcode::Load => 0b0000011,
        Opcode::Store => 0b0100011,
        Opcode::Branch => 0b1100011,
        Opcode::Lui => 0b0110111,
        Opcode::AuiPc => 0b0010111,
        Opcode::Jal => 0b1101111,
        Opcode::Jalr => 0b1100111,
        Opcode::Invalid => 0,
    }
}

fn funct3_for(function: Function) -> u32 {
    match function {
        Function::Add | Function::Sub | Function::Addi => 0x0,
        Function::Sll | Function::Slli => 0x1,
        Function::Slt | Function::Slti => 0x2,
        Function::Sltu | Function::Sltiu => 0x3,
        Function::Xor | Function::Xori => 0x4,
        Function::Srl | Function::Sra | Function::Srli | Function::Srai => 0x5,
        Function::Or | Function::Ori => 0x6,
        Function::And | Function::Andi => 0x7,
        Function::Lb | Function::Sb | Function::Beq => 0x0,
        Function::Lh | Function::Sh | Function::Bne => 0x1,
        Function::Lw | Function::Sw => 0x2,
        Function::Lbu | Function::Blt => 0x4,
        Function::Lhu | Function::Bge => 0x5,
        Function::Bltu => 0x6,
        Function::Bgeu => 0x7,
        Function::Lui | Function::Auipc | Function::Jal | Function::Jalr | Function::Invalid => 0x0,
    }
}

fn funct7_for(function: Function) -> u32 {
    match function {
        Function::Sub | Function::Sra | Function::Srai => 0b0100000,
        _ => 0b0000000,
    }
}

/// Reconstruct a raw instruction word from a decoded record. Total for
/// the deterministic encodable subset: every format this simulator
/// decodes round-trips bit-exactly (§8), including the shift-immediate
/// case where `imm` carries `funct7` folded in above the shift amount.
/// An `Invalid` record has no canonical encoding, so it returns the raw
/// word it was decoded from.
pub fn encode(inst: &Instruction) -> u32 {
    let low7 = low7_for(inst.opcode);
    let funct3 = funct3_for(inst.function);
    let funct7 = funct7_for(inst.function);
    let rd = inst.rd & 0x1f;
    let rs1 = inst.rs1 & 0x1f;
    let rs2 = inst.rs2 & 0x1f;

    match inst.format {
        Format::R => low7 | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (rs2 << 20) | (funct7 << 25),
        Format::I => {
            if matches!(inst.function, Function::Slli | Function::Srli | Function::Srai) {
                let shamt = (inst.imm as u32) & 0x1f;
                low7 | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (shamt << 20) | (funct7 << 25)
            } else {
                let imm = (inst.imm as u32) & 0xfff;
                low7 | (rd << 7) | (funct3 << 12) | (rs1 << 15) | (imm << 20)
            }
        }
        Format::S => {
            let imm = (inst.imm as u32) & 0xfff;
            let lo = imm & 0x1f;
            let hi = (imm >> 5) & 0x7f;
            low7 | (lo << 7) | (funct3 << 12) | (rs1 << 15) | (rs2 << 20) | (hi << 25)
        }
        Format::B => {
            let imm = (inst.imm as u32) & 0x1fff;
            let b11 = (imm >> 11) & 0x1;
            let b4_1 = (imm >> 1) & 0xf;
            let b10_5 = (imm >> 5) & 0x3f;
            let b12 = (imm >> 12) & 0x1;
            low7 | (b11 << 7) | (b4_1 << 8) | (funct3 << 12) | (rs1 << 15) | (rs2 << 20) | (b10_5 << 25) | (b12 << 31)
        }
        Format::U => low7 | (rd << 7) | ((inst.imm as u32) & 0xfffff000),
        Format::J => {
            let imm = (inst.imm as u32) & 0x1fffff;
            let b19_12 = (imm >> 12) & 0xff;
            let b11 = (imm >> 11) & 0x1;
            let b10_1 = (imm >> 1) & 0x3ff;
            let b20 = (imm >> 20) & 0x1;
            low7 | (rd << 7) | (b19_12 << 12) | (b11 << 20) | (b10_1 << 21) | (b20 << 31)
        }
        Format::Invalid => inst.raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_addi() {
        // addi x2, x0, 5
        let inst = decode(0x00500113);
        assert_eq!(inst.opcode, Opcode::OpImm);
        assert_eq!(inst.function, Function::Addi);
        assert_eq!(inst.rd, 2);
        assert_eq!(inst.rs1, 0);
        assert_eq!(inst.imm, 5);
    }

    #[test]
    fn decodes_add() {
        // add x3, x2, x3
        let inst = decode(0x003101B3);
        assert_eq!(inst.opcode, Opcode::Op);
        assert_eq!(inst.function, Function::Add);
        assert_eq!(inst.rd, 3);
        assert_eq!(inst.rs1, 2);
        assert_eq!(inst.rs2, 3);
    }

    #[test]
    fn decodes_lw() {
        // lw x2, 0(x0)
        let inst = decode(0x00002103);
        assert_eq!(inst.opcode, Opcode::Load);
        assert_eq!(inst.function, Function::Lw);
        assert_eq!(inst.rd, 2);
        assert_eq!(inst.rs1, 0);
        assert_eq!(inst.imm, 0);
    }

    #[test]
    fn decodes_beq_with_positive_offset() {
        // beq x6, x0, +8
        let inst = decode(0x00030463);
        assert_eq!(inst.opcode, Opcode::Branch);
        assert_eq!(inst.function, Function::Beq);
        assert_eq!(inst.rs1, 6);
        assert_eq!(inst.rs2, 0);
        assert_eq!(inst.imm, 8);
    }

    #[test]
    fn decodes_jal_with_positive_offset() {
        // jal x1, +8
        let inst = decode(0x008000EF);
        assert_eq!(inst.opcode, Opcode::Jal);
        assert_eq!(inst.rd, 1);
        assert_eq!(inst.imm, 8);
    }

    #[test]
    fn decodes_negative_branch_offset() {
        // beq x1, x2, -4  (0xFE208EE3)
        let inst = decode(0xFE208EE3);
        assert_eq!(inst.function, Function::Beq);
        assert_eq!(inst.imm, -4);
    }

    #[test]
    fn unknown_opcode_is_invalid() {
        let inst = decode(0x0000_0000);
        assert_eq!(inst.opcode, Opcode::Invalid);
        assert_eq!(inst.format, Format::Invalid);
        assert_eq!(inst.rd, 0);
    }

    #[test]
    fn decode_is_idempotent() {
        let word = 0x00110313; // addi x6, x2, 1
        assert_eq!(decode(word), decode(word));
    }

    #[test]
    fn lui_immediate_is_not_sign_extended_beyond_bit_31() {
        // lui x1, 0xfffff  -> raw upper 20 bits all set
        let inst = decode(0xFFFFF0B7);
        assert_eq!(inst.function, Function::Lui);
        assert_eq!(inst.imm, 0xFFFFF000u32 as i32);
    }

    #[test]
    fn encode_round_trips_r_type() {
        let word = 0x003101B3; // add x3, x2, x3
        assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn encode_round_trips_i_type() {
        let word = 0x00500113; // addi x2, x0, 5
        assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn encode_round_trips_load() {
        let word = 0x00002103; // lw x2, 0(x0)
        assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn encode_round_trips_store() {
        let word = 0x00102023; // sw x1, 0(x0)
        assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn encode_round_trips_branch_with_negative_offset() {
        let word = 0xFE208EE3; // beq x1, x2, -4
        assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn encode_round_trips_jal() {
        let word = 0x008000EF; // jal x1, +8
        assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn encode_round_trips_lui() {
        let word = 0x123450B7; // lui x1, 0x12345
        assert_eq!(encode(&decode(word)), word);
    }

    #[test]
    fn encode_round_trips_shift_immediate_with_funct7_folded_into_imm() {
        let word = 0x40335293; // srai x5, x6, 3
        let inst = decode(word);
        assert_eq!(inst.function, Function::Srai);
        assert_eq!(encode(&inst), word);
    }

    #[test]
    fn encode_of_invalid_returns_the_original_raw_word() {
        let word = 0xDEAD_0073; // SYSTEM family, out of scope, decodes to Invalid
        assert_eq!(encode(&decode(word)), word);
    }
}
