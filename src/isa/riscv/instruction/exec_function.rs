use crate::{
    config::arch_config::WordType,
    isa::riscv::{executor::RV64CPU, instruction::RVInstrInfo, trap::Exception},
    utils::{sign_extend, sign_extend_u32, TruncateFrom, TruncateToBits, UnsignedInteger},
};

/// An operation over two word operands. The `exec_xxx` skeletons read the
/// operands out of the CPU, apply the operation and write the result back;
/// `ExecTrait::exec` itself only calculates.
pub(super) trait ExecTrait<T> {
    fn exec(a: WordType, b: WordType) -> T;
}

/// Register-register and register-immediate arithmetic. The immediate
/// arrives already sign-extended from the decoder.
pub(super) fn exec_arith<F>(info: RVInstrInfo, cpu: &mut RV64CPU) -> Result<(), Exception>
where
    F: ExecTrait<WordType>,
{
    let (rd, rst) = match info {
        RVInstrInfo::R { rs1, rs2, rd } => {
            let (val1, val2) = cpu.reg_file.read(rs1, rs2);
            (rd, F::exec(val1, val2))
        }
        RVInstrInfo::I { rs1, rd, imm } => {
            let val1 = cpu.reg_file.read(rs1, 0).0;
            (rd, F::exec(val1, imm))
        }
        _ => unreachable!(),
    };

    cpu.reg_file.write(rd, rst);

    Ok(())
}

/// A taken branch targets the instruction's own address plus the offset;
/// the PC has already been advanced when this runs.
pub(super) fn exec_branch<F>(info: RVInstrInfo, cpu: &mut RV64CPU) -> Result<(), Exception>
where
    F: ExecTrait<bool>,
{
    if let RVInstrInfo::B { rs1, rs2, imm } = info {
        let (val1, val2) = cpu.reg_file.read(rs1, rs2);

        if F::exec(val1, val2) {
            cpu.pc = cpu.pc.wrapping_sub(4).wrapping_add(imm);
        }
    } else {
        unreachable!();
    }

    Ok(())
}

pub(super) fn exec_load<T, const EXTEND: bool>(
    info: RVInstrInfo,
    cpu: &mut RV64CPU,
) -> Result<(), Exception>
where
    T: UnsignedInteger,
{
    if let RVInstrInfo::I { rs1, rd, imm } = info {
        let base = cpu.reg_file.read(rs1, 0).0;
        let addr = base.wrapping_add(imm);

        let data = cpu
            .memory
            .read::<T>(addr)
            .map_err(Exception::from_memory_err)?;

        let mut value: WordType = data.into();
        if EXTEND {
            value = sign_extend(value, (size_of::<T>() as u32) * 8);
        }
        cpu.reg_file.write(rd, value);
    } else {
        unreachable!();
    }

    Ok(())
}

pub(super) fn exec_store<T>(info: RVInstrInfo, cpu: &mut RV64CPU) -> Result<(), Exception>
where
    T: UnsignedInteger,
{
    if let RVInstrInfo::S { rs1, rs2, imm } = info {
        let (base, value) = cpu.reg_file.read(rs1, rs2);
        let addr = base.wrapping_add(imm);

        cpu.memory
            .write(addr, T::truncate_from(value))
            .map_err(Exception::from_memory_err)?;
    } else {
        unreachable!();
    }

    Ok(())
}

/// CSRRW/CSRRWI: `t <- csr[a]; csr[a] <- new; x[rd] <- t`. The old value
/// is written to `rd` unconditionally; the register file discards x0.
pub(super) fn exec_csrw<const UIMM: bool>(
    info: RVInstrInfo,
    cpu: &mut RV64CPU,
) -> Result<(), Exception> {
    if let RVInstrInfo::I { rs1, rd, imm } = info {
        let new_val = if UIMM {
            rs1 as WordType
        } else {
            cpu.reg_file.read(rs1, 0).0
        };

        let old = cpu.csr.read(imm);
        cpu.csr.write(imm, new_val);
        cpu.reg_file.write(rd, old);
    }

    Ok(())
}

/// CSRRS/CSRRC and the immediate forms: set or clear the bits selected by
/// the operand, returning the old value.
pub(super) fn exec_csr_bit<const SET: bool, const UIMM: bool>(
    info: RVInstrInfo,
    cpu: &mut RV64CPU,
) -> Result<(), Exception> {
    if let RVInstrInfo::I { rs1, rd, imm } = info {
        let rhs = if UIMM {
            rs1 as WordType
        } else {
            cpu.reg_file.read(rs1, 0).0
        };

        let old = cpu.csr.read(imm);
        let data = if SET { old | rhs } else { old & !rhs };
        cpu.csr.write(imm, data);
        cpu.reg_file.write(rd, old);
    }

    Ok(())
}

pub(super) fn exec_nop(_info: RVInstrInfo, _cpu: &mut RV64CPU) -> Result<(), Exception> {
    Ok(())
}

// =============================================
//                  ExecTrait
// =============================================
// Arith
pub(super) struct ExecAdd {}
impl ExecTrait<WordType> for ExecAdd {
    fn exec(a: WordType, b: WordType) -> WordType {
        a.wrapping_add(b)
    }
}

pub(super) struct ExecSub {}
impl ExecTrait<WordType> for ExecSub {
    fn exec(a: WordType, b: WordType) -> WordType {
        a.wrapping_sub(b)
    }
}

// Arith word
pub(super) struct ExecAddw {}
impl ExecTrait<WordType> for ExecAddw {
    fn exec(a: WordType, b: WordType) -> WordType {
        sign_extend(a.wrapping_add(b).truncate_to_bits(32), 32)
    }
}

pub(super) struct ExecSubw {}
impl ExecTrait<WordType> for ExecSubw {
    fn exec(a: WordType, b: WordType) -> WordType {
        sign_extend(a.wrapping_sub(b).truncate_to_bits(32), 32)
    }
}

// Shift. `wrapping_shl`/`wrapping_shr` take the amount modulo the operand
// width, which is exactly the 6-bit (64-bit ops) and 5-bit (word ops)
// masking the ISA asks for.
pub(super) struct ExecSLL {}
impl ExecTrait<WordType> for ExecSLL {
    fn exec(a: WordType, b: WordType) -> WordType {
        a.wrapping_shl(b as u32)
    }
}

pub(super) struct ExecSRL {}
impl ExecTrait<WordType> for ExecSRL {
    fn exec(a: WordType, b: WordType) -> WordType {
        a.wrapping_shr(b as u32)
    }
}

pub(super) struct ExecSRA {}
impl ExecTrait<WordType> for ExecSRA {
    fn exec(a: WordType, b: WordType) -> WordType {
        (a.cast_signed().wrapping_shr(b as u32)).cast_unsigned()
    }
}

pub(super) struct ExecSLLW {}
impl ExecTrait<WordType> for ExecSLLW {
    fn exec(a: WordType, b: WordType) -> WordType {
        sign_extend_u32((a as u32).wrapping_shl(b as u32))
    }
}

pub(super) struct ExecSRLW {}
impl ExecTrait<WordType> for ExecSRLW {
    fn exec(a: WordType, b: WordType) -> WordType {
        sign_extend_u32((a as u32).wrapping_shr(b as u32))
    }
}

pub(super) struct ExecSRAW {}
impl ExecTrait<WordType> for ExecSRAW {
    fn exec(a: WordType, b: WordType) -> WordType {
        sign_extend_u32((a as u32).cast_signed().wrapping_shr(b as u32) as u32)
    }
}

// Bit
pub(super) struct ExecAnd {}
impl ExecTrait<WordType> for ExecAnd {
    fn exec(a: WordType, b: WordType) -> WordType {
        a & b
    }
}

pub(super) struct ExecOr {}
impl ExecTrait<WordType> for ExecOr {
    fn exec(a: WordType, b: WordType) -> WordType {
        a | b
    }
}

pub(super) struct ExecXor {}
impl ExecTrait<WordType> for ExecXor {
    fn exec(a: WordType, b: WordType) -> WordType {
        a ^ b
    }
}

// Compare. The signed/unsigned less-than pairs serve both as branch
// predicates and as SLT/SLTU results.
pub(super) struct ExecSignedLess {}
impl ExecTrait<bool> for ExecSignedLess {
    fn exec(a: WordType, b: WordType) -> bool {
        a.cast_signed() < b.cast_signed()
    }
}
impl ExecTrait<WordType> for ExecSignedLess {
    fn exec(a: WordType, b: WordType) -> WordType {
        (a.cast_signed() < b.cast_signed()) as WordType
    }
}

pub(super) struct ExecUnsignedLess {}
impl ExecTrait<bool> for ExecUnsignedLess {
    fn exec(a: WordType, b: WordType) -> bool {
        a < b
    }
}
impl ExecTrait<WordType> for ExecUnsignedLess {
    fn exec(a: WordType, b: WordType) -> WordType {
        (a < b) as WordType
    }
}

pub(super) struct ExecEqual {}
impl ExecTrait<bool> for ExecEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a == b
    }
}

pub(super) struct ExecNotEqual {}
impl ExecTrait<bool> for ExecNotEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a != b
    }
}

pub(super) struct ExecSignedGreatEqual {}
impl ExecTrait<bool> for ExecSignedGreatEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a.cast_signed() >= b.cast_signed()
    }
}

pub(super) struct ExecUnsignedGreatEqual {}
impl ExecTrait<bool> for ExecUnsignedGreatEqual {
    fn exec(a: WordType, b: WordType) -> bool {
        a >= b
    }
}
