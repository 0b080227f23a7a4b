use crate::isa::riscv::{
    executor::RV64CPU,
    instruction::{exec_function::*, instr_table::RiscvInstr, RVInstrInfo},
    trap::Exception,
};

pub(in crate::isa::riscv) fn get_exec_func(
    instr: RiscvInstr,
) -> fn(RVInstrInfo, &mut RV64CPU) -> Result<(), Exception> {
    match instr {
        // Arith
        RiscvInstr::ADD | RiscvInstr::ADDI => exec_arith::<ExecAdd>,
        RiscvInstr::ADDW | RiscvInstr::ADDIW => exec_arith::<ExecAddw>,
        RiscvInstr::SUB => exec_arith::<ExecSub>,
        RiscvInstr::SUBW => exec_arith::<ExecSubw>,

        // Shift
        RiscvInstr::SLL | RiscvInstr::SLLI => exec_arith::<ExecSLL>,
        RiscvInstr::SRL | RiscvInstr::SRLI => exec_arith::<ExecSRL>,
        RiscvInstr::SRA | RiscvInstr::SRAI => exec_arith::<ExecSRA>,
        RiscvInstr::SLLW | RiscvInstr::SLLIW => exec_arith::<ExecSLLW>,
        RiscvInstr::SRLW | RiscvInstr::SRLIW => exec_arith::<ExecSRLW>,
        RiscvInstr::SRAW | RiscvInstr::SRAIW => exec_arith::<ExecSRAW>,

        // Cond set
        RiscvInstr::SLT | RiscvInstr::SLTI => exec_arith::<ExecSignedLess>,
        RiscvInstr::SLTU | RiscvInstr::SLTIU => exec_arith::<ExecUnsignedLess>,

        // Bit
        RiscvInstr::AND | RiscvInstr::ANDI => exec_arith::<ExecAnd>,
        RiscvInstr::OR | RiscvInstr::ORI => exec_arith::<ExecOr>,
        RiscvInstr::XOR | RiscvInstr::XORI => exec_arith::<ExecXor>,

        // Branch
        RiscvInstr::BEQ => exec_branch::<ExecEqual>,
        RiscvInstr::BNE => exec_branch::<ExecNotEqual>,
        RiscvInstr::BLT => exec_branch::<ExecSignedLess>,
        RiscvInstr::BGE => exec_branch::<ExecSignedGreatEqual>,
        RiscvInstr::BLTU => exec_branch::<ExecUnsignedLess>,
        RiscvInstr::BGEU => exec_branch::<ExecUnsignedGreatEqual>,

        // Load
        RiscvInstr::LB => exec_load::<u8, true>,
        RiscvInstr::LBU => exec_load::<u8, false>,
        RiscvInstr::LH => exec_load::<u16, true>,
        RiscvInstr::LHU => exec_load::<u16, false>,
        RiscvInstr::LW => exec_load::<u32, true>,
        RiscvInstr::LWU => exec_load::<u32, false>,
        RiscvInstr::LD => exec_load::<u64, false>,

        // Store
        RiscvInstr::SB => exec_store::<u8>,
        RiscvInstr::SH => exec_store::<u16>,
        RiscvInstr::SW => exec_store::<u32>,
        RiscvInstr::SD => exec_store::<u64>,

        // Jump and link. The PC is already past the instruction, so the
        // link value is the PC itself and targets are relative to pc - 4.
        RiscvInstr::JAL => |info: RVInstrInfo, cpu: &mut RV64CPU| {
            if let RVInstrInfo::J { rd, imm } = info {
                let target = cpu.pc.wrapping_sub(4).wrapping_add(imm);
                if target & 1 != 0 {
                    return Err(Exception::MisalignedJump);
                }
                cpu.reg_file.write(rd, cpu.pc);
                cpu.pc = target;
            } else {
                unreachable!();
            }
            Ok(())
        },

        RiscvInstr::JALR => |info: RVInstrInfo, cpu: &mut RV64CPU| {
            if let RVInstrInfo::I { rs1, rd, imm } = info {
                // Compute the target before linking: rd may alias rs1.
                let target = cpu.reg_file.read(rs1, 0).0.wrapping_add(imm) & !1;
                cpu.reg_file.write(rd, cpu.pc);
                cpu.pc = target;
            } else {
                unreachable!();
            }
            Ok(())
        },

        RiscvInstr::AUIPC => |info, cpu| {
            if let RVInstrInfo::U { rd, imm } = info {
                cpu.reg_file
                    .write(rd, cpu.pc.wrapping_sub(4).wrapping_add(imm));
                Ok(())
            } else {
                unreachable!();
            }
        },

        RiscvInstr::LUI => |info, cpu| {
            if let RVInstrInfo::U { rd, imm } = info {
                cpu.reg_file.write(rd, imm);
                Ok(())
            } else {
                unreachable!();
            }
        },

        // We are executing in order, so there is nothing to synchronise.
        RiscvInstr::FENCE => exec_nop,

        // Environment calls carry no semantics in a user-mode run.
        RiscvInstr::ECALL | RiscvInstr::EBREAK => exec_nop,

        RiscvInstr::CSRRW => exec_csrw::<false>,
        RiscvInstr::CSRRWI => exec_csrw::<true>,
        RiscvInstr::CSRRS => exec_csr_bit::<true, false>,
        RiscvInstr::CSRRC => exec_csr_bit::<false, false>,
        RiscvInstr::CSRRSI => exec_csr_bit::<true, true>,
        RiscvInstr::CSRRCI => exec_csr_bit::<false, true>,
    }
}
