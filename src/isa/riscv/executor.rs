use crate::{
    config::arch_config::WordType,
    cpu::RegFile,
    isa::riscv::{
        csr_reg::CsrRegFile,
        decoder::{DecodeInstr, Decoder, DecoderTrait},
        instruction::{exec_mapping::get_exec_func, instr_table::RiscvInstr, RVInstrInfo},
        mmu::Mmu,
        trap::{Exception, Fault},
    },
    ram_config,
};

/// Run state of the execution engine. `Halted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Running,
    Halted,
}

/// One hart: register file, memory, CSRs and PC, plus the decoder that
/// feeds the fetch-decode-execute loop. All architectural state is owned
/// here and mutated only by instruction execution.
pub struct RV64CPU {
    pub(super) reg_file: RegFile,
    pub(super) memory: Mmu,
    pub(super) pc: WordType,
    pub(super) decoder: Decoder,
    pub(super) csr: CsrRegFile,
    program_len: WordType,
    state: CpuState,
}

impl RV64CPU {
    /// Build a reset CPU around a program image: the image sits at the
    /// base address, the PC points at it, and x2 holds the stack top.
    pub fn from_image(image: &[u8]) -> Self {
        let mut reg_file = RegFile::new();
        reg_file.write(2, ram_config::DEFAULT_SP_VALUE);

        Self {
            reg_file,
            memory: Mmu::from_image(image),
            pc: ram_config::DEFAULT_PC_VALUE,
            decoder: Decoder::new(),
            csr: CsrRegFile::new(),
            program_len: image.len() as WordType,
            state: CpuState::Running,
        }
    }

    /// Advance the PC past the instruction, then apply its semantics.
    /// Control transfers overwrite the advanced PC with their target.
    pub(super) fn execute(&mut self, instr: RiscvInstr, info: RVInstrInfo) -> Result<(), Exception> {
        self.pc = self.pc.wrapping_add(4);
        get_exec_func(instr)(info, self)
    }

    pub fn step(&mut self) -> Result<(), Exception> {
        // IF
        let instr_bytes = self
            .memory
            .read::<u32>(self.pc)
            .map_err(Exception::from_memory_err)?;
        log::trace!("raw instruction {:#010x} at {:#x}", instr_bytes, self.pc);

        // ID
        let Some(DecodeInstr(instr, info)) = self.decoder.decode(instr_bytes) else {
            log::warn!("illegal instruction {:#010x} at {:#x}", instr_bytes, self.pc);
            return Err(Exception::IllegalInstruction);
        };
        log::trace!("decoded instruction: {}", DecodeInstr(instr, info));

        // EX && MEM && WB
        self.execute(instr, info)
    }

    fn pc_in_program(&self) -> bool {
        self.pc >= ram_config::BASE_ADDR && self.pc < ram_config::BASE_ADDR + self.program_len
    }

    /// Run the fetch-decode-execute loop to completion. The loop ends
    /// cleanly once the PC leaves the loaded image; a raised exception
    /// halts the engine and surfaces as a [`Fault`] carrying the address
    /// of the faulting instruction. Returns the retired-instruction count.
    pub fn run(&mut self) -> Result<usize, Fault> {
        let mut retired: usize = 0;

        while self.state == CpuState::Running {
            if !self.pc_in_program() {
                self.state = CpuState::Halted;
                break;
            }

            let pc = self.pc;
            if let Err(kind) = self.step() {
                self.state = CpuState::Halted;
                return Err(Fault { kind, pc });
            }
            retired += 1;
        }

        Ok(retired)
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn pc(&self) -> WordType {
        self.pc
    }

    pub fn reg_file(&self) -> &RegFile {
        &self.reg_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        isa::riscv::{cpu_tester::*, csr_reg::csr_index},
        ram_config,
        utils::{negative_of, sign_extend},
    };

    #[test]
    fn test_exec_arith() {
        let mut tester = ExecTester::new();

        run_test_exec(
            RiscvInstr::ADDI,
            RVInstrInfo::I {
                rd: 5,
                rs1: 3,
                imm: negative_of(5),
            },
            |builder| builder.reg(3, 10).pc(0x8000_2000),
            |checker| checker.reg(5, 5).pc(0x8000_2004),
        );

        for _ in 1..=100 {
            tester.test_rand_r(RiscvInstr::ADD, |lhs, rhs| lhs.wrapping_add(rhs));
            tester.test_rand_r(RiscvInstr::SUB, |lhs, rhs| lhs.wrapping_sub(rhs));
            tester.test_rand_r(RiscvInstr::AND, |lhs, rhs| lhs & rhs);
            tester.test_rand_r(RiscvInstr::OR, |lhs, rhs| lhs | rhs);
            tester.test_rand_r(RiscvInstr::XOR, |lhs, rhs| lhs ^ rhs);

            tester.test_rand_i(RiscvInstr::ADDI, |lhs, imm| lhs.wrapping_add(imm));
            tester.test_rand_i(RiscvInstr::SLTI, |lhs, imm| {
                (lhs.cast_signed() < imm.cast_signed()) as WordType
            });
            tester.test_rand_i(RiscvInstr::SLTIU, |lhs, imm| (lhs < imm) as WordType);
        }
    }

    #[test]
    fn test_exec_shift() {
        let mut tester = ExecTester::new();

        // Shift amounts take the low six bits of the second operand.
        tester.test_rand_r_with(RiscvInstr::SLL, 1, 63, 1 << 63);
        tester.test_rand_r_with(RiscvInstr::SLL, 1, 64, 1);
        tester.test_rand_r_with(RiscvInstr::SLL, 0xABCD, 0, 0xABCD);
        tester.test_rand_r_with(RiscvInstr::SRL, 1 << 63, 63, 1);
        tester.test_rand_r_with(RiscvInstr::SRA, negative_of(64), 2, negative_of(16));
        tester.test_rand_r_with(RiscvInstr::SRA, negative_of(1), 63, negative_of(1));

        // Word shifts mask to five bits and sign-extend the 32-bit result.
        tester.test_rand_r_with(RiscvInstr::SLLW, 1, 31, 0xFFFF_FFFF_8000_0000);
        tester.test_rand_r_with(RiscvInstr::SLLW, 1, 32, 1);
        tester.test_rand_r_with(RiscvInstr::SRLW, 0x8000_0000, 31, 1);
        tester.test_rand_r_with(RiscvInstr::SRAW, 0x8000_0000, 31, WordType::MAX);
    }

    #[test]
    fn test_exec_arith_word() {
        let mut tester = ExecTester::new();

        // 32-bit overflow wraps and sign-extends.
        tester.test_rand_r_with(RiscvInstr::ADDW, 0x7FFF_FFFF, 1, 0xFFFF_FFFF_8000_0000);
        tester.test_rand_r_with(RiscvInstr::SUBW, 0, 1, WordType::MAX);
        tester.test_rand_r_with(RiscvInstr::ADDW, 0x1_0000_0000, 5, 5);

        run_test_exec_decode(
            0xfff7879b, // addiw a5, a5, -1
            |builder| builder.reg(15, 0).pc(0x8000_1000),
            |checker| checker.reg(15, WordType::MAX).pc(0x8000_1004),
        );
    }

    #[test]
    fn test_load_store_decode() {
        run_test_exec_decode(
            0x00812183, // lw x3, 8(x2)
            |builder| {
                builder
                    .reg(2, ram_config::BASE_ADDR)
                    .mem_base::<u32>(8, 123)
                    .pc(0x8000_1000)
            },
            |checker| checker.reg(3, 123).pc(0x8000_1004),
        );

        run_test_exec_decode(
            0xfec42783, // lw a5, -20(s0)
            |builder| {
                builder
                    .reg(8, ram_config::BASE_ADDR + 36)
                    .mem_base::<u32>(16, 123)
                    .pc(0x8000_1000)
            },
            |checker| checker.reg(15, 123).pc(0x8000_1004),
        );

        run_test_exec_decode(
            0xfe112c23, // sw x1, -8(x2)
            |builder| builder.reg(2, ram_config::BASE_ADDR + 16).reg(1, 123),
            |checker| checker.mem_base::<u32>(8, 123),
        );

        // Sign- and zero-extending byte loads.
        run_test_exec_decode(
            0x00030303, // lb t1, 0(t1)
            |builder| builder.reg(6, ram_config::BASE_ADDR).mem_base::<u8>(0, 0x80),
            |checker| checker.reg(6, sign_extend(0x80, 8)),
        );
        run_test_exec_decode(
            0x00034303, // lbu t1, 0(t1)
            |builder| builder.reg(6, ram_config::BASE_ADDR).mem_base::<u8>(0, 0x80),
            |checker| checker.reg(6, 0x80),
        );

        // 64-bit store/load round-trip.
        run_test_exec_decode(
            0x00113423, // sd x1, 8(x2)
            |builder| {
                builder
                    .reg(2, ram_config::BASE_ADDR)
                    .reg(1, 0x0123_4567_89AB_CDEF)
            },
            |checker| checker.mem_base::<u64>(8, 0x0123_4567_89AB_CDEF),
        );
        run_test_exec_decode(
            0x00813183, // ld x3, 8(x2)
            |builder| {
                builder
                    .reg(2, ram_config::BASE_ADDR)
                    .mem_base::<u64>(8, 0xFFFF_FFFF_FFFF_FFFF)
            },
            |checker| checker.reg(3, WordType::MAX),
        );

        // lwu zero-extends where lw sign-extends.
        run_test_exec_decode(
            0x00036303, // lwu t1, 0(t1)
            |builder| {
                builder
                    .reg(6, ram_config::BASE_ADDR)
                    .mem_base::<u32>(0, 0xFFFF_FFFF)
            },
            |checker| checker.reg(6, 0xFFFF_FFFF),
        );
    }

    #[test]
    fn test_load_fault() {
        let mut cpu = TestCPUBuilder::new().reg(1, 0x100).pc(0x8000_1000).build();
        let DecodeInstr(instr, info) = cpu.decoder.decode(0x0000b103).unwrap(); // ld x2, 0(x1)
        assert_eq!(
            cpu.execute(instr, info),
            Err(Exception::LoadAccessFault)
        );
    }

    #[test]
    fn test_u_types_decode() {
        run_test_exec_decode(
            0x12233097, // auipc x1, 0x12233
            |builder| builder.reg(1, 3).pc(0x8000_1000),
            |checker| checker.reg(1, 0x8000_1000 + 0x12233000).pc(0x8000_1004),
        );

        run_test_exec_decode(
            0x123451b7, // lui x3, 0x12345
            |builder| builder.reg(3, 0x54321).pc(0x8000_1000),
            |checker| checker.reg(3, 0x12345000).pc(0x8000_1004),
        );
    }

    #[test]
    fn test_branch_decode() {
        run_test_exec_decode(
            0xf8c318e3, // bne x6, x12, -112
            |builder| builder.reg(6, 5).reg(12, 10).pc(0x8000_2000),
            |checker| checker.pc(0x8000_2000 - 112),
        );

        run_test_exec_decode(
            0xf8c318e3, // bne x6, x12, -112
            |builder| builder.reg(6, 5).reg(12, 5).pc(0x8000_2000),
            |checker| checker.pc(0x8000_2004),
        );

        run_test_exec_decode(
            0x0020c463, // blt x1, x2, 8
            |builder| builder.reg(1, negative_of(1)).reg(2, 0).pc(0x8000_2000),
            |checker| checker.pc(0x8000_2008),
        );

        run_test_exec_decode(
            0x0020e463, // bltu x1, x2, 8
            |builder| builder.reg(1, negative_of(1)).reg(2, 0).pc(0x8000_2000),
            |checker| checker.pc(0x8000_2004),
        );
    }

    #[test]
    fn test_jump_decode() {
        run_test_exec_decode(
            0xf81ff06f, // jal x0, -128
            |builder| builder.reg(0, 0).pc(0x8000_1234),
            |checker| checker.pc(0x8000_1234 - 128),
        );

        run_test_exec_decode(
            0x00c000ef, // jal x1, 12
            |builder| builder.pc(0x8000_1000),
            |checker| checker.reg(1, 0x8000_1004).pc(0x8000_100C),
        );

        run_test_exec_decode(
            0x00078067, // jr a5
            |builder| builder.reg(15, 0x8000_2468).pc(0x8000_1234),
            |checker| checker.pc(0x8000_2468),
        );

        // JALR masks the low target bit.
        run_test_exec_decode(
            0x000080e7, // jalr x1, 0(x1)
            |builder| builder.reg(1, 0x8000_2469).pc(0x8000_1000),
            |checker| checker.reg(1, 0x8000_1004).pc(0x8000_2468),
        );
    }

    #[test]
    fn test_jal_immediate_extremes() {
        // The largest positive and negative 21-bit offsets land exactly
        // where two's-complement arithmetic says they should.
        run_test_exec(
            RiscvInstr::JAL,
            RVInstrInfo::J {
                rd: 1,
                imm: 0xFFFFE,
            },
            |builder| builder.pc(ram_config::BASE_ADDR),
            |checker| {
                checker
                    .reg(1, ram_config::BASE_ADDR + 4)
                    .pc(ram_config::BASE_ADDR + 0xFFFFE)
            },
        );

        run_test_exec(
            RiscvInstr::JAL,
            RVInstrInfo::J {
                rd: 1,
                imm: negative_of(0x10_0000),
            },
            |builder| builder.pc(ram_config::BASE_ADDR),
            |checker| checker.pc(ram_config::BASE_ADDR - 0x10_0000),
        );
    }

    #[test]
    fn test_csr() {
        // CSRRW x11, mscratch, x5
        run_test_exec_decode(
            0x340295f3,
            |builder| builder.reg(5, 0xAAAA).csr(csr_index::mscratch, 0x1234).pc(0x8000_1000),
            |checker| {
                checker
                    .reg(11, 0x1234)
                    .csr(csr_index::mscratch, 0xAAAA)
                    .pc(0x8000_1004)
            },
        );

        // CSRRS x12, mtvec, x6
        run_test_exec_decode(
            0x30532673,
            |builder| builder.reg(6, 0x00F0).csr(csr_index::mtvec, 0x0F00).pc(0x8000_1000),
            |checker| {
                checker
                    .reg(12, 0x0F00)
                    .csr(csr_index::mtvec, 0x0FF0)
                    .pc(0x8000_1004)
            },
        );

        // CSRRC x13, mepc, x7
        run_test_exec_decode(
            0x3413b6f3,
            |builder| builder.reg(7, 0x0FF0).csr(csr_index::mepc, 0x0FFF).pc(0x8000_1000),
            |checker| {
                checker
                    .reg(13, 0x0FFF)
                    .csr(csr_index::mepc, 0x000F)
                    .pc(0x8000_1004)
            },
        );

        // CSRRWI x11, mcause, imm=5
        run_test_exec_decode(
            0x3422d5f3,
            |builder| builder.csr(csr_index::mcause, 0xABCD).pc(0x8000_1000),
            |checker| {
                checker
                    .reg(11, 0xABCD)
                    .csr(csr_index::mcause, 5)
                    .pc(0x8000_1004)
            },
        );

        // CSRRSI x12, mip, imm=6
        run_test_exec_decode(
            0x34436673,
            |builder| builder.csr(csr_index::mip, 0x00F0).pc(0x8000_1000),
            |checker| {
                checker
                    .reg(12, 0x00F0)
                    .csr(csr_index::mip, 0x00F6)
                    .pc(0x8000_1004)
            },
        );

        // CSRRCI x13, mie, imm=7
        run_test_exec_decode(
            0x3043f6f3,
            |builder| builder.csr(csr_index::mie, 0x00FF).pc(0x8000_1000),
            |checker| {
                checker
                    .reg(13, 0x00FF)
                    .csr(csr_index::mie, 0x00F8)
                    .pc(0x8000_1004)
            },
        );
    }

    #[test]
    fn test_fence_and_env_are_nops() {
        run_test_exec_decode(
            0x0ff0000f, // fence
            |builder| builder.pc(0x8000_1000),
            |checker| checker.pc(0x8000_1004),
        );
        run_test_exec_decode(
            0x00000073, // ecall
            |builder| builder.pc(0x8000_1000),
            |checker| checker.pc(0x8000_1004),
        );
        run_test_exec_decode(
            0x00100073, // ebreak
            |builder| builder.pc(0x8000_1000),
            |checker| checker.pc(0x8000_1004),
        );
    }

    #[test]
    fn test_zero_register_stays_zero() {
        run_test_exec_decode(
            0x02a00013, // addi x0, x0, 42
            |builder| builder.pc(0x8000_1000),
            |checker| checker.reg(0, 0).pc(0x8000_1004),
        );
    }

    #[test]
    fn test_cpu_step_sequence() {
        run_test_cpu_step(
            &[
                0x00a00313, // addi t1, x0, 10
                0x01400393, // addi t2, x0, 20
                0x006383b3, // add t2, t2, t1
            ],
            |builder| builder,
            |checker| checker.reg(6, 10).reg(7, 30).pc(ram_config::BASE_ADDR + 12),
        );
    }

    #[test]
    fn test_reset_state() {
        let cpu = TestCPUBuilder::new().build();
        assert_eq!(cpu.pc(), ram_config::DEFAULT_PC_VALUE);
        assert_eq!(cpu.reg_file()[2], ram_config::DEFAULT_SP_VALUE);
        assert_eq!(cpu.state(), CpuState::Running);
    }
}
