pub(super) mod exec_function;
pub mod exec_mapping;
pub mod instr_table;

use crate::config::arch_config::WordType;

/// Decoded operand fields, one variant per encoding format.
///
/// Immediates are stored sign-extended to the full word. Exceptions made
/// at decode time: CSR instructions keep the zero-extended 12-bit CSR
/// address, and shift-immediate instructions keep the masked shift amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RVInstrInfo {
    R { rs1: u8, rs2: u8, rd: u8 },
    I { rs1: u8, rd: u8, imm: WordType },
    S { rs1: u8, rs2: u8, imm: WordType },
    B { rs1: u8, rs2: u8, imm: WordType },
    U { rd: u8, imm: WordType },
    J { rd: u8, imm: WordType },
    None,
}

#[derive(Debug, Clone, Copy)]
pub enum InstrFormat {
    U,
    J,
    B,
    I,
    S,
    R,
    None,
}

/// One table row: how to recognise an instruction and which format to
/// unpack. `use_mask` rows are resolved by exact `mask`/`key` match,
/// everything else by (opcode, funct3, funct7).
#[derive(Debug, Clone)]
pub struct RVInstrDesc {
    pub opcode: u8,
    pub funct3: u8,
    pub funct7: u8,
    pub instr: instr_table::RiscvInstr,
    pub format: InstrFormat,
    pub mask: u32,
    pub key: u32,
    pub use_mask: bool,
}

// define a single enum for every instruction
// define a descriptor table for each instruction set
#[macro_export]
macro_rules! define_riscv_isa {
    ( $tot_instr_name:ident,
        $( $isa_name:ident, $isa_table_name:ident, {$(
                $name:ident {
                    opcode: $opcode:literal,
                    funct3: $funct3:literal,
                    funct7: $funct7:literal,
                    format: $fmt:expr,
                    mask: $mask:literal,
                    key: $key:literal,
                    use_mask: $use_mask:literal,
                }),* $(,)?
            }
        ),* $(,)?
    ) => {

        $crate::define_instr_enum!($tot_instr_name, $($($name,)*)*);

        $(
            pub const $isa_table_name: &[$crate::isa::riscv::instruction::RVInstrDesc] = &[
                $(
                    $crate::isa::riscv::instruction::RVInstrDesc {
                        opcode: $opcode,
                        funct3: $funct3,
                        funct7: $funct7,
                        instr: $tot_instr_name::$name,
                        format: $fmt,
                        mask: $mask,
                        key: $key,
                        use_mask: $use_mask,
                    }
                ),*
            ];
        )*
    };
}
