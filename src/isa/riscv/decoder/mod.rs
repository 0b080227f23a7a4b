use std::fmt::Display;

use crate::{
    config::arch_config::WordType,
    isa::{
        riscv::instruction::{
            instr_table::{RiscvInstr, TABLE_RV64I, TABLE_RVSYSTEM, TABLE_RVZICSR},
            InstrFormat, RVInstrDesc, RVInstrInfo,
        },
        utils::ISABuilder,
    },
    utils::sign_extend,
};

mod funct_decoder;
mod mask_decoder;

pub trait DecoderTrait {
    fn from_isa(instrs: &[RVInstrDesc]) -> Self;
    fn decode(&self, instr: u32) -> Option<DecodeInstr>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeInstr(pub RiscvInstr, pub RVInstrInfo);

impl Display for DecodeInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}, {:?}", self.0.name(), self.1)
    }
}

pub struct Decoder {
    funct3_decoder: funct_decoder::Decoder,
    mask_decoder: mask_decoder::MaskDecoder,
}

impl Decoder {
    pub fn new() -> Self {
        let isa = ISABuilder::new()
            .add(TABLE_RV64I)
            .add(TABLE_RVZICSR)
            .add(TABLE_RVSYSTEM)
            .build();
        Self {
            funct3_decoder: funct_decoder::Decoder::from_isa(&isa),
            mask_decoder: mask_decoder::MaskDecoder::from_isa(&isa),
        }
    }
}

impl DecoderTrait for Decoder {
    fn from_isa(instrs: &[RVInstrDesc]) -> Self {
        Self {
            funct3_decoder: funct_decoder::Decoder::from_isa(instrs),
            mask_decoder: mask_decoder::MaskDecoder::from_isa(instrs),
        }
    }

    fn decode(&self, instr: u32) -> Option<DecodeInstr> {
        None.or_else(|| self.mask_decoder.decode(instr))
            .or_else(|| self.funct3_decoder.decode(instr))
    }
}

fn decode_info(raw_instr: u32, instr: RiscvInstr, fmt: InstrFormat) -> RVInstrInfo {
    let rd = ((raw_instr >> 7) & 0b11111) as u8;
    let rs1 = ((raw_instr >> 15) & 0b11111) as u8;
    let rs2 = ((raw_instr >> 20) & 0b11111) as u8;

    match fmt {
        InstrFormat::R => RVInstrInfo::R { rd, rs1, rs2 },
        InstrFormat::I => {
            let mut imm = ((raw_instr >> 20) & 0xFFF) as WordType;

            match instr {
                // Shift amounts live in the low immediate bits.
                RiscvInstr::SLLI | RiscvInstr::SRLI | RiscvInstr::SRAI => {
                    imm &= 0x3F;
                }
                RiscvInstr::SLLIW | RiscvInstr::SRLIW | RiscvInstr::SRAIW => {
                    imm &= 0x1F;
                }
                // CSR addresses stay zero-extended.
                RiscvInstr::CSRRW
                | RiscvInstr::CSRRS
                | RiscvInstr::CSRRC
                | RiscvInstr::CSRRWI
                | RiscvInstr::CSRRSI
                | RiscvInstr::CSRRCI => {}
                _ => {
                    imm = sign_extend(imm, 12);
                }
            }

            RVInstrInfo::I { rd, rs1, imm }
        }
        InstrFormat::S => {
            let imm = (((raw_instr >> 25) & 0x7F) << 5) | ((raw_instr >> 7) & 0b11111);
            RVInstrInfo::S {
                rs1,
                rs2,
                imm: sign_extend(imm as WordType, 12),
            }
        }
        InstrFormat::U => {
            let imm = raw_instr & 0xFFFF_F000;
            RVInstrInfo::U {
                rd,
                imm: sign_extend(imm as WordType, 32),
            }
        }
        InstrFormat::B => {
            let imm = (((raw_instr >> 31) & 1) << 12)
                | (((raw_instr >> 7) & 1) << 11)
                | (((raw_instr >> 25) & 0b111111) << 5)
                | (((raw_instr >> 8) & 0b1111) << 1);
            RVInstrInfo::B {
                rs1,
                rs2,
                imm: sign_extend(imm as WordType, 13),
            }
        }
        InstrFormat::J => {
            let imm = (((raw_instr >> 31) & 1) << 20)
                | (((raw_instr >> 12) & 0xFF) << 12)
                | (((raw_instr >> 20) & 1) << 11)
                | (((raw_instr >> 21) & 0x3FF) << 1);
            RVInstrInfo::J {
                rd,
                imm: sign_extend(imm as WordType, 21),
            }
        }
        InstrFormat::None => RVInstrInfo::None,
    }
}
