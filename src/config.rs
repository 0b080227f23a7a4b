pub mod ram_config {
    use crate::config::arch_config::WordType;

    pub const BASE_ADDR: WordType = 0x8000_0000;
    pub const SIZE: usize = 0x0010_0000;

    /// First address past the mapped window (exclusive bound).
    pub const END_ADDR: WordType = BASE_ADDR + SIZE as WordType;

    pub const DEFAULT_PC_VALUE: WordType = BASE_ADDR;
    pub const DEFAULT_SP_VALUE: WordType = BASE_ADDR + SIZE as WordType - 4;
}

pub mod arch_config {
    pub type WordType = u64;
    pub type SignedWordType = i64;

    pub const XLEN: u32 = WordType::BITS;

    pub const REGFILE_CNT: usize = 32;

    /// ABI names per the RISC-V calling convention, indexed by register number.
    #[rustfmt::skip]
    pub const REG_NAME: [&str; REGFILE_CNT] = [
        "zero", "ra", "sp",  "gp",  "tp", "t0", "t1", "t2",
        "s0",   "s1", "a0",  "a1",  "a2", "a3", "a4", "a5",
        "a6",   "a7", "s2",  "s3",  "s4", "s5", "s6", "s7",
        "s8",   "s9", "s10", "s11", "t3", "t4", "t5", "t6",
    ];
}
