mod reg_file;

pub use reg_file::{Reg, RegFile};
