use crate::{
    config::arch_config::WordType,
    load,
    ram::{MemError, Ram},
    ram_config,
    utils::UnsignedInteger,
};

/// Flat virtual memory: the RAM mapped at `[BASE_ADDR, END_ADDR)`.
///
/// Every byte of an access must fall inside the window; there is no
/// alignment requirement and no translation beyond the fixed offset.
pub(crate) struct Mmu {
    ram: Ram,
}

impl Mmu {
    pub fn from_image(image: &[u8]) -> Self {
        let mut ram = Ram::new();
        load::load_bin(&mut ram, image);
        Self { ram }
    }

    fn translate(addr: WordType, len: usize) -> Result<WordType, MemError> {
        let last = addr
            .checked_add(len as WordType - 1)
            .ok_or(MemError::OutOfRange)?;
        if addr < ram_config::BASE_ADDR || last >= ram_config::END_ADDR {
            return Err(MemError::OutOfRange);
        }
        Ok(addr - ram_config::BASE_ADDR)
    }

    pub fn read<T>(&self, addr: WordType) -> Result<T, MemError>
    where
        T: UnsignedInteger,
    {
        let offset = Self::translate(addr, size_of::<T>())?;
        self.ram.read(offset)
    }

    pub fn write<T>(&mut self, addr: WordType, data: T) -> Result<(), MemError>
    where
        T: UnsignedInteger,
    {
        let offset = Self::translate(addr, size_of::<T>())?;
        self.ram.write(offset, data)
    }
}
