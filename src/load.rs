use crate::ram::Ram;

/// Copy a flat binary image into RAM at offset zero, which the MMU maps to
/// the base virtual address. Bytes past the image stay zero.
pub fn load_bin(ram: &mut Ram, raw_data: &[u8]) {
    ram.insert_section(raw_data, 0);
}
