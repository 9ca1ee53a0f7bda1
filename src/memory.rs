use crate::font::{FONT, FONT_START};

/// Total addressable memory: 4096 bytes, addresses 0x000-0xFFF.
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded at 0x200; everything below is reserved for the
/// font glyphs (historically, for the interpreter itself).
pub const ROM_START: u16 = 0x200;

/// The largest ROM that fits between 0x200 and the end of memory.
pub const ROM_CAPACITY: usize = MEMORY_SIZE - ROM_START as usize;

/// The CHIP-8 address space.
///
/// Every access masks the address to 0xFFF, so reads and writes cannot
/// fail; a program that runs off the end of memory wraps around instead.
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("ROM is {size} bytes but only {max} fit at 0x200")]
    RomTooLarge { size: usize, max: usize },
}

impl Memory {
    /// Fresh memory with the font glyphs installed and no program.
    pub fn new() -> Self {
        let mut memory = Memory {
            cells: [0; MEMORY_SIZE],
        };
        memory.install_font();
        memory
    }

    /// Reads the byte at `addr & 0xFFF`.
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[usize::from(addr) & (MEMORY_SIZE - 1)]
    }

    /// Writes the byte at `addr & 0xFFF`.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.cells[usize::from(addr) & (MEMORY_SIZE - 1)] = value;
    }

    /// Clears the program area, reinstalls the glyphs and copies `rom` in
    /// at [`ROM_START`].
    ///
    /// ROM bytes are not validated in any way; the only failure is a ROM
    /// larger than [`ROM_CAPACITY`], which leaves memory untouched.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > ROM_CAPACITY {
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max: ROM_CAPACITY,
            });
        }

        self.cells[ROM_START as usize..].fill(0);
        self.install_font();

        let rom_start = ROM_START as usize;
        self.cells[rom_start..rom_start + rom.len()].copy_from_slice(rom);

        Ok(())
    }

    fn install_font(&mut self) {
        let font_start = FONT_START as usize;
        self.cells[font_start..font_start + FONT.len()].copy_from_slice(&FONT);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
