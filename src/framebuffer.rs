/// Display width in pixels.
pub const DISPLAY_WIDTH: usize = 64;
/// Display height in pixels.
pub const DISPLAY_HEIGHT: usize = 32;

/// A row-major snapshot of the screen; `grid[y][x]` is true for a lit pixel.
pub type PixelGrid = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// The 64x32 monochrome framebuffer and its XOR sprite compositor.
///
/// Sprites wrap around both edges: every destination coordinate is taken
/// modulo the display size, so a sprite drawn at the right edge continues
/// at the left. Pixels persist until cleared or XORed off.
pub struct Framebuffer {
    grid: PixelGrid,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            grid: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        }
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.grid = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    }

    /// XORs a sprite into the grid and reports collisions.
    ///
    /// Each byte of `rows` is one sprite row, most significant bit
    /// leftmost. Row `r` bit `b` lands at `((x + b) % 64, (y + r) % 32)`.
    /// Returns true if any pixel flipped from lit to unlit.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut erased = false;

        for (row, &sprite_byte) in rows.iter().enumerate() {
            let dest_y = (usize::from(y) + row) % DISPLAY_HEIGHT;

            for col in 0..8 {
                if sprite_byte & (0x80 >> col) == 0 {
                    continue;
                }

                let dest_x = (usize::from(x) + col) % DISPLAY_WIDTH;
                let pixel = &mut self.grid[dest_y][dest_x];

                *pixel ^= true;
                if !*pixel {
                    erased = true;
                }
            }
        }

        erased
    }

    /// Read-only view of the pixel grid, reflecting the last completed tick.
    pub fn pixels(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.grid[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH]
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
