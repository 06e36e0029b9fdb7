use super::Color;

/// Procedural color strategy.
///
/// Every variant has a stable numeric id (see [`Palette::id`]) which is mixed
/// into the noise seed, so two palettes sampled at the same position draw from
/// uncorrelated noise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Palette {
    Red,
    Green,
    Blue,
    Manual { r: u8, g: u8, b: u8, a: u8 },
    Grass,
    Stone,
    Dark,
    Light,
    Leaves,
    Cloud,
    Empty,
    Full,
    Alpha { a: u8 },
    Shadow { a: u8 },
    /// Any palette id without a built-in strategy. Renders opaque black.
    Other(i32),
}

impl Palette {
    pub const fn manual(c: Color) -> Self {
        Palette::Manual {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }

    pub const fn id(self) -> i32 {
        match self {
            Palette::Red => -3,
            Palette::Green => -2,
            Palette::Blue => -1,
            Palette::Manual { .. } => 0,
            Palette::Grass => 1,
            Palette::Stone => 2,
            Palette::Dark => 3,
            Palette::Light => 4,
            Palette::Leaves => 5,
            Palette::Cloud => 6,
            Palette::Empty => 7,
            Palette::Full => 8,
            Palette::Alpha { .. } => 9,
            Palette::Shadow { .. } => 10,
            Palette::Other(id) => id,
        }
    }
}

/// Deterministic integer-hash noise in `[0, 1]`.
///
/// All arithmetic wraps in 32 bits; negative coordinates and seeds are hashed
/// through their two's-complement bit pattern.
pub fn noise(x: i32, y: i32, seed: i32) -> f32 {
    let mut n = (x as u32).wrapping_mul(1_836_311_903)
        ^ (y as u32).wrapping_mul(2_971_215_073)
        ^ (seed as u32).wrapping_mul(1_073_741_827);
    n ^= n >> 13;
    n = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(60_493).wrapping_add(19_990_303))
        .wrapping_add(1_376_312_589);
    (n & 0x7FFF_FFFF) as f32 / 2_147_483_647.0
}

/// Procedural color source bound to an engine seed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ColorGenerator {
    seed: u32,
}

impl ColorGenerator {
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Changes the seed. Only colors generated afterwards are affected.
    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// Noise byte for `palette` at the offset position.
    pub fn noise_byte(&self, x: i32, y: i32, palette: Palette) -> u8 {
        let seed = (self.seed as i32) ^ palette.id();
        (noise(x, y, seed) * 255.0) as u8
    }

    /// Generates the color of `palette` at `(pos_x + offset_x, pos_y + offset_y)`.
    pub fn color(
        &self,
        pos_x: i32,
        pos_y: i32,
        offset_x: i32,
        offset_y: i32,
        palette: Palette,
    ) -> Color {
        let n = self.noise_byte(
            pos_x.wrapping_add(offset_x),
            pos_y.wrapping_add(offset_y),
            palette,
        );

        match palette {
            Palette::Red => Color::rgb(255, 0, 0),
            Palette::Green => Color::rgb(0, 255, 0),
            Palette::Blue => Color::rgb(0, 0, 255),
            Palette::Manual { r, g, b, a } => Color::rgba(r, g, b, a),
            Palette::Grass => {
                let n = compress(n.max(80), 80, 150) as f32;
                Color::rgb((n * 0.7) as u8, n as u8, (n * 0.1) as u8)
            }
            Palette::Stone => {
                let n = (n.max(120) as f32 * 0.4) as u8;
                Color::rgb(n, n, n)
            }
            Palette::Dark => Color::rgb(20, 20, 20),
            Palette::Light => Color::rgb(225, 225, 225),
            Palette::Leaves => Color::WHITE,
            Palette::Cloud => Color::rgba(n, n, n, 80),
            Palette::Empty => Color::TRANSPARENT,
            Palette::Full => Color::WHITE,
            Palette::Alpha { a } => Color::rgba(255, 255, 255, a),
            Palette::Shadow { a } => Color::rgba(0, 0, 0, a),
            Palette::Other(_) => Color::BLACK,
        }
    }
}

/// Linearly maps `v` in `[lo, 255]` onto `[lo, hi]`.
fn compress(v: u8, lo: u8, hi: u8) -> u8 {
    let span_in = (255 - lo) as u32;
    let span_out = (hi - lo) as u32;
    (lo as u32 + (v.saturating_sub(lo) as u32 * span_out) / span_in) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic() {
        for (x, y, s) in [(0, 0, 0), (17, -4, 3), (i32::MAX, i32::MIN, -9)] {
            assert_eq!(noise(x, y, s).to_bits(), noise(x, y, s).to_bits());
        }
    }

    #[test]
    fn noise_stays_in_unit_range() {
        for x in -50..50 {
            for y in -5..5 {
                let n = noise(x * 7919, y * 104_729, 42);
                assert!((0.0..=1.0).contains(&n), "noise({x},{y}) = {n}");
            }
        }
    }

    #[test]
    fn noise_varies_with_position() {
        let samples: Vec<u32> = (0..32).map(|x| noise(x, 0, 1).to_bits()).collect();
        let first = samples[0];
        assert!(samples.iter().any(|&s| s != first));
    }

    #[test]
    fn same_seed_same_colors() {
        let a = ColorGenerator::new(1234);
        let b = ColorGenerator::new(1234);
        for x in 0..20 {
            assert_eq!(a.color(x, 3, 1, 1, Palette::Grass), b.color(x, 3, 1, 1, Palette::Grass));
        }
    }

    #[test]
    fn offsets_shift_the_sample_position() {
        let g = ColorGenerator::new(7);
        assert_eq!(g.color(10, 10, 5, -2, Palette::Cloud), g.color(15, 8, 0, 0, Palette::Cloud));
    }

    #[test]
    fn reseed_changes_future_colors() {
        let mut g = ColorGenerator::new(1);
        let before: Vec<Color> = (0..32).map(|x| g.color(x, 0, 0, 0, Palette::Cloud)).collect();
        g.reseed(2);
        let after: Vec<Color> = (0..32).map(|x| g.color(x, 0, 0, 0, Palette::Cloud)).collect();
        assert_ne!(before, after);
    }

    // ── palettes ──────────────────────────────────────────────────────────

    #[test]
    fn fixed_palettes() {
        let g = ColorGenerator::new(99);
        assert_eq!(g.color(3, 4, 0, 0, Palette::Red), Color::rgb(255, 0, 0));
        assert_eq!(g.color(3, 4, 0, 0, Palette::Green), Color::rgb(0, 255, 0));
        assert_eq!(g.color(3, 4, 0, 0, Palette::Blue), Color::rgb(0, 0, 255));
        assert_eq!(g.color(3, 4, 0, 0, Palette::Dark), Color::rgb(20, 20, 20));
        assert_eq!(g.color(3, 4, 0, 0, Palette::Light), Color::rgb(225, 225, 225));
        assert_eq!(g.color(3, 4, 0, 0, Palette::Empty), Color::TRANSPARENT);
        assert_eq!(g.color(3, 4, 0, 0, Palette::Full), Color::WHITE);
        assert_eq!(g.color(3, 4, 0, 0, Palette::Other(77)), Color::BLACK);
    }

    #[test]
    fn parameterized_palettes() {
        let g = ColorGenerator::default();
        assert_eq!(
            g.color(0, 0, 0, 0, Palette::Manual { r: 1, g: 2, b: 3, a: 4 }),
            Color::rgba(1, 2, 3, 4)
        );
        assert_eq!(g.color(0, 0, 0, 0, Palette::Alpha { a: 60 }), Color::rgba(255, 255, 255, 60));
        assert_eq!(g.color(0, 0, 0, 0, Palette::Shadow { a: 90 }), Color::rgba(0, 0, 0, 90));
    }

    #[test]
    fn grass_stays_in_band() {
        let g = ColorGenerator::new(5);
        for x in 0..200 {
            let c = g.color(x, x / 3, 0, 0, Palette::Grass);
            assert!((80..=150).contains(&c.g), "green {} out of band", c.g);
            assert_eq!(c.a, 255);
            assert!(c.r < c.g && c.b < c.r);
        }
    }

    #[test]
    fn stone_is_gray_and_floored() {
        let g = ColorGenerator::new(5);
        for x in 0..200 {
            let c = g.color(x, 1, 0, 0, Palette::Stone);
            assert!(c.r == c.g && c.g == c.b);
            assert!(c.r >= 48, "stone {} below floor", c.r);
        }
    }

    #[test]
    fn cloud_is_translucent_gray() {
        let g = ColorGenerator::new(5);
        let c = g.color(9, 9, 0, 0, Palette::Cloud);
        assert_eq!(c.a, 80);
        assert!(c.r == c.g && c.g == c.b);
    }

    #[test]
    fn compress_maps_endpoints() {
        assert_eq!(compress(80, 80, 150), 80);
        assert_eq!(compress(255, 80, 150), 150);
    }
}
