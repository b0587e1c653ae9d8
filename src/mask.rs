use image::RgbaImage;

use crate::geom::Bounds;

/// Anything which can answer "does this box overlap something solid?"
pub trait SolidQuery {
    fn overlaps(&self, bounds: &Bounds) -> bool;
}

// ---------------------------------------------------------------------------------------------------------------------

const WORD_BITS: u32 = 64;

#[inline(always)]
fn word_mask(lo: u32, hi: u32) -> u64 {
    // bits [lo, hi) set, where 0 <= lo < hi <= 64
    let upper = if hi == WORD_BITS {
        u64::MAX
    } else {
        (1u64 << hi) - 1
    };
    upper & !((1u64 << lo) - 1)
}

/// Per-pixel solidity bitmap. Rows are packed into u64 words, so an overlap query touches
/// one or two words per row of the box and never allocates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl CollisionMask {
    /// Creates an empty (all clear) mask
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = ((width + WORD_BITS - 1) / WORD_BITS) as usize;
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    /// Creates a mask the size of `image` where every pixel with non-zero alpha is solid
    pub fn from_image(image: &RgbaImage) -> Self {
        let mut mask = Self::new(image.width(), image.height());
        mask.blit_image(image, 0, 0);
        mask
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Marks every non-transparent pixel of `image` as solid, with the image's top-left
    /// corner placed at (x, y). Pixels landing outside the mask are dropped.
    pub fn blit_image(&mut self, image: &RgbaImage, x: i32, y: i32) {
        for (ix, iy, pixel) in image.enumerate_pixels() {
            if pixel.0[3] != 0 {
                // widened so extreme offsets clip instead of overflowing
                let (px, py) = (x as i64 + ix as i64, y as i64 + iy as i64);
                if px >= 0 && py >= 0 && px < self.width as i64 && py < self.height as i64 {
                    self.set(px as i32, py as i32, true);
                }
            }
        }
    }

    /// Sets every pixel in the rect to `solid`, clipping to the mask
    pub fn fill_rect(&mut self, bounds: &Bounds, solid: bool) {
        if let Some(span) = bounds.pixel_span(self.width, self.height) {
            for y in span.y0..span.y1 {
                for x in span.x0..span.x1 {
                    self.set(x as i32, y as i32, solid);
                }
            }
        }
    }

    pub fn set(&mut self, x: i32, y: i32, solid: bool) {
        if let Some((word, bit)) = self.index_of(x, y) {
            if solid {
                self.bits[word] |= 1u64 << bit;
            } else {
                self.bits[word] &= !(1u64 << bit);
            }
        }
    }

    /// Out-of-range coordinates are never solid
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        match self.index_of(x, y) {
            Some((word, bit)) => self.bits[word] & (1u64 << bit) != 0,
            None => false,
        }
    }

    pub fn count_solid(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn index_of(&self, x: i32, y: i32) -> Option<(usize, u32)> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        let word = y as usize * self.words_per_row + (x / WORD_BITS) as usize;
        Some((word, x % WORD_BITS))
    }
}

impl SolidQuery for CollisionMask {
    /// True if any solid pixel lies under `bounds`. The part of the box outside the mask
    /// counts as empty space.
    fn overlaps(&self, bounds: &Bounds) -> bool {
        let span = match bounds.pixel_span(self.width, self.height) {
            Some(span) => span,
            None => return false,
        };

        let first_word = span.x0 / WORD_BITS;
        let last_word = (span.x1 - 1) / WORD_BITS;

        for y in span.y0..span.y1 {
            let row = &self.bits[y as usize * self.words_per_row..][..self.words_per_row];
            for w in first_word..=last_word {
                let lo = if w == first_word { span.x0 % WORD_BITS } else { 0 };
                let hi = if w == last_word {
                    span.x1 - w * WORD_BITS
                } else {
                    WORD_BITS
                };
                if row[w as usize] & word_mask(lo, hi) != 0 {
                    return true;
                }
            }
        }

        false
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// Lethal-on-contact regions. Kept as a distinct type so a hazard bitmap can't be handed to
/// the resolver as if it were solid ground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HazardMask(CollisionMask);

impl HazardMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self(CollisionMask::new(width, height))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn mask_mut(&mut self) -> &mut CollisionMask {
        &mut self.0
    }

    pub fn overlaps(&self, bounds: &Bounds) -> bool {
        self.0.overlaps(bounds)
    }
}

impl From<CollisionMask> for HazardMask {
    fn from(mask: CollisionMask) -> Self {
        Self(mask)
    }
}
