use cgmath::*;

pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

/// Axis-aligned box in screen space. Origin is the top-left corner and +y points down,
/// so `bottom()` is `origin.y + extent.y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub origin: Point2<f32>,
    pub extent: Vector2<f32>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            origin: point2(0.0, 0.0),
            extent: vec2(0.0, 0.0),
        }
    }
}

impl Bounds {
    pub fn new(origin: Point2<f32>, extent: Vector2<f32>) -> Self {
        Self { origin, extent }
    }

    pub fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(point2(x, y), vec2(size, size))
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }
    pub fn right(&self) -> f32 {
        self.origin.x + self.extent.x
    }
    pub fn top(&self) -> f32 {
        self.origin.y
    }
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.extent.y
    }
    pub fn width(&self) -> f32 {
        self.extent.x
    }
    pub fn height(&self) -> f32 {
        self.extent.y
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Bounds {
        Bounds::new(self.origin + vec2(dx, dy), self.extent)
    }

    /// Returns the integer pixel rectangle covered by these bounds, clipped to a `width` x `height`
    /// grid. A pixel (px, py) covers [px, px+1) x [py, py+1), so boxes which merely touch a pixel's
    /// edge don't cover it. Returns None when nothing remains after clipping.
    pub fn pixel_span(&self, width: u32, height: u32) -> Option<PixelSpan> {
        if !(self.left().is_finite()
            && self.right().is_finite()
            && self.top().is_finite()
            && self.bottom().is_finite())
        {
            return None;
        }

        let x0 = self.left().floor().max(0.0);
        let y0 = self.top().floor().max(0.0);
        let x1 = self.right().ceil().min(width as f32);
        let y1 = self.bottom().ceil().min(height as f32);

        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some(PixelSpan {
                x0: x0 as u32,
                y0: y0 as u32,
                x1: x1 as u32,
                y1: y1 as u32,
            })
        }
    }
}

/// Half-open integer pixel rectangle [x0, x1) x [y0, y1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelSpan {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}
