use anyhow::Result;
use cgmath::*;

use crate::{
    geom::Bounds,
    mask::{CollisionMask, HazardMask, SolidQuery},
};

/// The collision view of one loaded level: what's solid, what's lethal, and how big the
/// playfield is. Immutable once built; loading another level builds a new one.
#[derive(Clone, Debug)]
pub struct LevelGeometry {
    solid: CollisionMask,
    hazard: Option<HazardMask>,
    bounds: Bounds,
}

impl LevelGeometry {
    /// Both masks must cover exactly the level's `bounds` extent, with pixel (0,0) at the bounds' origin.
    pub fn new(solid: CollisionMask, hazard: Option<HazardMask>, bounds: Bounds) -> Result<Self> {
        let (width, height) = (bounds.width() as u32, bounds.height() as u32);
        if bounds.origin != point2(0.0, 0.0) {
            anyhow::bail!(
                "Level bounds must start at the screen origin, got {:?}",
                bounds.origin
            );
        }
        if solid.width() != width || solid.height() != height {
            anyhow::bail!(
                "Solid mask is {}x{} but level bounds are {}x{}",
                solid.width(),
                solid.height(),
                width,
                height
            );
        }
        if let Some(hazard) = &hazard {
            if hazard.width() != width || hazard.height() != height {
                anyhow::bail!(
                    "Hazard mask is {}x{} but level bounds are {}x{}",
                    hazard.width(),
                    hazard.height(),
                    width,
                    height
                );
            }
        }

        Ok(Self {
            solid,
            hazard,
            bounds,
        })
    }

    /// Convenience for an empty level of the given size with no hazards
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            solid: CollisionMask::new(width, height),
            hazard: None,
            bounds: Bounds::new(point2(0.0, 0.0), vec2(width as f32, height as f32)),
        }
    }

    pub fn solid(&self) -> &CollisionMask {
        &self.solid
    }

    pub fn hazard(&self) -> Option<&HazardMask> {
        self.hazard.as_ref()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn touches_hazard(&self, bounds: &Bounds) -> bool {
        match &self.hazard {
            Some(hazard) => hazard.overlaps(bounds),
            None => false,
        }
    }
}

impl SolidQuery for LevelGeometry {
    fn overlaps(&self, bounds: &Bounds) -> bool {
        self.solid.overlaps(bounds)
    }
}
