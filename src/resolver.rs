use cgmath::*;

use crate::{
    constants::{REFINEMENT_EPSILON, REFINEMENT_MAX_ITERATIONS},
    geom::Bounds,
    mask::SolidQuery,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Result of moving a box along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisMotion {
    // the resolved coordinate along the moved axis; always collision-free if the start was
    pub position: f32,
    // true if something solid stopped the box short of the requested displacement
    pub blocked: bool,
}

impl AxisMotion {
    fn free(position: f32) -> Self {
        Self {
            position,
            blocked: false,
        }
    }

    fn blocked(position: f32) -> Self {
        Self {
            position,
            blocked: true,
        }
    }
}

fn probe<S>(axis: Axis, coord: f32, other: f32, extent: Vector2<f32>, solid: &S) -> bool
where
    S: SolidQuery + ?Sized,
{
    let origin = match axis {
        Axis::Horizontal => point2(coord, other),
        Axis::Vertical => point2(other, coord),
    };
    solid.overlaps(&Bounds::new(origin, extent))
}

/// Moves a box of `extent` from `current` by `delta` along `axis`, holding the other axis at
/// `other`, and stops it against anything `solid` reports.
///
/// The whole-pixel part of the move is taken one pixel at a time so a box can never skip over
/// geometry thinner than itself; the first colliding step is rolled back and ends the move.
/// The sub-pixel remainder is committed directly when its destination is clear, otherwise it's
/// bisected down to REFINEMENT_EPSILON (at most REFINEMENT_MAX_ITERATIONS probes) and the last
/// clear offset is kept. Costs at most `floor(|delta|) + REFINEMENT_MAX_ITERATIONS + 1` probes.
pub fn resolve_axis_motion<S>(
    axis: Axis,
    current: f32,
    delta: f32,
    other: f32,
    extent: Vector2<f32>,
    solid: &S,
) -> AxisMotion
where
    S: SolidQuery + ?Sized,
{
    if delta == 0.0 || !delta.is_finite() {
        return AxisMotion::free(current);
    }

    let dir = delta.signum();
    let steps = delta.abs().floor() as u64;
    let mut coord = current;

    for _ in 0..steps {
        let next = coord + dir;
        if probe(axis, next, other, extent, solid) {
            return AxisMotion::blocked(coord);
        }
        coord = next;
    }

    let frac = delta - dir * steps as f32;
    if frac == 0.0 || !probe(axis, coord + frac, other, extent, solid) {
        return AxisMotion::free(coord + frac);
    }

    // lo is always a proven-clear offset, hi a colliding one
    let mut lo = 0.0f32;
    let mut hi = frac;
    for _ in 0..REFINEMENT_MAX_ITERATIONS {
        if (hi - lo).abs() <= REFINEMENT_EPSILON {
            break;
        }
        let mid = (lo + hi) * 0.5;
        if probe(axis, coord + mid, other, extent, solid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    AxisMotion::blocked(coord + lo)
}

#[cfg(test)]
mod resolver_tests {
    use super::*;
    use crate::mask::CollisionMask;
    use proptest::prelude::*;
    use std::cell::Cell;

    const SIZE: f32 = 10.0;

    fn extent() -> Vector2<f32> {
        vec2(SIZE, SIZE)
    }

    /// 200x200 mask with a single-pixel-wide vertical wall at x = 100 and a
    /// single-pixel-tall floor at y = 150
    fn thin_walls() -> CollisionMask {
        let mut mask = CollisionMask::new(200, 200);
        mask.fill_rect(&Bounds::new(point2(100.0, 0.0), vec2(1.0, 200.0)), true);
        mask.fill_rect(&Bounds::new(point2(0.0, 150.0), vec2(100.0, 1.0)), true);
        mask
    }

    struct CountingQuery<'a> {
        mask: &'a CollisionMask,
        count: Cell<u32>,
    }

    impl<'a> SolidQuery for CountingQuery<'a> {
        fn overlaps(&self, bounds: &Bounds) -> bool {
            self.count.set(self.count.get() + 1);
            self.mask.overlaps(bounds)
        }
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let mask = thin_walls();
        let r = resolve_axis_motion(Axis::Horizontal, 42.5, 0.0, 10.0, extent(), &mask);
        assert_eq!(r, AxisMotion::free(42.5));

        let r = resolve_axis_motion(Axis::Vertical, 42.5, f32::NAN, 10.0, extent(), &mask);
        assert_eq!(r, AxisMotion::free(42.5));
    }

    #[test]
    fn free_motion_is_exact() {
        let mask = thin_walls();
        let r = resolve_axis_motion(Axis::Horizontal, 10.0, 23.75, 10.0, extent(), &mask);
        assert_eq!(r, AxisMotion::free(33.75));

        let r = resolve_axis_motion(Axis::Horizontal, 40.0, -17.5, 10.0, extent(), &mask);
        assert_eq!(r, AxisMotion::free(22.5));
    }

    #[test]
    fn integer_step_collision_rolls_back_one_step() {
        let mask = thin_walls();
        // box right edge at 88; wall occupies [100, 101). Stepping stops with the edge at 100.
        let r = resolve_axis_motion(Axis::Horizontal, 78.0, 30.0, 10.0, extent(), &mask);
        assert_eq!(r, AxisMotion::blocked(90.0));

        // from the far side moving left, box left edge stops at 101
        let r = resolve_axis_motion(Axis::Horizontal, 130.0, -50.0, 10.0, extent(), &mask);
        assert_eq!(r, AxisMotion::blocked(101.0));
    }

    #[test]
    fn fractional_collision_is_refined() {
        let mask = thin_walls();
        // falling onto the floor at y=150 from a fractional height
        let r = resolve_axis_motion(Axis::Vertical, 139.3, 0.9, 20.0, extent(), &mask);
        assert!(r.blocked);
        assert!(r.position <= 140.0);
        assert!(r.position > 140.0 - 2.0 * REFINEMENT_EPSILON);
        assert!(!mask.overlaps(&Bounds::square(20.0, r.position, SIZE)));
    }

    #[test]
    fn integer_phase_block_skips_refinement() {
        let mask = thin_walls();
        // first whole step from 139.5 would reach 140.5 which overlaps the floor
        let r = resolve_axis_motion(Axis::Vertical, 139.5, 3.25, 20.0, extent(), &mask);
        assert_eq!(r, AxisMotion::blocked(139.5));
    }

    #[test]
    fn ceiling_blocks_upward_motion() {
        let mut mask = CollisionMask::new(100, 100);
        mask.fill_rect(&Bounds::new(point2(0.0, 10.0), vec2(100.0, 2.0)), true);
        let r = resolve_axis_motion(Axis::Vertical, 40.0, -35.0, 5.0, extent(), &mask);
        assert_eq!(r, AxisMotion::blocked(12.0));
    }

    #[test]
    fn probe_count_is_bounded() {
        let mut mask = CollisionMask::new(200, 200);
        mask.fill_rect(&Bounds::new(point2(0.0, 150.0), vec2(200.0, 50.0)), true);
        let query = CountingQuery {
            mask: &mask,
            count: Cell::new(0),
        };

        // 40 clear whole steps, then a fractional remainder which lands in the floor
        let r = resolve_axis_motion(Axis::Vertical, 100.0, 40.5, 20.0, extent(), &query);
        assert!(r.blocked);
        assert_eq!(r.position, 140.0);
        assert!(query.count.get() <= 40 + REFINEMENT_MAX_ITERATIONS + 1);
    }

    proptest! {
        #[test]
        fn never_tunnels_through_thin_wall(
            start in 0.0f32..89.0,
            delta in 0.0f32..400.0,
            y in 0.0f32..140.0,
        ) {
            let mask = thin_walls();
            let r = resolve_axis_motion(Axis::Horizontal, start, delta, y, extent(), &mask);
            // box must remain entirely left of the wall at x = 100
            prop_assert!(r.position + SIZE <= 100.0);
            prop_assert!(!mask.overlaps(&Bounds::square(r.position, y, SIZE)));
            if start + delta + SIZE > 100.0 + 1e-3 {
                prop_assert!(r.blocked);
            }
        }

        #[test]
        fn never_tunnels_through_thin_floor(
            start in 0.0f32..139.0,
            delta in 0.0f32..500.0,
            x in 0.0f32..89.0,
        ) {
            let mask = thin_walls();
            let r = resolve_axis_motion(Axis::Vertical, start, delta, x, extent(), &mask);
            prop_assert!(r.position + SIZE <= 150.0);
            if start + delta + SIZE > 150.0 + 1e-3 {
                prop_assert!(r.blocked);
            }
        }

        #[test]
        fn never_tunnels_leftward_through_thin_wall(
            start in 101.0f32..190.0,
            delta in -400.0f32..0.0,
            y in 0.0f32..140.0,
        ) {
            let mask = thin_walls();
            let r = resolve_axis_motion(Axis::Horizontal, start, delta, y, extent(), &mask);
            // box must remain entirely right of the wall's far edge at x = 101
            prop_assert!(r.position >= 101.0);
            prop_assert!(!mask.overlaps(&Bounds::square(r.position, y, SIZE)));
            if start + delta < 101.0 - 1e-3 {
                prop_assert!(r.blocked);
            }
        }

        #[test]
        fn never_tunnels_upward_through_thin_ceiling(
            start in 151.0f32..190.0,
            delta in -500.0f32..0.0,
            x in 0.0f32..89.0,
        ) {
            let mask = thin_walls();
            let r = resolve_axis_motion(Axis::Vertical, start, delta, x, extent(), &mask);
            prop_assert!(r.position >= 151.0);
            prop_assert!(!mask.overlaps(&Bounds::square(x, r.position, SIZE)));
            if start + delta < 151.0 - 1e-3 {
                prop_assert!(r.blocked);
            }
        }
    }
}
