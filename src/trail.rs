use std::collections::VecDeque;

use cgmath::*;

use crate::constants::TRAIL_LENGTH;

/// Fixed-capacity history of the body's recent positions, oldest first.
/// Sampled once per tick; once full, each new sample evicts the oldest.
#[derive(Clone, Debug)]
pub struct Trail {
    capacity: usize,
    positions: VecDeque<Point2<f32>>,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(TRAIL_LENGTH)
    }
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            positions: VecDeque::with_capacity(capacity),
        }
    }

    pub fn sample(&mut self, position: Point2<f32>) {
        if self.capacity == 0 {
            return;
        }
        if self.positions.len() == self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point2<f32>> {
        self.positions.iter()
    }

    pub fn latest(&self) -> Option<Point2<f32>> {
        self.positions.back().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
