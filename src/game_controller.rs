use anyhow::Result;
use cgmath::*;
use std::time::Duration;

use crate::{
    character_controller::{KinematicBody, Tuning},
    constants::{BODY_SIZE, GROUND_LEVEL, MAX_FRAME_DT},
    input::Buttons,
    level::LevelGeometry,
    level_loader::Level,
    trail::Trail,
};

//---------------------------------------------------------------------------------------------------------------------

/// Where the body starts when there are no levels to supply a spawn point
const DEFAULT_SPAWN_X: f32 = 100.0;

/// Things that happened during one `GameController::update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The body reached the right edge and was moved to the start of level `index`
    LevelAdvanced { index: usize },

    /// The last level was completed and play wrapped back to the first
    AllLevelsComplete,

    /// The body touched a hazard or fell off the bottom and was reset
    Respawned,
}

//---------------------------------------------------------------------------------------------------------------------

/// Drives one body through a sequence of levels, one tick per `update`.
pub struct GameController {
    levels: Vec<Level>,
    current_level: usize,
    body: KinematicBody,
    trail: Trail,
}

impl GameController {
    pub fn new(levels: Vec<Level>, tuning: Tuning) -> Result<Self> {
        tuning.validate()?;

        let spawn_point = match levels.first() {
            Some(level) => level.spawn_point,
            None => point2(DEFAULT_SPAWN_X, GROUND_LEVEL - BODY_SIZE),
        };
        let body = KinematicBody::new(spawn_point)
            .with_tuning(tuning)
            .with_respawn_point(spawn_point);

        if let Some(level) = levels.first() {
            log::info!("Starting at level 0 \"{}\"", level.name);
        }

        Ok(Self {
            levels,
            current_level: 0,
            body,
            trail: Trail::default(),
        })
    }

    /// Runs input then integration for one tick. Frame deltas longer than MAX_FRAME_DT are
    /// clamped so a stall can't turn into one enormous step.
    pub fn update(&mut self, dt: Duration, buttons: &Buttons) -> Vec<Event> {
        let mut events = vec![];

        let mut dt = dt.as_secs_f32();
        if dt > MAX_FRAME_DT {
            log::warn!(
                "Frame delta {:.4}s exceeds {:.4}s, clamping",
                dt,
                MAX_FRAME_DT
            );
            dt = MAX_FRAME_DT;
        }

        let geometry = self.levels.get(self.current_level).map(|l| &l.geometry);
        let respawns_before = self.body.respawn_count();

        self.body.apply_input(buttons, geometry);
        let level_complete = self.body.step(dt, geometry);

        if self.body.respawn_count() != respawns_before {
            events.push(Event::Respawned);
        }

        self.trail.sample(self.body.position());

        if level_complete {
            self.advance_level(&mut events);
        }

        events
    }

    fn advance_level(&mut self, events: &mut Vec<Event>) {
        let mut next = self.current_level + 1;
        if next >= self.levels.len() {
            next = 0;
            events.push(Event::AllLevelsComplete);
        }

        if let Some(level) = self.levels.get(next) {
            log::info!("Advancing to level {} \"{}\"", next, level.name);
            self.body.set_respawn_point(level.spawn_point);
            events.push(Event::LevelAdvanced { index: next });
        }

        self.current_level = next;
        self.body.respawn();
        self.trail.clear();
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn current_level_index(&self) -> usize {
        self.current_level
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.levels.get(self.current_level)
    }

    pub fn geometry(&self) -> Option<&LevelGeometry> {
        self.current_level().map(|l| &l.geometry)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
