use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::config::Rules;
use crate::difficulty::DifficultyRamp;
use crate::entities::{Asteroid, EnergyCrystal, Ship};
use crate::types::Controls;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    GameOver,
    Won,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Playing
    }
}

/// Side effects produced by one tick, for the frame loop to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    CrystalCollected { remaining: usize },
    Crashed,
    Won,
    DifficultyIncreased { step: u64, ship_speed_milli: u64 },
}

/// One playthrough. Built fresh on start and on every restart.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) rules: Rules,
    pub(crate) ship: Ship,
    pub(crate) asteroids: Vec<Asteroid>,
    pub(crate) crystals: Vec<EnergyCrystal>,
    pub(crate) started_at: Duration,
    pub(crate) collected: usize,
    pub(crate) initial_crystals: usize,
    pub(crate) status: Status,
    pub(crate) ramp: DifficultyRamp,
}

impl Session {
    pub fn new(rules: Rules, rng: &mut impl Rng, now: Duration) -> Self {
        let low = rules.crystal_min_count.min(rules.crystal_max_count);
        let initial_crystals = rng.gen_range(low..=rules.crystal_max_count.max(low));
        let asteroids = (0..rules.asteroid_count).map(|_| Asteroid::new(&rules, rng)).collect();
        let crystals = (0..initial_crystals).map(|_| EnergyCrystal::new(&rules, rng)).collect();
        info!(
            "New session: {} asteroids, {} crystals to collect.",
            rules.asteroid_count, initial_crystals
        );
        Session {
            rules,
            ship: Ship::new(&rules),
            asteroids,
            crystals,
            started_at: now,
            collected: 0,
            initial_crystals,
            status: Status::Playing,
            ramp: DifficultyRamp::new(rules.difficulty_step_secs),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn crystals(&self) -> &[EnergyCrystal] {
        &self.crystals
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn initial_crystals(&self) -> usize {
        self.initial_crystals
    }

    pub fn elapsed_secs(&self, now: Duration) -> u64 {
        now.saturating_sub(self.started_at).as_secs()
    }

    /// Advances one frame. Does nothing once the session is over; the
    /// returned events describe transitions that happened during this tick.
    pub fn tick(&mut self, controls: Controls, now: Duration, rng: &mut impl Rng) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.status.is_terminal() {
            return events;
        }

        self.ship.steer(controls, &self.rules);
        self.update_asteroids(rng, &mut events);

        if self.status == Status::Playing {
            self.collect_crystals(&mut events);
            if self.collected == self.initial_crystals {
                info!("All {} crystals collected. Session won.", self.initial_crystals);
                self.status = Status::Won;
                events.push(SessionEvent::Won);
            }
        }

        if self.status == Status::Playing {
            self.apply_difficulty(self.elapsed_secs(now), &mut events);
        }

        events
    }

    fn update_asteroids(&mut self, rng: &mut impl Rng, events: &mut Vec<SessionEvent>) {
        let ship_rect = self.ship.rect();
        for asteroid in &mut self.asteroids {
            asteroid.update();
            if asteroid.is_off_screen(&self.rules) {
                asteroid.respawn(&self.rules, rng);
            }
            if self.status == Status::Playing
                && ship_rect.intersects(&asteroid.hitbox(self.rules.collision_margin))
            {
                info!(
                    "Ship at ({}, {}) crashed into asteroid at ({}, {}).",
                    ship_rect.x, ship_rect.y, asteroid.position.x, asteroid.position.y
                );
                self.status = Status::GameOver;
                events.push(SessionEvent::Crashed);
            }
        }
    }

    fn collect_crystals(&mut self, events: &mut Vec<SessionEvent>) {
        let ship_rect = self.ship.rect();
        let before = self.crystals.len();
        self.crystals.retain(|crystal| !ship_rect.intersects(&crystal.rect()));
        let picked = before - self.crystals.len();
        for i in 0..picked {
            self.collected += 1;
            events.push(SessionEvent::CrystalCollected { remaining: before - i - 1 });
        }
        if picked > 0 {
            debug!("Collected {} crystal(s), {}/{}", picked, self.collected, self.initial_crystals);
        }
    }

    fn apply_difficulty(&mut self, elapsed_secs: u64, events: &mut Vec<SessionEvent>) {
        let due = self.ramp.steps_due(elapsed_secs);
        let first_step = self.ramp.steps_applied() - due + 1;
        for step in first_step..first_step + due {
            for asteroid in &mut self.asteroids {
                asteroid.grow(self.rules.asteroid_growth, self.rules.max_asteroid_size);
            }
            self.ship.accelerate(self.rules.ship_speed_increment);
            events.push(SessionEvent::DifficultyIncreased {
                step,
                ship_speed_milli: (self.ship.speed * 1000.0).round() as u64,
            });
        }
    }
}
