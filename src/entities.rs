use crate::config::Rules;
use crate::types::{clamp_coordinate, Controls, Rect, Vector2D};
use rand::Rng;
use log::debug;

/// Random whole-unit coordinate in `[low, high]`. A range that collapsed
/// because something grew larger than its lane yields `low`.
pub fn random_coordinate(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    let low = low.floor() as i64;
    let high = (high.floor() as i64).max(low);
    rng.gen_range(low..=high) as f64
}

// --- Ship ---
#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub position: Vector2D,
    pub size: f64,
    pub speed: f64,
}

impl Ship {
    /// Centred horizontally, a little above the bottom edge.
    pub fn new(rules: &Rules) -> Self {
        let centre_x = (rules.play_width / 2.0).floor();
        let centre_y = rules.play_height - crate::constants::SHIP_SPAWN_BOTTOM_OFFSET;
        Ship {
            position: Vector2D::new(centre_x - rules.ship_size / 2.0, centre_y - rules.ship_size / 2.0),
            size: rules.ship_size,
            speed: rules.ship_speed,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    /// Moves by the current speed along every held direction, then clamps the
    /// whole ship inside the play area.
    pub fn steer(&mut self, controls: Controls, rules: &Rules) {
        self.position = self.position.add(controls.direction().scale(self.speed));
        self.position.x = clamp_coordinate(self.position.x, self.size, rules.play_width);
        self.position.y = clamp_coordinate(self.position.y, self.size, rules.play_height);
    }

    pub fn accelerate(&mut self, increment: f64) {
        self.speed += increment.max(0.0);
    }
}

// --- Asteroid ---
#[derive(Clone, Debug, PartialEq)]
pub struct Asteroid {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub size: f64,
}

impl Asteroid {
    /// Starts somewhere in the upper-right quarter, drifting down and left.
    pub fn new(rules: &Rules, rng: &mut impl Rng) -> Self {
        let size = rules.asteroid_size;
        let x = random_coordinate(rng, rules.play_width / 2.0, rules.play_width - size);
        let y = random_coordinate(rng, 0.0, rules.play_height / 2.0);
        Asteroid {
            position: Vector2D::new(x, y),
            velocity: Vector2D::new(-rules.asteroid_speed, rules.asteroid_speed),
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    /// Crash hitbox, smaller than the drawn asteroid.
    pub fn hitbox(&self, margin: f64) -> Rect {
        self.rect().inset(margin)
    }

    pub fn update(&mut self) {
        self.position = self.position.add(self.velocity);
    }

    pub fn is_off_screen(&self, rules: &Rules) -> bool {
        self.position.y > rules.play_height || self.position.x < 0.0
    }

    /// Wraps back above the top edge, somewhere in the right half.
    pub fn respawn(&mut self, rules: &Rules, rng: &mut impl Rng) {
        self.position.y = -self.size;
        self.position.x = random_coordinate(rng, rules.play_width / 2.0, rules.play_width - self.size);
        debug!("Asteroid respawned at ({}, {}) with size {}", self.position.x, self.position.y, self.size);
    }

    pub fn grow(&mut self, growth: f64, max_size: f64) {
        if self.size < max_size {
            self.size = (self.size + growth.max(0.0)).min(max_size);
        }
    }
}

// --- Energy crystal ---
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyCrystal {
    pub position: Vector2D,
    pub size: f64,
}

impl EnergyCrystal {
    pub fn new(rules: &Rules, rng: &mut impl Rng) -> Self {
        let size = rules.crystal_size;
        EnergyCrystal {
            position: Vector2D::new(
                random_coordinate(rng, 0.0, rules.play_width - size),
                random_coordinate(rng, 0.0, rules.play_height - size),
            ),
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn ship_spawns_bottom_centre() {
        let ship = Ship::new(&Rules::default());
        assert_eq!(ship.rect(), Rect::new(380.0, 530.0, 40.0, 40.0));
        assert_eq!(ship.speed, 5.0);
    }

    #[test]
    fn diagonal_moves_on_both_axes_unnormalised() {
        let rules = Rules::default();
        let mut ship = Ship::new(&rules);
        ship.steer(Controls { left: true, up: true, ..Controls::default() }, &rules);
        assert_eq!(ship.position, Vector2D::new(375.0, 525.0));
    }

    #[test]
    fn opposite_directions_cancel() {
        let rules = Rules::default();
        let mut ship = Ship::new(&rules);
        let before = ship.position;
        ship.steer(Controls { left: true, right: true, up: true, down: true }, &rules);
        assert_eq!(ship.position, before);
    }

    #[test]
    fn ship_is_clamped_to_play_area() {
        let rules = Rules::default();
        let mut ship = Ship::new(&rules);
        ship.speed = 1000.0;
        ship.steer(Controls { right: true, down: true, ..Controls::default() }, &rules);
        assert_eq!(ship.position, Vector2D::new(760.0, 560.0));
        ship.steer(Controls { left: true, up: true, ..Controls::default() }, &rules);
        assert_eq!(ship.position, Vector2D::new(0.0, 0.0));
    }

    #[test]
    fn asteroid_spawns_in_upper_right_quarter() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let asteroid = Asteroid::new(&rules, &mut rng);
            assert!((400.0..=750.0).contains(&asteroid.position.x));
            assert!((0.0..=300.0).contains(&asteroid.position.y));
            assert_eq!(asteroid.position.x.fract(), 0.0);
        }
    }

    #[test]
    fn asteroid_drifts_left_and_down() {
        let rules = Rules::default();
        let mut asteroid = Asteroid::new(&rules, &mut StdRng::seed_from_u64(1));
        let before = asteroid.position;
        asteroid.update();
        assert_eq!(asteroid.position, Vector2D::new(before.x - 2.0, before.y + 2.0));
    }

    #[test]
    fn respawn_wraps_above_top_in_right_half() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut asteroid = Asteroid::new(&rules, &mut rng);
        asteroid.size = 72.5;
        for _ in 0..100 {
            asteroid.position = Vector2D::new(-1.0, 601.0);
            assert!(asteroid.is_off_screen(&rules));
            asteroid.respawn(&rules, &mut rng);
            assert_eq!(asteroid.position.y, -72.5);
            assert!(asteroid.position.x >= 400.0);
            assert!(asteroid.position.x + asteroid.size <= 800.0);
            assert!(!asteroid.is_off_screen(&rules));
        }
    }

    #[test]
    fn growth_is_capped() {
        let rules = Rules::default();
        let mut asteroid = Asteroid::new(&rules, &mut StdRng::seed_from_u64(2));
        asteroid.size = 99.8;
        asteroid.grow(0.5, 100.0);
        assert_eq!(asteroid.size, 100.0);
        asteroid.grow(0.5, 100.0);
        assert_eq!(asteroid.size, 100.0);
    }

    #[test]
    fn hitbox_is_inset() {
        let rules = Rules::default();
        let mut asteroid = Asteroid::new(&rules, &mut StdRng::seed_from_u64(3));
        asteroid.position = Vector2D::new(100.0, 100.0);
        assert_eq!(asteroid.hitbox(5.0), Rect::new(105.0, 105.0, 40.0, 40.0));
    }

    #[test]
    fn crystals_stay_on_screen() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let rect = EnergyCrystal::new(&rules, &mut rng).rect();
            assert!(rect.x >= 0.0 && rect.right() <= 800.0);
            assert!(rect.y >= 0.0 && rect.bottom() <= 600.0);
        }
    }
}
