use rand::Rng;

/// Position and per-frame velocity of a floating card, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Physics {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Container size and card size, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
    pub card_width: f64,
    pub card_height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64, card_width: f64, card_height: f64) -> Self {
        Self {
            width,
            height,
            card_width,
            card_height,
        }
    }

    pub fn max_x(&self) -> f64 {
        (self.width - self.card_width).max(0.0)
    }

    pub fn max_y(&self) -> f64 {
        (self.height - self.card_height).max(0.0)
    }
}

/// Advance one frame. A card touching an edge has that velocity component
/// inverted and is clamped back inside the container.
pub fn step(body: Physics, bounds: &Bounds) -> Physics {
    let mut next = body;
    next.x += next.vx;
    next.y += next.vy;

    let max_x = bounds.max_x();
    let max_y = bounds.max_y();
    if next.x <= 0.0 || next.x >= max_x {
        next.vx = -next.vx;
    }
    if next.y <= 0.0 || next.y >= max_y {
        next.vy = -next.vy;
    }
    next.x = next.x.clamp(0.0, max_x);
    next.y = next.y.clamp(0.0, max_y);
    next
}

/// Produces starting physics for cards entering the orbit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spawner {
    pub bounds: Bounds,
    pub card_speed: f64,
}

impl Spawner {
    pub fn new(bounds: Bounds, card_speed: f64) -> Self {
        Self { bounds, card_speed }
    }

    /// Somewhere in the upper-left 60% of the container, drifting at a
    /// speed scaled by `card_speed`.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Physics {
        Physics {
            x: rng.gen_range(0.0..1.0) * self.bounds.width * 0.6,
            y: rng.gen_range(0.0..1.0) * self.bounds.height * 0.6,
            vx: self.velocity(rng),
            vy: self.velocity(rng),
        }
    }

    fn velocity<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let direction = rng.gen_range(0.0..1.0) - 0.5;
        let magnitude = 2.0 + rng.gen_range(0.0..1.0) * 2.0;
        direction * magnitude * self.card_speed
    }
}

/// Opaque handle for one run of the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken(u64);

/// Start/stop bookkeeping for the per-frame simulation.
///
/// Each start hands out a new token; frames carrying a token from an earlier
/// run are rejected, so nothing keeps stepping after a stop.
#[derive(Debug, Default)]
pub struct FrameLoop {
    generation: u64,
    running: bool,
}

impl FrameLoop {
    pub fn start(&mut self) -> FrameToken {
        if !self.running {
            self.generation += 1;
            self.running = true;
        }
        FrameToken(self.generation)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Start or stop so the loop matches `should_run`.
    pub fn sync(&mut self, should_run: bool) {
        if should_run {
            self.start();
        } else {
            self.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn token(&self) -> Option<FrameToken> {
        self.running.then_some(FrameToken(self.generation))
    }

    pub fn accepts(&self, token: FrameToken) -> bool {
        self.running && token.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(400.0, 300.0, 100.0, 50.0)
    }

    #[test]
    fn moves_by_velocity_inside_bounds() {
        let body = Physics { x: 10.0, y: 10.0, vx: 2.0, vy: -1.0 };
        let next = step(body, &bounds());
        assert_eq!(next, Physics { x: 12.0, y: 9.0, vx: 2.0, vy: -1.0 });
    }

    #[test]
    fn reflects_and_clamps_at_right_edge() {
        let body = Physics { x: 299.0, y: 100.0, vx: 3.0, vy: 0.5 };
        let next = step(body, &bounds());
        assert_eq!(next.x, 300.0);
        assert_eq!(next.vx, -3.0);
        assert_eq!(next.vy, 0.5);
    }

    #[test]
    fn reflects_and_clamps_at_top_edge() {
        let body = Physics { x: 50.0, y: 1.0, vx: 0.0, vy: -4.0 };
        let next = step(body, &bounds());
        assert_eq!(next.y, 0.0);
        assert_eq!(next.vy, 4.0);
    }

    #[test]
    fn bodies_never_leave_the_container() {
        let b = bounds();
        let mut body = Physics { x: 5.0, y: 5.0, vx: 7.3, vy: 5.9 };
        for _ in 0..1000 {
            body = step(body, &b);
            assert!((0.0..=b.max_x()).contains(&body.x));
            assert!((0.0..=b.max_y()).contains(&body.y));
        }
    }

    #[test]
    fn container_smaller_than_card_pins_to_origin() {
        let b = Bounds::new(50.0, 20.0, 100.0, 50.0);
        let next = step(Physics { x: 0.0, y: 0.0, vx: 2.0, vy: 2.0 }, &b);
        assert_eq!((next.x, next.y), (0.0, 0.0));
    }

    #[test]
    fn spawn_stays_in_upper_left_region() {
        let spawner = Spawner::new(bounds(), 1.0);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..200 {
            let p = spawner.spawn(&mut rng);
            assert!(p.x < 400.0 * 0.6 && p.y < 300.0 * 0.6);
            assert!(p.vx.abs() <= 2.0 && p.vy.abs() <= 2.0);
        }
    }

    #[test]
    fn zero_speed_spawns_at_rest() {
        let spawner = Spawner::new(bounds(), 0.0);
        let mut rng = SmallRng::seed_from_u64(3);
        let p = spawner.spawn(&mut rng);
        assert_eq!(p.vx.abs(), 0.0);
        assert_eq!(p.vy.abs(), 0.0);
    }

    #[test]
    fn stale_tokens_are_rejected_after_restart() {
        let mut frames = FrameLoop::default();
        assert!(frames.token().is_none());
        let first = frames.start();
        assert!(frames.accepts(first));
        frames.stop();
        assert!(!frames.accepts(first));
        let second = frames.start();
        assert!(!frames.accepts(first));
        assert!(frames.accepts(second));
    }

    #[test]
    fn sync_is_idempotent_while_running() {
        let mut frames = FrameLoop::default();
        frames.sync(true);
        let token = frames.token().unwrap();
        frames.sync(true);
        assert!(frames.accepts(token));
        frames.sync(false);
        assert!(!frames.is_running());
    }
}
