//! Constellation particle field
//!
//! A fixed population of short-lived particles drifting over a toroidal
//! surface, with optional pointer attraction, per-particle trails, glow
//! halos, and proximity connection lines between nearby pairs.

use std::collections::VecDeque;

use crate::config::FieldConfig;
use crate::display::PixelBuffer;
use crate::math::Vec2;
use crate::util::{hsv_to_rgb, lerp_color, Rng};

/// A single particle with a bounded lifetime
///
/// Particles never leave the collection: when `life` hits zero the
/// particle respawns in place with freshly randomized fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub hue: f32,
    pub opacity: f32,
    pub life: u32,
    pub max_life: u32,
    trail: VecDeque<Vec2>,
}

impl Particle {
    /// Create a particle with randomized fields inside the given bounds
    fn spawn(rng: &mut Rng, width: f32, height: f32, cfg: &FieldConfig) -> Self {
        let max_life = rng.range_u32(cfg.life_range.0, cfg.life_range.1);
        Self {
            pos: Vec2::new(rng.next_f32() * width, rng.next_f32() * height),
            vel: Vec2::new(
                (rng.next_f32() - 0.5) * cfg.speed,
                (rng.next_f32() - 0.5) * cfg.speed,
            ),
            size: rng.range_f32(cfg.size_range.0, cfg.size_range.1),
            hue: rng.range_f32(cfg.hue_range.0, cfg.hue_range.1),
            opacity: rng.range_f32(cfg.opacity_range.0, cfg.opacity_range.1),
            life: max_life,
            max_life,
            trail: VecDeque::with_capacity(cfg.trail_len),
        }
    }

    /// Re-randomize all spawn fields in place and restore a full lifetime
    fn respawn(&mut self, rng: &mut Rng, width: f32, height: f32, cfg: &FieldConfig) {
        *self = Self::spawn(rng, width, height, cfg);
    }

    /// Advance one frame: attraction, motion, trail, wrap, lifetime
    fn update(
        &mut self,
        width: f32,
        height: f32,
        pointer: Option<Vec2>,
        cfg: &FieldConfig,
        rng: &mut Rng,
    ) {
        // Pointer attraction: a velocity nudge, not a velocity reset,
        // so it accumulates across frames while the pointer lingers
        if cfg.has_attraction {
            if let Some(p) = pointer {
                let d = self.pos.distance(p);
                if d > 0.0 && d < cfg.attraction_radius {
                    let force = (cfg.attraction_radius - d) / cfg.attraction_radius;
                    let dir = (p - self.pos) * (1.0 / d);
                    self.vel = self.vel + dir * (force * cfg.attraction_strength);
                }
            }
        }

        // Optional cap on accumulated speed (see FieldConfig::max_speed)
        if let Some(max) = cfg.max_speed {
            let speed = self.vel.length();
            if speed > max {
                self.vel = self.vel * (max / speed);
            }
        }

        self.pos = self.pos + self.vel;

        if cfg.trail_len > 0 {
            self.trail.push_front(self.pos);
            self.trail.truncate(cfg.trail_len);
        }

        // Toroidal wrap: exit one edge, reappear at the opposite one,
        // preserving the overshoot
        if self.pos.x < 0.0 || self.pos.x >= width {
            self.pos.x = self.pos.x.rem_euclid(width);
        }
        if self.pos.y < 0.0 || self.pos.y >= height {
            self.pos.y = self.pos.y.rem_euclid(height);
        }

        self.life = self.life.saturating_sub(1);
        if self.life == 0 {
            self.respawn(rng, width, height, cfg);
        }
    }

    /// Normalized remaining lifetime (1 = just spawned, 0 = about to respawn)
    #[inline]
    pub fn life_ratio(&self) -> f32 {
        self.life as f32 / self.max_life as f32
    }

    /// Rasterize trail, glow halo, and disk
    fn draw(&self, buffer: &mut PixelBuffer, cfg: &FieldConfig) {
        let alpha = self.opacity * self.life_ratio();
        let (r, g, b) = hsv_to_rgb(self.hue, 1.0, 1.0);

        // Trail first, newest to oldest, shrinking and fading
        let len = self.trail.len();
        for (i, point) in self.trail.iter().enumerate() {
            let t = 1.0 - i as f32 / len as f32;
            let radius = (self.size * t) as i32;
            let a = (alpha * t * 255.0) as u8;
            buffer.fill_circle_blend(point.x as i32, point.y as i32, radius, r, g, b, a);
        }

        let x = self.pos.x as i32;
        let y = self.pos.y as i32;

        if cfg.has_glow {
            // Wide additive halo beneath the disk
            let glow_radius = (self.size * 3.0).ceil() as i32;
            buffer.fill_circle_gradient(
                x,
                y,
                glow_radius,
                (r as f32 * alpha) as u8,
                (g as f32 * alpha) as u8,
                (b as f32 * alpha) as u8,
                2.0,
            );
        }

        buffer.fill_circle_blend(x, y, self.size as i32, r, g, b, (alpha * 255.0) as u8);
    }
}

/// A proximity link between two particles for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Indices into the field's particle collection, always `a < b`
    pub a: usize,
    pub b: usize,
    /// Line alpha in [0, 1], linear falloff with distance
    pub alpha: f32,
}

/// Owns a fixed-size particle population and renders it plus pairwise
/// proximity links to a `PixelBuffer`
pub struct ParticleField {
    config: FieldConfig,
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    pointer: Option<Vec2>,
    rng: Rng,
}

impl ParticleField {
    pub fn new(config: FieldConfig, width: u32, height: u32, seed: u64) -> Self {
        let config = config.sanitized();
        let mut rng = Rng::new(seed);
        let (w, h) = (width as f32, height as f32);
        let particles = (0..config.count)
            .map(|_| Particle::spawn(&mut rng, w, h, &config))
            .collect();

        Self {
            config,
            particles,
            width: w,
            height: h,
            pointer: None,
            rng,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Latest pointer position; None while the pointer is outside the surface
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer;
    }

    /// Update wrap bounds. In-flight positions are not rescaled; a
    /// particle momentarily outside the new bounds is wrapped on its
    /// next update, which is fine for a decorative layer.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.width = (width.max(1)) as f32;
        self.height = (height.max(1)) as f32;
    }

    /// Advance every particle one frame, in stable order
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.update(self.width, self.height, self.pointer, &self.config, &mut self.rng);
        }
    }

    /// Collect the proximity links for the current frame.
    ///
    /// Every unordered pair below the threshold appears exactly once
    /// with `a < b`. This is the O(n²) pass that keeps populations
    /// deliberately small; swap in grid bucketing before growing n.
    pub fn connections(&self) -> Vec<Connection> {
        let threshold = self.config.connection_threshold;
        let mut links = Vec::new();

        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let d = self.particles[i].pos.distance(self.particles[j].pos);
                if d < threshold {
                    links.push(Connection {
                        a: i,
                        b: j,
                        alpha: (threshold - d) / threshold * self.config.connection_alpha,
                    });
                }
            }
        }

        links
    }

    /// Rasterize the whole field: background, particles, then links
    pub fn render(&self, buffer: &mut PixelBuffer) {
        match self.config.fade {
            // Low-alpha fade leaves canvas-level motion trails
            Some(f) => buffer.fade(f),
            None => {
                let (r, g, b) = self.config.background;
                buffer.clear(r, g, b);
            },
        }

        for p in &self.particles {
            p.draw(buffer, &self.config);
        }

        for link in self.connections() {
            let pa = &self.particles[link.a];
            let pb = &self.particles[link.b];
            let alpha = (link.alpha * 255.0) as u8;
            let ca = hsv_to_rgb(pa.hue, 1.0, 1.0);
            let cb = hsv_to_rgb(pb.hue, 1.0, 1.0);

            if self.config.gradient_links {
                buffer.line_blend_gradient(
                    pa.pos.x as i32,
                    pa.pos.y as i32,
                    pb.pos.x as i32,
                    pb.pos.y as i32,
                    ca,
                    cb,
                    alpha,
                );
            } else {
                let (r, g, b) = lerp_color(ca, cb, 0.5);
                buffer.line_blend(
                    pa.pos.x as i32,
                    pa.pos.y as i32,
                    pb.pos.x as i32,
                    pb.pos.y as i32,
                    r,
                    g,
                    b,
                    alpha,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_field(mut cfg: FieldConfig, count: usize) -> ParticleField {
        cfg.count = count;
        ParticleField::new(cfg, 320, 240, 0xC0FFEE)
    }

    #[test]
    fn test_lifetime_stays_bounded_over_many_updates() {
        let mut cfg = FieldConfig::drift();
        cfg.life_range = (5, 5);
        let mut field = small_field(cfg, 10);

        let mut respawns = 0;
        let mut prev: Vec<u32> = field.particles().iter().map(|p| p.life).collect();

        for _ in 0..10_000 {
            field.update();
            for (p, &before) in field.particles().iter().zip(&prev) {
                assert!(p.life >= 1 && p.life <= p.max_life);
                if p.life > before {
                    respawns += 1;
                }
            }
            prev = field.particles().iter().map(|p| p.life).collect();
        }

        assert!(respawns > 0, "short-lived particles never respawned");
    }

    #[test]
    fn test_position_wraps_toroidally() {
        let mut field = small_field(FieldConfig::drift(), 1);
        {
            let p = &mut field.particles[0];
            p.pos = Vec2::new(319.5, 100.0);
            p.vel = Vec2::new(1.0, 0.0);
            p.life = 50;
            p.max_life = 50;
        }
        field.update();

        let p = &field.particles()[0];
        assert!(p.pos.x >= 0.0 && p.pos.x < 320.0);
        assert!((p.pos.x - 0.5).abs() < 1e-3, "expected wrap near 0, got {}", p.pos.x);
    }

    #[test]
    fn test_negative_overflow_wraps_to_far_edge() {
        let mut field = small_field(FieldConfig::drift(), 1);
        {
            let p = &mut field.particles[0];
            p.pos = Vec2::new(100.0, 0.25);
            p.vel = Vec2::new(0.0, -1.0);
            p.life = 50;
            p.max_life = 50;
        }
        field.update();

        let p = &field.particles()[0];
        assert!(p.pos.y >= 0.0 && p.pos.y < 240.0);
        assert!(p.pos.y > 239.0, "expected wrap near the bottom, got {}", p.pos.y);
    }

    #[test]
    fn test_population_is_constant() {
        let mut field = small_field(FieldConfig::network(), 40);
        let mut buffer = PixelBuffer::with_size(320, 240);

        for i in 0..500 {
            field.update();
            field.render(&mut buffer);
            if i == 250 {
                field.on_resize(800, 600);
            }
            assert_eq!(field.particles().len(), 40);
        }
    }

    #[test]
    fn test_trail_never_exceeds_cap() {
        let mut cfg = FieldConfig::network();
        cfg.trail_len = 10;
        cfg.life_range = (1000, 1000); // no respawn mid-test
        let mut field = small_field(cfg, 3);

        for step in 1..=15 {
            field.update();
            for p in field.particles() {
                assert!(p.trail.len() <= 10);
                if step >= 10 {
                    assert_eq!(p.trail.len(), 10);
                }
            }
        }
    }

    #[test]
    fn test_trail_newest_first() {
        let mut cfg = FieldConfig::network();
        cfg.has_attraction = false;
        cfg.life_range = (1000, 1000);
        let mut field = small_field(cfg, 1);
        field.update();

        let p = &field.particles()[0];
        assert_eq!(p.trail[0], p.pos);
    }

    #[test]
    fn test_connections_unique_and_symmetric() {
        let field = small_field(FieldConfig::network(), 30);
        let links = field.connections();

        for link in &links {
            assert!(link.a < link.b, "pairs must be canonical (a < b)");
            assert!(link.alpha > 0.0 && link.alpha <= field.config().connection_alpha);
        }

        // Each unordered pair at most once
        let mut seen: Vec<(usize, usize)> = links.iter().map(|l| (l.a, l.b)).collect();
        seen.sort_unstable();
        let before = seen.len();
        seen.dedup();
        assert_eq!(before, seen.len());

        // The set matches a reverse-order recomputation
        let threshold = field.config().connection_threshold;
        let ps = field.particles();
        let mut reversed = Vec::new();
        for j in (0..ps.len()).rev() {
            for i in (0..j).rev() {
                if ps[i].pos.distance(ps[j].pos) < threshold {
                    reversed.push((i, j));
                }
            }
        }
        reversed.sort_unstable();
        assert_eq!(seen, reversed);
    }

    #[test]
    fn test_respawn_after_exactly_one_update() {
        let mut cfg = FieldConfig::drift();
        cfg.life_range = (100, 200);
        let mut field = small_field(cfg, 1);
        {
            let p = &mut field.particles[0];
            p.life = 1;
            p.max_life = 1;
        }
        field.update();

        let p = &field.particles()[0];
        assert_eq!(p.life, p.max_life, "respawn must restore a full lifetime");
        assert!(p.max_life >= 100, "respawn re-randomizes max_life from config");
        assert!(p.trail.is_empty(), "respawn clears the trail");
    }

    #[test]
    fn test_resize_changes_bounds_only() {
        let mut field = small_field(FieldConfig::energy(), 15);
        field.update();
        let before = field.particles.clone();

        field.on_resize(1920, 1080);

        assert_eq!(field.width, 1920.0);
        assert_eq!(field.height, 1080.0);
        assert_eq!(field.particles, before, "resize must not touch particle state");
    }

    #[test]
    fn test_attraction_nudges_velocity_toward_pointer() {
        let mut cfg = FieldConfig::network();
        cfg.max_speed = None;
        cfg.life_range = (1000, 1000);
        let mut field = small_field(cfg, 1);
        {
            let p = &mut field.particles[0];
            p.pos = Vec2::new(100.0, 100.0);
            p.vel = Vec2::zero();
        }
        field.set_pointer(Some(Vec2::new(150.0, 100.0)));
        field.update();

        let p = &field.particles()[0];
        assert!(p.vel.x > 0.0, "velocity should point toward the pointer");
        assert!(p.vel.y.abs() < 1e-6);

        // Nudges accumulate frame over frame
        let v1 = p.vel.x;
        field.update();
        assert!(field.particles()[0].vel.x > v1);
    }

    #[test]
    fn test_pointer_absent_means_no_attraction() {
        let mut cfg = FieldConfig::network();
        cfg.life_range = (1000, 1000);
        let mut field = small_field(cfg, 1);
        {
            let p = &mut field.particles[0];
            p.pos = Vec2::new(100.0, 100.0);
            p.vel = Vec2::new(0.5, 0.0);
        }
        field.set_pointer(None);
        field.update();
        assert_eq!(field.particles()[0].vel, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_max_speed_caps_accumulated_velocity() {
        let mut cfg = FieldConfig::network();
        cfg.max_speed = Some(3.0);
        cfg.life_range = (10_000, 10_000);
        let mut field = small_field(cfg, 1);
        {
            let p = &mut field.particles[0];
            p.pos = Vec2::new(160.0, 120.0);
            p.vel = Vec2::zero();
        }

        // Park the pointer on top of the particle's neighborhood for a while
        for _ in 0..2000 {
            let pos = field.particles()[0].pos;
            field.set_pointer(Some(Vec2::new(pos.x + 40.0, pos.y)));
            field.update();
            assert!(field.particles()[0].vel.length() <= 3.0 + 1e-4);
        }
    }

    #[test]
    fn test_render_touches_the_buffer() {
        let mut field = small_field(FieldConfig::energy(), 20);
        let mut buffer = PixelBuffer::with_size(320, 240);
        field.update();
        field.render(&mut buffer);

        let bg = field.config().background;
        let mut painted = 0;
        for y in 0..240 {
            for x in 0..320 {
                if buffer.get_pixel(x, y) != Some(bg) {
                    painted += 1;
                }
            }
        }
        assert!(painted > 0, "rendering drew nothing");
    }
}
