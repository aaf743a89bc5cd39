//! Scene state and the per-tick update.
//!
//! A [`Scene`] holds everything that changes from frame to frame: the frame
//! counter, the entity population, the pointer, active transient effects and
//! the optional 3D model. It is built for one surface size and thrown away on
//! resize; nothing is migrated.
//!
//! Entities are stored in one flat `Vec`, grouped by population so the
//! per-population rules and draw styles can be looked up by index.

use crate::config::EngineConfig;
use crate::entity::Entity;
use crate::glyphs::data_glyphs;
use crate::input::Pointer;
use crate::lifecycle::{Effect, Effects, ShootingStar};
use crate::rules::{attract_impulse, repel_displacement, PointerForce};
use crate::spawn::{Population, SpawnContext};
use crate::visuals::Color;
use crate::wireframe::Wireframe;
use glam::Vec2;
use rand::rngs::StdRng;
use std::ops::Range;

/// Ring color when neither the ring config nor the palette provides one.
const RING_FALLBACK_COLOR: Color = Color::new(0.0, 1.0, 1.0, 1.0);

/// The live state of one engine instance.
#[derive(Debug)]
pub struct Scene {
    width: u32,
    height: u32,
    t: u64,
    entities: Vec<Entity>,
    /// Entity index range of each population, in config order.
    spans: Vec<Range<usize>>,
    pointer: Pointer,
    effects: Effects,
    wireframe: Option<Wireframe>,
    rng: StdRng,
    palette: Vec<Color>,
    glyphs: Vec<char>,
}

impl Scene {
    /// Seed a scene for a surface of the given size.
    ///
    /// Population counts are resolved against the size, so a zero-area
    /// surface gets no entities at all.
    pub fn new(config: &EngineConfig, width: u32, height: u32, mut rng: StdRng) -> Self {
        let size = Vec2::new(width as f32, height as f32);
        let palette = config.palette.clone();
        let glyphs = data_glyphs();

        let mut entities = Vec::new();
        let mut spans = Vec::with_capacity(config.populations.len());
        let wireframe;
        {
            let mut ctx = SpawnContext::new(&mut rng, size, &palette, &glyphs);
            for population in &config.populations {
                let start = entities.len();
                let count = population.count.resolve(width, height);
                entities.extend((0..count).map(|_| population.spawn.spawn(&mut ctx)));
                spans.push(start..entities.len());
            }
            wireframe = config
                .wireframe
                .clone()
                .map(|model| Wireframe::new(model, &mut ctx));
        }

        log::debug!(
            "Seeded scene '{}' at {}x{}: {} entities in {} populations",
            config.name,
            width,
            height,
            entities.len(),
            spans.len()
        );

        Self {
            width,
            height,
            t: 0,
            entities,
            spans,
            pointer: Pointer::new(),
            effects: Effects::new(),
            wireframe,
            rng,
            palette,
            glyphs,
        }
    }

    /// Advance the scene by one tick.
    ///
    /// Order within a tick: queued clicks become effects, random effects may
    /// spawn, entities move, effects advance and terminal ones are pruned,
    /// then the 3D model rotates. Drawing happens afterwards.
    pub fn tick(&mut self, config: &EngineConfig) {
        self.t += 1;
        let size = self.size();

        let clicks: Vec<Vec2> = self.pointer.drain_clicks().collect();
        let pointer = self.pointer.position();
        let mut ctx = SpawnContext::new(&mut self.rng, size, &self.palette, &self.glyphs);

        if let Some(ring) = &config.click {
            for at in clicks {
                let color = ring
                    .color
                    .unwrap_or_else(|| ctx.pick_color(RING_FALLBACK_COLOR));
                self.effects.spawn_ring(at, ring, color);
            }
        }

        if let Some(stars) = &config.shooting_stars {
            if size.x > 0.0 && size.y > 0.0 && ctx.chance(stars.chance) {
                let start = Vec2::new(ctx.random() * size.x, ctx.random() * size.y * 0.5);
                let length = ctx.range(stars.length);
                let jitter = ctx.random();
                self.effects.spawn(Effect::ShootingStar(ShootingStar::new(
                    start,
                    length,
                    jitter,
                    stars.lifetime,
                )));
            }
        }

        for (population, span) in config.populations.iter().zip(&self.spans) {
            for entity in &mut self.entities[span.clone()] {
                update_entity(entity, population, pointer, &mut ctx);
            }
        }

        self.effects.update();

        if let Some(wireframe) = &mut self.wireframe {
            wireframe.advance();
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Surface size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Frame counter, incremented once per tick.
    pub fn t(&self) -> u64 {
        self.t
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entities of each population, paired with the population.
    pub fn groups<'a>(
        &'a self,
        config: &'a EngineConfig,
    ) -> impl Iterator<Item = (&'a Population, &'a [Entity])> + 'a {
        config
            .populations
            .iter()
            .zip(&self.spans)
            .map(move |(population, span)| (population, &self.entities[span.clone()]))
    }

    /// Number of entities spawned for population `index`.
    pub fn population_len(&self, index: usize) -> usize {
        self.spans.get(index).map_or(0, |span| span.len())
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut Pointer {
        &mut self.pointer
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn wireframe(&self) -> Option<&Wireframe> {
        self.wireframe.as_ref()
    }
}

/// Apply one population's rules to one entity.
fn update_entity(
    entity: &mut Entity,
    population: &Population,
    pointer: Option<Vec2>,
    ctx: &mut SpawnContext,
) {
    if let Some(p) = pointer {
        match population.pointer {
            PointerForce::None => {}
            PointerForce::Repel { radius, strength } => {
                entity.pos += repel_displacement(entity.pos, p, radius, strength);
            }
            PointerForce::Attract {
                radius, strength, ..
            } => {
                let impulse = attract_impulse(entity.pos, p, radius, strength);
                if let Some(vel) = entity.velocity_mut() {
                    *vel += impulse;
                }
            }
        }
    }

    if let Some(vel) = entity.velocity() {
        entity.pos += vel;
    }

    if let (Some(damping), Some(vel)) = (population.pointer.damping(), entity.velocity_mut()) {
        *vel *= damping;
    }

    entity.advance(ctx, pointer);

    if entity.is_bounded() {
        let margin = entity.margin();
        let (pos, vel) = entity.pos_and_velocity_mut();
        population.boundary.apply(pos, vel, margin, ctx.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rand::SeedableRng;

    fn seeded(name: &str, width: u32, height: u32) -> (EngineConfig, Scene) {
        let config = EngineConfig::preset(name).unwrap();
        let scene = Scene::new(&config, width, height, StdRng::seed_from_u64(1));
        (config, scene)
    }

    #[test]
    fn test_network_population_scales_with_area() {
        let (_, scene) = seeded("network", 1920, 1080);
        assert_eq!(scene.entities().len(), 103);
        let (_, empty) = scene_zero();
        assert!(empty.entities().is_empty());
    }

    fn scene_zero() -> (EngineConfig, Scene) {
        seeded("session", 0, 0)
    }

    #[test]
    fn test_zero_area_keeps_ticking() {
        let (config, mut scene) = scene_zero();
        for _ in 0..5 {
            scene.tick(&config);
        }
        assert_eq!(scene.t(), 5);
    }

    #[test]
    fn test_clicks_become_rings() {
        let (config, mut scene) = seeded("session", 800, 600);
        scene.pointer_mut().click(Vec2::new(100.0, 100.0));
        scene.pointer_mut().click(Vec2::new(200.0, 100.0));
        scene.tick(&config);
        assert_eq!(scene.effects().rings().count(), 2);
        assert_eq!(scene.pointer().pending_clicks(), 0);
    }

    #[test]
    fn test_ring_colors_come_from_palette() {
        let (config, mut scene) = seeded("session", 800, 600);
        assert!(config.palette.len() > 1);
        for i in 0..20 {
            scene.pointer_mut().click(Vec2::new(i as f32 * 10.0, 100.0));
        }
        scene.tick(&config);
        let colors: Vec<Color> = scene.effects().rings().map(|r| r.color).collect();
        assert_eq!(colors.len(), 20);
        assert!(colors.iter().all(|c| config.palette.contains(c)));
        assert!(colors.iter().any(|c| *c != colors[0]));
    }

    #[test]
    fn test_fixed_ring_color() {
        let (mut config, mut scene) = seeded("session", 800, 600);
        if let Some(ring) = &mut config.click {
            ring.color = Some(Color::WHITE);
        }
        scene.pointer_mut().click(Vec2::ZERO);
        scene.pointer_mut().click(Vec2::ONE);
        scene.tick(&config);
        assert!(scene.effects().rings().all(|r| r.color == Color::WHITE));
    }

    #[test]
    fn test_groups_follow_config_order() {
        let (config, scene) = seeded("session", 800, 600);
        let lens: Vec<usize> = scene.groups(&config).map(|(_, e)| e.len()).collect();
        assert_eq!(lens.len(), config.populations.len());
        assert_eq!(lens.iter().sum::<usize>(), scene.entities().len());
        assert_eq!(scene.population_len(0), lens[0]);
    }

    #[test]
    fn test_wireframe_rotates_each_tick() {
        let (config, mut scene) = seeded("earth", 800, 600);
        let before = scene.wireframe().map(|w| w.angle());
        scene.tick(&config);
        let after = scene.wireframe().map(|w| w.angle());
        assert!(before.is_some());
        assert_ne!(before, after);
    }
}
