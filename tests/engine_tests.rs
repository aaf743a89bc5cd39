//! Integration tests for the engine lifecycle and the drawing contract.
//!
//! Engines run against a `Recorder` surface and a `ManualScheduler`, so
//! every frame is stepped explicitly and every draw call can be inspected.

use backdrop::prelude::*;
use backdrop::proximity::edge_opacity;
use backdrop::rules::repel_displacement;
use backdrop::surface::DrawCommand;
use backdrop::visuals::Color;
use backdrop::wireframe::{depth_alpha, rotate_y, Projection};

type TestEngine = Engine<Recorder, ManualScheduler>;

fn mounted(preset: &str, width: u32, height: u32) -> TestEngine {
    let config = EngineConfig::preset(preset).expect("preset exists");
    let mut engine = Engine::with_seed(config, ManualScheduler::new(), 42).expect("valid preset");
    engine.mount(width, height, Some(Recorder::new(width, height)));
    engine
}

/// Deliver `n` scheduled frames.
fn run_frames(engine: &mut TestEngine, n: usize) {
    for _ in 0..n {
        let frame = engine
            .scheduler_mut()
            .take_due()
            .expect("a running engine always has a frame pending");
        assert!(engine.on_frame(frame));
    }
}

fn entity_count(engine: &TestEngine) -> usize {
    engine.scene().map_or(0, |s| s.entities().len())
}

// ============================================================================
// Kinematics
// ============================================================================

#[test]
fn test_entities_stay_within_margin() {
    for preset in ["network", "balloons", "lecture", "starfield", "session"] {
        let mut engine = mounted(preset, 640, 400);
        engine.handle_event(HostEvent::PointerMoved(Vec2::new(320.0, 200.0)));

        for i in 0..240 {
            if i % 40 == 0 {
                let x = (i * 7 % 640) as f32;
                engine.handle_event(HostEvent::PointerMoved(Vec2::new(x, 150.0)));
            }
            run_frames(&mut engine, 1);

            let scene = engine.scene().unwrap();
            for entity in scene.entities().iter().filter(|e| e.is_bounded()) {
                let m = entity.size;
                assert!(
                    entity.pos.x >= -m && entity.pos.x <= 640.0 + m,
                    "{preset}: x {} out of bounds",
                    entity.pos.x
                );
                assert!(
                    entity.pos.y >= -m && entity.pos.y <= 400.0 + m,
                    "{preset}: y {} out of bounds",
                    entity.pos.y
                );
            }
        }
    }
}

fn assert_bounded(engine: &TestEngine, width: f32, height: f32, label: &str) {
    let scene = engine.scene().unwrap();
    for entity in scene.entities().iter().filter(|e| e.is_bounded()) {
        let m = entity.margin();
        assert!(
            (-m..=width + m).contains(&entity.pos.x),
            "{label}: x {} outside {width}",
            entity.pos.x
        );
        assert!(
            (-m..=height + m).contains(&entity.pos.y),
            "{label}: y {} outside {height}",
            entity.pos.y
        );
    }
}

#[test]
fn test_shrinking_mid_run_keeps_entities_in_bounds() {
    for preset in ["network", "balloons", "session", "lecture"] {
        let mut engine = mounted(preset, 800, 600);
        engine.handle_event(HostEvent::PointerMoved(Vec2::new(700.0, 500.0)));
        run_frames(&mut engine, 60);
        assert_bounded(&engine, 800.0, 600.0, preset);

        engine.handle_event(HostEvent::Resized {
            width: 300,
            height: 200,
        });
        for _ in 0..120 {
            run_frames(&mut engine, 1);
            assert_bounded(&engine, 300.0, 200.0, preset);
        }
    }
}

#[test]
fn test_bounce_preserves_speed() {
    for preset in ["network", "lecture"] {
        let mut engine = mounted(preset, 320, 240);
        let speeds = |engine: &TestEngine| -> Vec<f32> {
            engine
                .scene()
                .unwrap()
                .entities()
                .iter()
                .filter_map(|e| e.velocity())
                .map(|v| v.length())
                .collect()
        };
        let before = speeds(&engine);
        assert!(!before.is_empty(), "{preset} has moving entities");

        // Long enough for every node to reach a wall at least once.
        run_frames(&mut engine, 600);
        let after = speeds(&engine);
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-4, "{preset}: speed {a} became {b}");
        }
    }
}

#[test]
fn test_pointer_repulsion_example() {
    let node = Vec2::new(150.0, 0.0);
    let push = repel_displacement(node, Vec2::ZERO, 200.0, 10.0);
    assert!((push.length() - 2.5).abs() < 1e-5);
    assert!(push.y.abs() < 1e-6 && push.x > 0.0);

    // On the pointer there is no direction to push in.
    assert_eq!(repel_displacement(Vec2::ZERO, Vec2::ZERO, 200.0, 10.0), Vec2::ZERO);
}

// ============================================================================
// Populations
// ============================================================================

#[test]
fn test_population_scales_with_area() {
    for (w, h, expected) in [(1920, 1080, 103), (800, 600, 24), (1000, 1000, 50), (0, 0, 0)] {
        let engine = mounted("network", w, h);
        assert_eq!(entity_count(&engine), expected, "{w}x{h}");
    }
}

#[test]
fn test_zero_area_keeps_running() {
    let mut engine = mounted("session", 0, 0);
    run_frames(&mut engine, 10);
    assert_eq!(engine.scene().map(|s| s.t()), Some(10));
    assert_eq!(entity_count(&engine), 0);
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_drawn_opacities_are_bounded() {
    for preset in ["network", "tech", "starfield", "session", "lecture", "earth", "globe", "blocks"] {
        let mut engine = mounted(preset, 480, 320);
        engine.handle_event(HostEvent::PointerMoved(Vec2::new(240.0, 160.0)));
        engine.handle_event(HostEvent::Click(Vec2::new(100.0, 100.0)));

        for _ in 0..90 {
            run_frames(&mut engine, 1);
            let recorder = engine.surface().unwrap();
            for command in recorder.commands() {
                for alpha in command.alphas() {
                    assert!(
                        (0.0..=1.0).contains(&alpha),
                        "{preset}: alpha {alpha} in {command:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_frame_starts_with_clear_and_background() {
    let mut engine = mounted("network", 320, 240);
    run_frames(&mut engine, 1);
    let commands = engine.surface().unwrap().commands();
    assert_eq!(commands.first(), Some(&DrawCommand::Clear));
    assert!(matches!(commands.get(1), Some(DrawCommand::FillRect { .. })));
}

#[test]
fn test_pointer_glow_is_drawn_last() {
    let mut engine = mounted("session", 640, 480);
    let at = Vec2::new(300.0, 200.0);
    engine.handle_event(HostEvent::PointerMoved(at));
    run_frames(&mut engine, 1);

    let commands = engine.surface().unwrap().commands();
    match commands.last() {
        Some(DrawCommand::FillRect { paint, .. }) => match paint {
            backdrop::Paint::Radial { center, .. } => assert_eq!(*center, at),
            other => panic!("expected radial glow, got {other:?}"),
        },
        other => panic!("expected glow rect, got {other:?}"),
    }

    engine.handle_event(HostEvent::PointerLeft);
    run_frames(&mut engine, 1);
    let last = engine.surface().unwrap().commands().last().cloned();
    assert!(!matches!(
        last,
        Some(DrawCommand::FillRect {
            paint: backdrop::Paint::Radial { center, .. },
            ..
        }) if center == at
    ));
}

#[test]
fn test_layer_order() {
    assert_eq!(Layer::ORDER.first(), Some(&Layer::Background));
    assert_eq!(Layer::ORDER.last(), Some(&Layer::PointerGlow));
    let edges = Layer::ORDER.iter().position(|l| *l == Layer::Edges);
    let entities = Layer::ORDER.iter().position(|l| *l == Layer::Entities);
    assert!(edges < entities);
}

// ============================================================================
// Effects
// ============================================================================

#[test]
fn test_click_ring_lifecycle() {
    let mut engine = mounted("session", 640, 480);
    engine.handle_event(HostEvent::Click(Vec2::new(50.0, 50.0)));

    run_frames(&mut engine, 47);
    let radii: Vec<f32> = engine
        .scene()
        .unwrap()
        .effects()
        .rings()
        .map(|r| r.radius)
        .collect();
    assert_eq!(radii.len(), 1);
    assert!((radii[0] - 198.0).abs() < 1e-4);

    // Tick 48 grows it to 202, past the maximum, and prunes it.
    run_frames(&mut engine, 1);
    assert_eq!(engine.scene().unwrap().effects().rings().count(), 0);
}

#[test]
fn test_each_click_spawns_one_ring() {
    let mut engine = mounted("session", 640, 480);
    for i in 0..3 {
        engine.handle_event(HostEvent::Click(Vec2::new(10.0 * i as f32, 5.0)));
    }
    run_frames(&mut engine, 1);
    assert_eq!(engine.scene().unwrap().effects().rings().count(), 3);
}

#[test]
fn test_clicks_ignored_without_ring_config() {
    let mut engine = mounted("network", 640, 480);
    engine.handle_event(HostEvent::Click(Vec2::new(10.0, 10.0)));
    run_frames(&mut engine, 1);
    assert_eq!(engine.scene().unwrap().effects().rings().count(), 0);
}

// ============================================================================
// Proximity
// ============================================================================

#[test]
fn test_proximity_opacity_example() {
    let a = Vec2::ZERO;
    let b = Vec2::new(100.0, 0.0);
    let opacity = edge_opacity(a.distance(b), 180.0, 0.4);
    assert!((opacity - (1.0 - 100.0 / 180.0) * 0.4).abs() < 1e-6);
    assert!((opacity - 0.177_777_8).abs() < 1e-6);
}

#[test]
fn test_proximity_opacity_bounded_for_any_distance() {
    for i in 0..400 {
        let d = i as f32 * 0.75;
        for falloff in [0.0, 0.3, 1.0, 2.5] {
            let o = edge_opacity(d, 150.0, falloff);
            assert!((0.0..=1.0).contains(&o), "d={d} falloff={falloff} -> {o}");
        }
    }
}

// ============================================================================
// Wireframe
// ============================================================================

#[test]
fn test_depth_ordering() {
    let r = 220.0;
    let projection = Projection {
        perspective: 800.0,
        offset: 0.0,
    };

    // Same x,y before rotation; half a turn swaps near and far.
    let near = rotate_y(Vec3::new(0.0, 0.0, r), std::f32::consts::PI);
    let far = Vec3::new(0.0, 0.0, r);
    assert!((near.z + r).abs() < 1e-3);

    assert!(projection.scale(near.z) > projection.scale(far.z));
    assert!(depth_alpha(far.z, r, 0.6, 0.05) < depth_alpha(near.z, r, 0.6, 0.05));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_stop_twice_is_harmless() {
    let mut engine = mounted("network", 320, 240);
    run_frames(&mut engine, 2);
    let stale = engine.pending_frame().expect("frame pending while running");

    engine.stop();
    let scheduled = engine.scheduler().scheduled_count();
    engine.stop();

    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.scheduler().pending(), 0);
    assert!(engine.listeners().is_empty());

    // Late deliveries and input are ignored and schedule nothing.
    assert!(!engine.on_frame(stale));
    engine.handle_event(HostEvent::Click(Vec2::ONE));
    engine.handle_event(HostEvent::Resized {
        width: 10,
        height: 10,
    });
    assert_eq!(engine.scheduler().scheduled_count(), scheduled);
    assert_eq!(engine.scene().map(|s| s.width()), Some(320));
}

#[test]
fn test_blank_surface_no_ops() {
    let config = EngineConfig::preset("starfield").unwrap();
    let mut engine: TestEngine = Engine::with_seed(config, ManualScheduler::new(), 1).unwrap();
    engine.mount(640, 480, None);

    assert_eq!(engine.state(), EngineState::Blank);
    engine.handle_event(HostEvent::PointerMoved(Vec2::ONE));
    engine.step();
    assert_eq!(engine.scheduler().scheduled_count(), 0);
    assert!(engine.surface().is_none());

    engine.stop();
    engine.stop();
}

#[test]
fn test_resize_reseeds_scene() {
    let mut engine = mounted("network", 800, 600);
    run_frames(&mut engine, 5);
    assert_eq!(entity_count(&engine), 24);

    engine.handle_event(HostEvent::Resized {
        width: 1000,
        height: 1000,
    });
    let scene = engine.scene().unwrap();
    assert_eq!(scene.t(), 0);
    assert_eq!(scene.entities().len(), 50);
    assert_eq!(engine.surface().map(|s| s.size()), Some(Vec2::new(1000.0, 1000.0)));

    // Still animating after the resize.
    run_frames(&mut engine, 1);
    assert_eq!(engine.scene().map(|s| s.t()), Some(1));
}

#[test]
fn test_engines_are_independent() {
    let mut a = mounted("network", 320, 240);
    let mut b = mounted("session", 320, 240);

    a.handle_event(HostEvent::Click(Vec2::ONE));
    a.stop();
    run_frames(&mut b, 3);

    assert_eq!(a.state(), EngineState::Stopped);
    assert_eq!(b.state(), EngineState::Running);
    assert_eq!(b.scene().map(|s| s.t()), Some(3));
}

#[test]
fn test_same_seed_same_scene() {
    let a = mounted("starfield", 400, 300);
    let b = mounted("starfield", 400, 300);
    let pa: Vec<Vec2> = a.scene().unwrap().entities().iter().map(|e| e.pos).collect();
    let pb: Vec<Vec2> = b.scene().unwrap().entities().iter().map(|e| e.pos).collect();
    assert_eq!(pa, pb);
}

#[test]
fn test_custom_config_from_toml() {
    let config = EngineConfig::from_toml_str(
        r##"
name = "mini"
palette = ["#ff0000"]

[[populations]]
boundary = "wrap"
count = { fixed = 5 }
"##,
    );
    // Population needs a spawn description; a bare count is rejected.
    assert!(config.is_err());

    let network = EngineConfig::preset("network").unwrap();
    let text = network.to_toml().unwrap();
    let parsed = EngineConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed.palette, network.palette);
    assert_eq!(parsed.populations.len(), network.populations.len());
    assert_eq!(parsed.edges, network.edges);
    assert_eq!(
        parsed.edges.map(|e| e.color),
        Some(EdgeColor::Fixed(Color::hex("#00bcd4")))
    );
}
