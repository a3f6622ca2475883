use std::{
    cell::RefCell,
    rc::Rc
};

use rust_scene2d::game::{
    entity::{
        Entity,
        EntityBase,
        EntityId
    },
    math::{
        Rect2F,
        Vector2F
    },
    viewport::Viewport,
    world::World
};
use rust_scene2d::rendering::{
    DrawSurface,
    Primitive,
    RenderBatch
};

type EventLog = Rc<RefCell<Vec<String>>>;

fn test_world() -> World {
    World::new(Viewport::init_in_window(640.0, 360.0))
}

fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

/// Records every lifecycle hook it receives into a shared log.
#[derive(Debug)]
struct Recorder {
    base: EntityBase,
    log: EventLog,
}

impl Recorder {
    fn boxed(name: &str, log: &EventLog) -> Box<dyn Entity> {
        Box::new(Self {
            base: EntityBase::new(name),
            log: log.clone(),
        })
    }
}

impl Entity for Recorder {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn start(&mut self, world: &mut World) {
        self.log
            .borrow_mut()
            .push(format!("{}:start:{}", self.base.name(), world.entity_count()));
    }

    fn update(&mut self, _world: &mut World, _dt: f32) {
        self.log
            .borrow_mut()
            .push(format!("{}:update", self.base.name()));
    }

    fn cleanup(&mut self, world: &mut World) {
        self.log
            .borrow_mut()
            .push(format!("{}:cleanup:{}", self.base.name(), world.entity_count()));
    }
}

/// Spawns one `Recorder` child during its own update, once.
#[derive(Debug)]
struct Spawner {
    base: EntityBase,
    log: EventLog,
    spawned: bool,
}

impl Spawner {
    fn boxed(log: &EventLog) -> Box<dyn Entity> {
        Box::new(Self {
            base: EntityBase::new("spawner"),
            log: log.clone(),
            spawned: false,
        })
    }
}

impl Entity for Spawner {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        self.log.borrow_mut().push("spawner:update".to_string());
        if !self.spawned {
            self.spawned = true;
            world.spawn(Recorder::boxed("child", &self.log));
        }
    }
}

/// Destroys itself on its first update; draws one rect so the render
/// pass visiting it is observable.
#[derive(Debug)]
struct SelfDestructor {
    base: EntityBase,
    log: EventLog,
}

impl SelfDestructor {
    fn boxed(log: &EventLog) -> Box<dyn Entity> {
        Box::new(Self {
            base: EntityBase::new("doomed"),
            log: log.clone(),
        })
    }
}

impl Entity for SelfDestructor {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        world.destroy(self.base.id());
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), [200, 0, 0]);
    }

    fn cleanup(&mut self, world: &mut World) {
        self.log
            .borrow_mut()
            .push(format!("doomed:cleanup:{}", world.entity_count()));
    }
}

/// Moves itself to a new depth on its first update.
#[derive(Debug)]
struct DepthShifter {
    base: EntityBase,
    target_depth: i32,
    shifted: bool,
}

impl DepthShifter {
    fn boxed(name: &str, depth: i32, target_depth: i32) -> Box<dyn Entity> {
        Box::new(Self {
            base: EntityBase::new(name).with_depth(depth),
            target_depth,
            shifted: false,
        })
    }
}

impl Entity for DepthShifter {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn update(&mut self, _world: &mut World, _dt: f32) {
        if !self.shifted {
            self.shifted = true;
            self.base.set_depth(self.target_depth);
        }
    }
}

fn active_names(world: &World) -> Vec<String> {
    world
        .entities()
        .map(|e| e.base().name().to_string())
        .collect()
}

#[test]
fn test_start_runs_after_all_insertions() {
    let log: EventLog = Rc::new(RefCell::new(vec![]));
    let mut world = test_world();
    world.spawn(Recorder::boxed("first", &log));
    world.spawn(Recorder::boxed("second", &log));
    world.tick(0.016);

    // Both start() calls observe the complete 2-entity scene.
    assert_eq!(
        events(&log)[..2],
        ["first:start:2".to_string(), "second:start:2".to_string()]
    );
}

#[test]
fn test_spawned_mid_frame_starts_before_any_update_next_frame() {
    let log: EventLog = Rc::new(RefCell::new(vec![]));
    let mut world = test_world();
    world.spawn(Spawner::boxed(&log));
    world.tick(0.016);

    // Frame 1: only the spawner updated, the child is still queued.
    assert_eq!(events(&log), ["spawner:update"]);

    log.borrow_mut().clear();
    world.tick(0.016);

    // Frame 2: the child's start precedes every update of the frame.
    let frame = events(&log);
    let start_at = frame.iter().position(|e| e == "child:start:2").unwrap();
    let first_update = frame.iter().position(|e| e.ends_with(":update")).unwrap();
    assert!(
        start_at < first_update,
        "start must precede all updates, got {frame:?}"
    );
}

#[test]
fn test_destroy_during_own_update_is_frame_granular() {
    let log: EventLog = Rc::new(RefCell::new(vec![]));
    let mut world = test_world();
    let doomed = world.spawn_at(SelfDestructor::boxed(&log), Vector2F::zero(), 0);
    let witness = world.spawn_at(
        Recorder::boxed("witness", &log),
        Vector2F::new(0.5, 0.5),
        0,
    );
    world.tick(0.016);

    // The frame in which destroy() ran still sees the entity everywhere:
    // membership, the witness's colliding set, and the render pass.
    assert!(world.contains(doomed));
    assert!(world
        .get_entity(witness)
        .unwrap()
        .base()
        .is_colliding_with(doomed));

    // The render pass of frame N still visits it.
    let mut batch = RenderBatch::new();
    world.render(&mut batch);
    assert_eq!(batch.primitives().len(), 1);

    // Next frame boundary: cleanup ran with the old list intact, then the
    // entity is gone before anything else observed the new frame.
    log.borrow_mut().clear();
    world.tick(0.016);
    assert!(!world.contains(doomed));
    let frame = events(&log);
    assert_eq!(frame[0], "doomed:cleanup:2", "cleanup sees the full previous list");

    batch.clear();
    world.render(&mut batch);
    assert!(batch.primitives().is_empty());
}

#[test]
fn test_collision_scenario_mutual_half_overlap() {
    let mut world = test_world();
    let log: EventLog = Rc::new(RefCell::new(vec![]));

    let a = world.spawn_at(Recorder::boxed("a", &log), Vector2F::zero(), 0);
    let b = world.spawn_at(Recorder::boxed("b", &log), Vector2F::new(0.5, 0.5), 0);
    world.tick(0.016);

    assert_eq!(world.get_entity(a).unwrap().base().colliding_entities(), &[b]);
    assert_eq!(world.get_entity(b).unwrap().base().colliding_entities(), &[a]);
}

#[test]
fn test_collision_sets_recomputed_each_frame() {
    let mut world = test_world();
    let log: EventLog = Rc::new(RefCell::new(vec![]));

    let a = world.spawn_at(Recorder::boxed("a", &log), Vector2F::zero(), 0);
    let b = world.spawn_at(Recorder::boxed("b", &log), Vector2F::new(0.5, 0.5), 0);
    world.tick(0.016);
    assert!(world.get_entity(a).unwrap().base().is_colliding_with(b));

    // Move B away; the stale pair must disappear on the next pass.
    world
        .get_entity_mut(b)
        .unwrap()
        .base_mut()
        .set_position(Vector2F::new(40.0, 40.0));
    world.tick(0.016);
    assert!(!world.get_entity(a).unwrap().base().is_colliding_with(b));
    assert!(world.get_entity(b).unwrap().base().colliding_entities().is_empty());
}

#[test]
fn test_depth_change_resorts_at_frame_end() {
    let mut world = test_world();
    world.spawn(DepthShifter::boxed("riser", 0, 100));
    world.spawn(DepthShifter::boxed("steady", 10, 10));
    world.tick(0.016);

    // The shifter asked for depth 100 during update; by the end of the
    // same tick the active list reflects it.
    assert_eq!(active_names(&world), ["steady", "riser"]);

    // Stable afterwards.
    world.tick(0.016);
    assert_eq!(active_names(&world), ["steady", "riser"]);
}

/// Draws one unit rect so render-pass behavior is observable.
#[derive(Debug)]
struct Drawer {
    base: EntityBase,
}

impl Drawer {
    fn boxed(name: &str, visible: bool, is_static: bool) -> Box<dyn Entity> {
        Box::new(Self {
            base: EntityBase::new(name)
                .with_visible(visible)
                .with_static(is_static),
        })
    }
}

impl Entity for Drawer {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn update(&mut self, _world: &mut World, _dt: f32) {
        // A static entity receiving this call is a pipeline bug.
        panic!("update called on '{}'", self.base.name());
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), [255, 255, 255]);
    }
}

#[test]
fn test_static_entities_skip_update_but_draw() {
    let mut world = test_world();
    world.spawn_at(Drawer::boxed("statue", true, true), Vector2F::zero(), 0);
    world.tick(0.016); // would panic if update were called

    let mut batch = RenderBatch::new();
    world.render(&mut batch);
    assert_eq!(batch.primitives().len(), 1);
}

#[test]
fn test_invisible_entities_are_not_drawn() {
    let mut world = test_world();
    world.spawn_at(Drawer::boxed("hidden", false, true), Vector2F::zero(), 0);
    world.spawn_at(Drawer::boxed("shown", true, true), Vector2F::new(2.0, 0.0), 0);
    world.tick(0.016);

    let mut batch = RenderBatch::new();
    world.render(&mut batch);
    assert_eq!(batch.primitives().len(), 1);
}

#[test]
fn test_render_transforms_into_entity_local_space() {
    let mut world = test_world();
    // Camera at origin, zoom 1, 640px wide viewport: 64px per unit and
    // the world origin lands at the 320,180 screen center.
    world.spawn_at(Drawer::boxed("drawer", true, true), Vector2F::new(1.0, 1.0), 0);
    world.tick(0.016);

    let mut batch = RenderBatch::new();
    world.render(&mut batch);
    let Primitive::Rect { rect, .. } = &batch.primitives()[0] else {
        panic!("expected rect");
    };
    // Entity local (0,0)..(1,1) maps to one 64px cell right/below the
    // entity's screen position (320+64, 180+64).
    assert!((rect.pos.x - 384.0).abs() < 1e-3, "got {rect}");
    assert!((rect.pos.y - 244.0).abs() < 1e-3, "got {rect}");
    assert!((rect.size.x - 64.0).abs() < 1e-3, "got {rect}");
    assert!((rect.size.y - 64.0).abs() < 1e-3, "got {rect}");
}

#[test]
fn test_destroy_twice_single_cleanup() {
    let log: EventLog = Rc::new(RefCell::new(vec![]));
    let mut world = test_world();
    let id = world.spawn(Recorder::boxed("once", &log));
    world.tick(0.016);

    world.destroy(id);
    world.destroy(id);
    log.borrow_mut().clear();
    world.tick(0.016);

    let cleanups = events(&log)
        .iter()
        .filter(|e| e.contains("cleanup"))
        .count();
    assert_eq!(cleanups, 1);
}

#[test]
fn test_destroying_pending_addition_never_runs_hooks() {
    let log: EventLog = Rc::new(RefCell::new(vec![]));
    let mut world = test_world();
    let id = world.spawn(Recorder::boxed("phantom", &log));
    world.destroy(id);
    world.tick(0.016);
    world.tick(0.016);

    assert!(events(&log).is_empty(), "cancelled addition ran hooks: {:?}", events(&log));
    assert!(!world.contains(id));
}

#[test]
fn test_clear_runs_cleanup_with_full_list() {
    let log: EventLog = Rc::new(RefCell::new(vec![]));
    let mut world = test_world();
    world.spawn(Recorder::boxed("a", &log));
    world.spawn(Recorder::boxed("b", &log));
    world.tick(0.016);

    log.borrow_mut().clear();
    world.clear();

    // Each cleanup still saw both entities nominally active.
    assert_eq!(
        events(&log),
        ["a:cleanup:2".to_string(), "b:cleanup:2".to_string()]
    );
    assert_eq!(world.entity_count(), 0);
}

#[test]
fn test_ids_are_never_reused() {
    let mut world = test_world();
    let log: EventLog = Rc::new(RefCell::new(vec![]));
    let mut seen: Vec<EntityId> = vec![];
    for round in 0..5 {
        let id = world.spawn(Recorder::boxed(&format!("e{round}"), &log));
        world.tick(0.016);
        world.destroy(id);
        world.tick(0.016);
        assert!(!seen.contains(&id));
        seen.push(id);
    }
}
