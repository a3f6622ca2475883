use super::hitbox::Hitbox;
use super::math::{
    Rect2F,
    Vector2F
};
use super::world::World;
use crate::rendering::DrawSurface;

pub type EntityId = u32;

/// Common state shared by every concrete entity kind. Concrete types embed
/// one `EntityBase` and expose it through [`Entity::base`].
///
/// `visible`, `collidable` and `is_static` are fixed per entity kind at
/// construction and not expected to change afterwards. `in_scene` and
/// `colliding` are written only by the [`World`] pipeline.
#[derive(Debug)]
pub struct EntityBase {
    id: EntityId,
    name: String,
    position: Vector2F,
    depth: i32,
    visible: bool,
    collidable: bool,
    is_static: bool,
    in_scene: bool,
    hitbox: Hitbox,
    colliding: Vec<EntityId>,
    depth_dirty: bool,
}

impl EntityBase {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            id: 0,
            name: name.as_ref().to_string(),
            position: Vector2F::zero(),
            depth: 0,
            visible: true,
            collidable: true,
            is_static: false,
            in_scene: false,
            hitbox: Hitbox::unit(),
            colliding: vec![],
            depth_dirty: false,
        }
    }

    pub fn with_position(mut self, position: Vector2F) -> Self {
        self.position = position;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_hitbox(mut self, rect: Rect2F) -> Self {
        self.hitbox = Hitbox::new(rect);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_collidable(mut self, collidable: bool) -> Self {
        self.collidable = collidable;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Registry-assigned, 0 until spawned.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vector2F {
        self.position
    }

    /// Assigning a position copies the value, the caller keeps its own.
    pub fn set_position(&mut self, position: Vector2F) {
        self.position = position;
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Changing depth while the entity is a scene member marks the active
    /// list for one deferred stable re-sort at the end of the current
    /// frame's update phase, not immediately.
    pub fn set_depth(&mut self, depth: i32) {
        if depth != self.depth {
            self.depth = depth;
            if self.in_scene {
                self.depth_dirty = true;
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// True only while the entity is a member of the active list.
    pub fn is_in_scene(&self) -> bool {
        self.in_scene
    }

    pub fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    pub fn hitbox_mut(&mut self) -> &mut Hitbox {
        &mut self.hitbox
    }

    pub fn world_rect(&self) -> Rect2F {
        self.hitbox.world_rect(self.position)
    }

    /// Entities overlapping this one on the current frame. Always empty
    /// for non-collidable entities.
    pub fn colliding_entities(&self) -> &[EntityId] {
        &self.colliding
    }

    pub fn is_colliding_with(&self, other: EntityId) -> bool {
        self.colliding.contains(&other)
    }

    /// Move position so the world hitbox lies fully inside `bounds`.
    /// Already fitting: exact no-op. Hitbox larger than `bounds` on an
    /// axis: the world hitbox origin snaps to the bounds origin on that
    /// axis. The entity is never resized.
    pub fn clamp_inside(&mut self, bounds: Rect2F) {
        let local = self.hitbox.rect();
        self.position.x =
            Self::clamp_axis(self.position.x, local.pos.x, local.size.x, bounds.pos.x, bounds.size.x);
        self.position.y =
            Self::clamp_axis(self.position.y, local.pos.y, local.size.y, bounds.pos.y, bounds.size.y);
    }

    fn clamp_axis(position: f32, local: f32, size: f32, bounds_min: f32, bounds_size: f32) -> f32 {
        if size > bounds_size {
            return bounds_min - local;
        }
        let world = position + local;
        let clamped = world.clamp(bounds_min, bounds_min + bounds_size - size);
        if clamped == world {
            // Untouched so an in-bounds entity keeps its exact position.
            position
        } else {
            position + (clamped - world)
        }
    }

    /// Move position so the world hitbox center coincides with the center
    /// of `bounds`.
    pub fn center_inside(&mut self, bounds: Rect2F) {
        let local = self.hitbox.rect();
        let target = bounds.center();
        self.position.x = target.x - local.pos.x - local.size.x / 2.0;
        self.position.y = target.y - local.pos.y - local.size.y / 2.0;
    }

    pub(super) fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub(super) fn set_in_scene(&mut self, in_scene: bool) {
        self.in_scene = in_scene;
    }

    pub(super) fn set_colliding(&mut self, colliding: Vec<EntityId>) {
        self.colliding = colliding;
    }

    pub(super) fn clear_colliding(&mut self) {
        self.colliding.clear();
    }

    pub(super) fn take_depth_dirty(&mut self) -> bool {
        std::mem::take(&mut self.depth_dirty)
    }

    pub(super) fn is_depth_dirty(&self) -> bool {
        self.depth_dirty
    }
}

/// One simulated object. Concrete entity kinds implement the lifecycle
/// hooks they care about; every hook defaults to a no-op.
///
/// Hooks receive `&mut World` with the receiving entity itself taken out
/// of its slot for the duration of the call, so the world view seen from a
/// hook contains every active sibling but never the entity itself.
pub trait Entity: std::fmt::Debug {
    fn base(&self) -> &EntityBase;

    fn base_mut(&mut self) -> &mut EntityBase;

    /// Called once, at the frame boundary where the entity becomes a scene
    /// member, after all of that frame's insertions. Siblings spawned in
    /// the same frame are already observable.
    fn start(&mut self, _world: &mut World) {}

    /// Called every frame while a member, unless the entity is static.
    /// `dt` is the measured wall-time of the previous frame in seconds.
    fn update(&mut self, _world: &mut World, _dt: f32) {}

    /// Called every frame while a member and visible. The surface is
    /// already transformed into entity-local space and its state is
    /// restored afterwards.
    fn draw(&self, _surface: &mut dyn DrawSurface) {}

    /// Called at the frame boundary where a queued removal is applied,
    /// while the previous frame's active list is still intact.
    fn cleanup(&mut self, _world: &mut World) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_defaults() {
        let base = EntityBase::new("thing");
        assert_eq!(base.name(), "thing");
        assert_eq!(base.position(), Vector2F::zero());
        assert_eq!(base.depth(), 0);
        assert!(base.is_visible());
        assert!(base.is_collidable());
        assert!(!base.is_static());
        assert!(!base.is_in_scene());
        assert!(base.colliding_entities().is_empty());
    }

    #[test]
    fn test_set_depth_outside_scene_is_not_dirty() {
        let mut base = EntityBase::new("thing");
        base.set_depth(5);
        assert_eq!(base.depth(), 5);
        assert!(!base.is_depth_dirty());
    }

    #[test]
    fn test_set_depth_in_scene_marks_resort() {
        let mut base = EntityBase::new("thing");
        base.set_in_scene(true);
        base.set_depth(base.depth());
        assert!(!base.is_depth_dirty(), "no-op depth write must not mark");
        base.set_depth(-3);
        assert!(base.is_depth_dirty());
        assert!(base.take_depth_dirty());
        assert!(!base.is_depth_dirty());
    }

    #[test]
    fn test_clamp_inside_noop_when_fitting() {
        let bounds = Rect2F::new(0.0, 0.0, 10.0, 10.0);
        let mut base = EntityBase::new("thing")
            .with_position(Vector2F::new(4.3, 7.9))
            .with_hitbox(Rect2F::new(0.0, 0.0, 1.0, 1.0));

        let before = base.position();
        base.clamp_inside(bounds);
        assert_eq!(base.position(), before, "fitting entity must not move");
    }

    #[test]
    fn test_clamp_inside_pushes_back() {
        let bounds = Rect2F::new(0.0, 0.0, 10.0, 10.0);
        let mut base = EntityBase::new("thing")
            .with_position(Vector2F::new(-2.0, 9.5))
            .with_hitbox(Rect2F::new(0.0, 0.0, 1.0, 1.0));

        base.clamp_inside(bounds);
        assert_eq!(base.position(), Vector2F::new(0.0, 9.0));
        assert!(bounds.contains(&base.world_rect().pos));
    }

    #[test]
    fn test_clamp_inside_respects_local_offset() {
        let bounds = Rect2F::new(0.0, 0.0, 10.0, 10.0);
        // Hitbox centered on the entity origin.
        let mut base = EntityBase::new("thing")
            .with_position(Vector2F::zero())
            .with_hitbox(Rect2F::new(-0.5, -0.5, 1.0, 1.0));

        base.clamp_inside(bounds);
        assert_eq!(base.position(), Vector2F::new(0.5, 0.5));
    }

    #[test]
    fn test_clamp_inside_oversized_snaps_to_origin() {
        let bounds = Rect2F::new(2.0, 3.0, 1.0, 20.0);
        let mut base = EntityBase::new("thing")
            .with_position(Vector2F::new(7.0, 7.0))
            .with_hitbox(Rect2F::new(0.0, 0.0, 4.0, 4.0));

        base.clamp_inside(bounds);
        // x axis oversized: snapped to bounds origin. y axis fits: clamped.
        let world = base.world_rect();
        assert_eq!(world.pos.x, 2.0);
        assert_eq!(world.pos.y, 7.0);
    }

    #[test]
    fn test_center_inside() {
        let bounds = Rect2F::new(0.0, 0.0, 10.0, 6.0);
        let mut base = EntityBase::new("thing")
            .with_position(Vector2F::new(-50.0, 42.0))
            .with_hitbox(Rect2F::new(0.0, 0.0, 2.0, 2.0));

        base.center_inside(bounds);
        assert_eq!(base.world_rect().center(), bounds.center());
        assert_eq!(base.position(), Vector2F::new(4.0, 2.0));
    }
}
