use super::math::{
    Rect2F,
    Vector2F
};
use super::viewport::{
    Camera,
    Viewport
};

/// Axis-aligned collision rectangle expressed in its owning entity's local
/// space. The world and viewport rects are computed on demand from the
/// owner's current position, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Hitbox {
    rect: Rect2F,
}

impl Hitbox {
    pub fn new(rect: Rect2F) -> Self {
        Self { rect }
    }

    /// Unit square with its upper-left corner at the entity origin.
    pub fn unit() -> Self {
        Self::new(Rect2F::new(0.0, 0.0, 1.0, 1.0))
    }

    pub fn rect(&self) -> Rect2F {
        self.rect
    }

    /// Replacing the rect copies the argument, the caller keeps its own.
    pub fn set_rect(&mut self, rect: Rect2F) {
        self.rect = rect;
    }

    /// Local rect translated by the owner's world position, size unchanged.
    pub fn world_rect(&self, owner_position: Vector2F) -> Rect2F {
        self.rect.translated(owner_position)
    }

    /// World rect mapped through the world-to-screen transform.
    pub fn viewport_rect(
        &self,
        owner_position: Vector2F,
        viewport: &Viewport,
        camera: &Camera,
    ) -> Rect2F {
        viewport.world_to_screen_rect(self.world_rect(owner_position), camera)
    }

    /// Closed-interval overlap of the two world rects. Symmetric, since
    /// rect overlap is.
    pub fn is_colliding(
        &self,
        owner_position: Vector2F,
        other: &Hitbox,
        other_position: Vector2F,
    ) -> bool {
        self.world_rect(owner_position)
            .overlaps(&other.world_rect(other_position))
    }
}

#[test]
fn test_world_rect_follows_owner() {
    let hitbox = Hitbox::new(Rect2F::new(-0.5, -0.5, 1.0, 1.0));
    let world = hitbox.world_rect(Vector2F::new(10.0, 20.0));
    assert_eq!(world, Rect2F::new(9.5, 19.5, 1.0, 1.0));
}

#[test]
fn test_set_rect_copies_argument() {
    let mut rect = Rect2F::new(0.0, 0.0, 2.0, 2.0);
    let mut hitbox = Hitbox::new(rect);
    rect.size.x = 100.0;
    assert_eq!(hitbox.rect().size.x, 2.0);

    hitbox.set_rect(rect);
    rect.size.x = 5.0;
    assert_eq!(hitbox.rect().size.x, 100.0);
}

#[test]
fn test_is_colliding_offset_unit_squares() {
    let a = Hitbox::unit();
    let b = Hitbox::unit();

    let a_pos = Vector2F::zero();
    let b_pos = Vector2F::new(0.5, 0.5);
    assert!(a.is_colliding(a_pos, &b, b_pos));
    assert!(b.is_colliding(b_pos, &a, a_pos));

    let far = Vector2F::new(3.0, 0.0);
    assert!(!a.is_colliding(a_pos, &b, far));
}

#[test]
fn test_viewport_rect_scales_with_zoom() {
    let viewport = Viewport::init_in_window(640.0, 360.0);
    let mut camera = Camera::new();
    let hitbox = Hitbox::unit();

    // 1 unit = 64px at zoom 1 on a 640px wide viewport.
    let on_screen = hitbox.viewport_rect(Vector2F::zero(), &viewport, &camera);
    assert!((on_screen.size.x - 64.0).abs() < 1e-4);

    camera.set_zoom(2.0);
    let zoomed = hitbox.viewport_rect(Vector2F::zero(), &viewport, &camera);
    assert!((zoomed.size.x - 128.0).abs() < 1e-4);
}
