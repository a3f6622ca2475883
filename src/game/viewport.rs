use super::math::{
    Rect2F,
    Vector2F
};

/// One game-unit is 1/10 of the viewport's on-screen width. The ratio is
/// fixed and independent of camera zoom.
pub const UNITS_PER_SCREEN_WIDTH: f32 = 10.0;

/// World-space eye of the scene. The viewport's screen center maps to
/// `position`; `zoom` > 1 magnifies (shows fewer world units).
///
/// Non-positive zoom is a caller error with undefined results, matching
/// the permissiveness of the rest of the geometry layer. Only debug
/// builds assert on it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    position: Vector2F,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector2F::zero(),
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vector2F {
        self.position
    }

    /// Assigning a position copies the value, the caller keeps its own.
    pub fn set_position(&mut self, position: Vector2F) {
        self.position = position;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        debug_assert!(zoom > 0.0, "camera zoom must be positive, got {zoom}");
        self.zoom = zoom;
    }
}

/// Mapping between world space (game-units, camera relative) and screen
/// space (pixels, origin at the render surface's upper-left corner).
///
/// The aspect ratio is fixed at construction for the process lifetime;
/// window resizes only move/scale the letterboxed screen rect.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    aspect_ratio: f32,
    /// Placement of the render area inside the window, in window pixels.
    screen_rect: Rect2F,
    /// Same size as `screen_rect` with origin at (0,0).
    logical_rect: Rect2F,
}

impl Viewport {
    /// One-time construction: fixes `aspect_ratio = width / height`, then
    /// computes the initial screen placement. There is no way to obtain a
    /// `Viewport` that skipped this step.
    pub fn init_in_window(width: f32, height: f32) -> Self {
        let aspect_ratio = width / height;
        log::info!("Viewport created, aspect ratio {aspect_ratio} fixed from {width}x{height} window");
        let mut viewport = Self {
            aspect_ratio,
            screen_rect: Rect2F::default(),
            logical_rect: Rect2F::default(),
        };
        viewport.update_window_size(width, height);
        viewport
    }

    /// Recompute the largest `aspect_ratio` rectangle that fits centered in
    /// a `width` x `height` window. Idempotent for identical sizes.
    pub fn update_window_size(&mut self, width: f32, height: f32) {
        let window_ratio = width / height;
        let screen_rect = if window_ratio > self.aspect_ratio {
            // Window wider than the viewport, pillarbox.
            let used_width = height * self.aspect_ratio;
            Rect2F::new((width - used_width) / 2.0, 0.0, used_width, height)
        } else {
            // Window taller than the viewport, letterbox.
            let used_height = width / self.aspect_ratio;
            Rect2F::new(0.0, (height - used_height) / 2.0, width, used_height)
        };

        if screen_rect != self.screen_rect {
            log::debug!("Viewport screen rect now {screen_rect}");
        }
        self.screen_rect = screen_rect;
        self.logical_rect = Rect2F::new(0.0, 0.0, screen_rect.size.x, screen_rect.size.y);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn screen_rect(&self) -> Rect2F {
        self.screen_rect
    }

    pub fn logical_rect(&self) -> Rect2F {
        self.logical_rect
    }

    /// Screen pixels per world unit at zoom 1.
    fn pixels_per_unit(&self) -> f32 {
        self.screen_rect.size.x / UNITS_PER_SCREEN_WIDTH
    }

    pub fn units_to_pixels(&self, units: f32, camera: &Camera) -> f32 {
        units * self.pixels_per_unit() * camera.zoom()
    }

    pub fn units_to_pixels_unzoomed(&self, units: f32) -> f32 {
        units * self.pixels_per_unit()
    }

    pub fn pixels_to_units(&self, pixels: f32, camera: &Camera) -> f32 {
        pixels / (self.pixels_per_unit() * camera.zoom())
    }

    pub fn pixels_to_units_unzoomed(&self, pixels: f32) -> f32 {
        pixels / self.pixels_per_unit()
    }

    /// World extent currently visible through the camera, in game-units.
    fn visible_extent(&self, camera: &Camera) -> Vector2F {
        let visible_width = UNITS_PER_SCREEN_WIDTH / camera.zoom();
        Vector2F::new(visible_width, visible_width / self.aspect_ratio)
    }

    /// World-space rectangle currently on screen.
    pub fn visible_world_rect(&self, camera: &Camera) -> Rect2F {
        let extent = self.visible_extent(camera);
        Rect2F {
            pos: camera.position() - extent * 0.5,
            size: extent,
        }
    }

    /// World position to window pixels. Exact inverse of [`Self::screen_to_world`].
    pub fn world_to_screen(&self, position: Vector2F, camera: &Camera) -> Vector2F {
        let half_extent = self.visible_extent(camera) * 0.5;
        let scale = self.pixels_per_unit() * camera.zoom();
        self.screen_rect.pos + (position - camera.position() + half_extent) * scale
    }

    /// Window pixels to world position. Exact inverse of [`Self::world_to_screen`].
    pub fn screen_to_world(&self, position: Vector2F, camera: &Camera) -> Vector2F {
        let half_extent = self.visible_extent(camera) * 0.5;
        let scale = self.pixels_per_unit() * camera.zoom();
        (position - self.screen_rect.pos) * (1.0 / scale) - half_extent + camera.position()
    }

    pub fn world_to_screen_rect(&self, rect: Rect2F, camera: &Camera) -> Rect2F {
        Rect2F {
            pos: self.world_to_screen(rect.pos, camera),
            size: Vector2F::new(
                self.units_to_pixels(rect.size.x, camera),
                self.units_to_pixels(rect.size.y, camera),
            ),
        }
    }

    pub fn screen_to_world_rect(&self, rect: Rect2F, camera: &Camera) -> Rect2F {
        Rect2F {
            pos: self.screen_to_world(rect.pos, camera),
            size: Vector2F::new(
                self.pixels_to_units(rect.size.x, camera),
                self.pixels_to_units(rect.size.y, camera),
            ),
        }
    }
}

#[cfg(test)]
fn assert_close(a: Vector2F, b: Vector2F, tolerance: f32) {
    assert!(
        (a - b).length() <= tolerance,
        "expected {a} close to {b} within {tolerance}"
    );
}

#[cfg(test)]
fn test_viewport_16_9() -> Viewport {
    // 640x360 window, so the screen rect fills it exactly.
    Viewport::init_in_window(640.0, 360.0)
}

#[test]
fn test_viewport_fixes_aspect_ratio() {
    let viewport = test_viewport_16_9();
    assert!((viewport.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    assert_eq!(viewport.screen_rect(), Rect2F::new(0.0, 0.0, 640.0, 360.0));
    assert_eq!(viewport.logical_rect(), Rect2F::new(0.0, 0.0, 640.0, 360.0));
}

#[test]
fn test_update_window_size_pillarbox() {
    let mut viewport = test_viewport_16_9();
    viewport.update_window_size(1000.0, 360.0);
    // Width used: 360 * 16/9 = 640, centered.
    assert_close(viewport.screen_rect().pos, Vector2F::new(180.0, 0.0), 1e-3);
    assert_close(viewport.screen_rect().size, Vector2F::new(640.0, 360.0), 1e-3);
    assert_eq!(viewport.logical_rect().pos, Vector2F::zero());
}

#[test]
fn test_update_window_size_letterbox() {
    let mut viewport = test_viewport_16_9();
    viewport.update_window_size(640.0, 500.0);
    // Height used: 640 * 9/16 = 360, centered.
    assert_close(viewport.screen_rect().pos, Vector2F::new(0.0, 70.0), 1e-3);
    assert_close(viewport.screen_rect().size, Vector2F::new(640.0, 360.0), 1e-3);
}

#[test]
fn test_update_window_size_idempotent() {
    let mut viewport = test_viewport_16_9();
    viewport.update_window_size(1000.0, 700.0);
    let first = viewport.clone();
    viewport.update_window_size(1000.0, 700.0);
    assert_eq!(viewport, first);
}

#[test]
fn test_units_pixels_inverse() {
    let viewport = test_viewport_16_9();
    let mut camera = Camera::new();
    camera.set_zoom(2.5);

    let pixels = viewport.units_to_pixels(3.2, &camera);
    assert!((viewport.pixels_to_units(pixels, &camera) - 3.2).abs() < 1e-6);

    let unzoomed = viewport.units_to_pixels_unzoomed(3.2);
    assert!((viewport.pixels_to_units_unzoomed(unzoomed) - 3.2).abs() < 1e-6);
    // One unit is 1/10 of the 640px screen width, zoom independent.
    assert_eq!(viewport.units_to_pixels_unzoomed(1.0), 64.0);
}

#[test]
fn test_world_screen_round_trip_reference_scenario() {
    // Aspect 16:9, camera at origin, zoom 1, viewport width 640px.
    let viewport = test_viewport_16_9();
    let camera = Camera::new();

    let world = Vector2F::new(1.0, 1.0);
    let screen = viewport.world_to_screen(world, &camera);
    let round_trip = viewport.screen_to_world(screen, &camera);
    assert_close(round_trip, world, 1e-9);

    // Camera position maps to the screen center.
    let center = viewport.world_to_screen(camera.position(), &camera);
    assert_close(center, Vector2F::new(320.0, 180.0), 1e-4);
}

#[test]
fn test_world_screen_round_trip_moved_camera() {
    let mut viewport = test_viewport_16_9();
    viewport.update_window_size(800.0, 800.0);
    let mut camera = Camera::new();
    camera.set_position(Vector2F::new(-3.5, 12.25));
    camera.set_zoom(1.75);

    for point in [
        Vector2F::zero(),
        Vector2F::new(1.0, 1.0),
        Vector2F::new(-20.0, 7.5),
    ] {
        let round_trip = viewport.screen_to_world(viewport.world_to_screen(point, &camera), &camera);
        assert_close(round_trip, point, 1e-4);
    }
}

#[test]
fn test_world_screen_rect_round_trip() {
    let viewport = test_viewport_16_9();
    let mut camera = Camera::new();
    camera.set_zoom(3.0);
    camera.set_position(Vector2F::new(4.0, -2.0));

    let rect = Rect2F::new(-1.0, 2.0, 3.0, 0.5);
    let screen_rect = viewport.world_to_screen_rect(rect, &camera);
    let round_trip = viewport.screen_to_world_rect(screen_rect, &camera);
    assert_close(round_trip.pos, rect.pos, 1e-4);
    assert_close(round_trip.size, rect.size, 1e-4);
}

#[test]
fn test_visible_world_rect_centered_on_camera() {
    let viewport = test_viewport_16_9();
    let mut camera = Camera::new();
    camera.set_position(Vector2F::new(5.0, 5.0));

    let visible = viewport.visible_world_rect(&camera);
    assert_close(visible.center(), camera.position(), 1e-4);
    assert!((visible.size.x - 10.0).abs() < 1e-4);
    assert!((visible.size.y - 10.0 * 9.0 / 16.0).abs() < 1e-4);

    // Zooming in shows less of the world.
    camera.set_zoom(2.0);
    assert!((viewport.visible_world_rect(&camera).size.x - 5.0).abs() < 1e-4);
}
