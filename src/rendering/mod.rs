pub mod renderer;

use crate::game::math::{
    Rect2F,
    Vector2F
};

/// Opaque handle to a loaded image asset. The core never inspects the
/// pixels; resolving the id is the asset collaborator's business.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// Drawing surface contract the render pass draws through. All draw calls
/// are interpreted in whatever coordinate space the surface is currently
/// transformed into; `save`/`restore` bracket per-entity transforms so one
/// entity cannot corrupt another's drawing state.
pub trait DrawSurface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vector2F);
    fn scale(&mut self, factor: Vector2F);
    fn fill_rect(&mut self, rect: Rect2F, color: [u8; 3]);
    fn draw_text(&mut self, position: Vector2F, text: &str, color: [u8; 3]);
    fn draw_image(&mut self, rect: Rect2F, image: ImageHandle);
}

/// Affine scale-then-translate: `screen = local * scale + offset`.
#[derive(Debug, Copy, Clone)]
struct Transform2 {
    offset: Vector2F,
    scale: Vector2F,
}

impl Default for Transform2 {
    fn default() -> Self {
        Self {
            offset: Vector2F::zero(),
            scale: Vector2F::new(1.0, 1.0),
        }
    }
}

impl Transform2 {
    fn apply_point(&self, point: Vector2F) -> Vector2F {
        point.scaled(self.scale) + self.offset
    }

    fn apply_rect(&self, rect: Rect2F) -> Rect2F {
        Rect2F {
            pos: self.apply_point(rect.pos),
            size: rect.size.scaled(self.scale),
        }
    }
}

/// One recorded draw call, already resolved to screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect2F,
        color: [u8; 3],
    },
    Text {
        position: Vector2F,
        text: String,
        color: [u8; 3],
    },
    Image {
        rect: Rect2F,
        image: ImageHandle,
    },
}

/// CPU-side [`DrawSurface`]: keeps the transform stack and records
/// screen-space primitives for one frame. The wgpu renderer consumes the
/// finished batch; tests inspect it directly.
#[derive(Debug, Default)]
pub struct RenderBatch {
    current: Transform2,
    stack: Vec<Transform2>,
    primitives: Vec<Primitive>,
}

impl RenderBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.current = Transform2::default();
        self.stack.clear();
        self.primitives.clear();
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

impl DrawSurface for RenderBatch {
    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        if let Some(previous) = self.stack.pop() {
            self.current = previous;
        } else {
            log::warn!("DrawSurface restore without matching save");
            self.current = Transform2::default();
        }
    }

    fn translate(&mut self, offset: Vector2F) {
        self.current.offset += offset.scaled(self.current.scale);
    }

    fn scale(&mut self, factor: Vector2F) {
        self.current.scale = self.current.scale.scaled(factor);
    }

    fn fill_rect(&mut self, rect: Rect2F, color: [u8; 3]) {
        self.primitives.push(Primitive::Rect {
            rect: self.current.apply_rect(rect),
            color,
        });
    }

    fn draw_text(&mut self, position: Vector2F, text: &str, color: [u8; 3]) {
        self.primitives.push(Primitive::Text {
            position: self.current.apply_point(position),
            text: text.to_string(),
            color,
        });
    }

    fn draw_image(&mut self, rect: Rect2F, image: ImageHandle) {
        self.primitives.push(Primitive::Image {
            rect: self.current.apply_rect(rect),
            image,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform_passes_through() {
        let mut batch = RenderBatch::new();
        batch.fill_rect(Rect2F::new(1.0, 2.0, 3.0, 4.0), [255, 0, 0]);
        assert_eq!(
            batch.primitives(),
            &[Primitive::Rect {
                rect: Rect2F::new(1.0, 2.0, 3.0, 4.0),
                color: [255, 0, 0]
            }]
        );
    }

    #[test]
    fn test_translate_then_scale_maps_local_space() {
        let mut batch = RenderBatch::new();
        // The render pass order: translate to the entity's screen origin,
        // then scale local units up to pixels.
        batch.translate(Vector2F::new(100.0, 50.0));
        batch.scale(Vector2F::new(64.0, 64.0));
        batch.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), [0, 255, 0]);

        let Primitive::Rect { rect, .. } = &batch.primitives()[0] else {
            panic!("expected rect");
        };
        assert_eq!(rect.pos, Vector2F::new(100.0, 50.0));
        assert_eq!(rect.size, Vector2F::new(64.0, 64.0));
    }

    #[test]
    fn test_nested_translate_composes_in_scaled_units() {
        let mut batch = RenderBatch::new();
        batch.scale(Vector2F::new(10.0, 10.0));
        batch.translate(Vector2F::new(2.0, 0.0));
        batch.fill_rect(Rect2F::new(1.0, 1.0, 1.0, 1.0), [0, 0, 255]);

        let Primitive::Rect { rect, .. } = &batch.primitives()[0] else {
            panic!("expected rect");
        };
        // 2 local units of translation and 1 of position, all scaled.
        assert_eq!(rect.pos, Vector2F::new(30.0, 10.0));
        assert_eq!(rect.size, Vector2F::new(10.0, 10.0));
    }

    #[test]
    fn test_save_restore_isolates_state() {
        let mut batch = RenderBatch::new();
        batch.save();
        batch.translate(Vector2F::new(5.0, 5.0));
        batch.scale(Vector2F::new(2.0, 2.0));
        batch.restore();

        batch.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), [1, 2, 3]);
        let Primitive::Rect { rect, .. } = &batch.primitives()[0] else {
            panic!("expected rect");
        };
        assert_eq!(*rect, Rect2F::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_text_and_image_record_transformed() {
        let mut batch = RenderBatch::new();
        batch.translate(Vector2F::new(10.0, 0.0));
        batch.draw_text(Vector2F::new(1.0, 1.0), "hp: 3", [255, 255, 255]);
        batch.draw_image(Rect2F::new(0.0, 0.0, 2.0, 2.0), ImageHandle(7));

        assert_eq!(batch.primitives().len(), 2);
        let Primitive::Text { position, text, .. } = &batch.primitives()[0] else {
            panic!("expected text");
        };
        assert_eq!(*position, Vector2F::new(11.0, 1.0));
        assert_eq!(text, "hp: 3");
        let Primitive::Image { image, .. } = &batch.primitives()[1] else {
            panic!("expected image");
        };
        assert_eq!(*image, ImageHandle(7));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut batch = RenderBatch::new();
        batch.save();
        batch.scale(Vector2F::new(3.0, 3.0));
        batch.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), [9, 9, 9]);
        batch.clear();

        assert!(batch.primitives().is_empty());
        batch.fill_rect(Rect2F::new(0.0, 0.0, 1.0, 1.0), [9, 9, 9]);
        let Primitive::Rect { rect, .. } = &batch.primitives()[0] else {
            panic!("expected rect");
        };
        assert_eq!(rect.size, Vector2F::new(1.0, 1.0));
    }
}
