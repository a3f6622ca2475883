use super::entity::{
    Entity,
    EntityId
};
use super::input::InputState;
use super::math::{
    Rect2F,
    Vector2F
};
use super::viewport::{
    Camera,
    Viewport
};
use crate::rendering::DrawSurface;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Entity id={0} does not exist")]
    EntityNotExist(EntityId),
}

/// Active-list slot. `entity` is `None` only while the entity is taken out
/// for a lifecycle hook dispatch; `id` and the cached `depth` stay readable
/// throughout so lookups and ordering never need the box.
struct EntitySlot {
    id: EntityId,
    depth: i32,
    entity: Option<Box<dyn Entity>>,
}

/// The simulation context: owns every live entity for the duration of one
/// scene plus the camera, viewport and frame-stable input snapshot, and
/// runs the per-frame pipeline.
///
/// Membership is frame-granular. [`World::spawn`] and [`World::destroy`]
/// called at any point during a frame only touch the add/remove queues;
/// the active list itself changes exclusively at the start of the next
/// [`World::tick`].
pub struct World {
    next_entity_id: EntityId,
    /// Authoritative active list, ascending depth, insertion order among
    /// equal depths.
    entities: Vec<EntitySlot>,
    add_queue: Vec<Box<dyn Entity>>,
    remove_queue: Vec<EntityId>,
    pub camera: Camera,
    pub viewport: Viewport,
    pub input: InputState,
}

impl World {
    pub fn new(viewport: Viewport) -> Self {
        log::info!("World created");
        Self {
            next_entity_id: 1,
            entities: vec![],
            add_queue: vec![],
            remove_queue: vec![],
            camera: Camera::new(),
            viewport,
            input: InputState::new(),
        }
    }

    /// Queue `entity` for membership starting at the next frame boundary.
    /// Owning `Box` transfer makes spawning the same live entity twice
    /// unrepresentable. Returns the assigned id immediately.
    pub fn spawn(&mut self, mut entity: Box<dyn Entity>) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        entity.base_mut().assign_id(id);
        log::debug!("Entity '{}' id={id} queued for addition", entity.base().name());
        self.add_queue.push(entity);
        id
    }

    /// [`World::spawn`] with position and depth applied first.
    pub fn spawn_at(
        &mut self,
        mut entity: Box<dyn Entity>,
        position: Vector2F,
        depth: i32,
    ) -> EntityId {
        entity.base_mut().set_position(position);
        entity.base_mut().set_depth(depth);
        self.spawn(entity)
    }

    /// Queue removal of an active entity. Idempotent; a no-op for ids that
    /// are neither members nor pending additions. Destroying an entity
    /// that is still only queued for addition cancels the addition instead
    /// of queueing a removal.
    pub fn destroy(&mut self, id: EntityId) {
        if let Some(queued) = self.add_queue.iter().position(|e| e.base().id() == id) {
            let cancelled = self.add_queue.remove(queued);
            log::debug!("Entity '{}' id={id} addition cancelled", cancelled.base().name());
            return;
        }
        if self.slot_index(id).is_some() && !self.remove_queue.contains(&id) {
            log::debug!("Entity id={id} queued for removal");
            self.remove_queue.push(id);
        }
    }

    fn slot_index(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|slot| slot.id == id)
    }

    /// Active entities, in depth order. Skips an entity currently taken
    /// out for its own hook dispatch, so a hook never observes itself.
    pub fn entities(&self) -> impl Iterator<Item = &dyn Entity> {
        self.entities
            .iter()
            .filter_map(|slot| slot.entity.as_deref())
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities
            .iter()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.entity.as_deref())
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.entities
            .iter_mut()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.entity.as_deref_mut())
    }

    pub fn require_entity(&self, id: EntityId) -> Result<&dyn Entity, WorldError> {
        self.get_entity(id).ok_or(WorldError::EntityNotExist(id))
    }

    /// Membership test against the active list, pending queues excluded.
    pub fn contains(&self, id: EntityId) -> bool {
        self.slot_index(id).is_some()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn pending_add_count(&self) -> usize {
        self.add_queue.len()
    }

    /// Current pointer position converted into world space.
    pub fn pointer_world_position(&self) -> Vector2F {
        self.viewport
            .screen_to_world(self.input.pointer_screen(), &self.camera)
    }

    /// Advance the simulation one frame: steps 1-7 of the pipeline.
    /// Rendering (step 8) is separate, see [`World::render`].
    pub fn tick(&mut self, dt: f32) {
        log::trace!("World tick, dt={dt}, entities={}", self.entities.len());

        // 1. Cleanup pass. Every queued-for-removal entity gets cleanup()
        //    while the previous frame's active list is still intact.
        let removals = std::mem::take(&mut self.remove_queue);
        for &id in &removals {
            self.dispatch(id, |entity, world| entity.cleanup(world));
        }

        // 2. Removal pass.
        for &id in &removals {
            if let Some(index) = self.slot_index(id) {
                let mut slot = self.entities.remove(index);
                if let Some(entity) = slot.entity.as_mut() {
                    entity.base_mut().set_in_scene(false);
                    log::debug!("Entity '{}' id={id} removed", entity.base().name());
                }
            }
        }

        // 3. Insertion pass. Queue order preserved among equal depths.
        let additions = std::mem::take(&mut self.add_queue);
        let mut started_ids = Vec::with_capacity(additions.len());
        for mut entity in additions {
            let base = entity.base_mut();
            base.set_in_scene(true);
            let id = base.id();
            let depth = base.depth();
            let index = self
                .entities
                .partition_point(|slot| slot.depth <= depth);
            log::debug!("Entity '{}' id={id} inserted at depth {depth}", entity.base().name());
            self.entities.insert(index, EntitySlot {
                id,
                depth,
                entity: Some(entity),
            });
            started_ids.push(id);
        }

        // 4. Start pass, after all insertions so siblings added the same
        //    frame are observable from start().
        for id in started_ids {
            self.dispatch(id, |entity, world| entity.start(world));
        }

        // 5. Collision pass over a frozen snapshot of world rects, so the
        //    result is independent of iteration order and of hitbox
        //    mutation mid-pass.
        self.recompute_collisions();

        // 6. Update pass over every non-static active entity.
        for index in 0..self.entities.len() {
            let is_static = match self.entities[index].entity.as_ref() {
                Some(entity) => entity.base().is_static(),
                None => continue,
            };
            if is_static {
                continue;
            }
            let id = self.entities[index].id;
            self.dispatch(id, |entity, world| entity.update(world, dt));
        }

        // 7. Deferred depth re-sort, once per frame at most.
        self.apply_depth_resort();
    }

    /// Step 8: draw every visible active entity, the surface transformed
    /// into its local space and save/restored around each one.
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        let pixels_per_unit = self.viewport.units_to_pixels(1.0, &self.camera);
        for slot in &self.entities {
            let Some(entity) = slot.entity.as_deref() else {
                continue;
            };
            if !entity.base().is_visible() {
                continue;
            }
            let origin = self
                .viewport
                .world_to_screen(entity.base().position(), &self.camera);
            surface.save();
            surface.translate(origin);
            surface.scale(Vector2F::new(pixels_per_unit, pixels_per_unit));
            entity.draw(surface);
            surface.restore();
        }
    }

    /// Immediate whole-scene teardown, for scene transitions only: runs
    /// cleanup() on every active entity (each still sees the full list),
    /// then empties the active list and discards both queues.
    pub fn clear(&mut self) {
        log::info!("World cleared, {} entities dropped", self.entities.len());
        let ids: Vec<EntityId> = self.entities.iter().map(|slot| slot.id).collect();
        for id in ids {
            self.dispatch(id, |entity, world| entity.cleanup(world));
        }
        for slot in &mut self.entities {
            if let Some(entity) = slot.entity.as_mut() {
                entity.base_mut().set_in_scene(false);
            }
        }
        self.entities.clear();
        self.add_queue.clear();
        self.remove_queue.clear();
    }

    /// Take the entity out of its slot, run `hook` with the world, put it
    /// back. The slot survives (id stays resolvable) and the list gains no
    /// structural changes while the hook runs, so the put-back index is
    /// still valid.
    fn dispatch<F>(&mut self, id: EntityId, hook: F)
    where
        F: FnOnce(&mut Box<dyn Entity>, &mut World),
    {
        let Some(index) = self.slot_index(id) else {
            return;
        };
        let Some(mut entity) = self.entities[index].entity.take() else {
            return;
        };
        hook(&mut entity, self);
        self.entities[index].entity = Some(entity);
    }

    fn recompute_collisions(&mut self) {
        // Frozen snapshot: id plus world rect of every collidable member.
        let snapshot: Vec<(EntityId, Rect2F)> = self
            .entities
            .iter()
            .filter_map(|slot| slot.entity.as_deref().map(|e| (slot.id, e)))
            .filter(|(_, entity)| entity.base().is_collidable())
            .map(|(id, entity)| (id, entity.base().world_rect()))
            .collect();

        for slot in &mut self.entities {
            let Some(entity) = slot.entity.as_deref_mut() else {
                continue;
            };
            if !entity.base().is_collidable() {
                entity.base_mut().clear_colliding();
                continue;
            }
            let own_rect = snapshot
                .iter()
                .find(|(id, _)| *id == slot.id)
                .map(|(_, rect)| *rect);
            let Some(own_rect) = own_rect else {
                continue;
            };
            let colliding: Vec<EntityId> = snapshot
                .iter()
                .filter(|(id, rect)| *id != slot.id && own_rect.overlaps(rect))
                .map(|(id, _)| *id)
                .collect();
            entity.base_mut().set_colliding(colliding);
        }
    }

    fn apply_depth_resort(&mut self) {
        let mut any_dirty = false;
        for slot in &mut self.entities {
            if let Some(entity) = slot.entity.as_deref_mut() {
                if entity.base_mut().take_depth_dirty() {
                    any_dirty = true;
                }
                slot.depth = entity.base().depth();
            }
        }
        if any_dirty {
            log::trace!("Depth changed during update, re-sorting active list");
            self.entities.sort_by_key(|slot| slot.depth);
        }
    }
}
