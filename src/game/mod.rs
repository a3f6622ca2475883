pub mod entity;
pub mod hitbox;
pub mod input;
pub mod math;
pub mod viewport;
pub mod world;
