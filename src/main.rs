use clap::Parser;

use rust_scene2d::{
    app::GameApp,
    game::{
        math::Vector2F,
        viewport::Viewport,
        world::World
    },
    DEFAULT_WINDOW_HEIGHT,
    DEFAULT_WINDOW_WIDTH
};

/// # Global Arguments
#[derive(Debug, Parser)]
#[command(version, about = "2D scene runtime demo", long_about = None)]
struct Cli {
    /// Window width in pixels
    #[arg(short = 'W', long = "width", value_name = "WIDTH", default_value_t = DEFAULT_WINDOW_WIDTH)]
    width: u32,

    /// Window height in pixels
    #[arg(short = 'H', long = "height", value_name = "HEIGHT", default_value_t = DEFAULT_WINDOW_HEIGHT)]
    height: u32,

    /// Initial camera zoom (> 0, 1.0 = no scaling)
    #[arg(short = 'z', long = "zoom", value_name = "ZOOM", default_value_t = 1.0)]
    zoom: f32,

    /// Number of roaming wanderers to spawn
    #[arg(short = 'n', long = "wanderers", value_name = "COUNT", default_value_t = 5)]
    wanderers: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .format_file(false)
        .format_line_number(true)
        .init();

    let cli_args = Cli::parse();
    log::info!("Got args: '{:?}'.", cli_args);

    let viewport = Viewport::init_in_window(cli_args.width as f32, cli_args.height as f32);
    let mut world = World::new(viewport);
    world.camera.set_zoom(cli_args.zoom);

    // Initial scene: a player, a static pillar and some wanderers.
    world.spawn_at(demo::Player::boxed(), Vector2F::zero(), demo::PLAYER_DEPTH);
    world.spawn(demo::Pillar::boxed());
    for index in 0..cli_args.wanderers {
        let position = Vector2F::new(
            rand::random_range(-6.0..6.0),
            rand::random_range(-3.5..3.5),
        );
        world.spawn_at(
            demo::Wanderer::boxed(format!("wanderer-{index}")),
            position,
            demo::WANDERER_DEPTH,
        );
    }

    let app = GameApp::new("rust_scene2d demo", cli_args.width, cli_args.height, world);
    if let Err(err) = app.run() {
        log::error!("App failed: {err}");
        std::process::exit(1);
    }
}

mod demo {
    use rand::seq::IndexedRandom;

    use rust_scene2d::game::{
        entity::{
            Entity,
            EntityBase
        },
        input::Key,
        math::{
            Rect2F,
            Vector2F
        },
        world::World
    };
    use rust_scene2d::rendering::DrawSurface;

    /// World-space play area the demo entities stay inside.
    pub const ARENA: Rect2F = Rect2F {
        pos: Vector2F { x: -8.0, y: -4.5 },
        size: Vector2F { x: 16.0, y: 9.0 },
    };

    pub const PLAYER_DEPTH: i32 = 10;
    pub const WANDERER_DEPTH: i32 = 5;
    const PILLAR_DEPTH: i32 = -5;

    const PLAYER_SPEED: f32 = 4.0;
    const WANDERER_SPEED: f32 = 1.5;
    const WANDERER_RETARGET_SECONDS: std::ops::Range<f32> = 0.5..2.5;

    /// Arrow/WASD controlled square. The camera follows it; space drops a
    /// new wanderer at the pointer, right click destroys whatever is under
    /// the pointer.
    #[derive(Debug)]
    pub struct Player {
        base: EntityBase,
    }

    impl Player {
        pub fn boxed() -> Box<dyn Entity> {
            Box::new(Self {
                base: EntityBase::new("player")
                    .with_hitbox(Rect2F::new(-0.4, -0.4, 0.8, 0.8)),
            })
        }
    }

    impl Entity for Player {
        fn base(&self) -> &EntityBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut EntityBase {
            &mut self.base
        }

        fn start(&mut self, world: &mut World) {
            log::info!(
                "Player starting, {} entities in scene around it",
                world.entity_count()
            );
        }

        fn update(&mut self, world: &mut World, dt: f32) {
            let mut direction = Vector2F::zero();
            if world.input.is_held(Key::Left) || world.input.is_held(Key::A) {
                direction.x -= 1.0;
            }
            if world.input.is_held(Key::Right) || world.input.is_held(Key::D) {
                direction.x += 1.0;
            }
            if world.input.is_held(Key::Up) || world.input.is_held(Key::W) {
                direction.y -= 1.0;
            }
            if world.input.is_held(Key::Down) || world.input.is_held(Key::S) {
                direction.y += 1.0;
            }
            if direction.length_squared() > 0.0 {
                let step = direction.normal() * (PLAYER_SPEED * dt);
                self.base.set_position(self.base.position() + step);
                self.base.clamp_inside(ARENA);
            }

            world.camera.set_position(self.base.position());

            if world.input.was_pressed(Key::Space) {
                let pointer = world.pointer_world_position();
                world.spawn_at(
                    Wanderer::boxed("wanderer-dropped"),
                    pointer,
                    WANDERER_DEPTH,
                );
            }

            if world.input.was_pressed(Key::MouseRight) {
                let pointer = world.pointer_world_position();
                let hit: Vec<_> = world
                    .entities()
                    .filter(|e| e.base().world_rect().contains(&pointer))
                    .map(|e| e.base().id())
                    .collect();
                for id in hit {
                    world.destroy(id);
                }
            }
        }

        fn draw(&self, surface: &mut dyn DrawSurface) {
            let color = if self.base.colliding_entities().is_empty() {
                [230, 230, 230]
            } else {
                [230, 70, 70]
            };
            surface.fill_rect(self.base.hitbox().rect(), color);
        }
    }

    /// Roams the arena, picking a random cardinal direction every couple
    /// of seconds.
    #[derive(Debug)]
    pub struct Wanderer {
        base: EntityBase,
        direction: Vector2F,
        retarget_in: f32,
        color: [u8; 3],
    }

    impl Wanderer {
        pub fn boxed<S: AsRef<str>>(name: S) -> Box<dyn Entity> {
            let channel = rand::random_range(90..200);
            Box::new(Self {
                base: EntityBase::new(name)
                    .with_hitbox(Rect2F::new(-0.3, -0.3, 0.6, 0.6)),
                direction: Vector2F::zero(),
                retarget_in: 0.0,
                color: [channel, channel, 60],
            })
        }
    }

    impl Entity for Wanderer {
        fn base(&self) -> &EntityBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut EntityBase {
            &mut self.base
        }

        fn update(&mut self, _world: &mut World, dt: f32) {
            self.retarget_in -= dt;
            if self.retarget_in <= 0.0 {
                let directions = [
                    Vector2F::new(1.0, 0.0),
                    Vector2F::new(-1.0, 0.0),
                    Vector2F::new(0.0, 1.0),
                    Vector2F::new(0.0, -1.0),
                    Vector2F::zero(),
                ];
                self.direction = *directions.choose(&mut rand::rng()).unwrap();
                self.retarget_in = rand::random_range(WANDERER_RETARGET_SECONDS);
                log::trace!("{} new direction {}", self.base.name(), self.direction);
            }

            let step = self.direction * (WANDERER_SPEED * dt);
            self.base.set_position(self.base.position() + step);
            self.base.clamp_inside(ARENA);
        }

        fn draw(&self, surface: &mut dyn DrawSurface) {
            let color = if self.base.colliding_entities().is_empty() {
                self.color
            } else {
                [230, 70, 70]
            };
            surface.fill_rect(self.base.hitbox().rect(), color);
        }

        fn cleanup(&mut self, world: &mut World) {
            log::debug!(
                "{} leaving, {} entities still in scene",
                self.base.name(),
                world.entity_count()
            );
        }
    }

    /// Static scenery: never updated, still collides and draws.
    #[derive(Debug)]
    pub struct Pillar {
        base: EntityBase,
    }

    impl Pillar {
        pub fn boxed() -> Box<dyn Entity> {
            let mut base = EntityBase::new("pillar")
                .with_depth(PILLAR_DEPTH)
                .with_static(true)
                .with_hitbox(Rect2F::new(0.0, 0.0, 1.5, 1.5));
            base.center_inside(ARENA);
            Box::new(Self { base })
        }
    }

    impl Entity for Pillar {
        fn base(&self) -> &EntityBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut EntityBase {
            &mut self.base
        }

        fn draw(&self, surface: &mut dyn DrawSurface) {
            surface.fill_rect(self.base.hitbox().rect(), [80, 110, 160]);
        }
    }
}
