/// WEIRD Project
/// `File` main.rs
/// `Description` Map viewer executable
/// `Author` TioT2
/// `Last changed` 16.10.2026

mod viewer;

use std::num::NonZeroU32;

use viewer::camera::Camera;
use viewer::input::{Input, KeyCode};
use viewer::render::Render;
use viewer::surface::Surface;
use viewer::timer::Timer;

use weird_map::entity::{CastFilter, NoEntities};
use weird_map::map::{BuildFlags, CameraSpawn, MapSectors, WmtLoadingError};
use weird_map::math::*;
use weird_map::physics::{CharacterShape, CharacterState, PhysicsWorld};

/// Player collision shape
const PLAYER: CharacterShape = CharacterShape {
    radius: 0.25,
    height: 1.4,
    step: 0.35,
};

/// Eye height above player feet
const EYE_HEIGHT: f32 = 1.2;
const WALK_SPEED: f32 = 3.0;
const TURN_SPEED: f32 = 2.0;
const MOUSE_TURN_SPEED: f32 = 0.005;
const GRAVITY: f32 = 9.8;
const JUMP_SPEED: f32 = 4.0;

/// Command line arguments
struct Args {
    /// Map file, built-in map if None
    map_path: Option<String>,
    flags: BuildFlags,
} // struct Args

impl Args {
    fn parse() -> Self {
        let mut args = Args { map_path: None, flags: BuildFlags::empty() };

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--no-overlap-check" => args.flags |= BuildFlags::OMIT_SECTOR_OVERLAP_CHECK,
                "--no-convexity-check" => args.flags |= BuildFlags::OMIT_CONVEXITY_CLOCKWISE_CHECK,
                "--assert" => args.flags |= BuildFlags::ASSERT_ON_FAIL,
                _ => args.map_path = Some(arg),
            }
        }

        args
    } // fn parse
} // impl Args

/// Map loading error
#[derive(Debug)]
enum LoadError {
    Io(std::io::Error),
    Wmt(WmtLoadingError),
} // enum LoadError

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(error) => f.write_fmt(format_args!("map file reading error: {error}")),
            LoadError::Wmt(error) => f.write_fmt(format_args!("map building error: {error}")),
        }
    }
} // impl std::fmt::Display for LoadError

/// Map loading function
/// * Returns map and camera spawn point
fn load_map(args: &Args) -> Result<(MapSectors, CameraSpawn), LoadError> {
    let source = match &args.map_path {
        Some(path) => std::fs::read_to_string(path).map_err(LoadError::Io)?,
        None => include_str!("../maps/default.wmt").to_string(),
    };

    let (map, spawn) = MapSectors::load_from_wmt(&source, args.flags).map_err(LoadError::Wmt)?;

    let spawn = spawn.unwrap_or_else(|| CameraSpawn {
        location: map.sectors().first().map_or(Vec2::ZERO, |sector| sector.aabb.center()),
        height: 0.0,
        rotation: 0.0,
    });

    Ok((map, spawn))
} // fn load_map

fn main() {
    env_logger::init();

    let args = Args::parse();

    let (map, spawn) = match load_map(&args) {
        Ok(loaded) => loaded,
        Err(error) => {
            log::error!("{error}");
            return;
        }
    };

    log::info!("map loaded: {} sectors, {} walls", map.sector_count(), map.wall_count());

    let Some(spawn_sector) = map.get_sector_from_point(spawn.location) else {
        log::error!("camera spawn point {} is outside of map", spawn.location);
        return;
    };

    let entities = NoEntities;
    let world = PhysicsWorld::new(&map, &entities);
    let filter = CastFilter::world();

    let mut player = CharacterState::new(spawn_sector, spawn.location.extend(map.sector(spawn_sector).floor));
    let mut rotation = spawn.rotation;
    let mut grounded = true;

    let mut camera = Camera::new();
    camera.set_location(spawn.location, player.position.z + EYE_HEIGHT, rotation);

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(error) => {
            log::error!("event loop creation error: {error}");
            return;
        }
    };
    let screen_size = winit::dpi::PhysicalSize::<u32>::new(800, 600);
    let window = match winit::window::WindowBuilder::new()
        .with_title("WEIRD")
        .with_resizable(true)
        .with_inner_size(screen_size)
        .build(&event_loop)
    {
        Ok(window) => window,
        Err(error) => {
            log::error!("window creation error: {error}");
            return;
        }
    };

    let window_context = match softbuffer::Context::new(&window) {
        Ok(context) => context,
        Err(error) => {
            log::error!("softbuffer context creation error: {error}");
            return;
        }
    };
    let mut surface = match softbuffer::Surface::new(&window_context, &window) {
        Ok(surface) => surface,
        Err(error) => {
            log::error!("softbuffer surface creation error: {error}");
            return;
        }
    };

    let mut surface_size = screen_size;
    if let Some((width, height)) = NonZeroU32::new(surface_size.width).zip(NonZeroU32::new(surface_size.height)) {
        _ = surface.resize(width, height);
    }

    let mut render = Render::new();
    let mut timer = Timer::new();
    let mut input = Input::new();

    let result = event_loop.run(|event, target| {
        match event {
            winit::event::Event::WindowEvent { window_id, event } => if window.id() == window_id {
                match event {
                    winit::event::WindowEvent::CloseRequested => {
                        target.exit();
                    }
                    winit::event::WindowEvent::KeyboardInput { event, .. } => if let winit::keyboard::PhysicalKey::Code(code) = event.physical_key {
                        input.on_key_state_change(code, event.state == winit::event::ElementState::Pressed);
                    }
                    winit::event::WindowEvent::MouseInput { state, button: winit::event::MouseButton::Left, .. } => {
                        input.on_key_state_change(KeyCode::F30, state == winit::event::ElementState::Pressed);
                    }
                    winit::event::WindowEvent::CursorMoved { position, .. } => {
                        let position: winit::dpi::LogicalPosition<f32> = position.to_logical(window.scale_factor());

                        input.on_mouse_move(Vec2::new(position.x, position.y));
                    }
                    winit::event::WindowEvent::Resized(size) => {
                        surface_size = size;
                        if let Some((width, height)) = NonZeroU32::new(size.width).zip(NonZeroU32::new(size.height)) {
                            _ = surface.resize(width, height);
                        }
                    }
                    winit::event::WindowEvent::RedrawRequested => 'redraw: {
                        if timer.response() {
                            window.set_title(&format!("WEIRD - {:.1} FPS", timer.get_fps()));
                        }

                        let state = input.get_state();
                        let dt = timer.get_delta_time();

                        if state.is_key_clicked(KeyCode::F11) {
                            if window.fullscreen().is_some() {
                                window.set_fullscreen(None);
                            } else {
                                window.set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                            }
                        }

                        // Player control
                        let ox = state.axis(KeyCode::KeyA, KeyCode::KeyD)
                            + state.axis(KeyCode::ArrowLeft, KeyCode::ArrowRight);
                        let oy = state.axis(KeyCode::KeyW, KeyCode::KeyS)
                            + state.axis(KeyCode::ArrowUp, KeyCode::ArrowDown);
                        let strafe = state.is_key_pressed(KeyCode::AltLeft) || state.is_key_pressed(KeyCode::AltRight);

                        if state.is_key_pressed(KeyCode::F30) {
                            rotation -= state.get_mouse_motion().x * MOUSE_TURN_SPEED;
                        }

                        let mut wish = camera.direction * oy;
                        if strafe {
                            wish -= camera.right * ox;
                        } else {
                            rotation += ox * TURN_SPEED * dt;
                        }
                        let wish = wish.normalize_or_zero() * WALK_SPEED;

                        player.velocity.x = wish.x;
                        player.velocity.y = wish.y;
                        if grounded && state.is_key_clicked(KeyCode::Space) {
                            player.velocity.z = JUMP_SPEED;
                        }
                        player.velocity.z -= GRAVITY * dt;

                        let movement = world.move_character(&mut player, &PLAYER, dt, &filter, |old, new| {
                            log::debug!("sector change: {old} -> {new}");
                        });
                        grounded = movement.grounded;
                        rotation += affine2_angle(&movement.transform);

                        camera.set_location(xy(player.position), player.position.z + EYE_HEIGHT, rotation);

                        let mut buffer = match surface.buffer_mut() {
                            Ok(buffer) => buffer,
                            Err(error) => {
                                log::warn!("frame buffer acquiring error: {error}");
                                break 'redraw;
                            }
                        };

                        {
                            let width = surface_size.width as usize;
                            let height = surface_size.height as usize;
                            let mut frame = Surface::new(&mut buffer, width, height, width);

                            // Render main frame
                            let tree = render.render(&mut frame, &map, &camera, player.sector);

                            if input.get_state().is_key_clicked(KeyCode::F12) {
                                let path = format!("screenshot_{}.png", std::time::SystemTime::now()
                                    .duration_since(std::time::UNIX_EPOCH)
                                    .map_or(0, |duration| duration.as_secs()));

                                match frame.save_png(std::path::Path::new(&path)) {
                                    Ok(()) => log::info!("screenshot saved to {path}"),
                                    Err(error) => log::warn!("screenshot saving error: {error}"),
                                }
                            }

                            // Render minimap on subframe
                            render.render_minimap(&mut frame.sub_surface(width / 3, height / 3), &map, &camera, &tree);
                        }

                        _ = buffer.present();

                        input.clear_changed();

                        window.request_redraw();
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    });

    if let Err(error) = result {
        log::error!("event loop error: {error}");
    }
} // fn main

// file main.rs
