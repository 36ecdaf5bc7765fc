use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use corridor_caster::scaler::{ScaleLut, blit_nearest_stretch, build_scale_lut};
use corridor_caster::{
    Compositor, Config, ControlScheme, Controller, InputState, Map, MapSource, Player,
};

/// Walk a grid map in first person.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file; flags below override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Built-in map: open, maze or large.
    #[arg(long, value_name = "NAME", conflicts_with = "map_file")]
    map: Option<String>,
    /// Text map file, '#' for walls.
    #[arg(long, value_name = "FILE")]
    map_file: Option<PathBuf>,
    /// Render width in pixels.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,
    /// Render height in pixels.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,
    /// Block size for downsampling, 1 disables it.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    downsample: Option<u32>,
    /// What A/D do: strafe (pointer turns while captured) or turn.
    #[arg(long, value_enum, ignore_case = true)]
    scheme: Option<ControlScheme>,
    /// Print the resulting config as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(name) = self.map {
            config.map = MapSource::Builtin(name);
        }
        if let Some(path) = self.map_file {
            config.map = MapSource::File(path);
        }
        if let Some(w) = self.width {
            config.viewport_width = w as usize;
        }
        if let Some(h) = self.height {
            config.viewport_height = h as usize;
        }
        if let Some(block) = self.downsample {
            config.downsample = block as usize;
        }
        if let Some(scheme) = self.scheme {
            config.apply_scheme(scheme);
        }

        config.validate()?;
        Ok(config)
    }
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    config: Config,
    map: Map,
    player: Player,
    compositor: Compositor,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    scale_lut: ScaleLut,

    // Input and movement
    input: InputState,
    controller: Controller,

    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, map: Map) -> Self {
        let player = Player::spawn(&map);
        Self {
            window: None,
            surface: None,
            compositor: Compositor::new(config.viewport_width, config.viewport_height),
            controller: Controller::from_config(&config),
            config,
            map,
            player,

            frame_counter: 0,
            last_fps_print: Instant::now(),

            scale_lut: ScaleLut::empty(),

            input: InputState::default(),

            fatal: None,
        }
    }

    fn init_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("Corridor Caster")
            .with_inner_size(LogicalSize::new(
                self.config.viewport_width as f64,
                self.config.viewport_height as f64,
            ));

        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .context("create window")?,
        );
        // SoftBufferError is not Send, so only its message can be kept
        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| anyhow!("create softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow!("create softbuffer surface: {e}"))?;

        self.surface = Some(surface);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn set_capture(&mut self, captured: bool) {
        let Some(window) = &self.window else {
            return;
        };

        if captured {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("pointer capture unavailable: {e}");
                return;
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("could not release pointer: {e}");
        }

        window.set_cursor_visible(!captured);
        if self.input.captured != captured {
            log::info!("pointer capture {}", if captured { "on" } else { "off" });
        }
        self.input.captured = captured;
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        self.controller
            .update(&mut self.input, &mut self.player, &self.map);

        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };

        let size = window.inner_size();
        let (Some(nw), Some(nh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized window, skip drawing
            window.request_redraw();
            return;
        };
        let (dw, dh) = (size.width as usize, size.height as usize);

        let frame = self
            .compositor
            .render(&self.map, &self.player, &self.config);

        if !self.scale_lut.fits(dw, dh) {
            self.scale_lut = build_scale_lut(dw, dh, frame.width(), frame.height());
        }

        let presented = surface
            .resize(nw, nh)
            .and_then(|()| {
                let mut buf = surface.buffer_mut()?;
                blit_nearest_stretch(&mut buf, dw, frame.pixels(), frame.width(), &self.scale_lut);
                buf.present()
            })
            .map_err(|e| anyhow!("present frame: {e}"));
        if let Err(err) = presented {
            self.fail(event_loop, err);
            return;
        }

        // Report FPS
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            log::debug!(
                "FPS: {:.1} at ({:.2}, {:.2}) heading {:.2}",
                self.frame_counter as f32 / elapsed,
                self.player.pos[0],
                self.player.pos[1],
                self.player.heading
            );
            self.frame_counter = 0;
            self.last_fps_print = now;
        }

        // Queue the next frame
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init_surface(event_loop) {
            self.fail(event_loop, err);
            return;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if code == KeyCode::Escape && pressed {
                    self.set_capture(false);
                } else {
                    self.input.key(code, pressed, self.config.scheme);
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if !self.input.captured {
                    self.set_capture(true);
                }
            }

            WindowEvent::Focused(false) => {
                self.input.release_all();
                self.set_capture(false);
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, id),

            WindowEvent::Resized(new_size) => {
                log::info!("window resized to {}x{}", new_size.width, new_size.height);
                let (dw, dh) = (new_size.width as usize, new_size.height as usize);
                let frame = self.compositor.frame();
                self.scale_lut = build_scale_lut(dw, dh, frame.width(), frame.height());
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, _) } = event {
            self.input.add_pointer_motion(dx);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let dump_config = cli.dump_config;
    let config = cli.into_config()?;
    if dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let map = config
        .map
        .load()
        .with_context(|| format!("load map {}", config.map))?;

    log::info!(
        "map {} ({}x{}), viewport {}x{}, scheme {}, downsample {}",
        config.map,
        map.width(),
        map.height(),
        config.viewport_width,
        config.viewport_height,
        config.scheme.as_str(),
        config.downsample
    );

    let event_loop = EventLoop::new().context("create event loop")?;
    // Frames are driven by request_redraw at the end of each frame
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, map);
    event_loop
        .run_app(&mut app)
        .context("event loop")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
