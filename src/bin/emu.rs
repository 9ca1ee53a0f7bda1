use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use clap::Parser;
use pixels::{Pixels, SurfaceTexture};
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SquareWave};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey},
    window::{Window, WindowId},
};

use okto8::{DISPLAY_HEIGHT, DISPLAY_WIDTH, Runner, Vm};

/// How quickly unlit pixels fade, in brightness per second. Softens the
/// flicker of sprites that are erased and redrawn every frame.
const PHOSPHOR_DECAY_RATE: f32 = 10.0;

/// Physical keyboard keys for the hex keypad, indexed by hex code.
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x0
    KeyCode::Digit1, // 0x1
    KeyCode::Digit2, // 0x2
    KeyCode::Digit3, // 0x3
    KeyCode::KeyQ,   // 0x4
    KeyCode::KeyW,   // 0x5
    KeyCode::KeyE,   // 0x6
    KeyCode::KeyA,   // 0x7
    KeyCode::KeyS,   // 0x8
    KeyCode::KeyD,   // 0x9
    KeyCode::KeyZ,   // 0xA
    KeyCode::KeyC,   // 0xB
    KeyCode::Digit4, // 0xC
    KeyCode::KeyR,   // 0xD
    KeyCode::KeyF,   // 0xE
    KeyCode::KeyV,   // 0xF
];

struct App {
    pixels: Option<Pixels<'static>>,
    window: Option<Arc<Window>>,
    /// Per-pixel brightness (0.0 to 1.0) for the phosphor decay effect.
    brightness: [[f32; DISPLAY_WIDTH]; DISPLAY_HEIGHT],

    /// Audio output stream (must be kept alive).
    _audio_stream: OutputStream,
    audio_sink: Sink,

    runner: Runner,
    /// Pressed state per hex key, lent to the machine every tick.
    keypad: [bool; 16],
    last_frame_instant: Instant,

    /// Result to return from main once the event loop winds down.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(rom: &[u8]) -> anyhow::Result<Self> {
        let mut _audio_stream = OutputStreamBuilder::open_default_stream()
            .context("Failed to open audio output stream")?;
        _audio_stream.log_on_drop(false);

        let audio_sink = Sink::connect_new(_audio_stream.mixer());
        audio_sink.pause();
        audio_sink.append(SquareWave::new(440.0).amplify(0.5));

        let mut vm = Vm::new();
        vm.load(rom).context("Failed to load ROM")?;

        Ok(Self {
            pixels: None,
            window: None,
            brightness: [[0.0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],

            _audio_stream,
            audio_sink,

            runner: Runner::new(vm),
            keypad: [false; 16],
            last_frame_instant: Instant::now(),
            exit_result: Ok(()),
        })
    }

    fn process_display(&mut self, dt: f32) {
        let grid = self.runner.vm().framebuffer().pixels();
        let frame = self.pixels.as_mut().unwrap().frame_mut();

        for (i, pixel) in frame.chunks_exact_mut(4).enumerate() {
            let x = i % DISPLAY_WIDTH;
            let y = i / DISPLAY_WIDTH;

            // Lit pixels jump to full brightness; unlit ones fade out.
            self.brightness[y][x] = if grid[y][x] {
                1.0
            } else {
                (self.brightness[y][x] - PHOSPHOR_DECAY_RATE * dt).max(0.0)
            };

            let rgba = [0, 0xFF, 0, (self.brightness[y][x] * 255.0) as u8];
            pixel.copy_from_slice(&rgba);
        }
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = {
            let size = LogicalSize::new(DISPLAY_WIDTH as u32 * 10, DISPLAY_HEIGHT as u32 * 10);
            let min_size = LogicalSize::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32);

            Arc::new(
                event_loop
                    .create_window(
                        Window::default_attributes()
                            .with_title("okto8")
                            .with_inner_size(size)
                            .with_min_inner_size(min_size),
                    )
                    .context("Failed to create window")?,
            )
        };

        self.window = Some(window.clone());
        self.pixels = {
            let window_size = window.inner_size();
            let surface_texture =
                SurfaceTexture::new(window_size.width, window_size.height, window.clone());

            let pixels =
                Pixels::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32, surface_texture)
                    .context("Failed to create pixels surface")?;

            window.request_redraw();
            Some(pixels)
        };

        // Avoid a huge dt on the first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                self.pixels
                    .as_mut()
                    .unwrap()
                    .resize_surface(size.width, size.height)
                    .context("Failed to resize pixels surface")?;
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame_instant).as_secs_f32();
                self.last_frame_instant = now;

                self.runner
                    .tick(dt, &self.keypad)
                    .context("Execution fault")?;

                if self.runner.sound_active() {
                    self.audio_sink.play();
                } else {
                    self.audio_sink.pause();
                }

                self.process_display(dt);

                self.pixels
                    .as_ref()
                    .unwrap()
                    .render()
                    .context("Render error")?;

                self.window.as_ref().unwrap().request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = KEY_MAP.iter().position(|&k| k == event.physical_key) {
                    self.keypad[key] = event.state == ElementState::Pressed;
                }
            }

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }
}

/// CHIP-8 emulator.
///
/// Keys 1-4, Q-R, A-F, Z-V map to the hex keypad.
/// Escape exits the emulator.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = std::fs::read(&args.rom_path).context("Failed to read ROM file")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&rom).context("Failed to initialize application")?;
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    app.exit_result
}
