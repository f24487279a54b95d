//! Bouncing-square demo: the bridge running against a simulated host.
//!
//! Proves the whole loop end to end without a real plugin runtime:
//!
//! - [`sim::SimHost`] plays the host, with its own flush-pacing and audio
//!   threads.
//! - The app draws a bouncing square, first in an indexed-palette mode, then
//!   in a direct-color mode at a different size, presenting every frame.
//! - A scripted input thread pushes raw events through the plugin context;
//!   the app's event sink steers and recolors the square.
//! - The audio producer renders a tone into every pulled block.
//!
//! On exit the last composited image is written to `bounce-screenshot.png`
//! and the audio capture to `bounce-capture.wav`.

mod sim;

use std::f32::consts::TAU;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context as _;

use sandpipe_core::av::audio::SAMPLE_RATE;
use sandpipe_core::driver::{
    AudioBackend, AudioSpec, ButtonState, ColorDepth, DisplayBackend, EventSink, Key, ModeInfo,
    MouseButton, Rgb,
};
use sandpipe_core::host::HostInstance;
use sandpipe_core::input::RawEvent;
use sandpipe_core::{AudioBridge, DisplayBridge, PluginContext};

use crate::sim::{SimHost, SimSurface};

const OUT_WIDTH: u32 = 320;
const OUT_HEIGHT: u32 = 240;

const SQUARE: i32 = 24;
const FRAMES_PER_PHASE: u32 = 120;
const FRAME_TIME: Duration = Duration::from_millis(8);

/// Palette for the indexed phase: slot 0 is the background, the rest are the
/// square colors a click cycles through.
const PALETTE: [Rgb; 5] = [
    Rgb { r: 16, g: 16, b: 40 },
    Rgb { r: 235, g: 110, b: 40 },
    Rgb { r: 80, g: 200, b: 120 },
    Rgb { r: 70, g: 130, b: 220 },
    Rgb { r: 220, g: 210, b: 80 },
];

/// Square colors for the direct phase, packed opaque words.
const DIRECT_COLORS: [u32; 4] = [0xFFEB_6E28, 0xFF50_C878, 0xFF46_82DC, 0xFFDC_D250];

const DIRECT_BACKGROUND: u32 = 0xFF10_1028;

/// The bouncing square, steered by translated input.
struct App {
    x: i32,
    y: i32,
    vx: i32,
    vy: i32,
    /// Index into the color cycle; palette slot `color + 1` in the indexed
    /// phase, `DIRECT_COLORS[color]` in the direct phase.
    color: usize,
    pointer: (i32, i32),
}

impl App {
    fn new() -> Self {
        Self {
            x: 40,
            y: 30,
            vx: 3,
            vy: 2,
            color: 0,
            pointer: (0, 0),
        }
    }

    fn step(&mut self, mode: ModeInfo) {
        self.x += self.vx;
        self.y += self.vy;

        let max_x = mode.width as i32 - SQUARE;
        let max_y = mode.height as i32 - SQUARE;
        if self.x <= 0 || self.x >= max_x {
            self.vx = -self.vx;
            self.x = self.x.clamp(0, max_x);
        }
        if self.y <= 0 || self.y >= max_y {
            self.vy = -self.vy;
            self.y = self.y.clamp(0, max_y);
        }
    }

    fn draw_indexed(&self, frame: &mut [u8], mode: ModeInfo) {
        frame.fill(0);
        let slot = (self.color + 1) as u8;
        for y in self.y..self.y + SQUARE {
            let row = &mut frame[y as usize * mode.pitch..][..mode.width as usize];
            row[self.x as usize..(self.x + SQUARE) as usize].fill(slot);
        }
    }

    fn draw_direct(&self, frame: &mut [u8], mode: ModeInfo) {
        for word in frame.chunks_exact_mut(4) {
            word.copy_from_slice(&DIRECT_BACKGROUND.to_le_bytes());
        }
        let color = DIRECT_COLORS[self.color].to_le_bytes();
        for y in self.y..self.y + SQUARE {
            let row = &mut frame[y as usize * mode.pitch..][..mode.pitch];
            for word in row[self.x as usize * 4..(self.x + SQUARE) as usize * 4].chunks_exact_mut(4)
            {
                word.copy_from_slice(&color);
            }
        }
    }
}

impl EventSink for App {
    fn mouse_button(&mut self, state: ButtonState, button: MouseButton, x: i32, y: i32) {
        if state == ButtonState::Pressed {
            log::debug!("click {button:?} at {x},{y}");
            self.color = (self.color + 1) % DIRECT_COLORS.len();
        }
    }

    fn mouse_motion(&mut self, x: i32, y: i32) {
        self.pointer = (x, y);
    }

    fn keyboard(&mut self, state: ButtonState, key: Key) {
        if state != ButtonState::Pressed {
            return;
        }
        match key {
            Key::Left => self.vx = -self.vx.abs(),
            Key::Right => self.vx = self.vx.abs(),
            Key::Up => self.vy = -self.vy.abs(),
            Key::Down => self.vy = self.vy.abs(),
            Key::Space => {
                self.vx = -self.vx;
                self.vy = -self.vy;
            }
            other => log::debug!("key {other:?} ignored"),
        }
    }
}

/// A 440 Hz tone producer; keeps its phase across blocks so the capture is a
/// continuous wave.
fn tone_producer() -> Box<dyn FnMut(&mut [u8]) + Send> {
    let step = TAU * 440.0 / SAMPLE_RATE as f32;
    let mut phase = 0f32;
    Box::new(move |block| {
        for frame in block.chunks_exact_mut(4) {
            let sample = ((phase.sin() * 0.25 * f32::from(i16::MAX)) as i16).to_le_bytes();
            phase = (phase + step) % TAU;
            frame[..2].copy_from_slice(&sample);
            frame[2..].copy_from_slice(&sample);
        }
    })
}

/// The scripted "user": steers the square around, wiggles the pointer, and
/// clicks twice to recolor.
fn input_script(ctx: Arc<PluginContext>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let pause = Duration::from_millis(60);
        let taps = [37u32, 38, 39, 40, 32]; // left, up, right, down, space
        for code in taps {
            ctx.push_event(RawEvent::KeyDown { code });
            ctx.push_event(RawEvent::KeyUp { code });
            thread::sleep(pause);
        }
        for i in 0..8 {
            ctx.push_event(RawEvent::MouseMove {
                x: 40 + i * 10,
                y: 60,
            });
            thread::sleep(Duration::from_millis(15));
        }
        ctx.push_event(RawEvent::MouseButtonDown {
            button: 0,
            x: 120,
            y: 60,
        });
        ctx.push_event(RawEvent::MouseButtonUp {
            button: 0,
            x: 120,
            y: 60,
        });
        thread::sleep(pause);
        ctx.push_event(RawEvent::MouseButtonDown {
            button: 2,
            x: 120,
            y: 60,
        });
        ctx.push_event(RawEvent::MouseButtonUp {
            button: 2,
            x: 120,
            y: 60,
        });
    })
}

fn run_phase(display: &mut DisplayBridge, app: &mut App, mode: ModeInfo, indexed: bool) {
    for _ in 0..FRAMES_PER_PHASE {
        display.pump_events(app);
        app.step(mode);
        if indexed {
            app.draw_indexed(display.frame_mut(), mode);
        } else {
            app.draw_direct(display.frame_mut(), mode);
        }
        display.update();
        thread::sleep(FRAME_TIME);
    }
}

fn write_screenshot(path: &str, surface: &SimSurface) -> anyhow::Result<()> {
    let (width, height) = surface.dimensions();
    let words = surface.staged();

    let mut rgba = Vec::with_capacity(words.len() * 4);
    for word in words {
        rgba.extend_from_slice(&[
            (word >> 16) as u8,
            (word >> 8) as u8,
            word as u8,
            (word >> 24) as u8,
        ]);
    }

    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgba)?;
    writer.finish()?;
    Ok(())
}

fn write_capture(path: &str, samples: &[i16]) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).with_context(|| format!("creating {path}"))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let host = SimHost::new();
    let ctx = Arc::new(PluginContext::new(
        Arc::clone(&host) as Arc<dyn HostInstance>,
        OUT_WIDTH,
        OUT_HEIGHT,
    ));

    let mut display = DisplayBridge::new(&ctx).context("creating the display bridge")?;
    let mut audio = AudioBridge::new(&ctx);

    display.init();
    display.init_keymap();

    let mut spec = AudioSpec {
        sample_rate: SAMPLE_RATE,
        channels: 2,
        frames: 0,
        block_len: 0,
    };
    audio.open(&mut spec, tone_producer());
    log::info!(
        "audio open: {} Hz, {} channels, {} frames per block",
        spec.sample_rate,
        spec.channels,
        spec.frames
    );

    let script = input_script(Arc::clone(&ctx));
    let mut app = App::new();

    // Phase one: palette-indexed at the output size.
    let mode = display
        .set_mode(OUT_WIDTH, OUT_HEIGHT, ColorDepth::Indexed8)
        .context("setting the indexed mode")?;
    display.set_palette(0, &PALETTE);
    run_phase(&mut display, &mut app, mode, true);

    // Phase two: direct color at a smaller size, letterboxed by the
    // intersection copy.
    let mode = display
        .set_mode(256, 192, ColorDepth::Argb32)
        .context("setting the direct mode")?;
    run_phase(&mut display, &mut app, mode, false);

    script.join().expect("input script thread panicked");
    log::debug!("last pointer position {:?}", app.pointer);

    // Teardown in the documented order: display quit, audio close, bridges
    // dropped, then the host itself.
    display.quit();
    audio.close();
    drop(display);
    drop(audio);

    let surface = host
        .surface()
        .context("the display bridge never created a surface")?;
    host.shutdown();

    write_screenshot("bounce-screenshot.png", &surface)?;
    write_capture("bounce-capture.wav", &host.captured_samples())?;
    log::info!("wrote bounce-screenshot.png and bounce-capture.wav");
    Ok(())
}
