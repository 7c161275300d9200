// Allow unused code for designed-but-not-yet-used APIs
// Remove these as the codebase matures
#![allow(dead_code)]

mod animation;
mod config;
mod display;
mod field;
mod math;
mod util;

use animation::RenderLoop;
use config::{FieldConfig, PresetBank};
use display::{Display, InputEvent, PixelBuffer, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use field::ParticleField;
use math::Vec2;
use sdl2::keyboard::Keycode;
use util::FpsCounter;

const PRESETS_PATH: &str = "presets.json";
const BASE_SEED: u64 = 0x5EED;

struct Args {
    width: u32,
    height: u32,
    vsync: bool,
    preset: String,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let mut args = Args {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        preset: "network".to_string(),
    };

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--no-vsync" => args.vsync = false,
            "--width" | "-w" => {
                if i + 1 < argv.len() {
                    if let Ok(w) = argv[i + 1].parse::<u32>() {
                        args.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < argv.len() {
                    if let Ok(h) = argv[i + 1].parse::<u32>() {
                        args.height = h;
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < argv.len() {
                    // Parse WxH format (e.g., 1920x1080)
                    let parts: Vec<&str> = argv[i + 1].split('x').collect();
                    if parts.len() == 2 {
                        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                            args.width = w;
                            args.height = h;
                        }
                    }
                    i += 1;
                }
            },
            "--preset" | "-p" => {
                if i + 1 < argv.len() {
                    args.preset = argv[i + 1].clone();
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: constellate [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  --width W, -w W       Set window width (default: {})",
                    DEFAULT_WIDTH
                );
                println!(
                    "  --height H, -h H      Set window height (default: {})",
                    DEFAULT_HEIGHT
                );
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
                println!("  --preset NAME, -p NAME    Start with a preset (drift/network/energy)");
                println!("  --no-vsync            Disable VSync for uncapped framerate");
                println!("  --help                Show this help message");
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }

    args
}

fn make_field(cfg: &FieldConfig, width: u32, height: u32, generation: u64) -> ParticleField {
    ParticleField::new(cfg.clone(), width, height, BASE_SEED.wrapping_add(generation))
}

fn main() {
    let args = parse_args();

    // The field is a decorative layer: if the surface cannot be
    // created, report why and bow out without an error status.
    if let Err(e) = run(&args) {
        eprintln!("constellate: display unavailable, effect skipped: {}", e);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let (mut display, texture_creator) =
        Display::with_options("constellate", args.width, args.height, args.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, args.width, args.height)?;
    let mut buffer = PixelBuffer::with_size(args.width, args.height);
    let mut width = args.width;
    let mut height = args.height;

    // FPS counter with 60 sample rolling average
    let mut fps_counter = FpsCounter::new(60);
    let mut show_fps = false;

    // Load preset bank or fall back to the built-ins
    let mut bank = PresetBank::load(PRESETS_PATH).unwrap_or_else(|_| PresetBank::builtin());
    let start_cfg = bank
        .get(&args.preset)
        .cloned()
        .unwrap_or_else(FieldConfig::network);

    let mut generation: u64 = 0;
    let mut render_loop = RenderLoop::new(make_field(&start_cfg, width, height, generation));
    render_loop.start();

    println!("=== constellate ===");
    println!("Resolution: {}x{}", width, height);
    if args.vsync {
        println!("VSync: ON (60fps locked). Use --no-vsync for uncapped.");
    } else {
        println!("VSync: OFF (uncapped framerate)");
    }
    println!("Preset: {}", args.preset);
    println!("Controls:");
    println!("  1          - Drift preset");
    println!("  2          - Network preset");
    println!("  3          - Energy preset");
    println!("  Space      - Pause/resume the animation");
    println!("  F          - Toggle FPS readout (window title)");
    println!("  S          - Save presets to {}", PRESETS_PATH);
    println!("  L          - Reload presets from {}", PRESETS_PATH);
    println!("  Escape     - Quit");

    let mut frame: u64 = 0;

    'main: loop {
        let (_dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::Space => {
                        if render_loop.is_running() {
                            render_loop.stop();
                        } else {
                            render_loop.start();
                        }
                    },
                    Keycode::F => show_fps = !show_fps,
                    Keycode::S => {
                        if let Err(e) = bank.save(PRESETS_PATH) {
                            eprintln!("Failed to save: {}", e);
                        } else {
                            println!("Presets saved to {}", PRESETS_PATH);
                        }
                    },
                    Keycode::L => match PresetBank::load(PRESETS_PATH) {
                        Ok(loaded) => {
                            bank = loaded;
                            println!("Presets loaded from {}", PRESETS_PATH);
                        },
                        Err(e) => eprintln!("Failed to load: {}", e),
                    },
                    Keycode::Num1 | Keycode::Num2 | Keycode::Num3 => {
                        let name = match key {
                            Keycode::Num1 => "drift",
                            Keycode::Num2 => "network",
                            _ => "energy",
                        };
                        if let Some(cfg) = bank.get(name) {
                            generation += 1;
                            render_loop
                                .replace_field(make_field(cfg, width, height, generation));
                            println!("Preset: {}", name);
                        }
                    },
                    _ => {},
                },
                InputEvent::MouseMove { x, y } => {
                    render_loop.set_pointer(Some(Vec2::new(x as f32, y as f32)));
                },
                InputEvent::MouseLeave => render_loop.set_pointer(None),
                InputEvent::Resized {
                    width: w,
                    height: h,
                } => {
                    width = w;
                    height = h;
                    target = RenderTarget::with_size(&texture_creator, w, h)?;
                    buffer = PixelBuffer::with_size(w, h);
                    render_loop.on_resize(w, h);
                },
            }
        }

        render_loop.step(&mut buffer);

        // Present every frame so the last rendered frame stays up while paused
        display.present(&mut target, &buffer)?;

        frame += 1;
        if show_fps && frame % 30 == 0 {
            let title = format!(
                "constellate - {:.0} fps ({:.1} ms)",
                avg_fps,
                fps_counter.avg_frame_time_ms()
            );
            display.set_title(&title);
        } else if !show_fps && frame % 30 == 0 {
            display.set_title("constellate");
        }
    }

    Ok(())
}
