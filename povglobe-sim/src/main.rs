use clap::{Parser, ValueEnum};
use povglobe_protocol_lib::CommandDecoder;
use povglobe_render_lib::{
    graticule, Frame, Geometry, LedDriver, RenderOptions, Renderer, RingShape, Wiring, RGB8,
};
use std::convert::Infallible;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

mod display;
mod script;

use script::{parse_script, Step};

/// Run a POV globe command script on the host and print each revolution.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Command script to run (reads stdin if omitted).
    script: Option<PathBuf>,

    /// How the strips are wired to the controller.
    #[arg(short, long, value_enum, default_value_t = WiringArg::Serial)]
    wiring: WiringArg,

    /// Shape of the animation ring.
    #[arg(short, long, value_enum, default_value_t = RingArg::Legacy)]
    ring: RingArg,

    /// Sectors around the rotation axis.
    #[arg(long, default_value_t = 2)]
    x_sectors: usize,

    /// Sectors stacked along the rotation axis.
    #[arg(long, default_value_t = 1)]
    y_sectors: usize,

    /// Columns per sector.
    #[arg(long, default_value_t = 60)]
    sector_width: usize,

    /// LEDs per strip.
    #[arg(long, default_value_t = 60)]
    sector_height: usize,

    /// Grid spacing of the test pattern.
    #[arg(short, long, default_value_t = 10)]
    grid: usize,

    /// Do not composite overlays.
    #[arg(long)]
    no_overlays: bool,

    /// Print ASCII shades instead of ANSI colors.
    #[arg(short, long)]
    ascii: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WiringArg {
    Serial,
    Parallel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RingArg {
    Legacy,
    Circle,
}

/// Keeps every submitted frame as plain pixels
#[derive(Debug, Default)]
struct RecordingDriver {
    initialized: usize,
    frames: Vec<Vec<RGB8>>,
}

impl LedDriver for RecordingDriver {
    type Error = Infallible;

    fn initialize(&mut self) -> Result<(), Infallible> {
        self.initialized += 1;
        Ok(())
    }

    fn submit(&mut self, frame: Frame<'_>) -> Result<(), Infallible> {
        self.frames.push(frame.pixels().collect());
        Ok(())
    }
}

fn read_script(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn main() {
    let args = Args::parse();

    let text = read_script(args.script.as_ref()).unwrap_or_else(|e| {
        eprintln!("Error reading script: {e}");
        std::process::exit(1);
    });
    let steps = parse_script(&text).unwrap_or_else(|e| {
        eprintln!("Invalid script: {e}");
        std::process::exit(1);
    });

    let geometry = Geometry {
        x_sectors: args.x_sectors,
        y_sectors: args.y_sectors,
        sector_width: args.sector_width,
        sector_height: args.sector_height,
    };
    if let Err(e) = geometry.validate() {
        eprintln!("Invalid geometry: {e}");
        std::process::exit(1);
    }

    let mut options = RenderOptions {
        wiring: match args.wiring {
            WiringArg::Serial => Wiring::Serial,
            WiringArg::Parallel => Wiring::Parallel,
        },
        ring_shape: match args.ring {
            RingArg::Legacy => RingShape::Legacy,
            RingArg::Circle => RingShape::Circle,
        },
        ..RenderOptions::default()
    };
    if args.no_overlays {
        options.overlays.clear();
    }

    let bitmap = graticule(geometry, args.grid);
    let mut renderer = Renderer::new(bitmap, RecordingDriver::default(), options)
        .unwrap_or_else(|e| {
            eprintln!("Cannot build renderer: {e}");
            std::process::exit(1);
        });

    let mut revolution = 0u32;
    for step in steps {
        run_step(&mut renderer, step, &mut revolution, args.ascii);
    }
}

fn run_step(
    renderer: &mut Renderer<RecordingDriver>,
    step: Step,
    revolution: &mut u32,
    ascii: bool,
) {
    // The recording driver never fails
    let ok = |result: Result<(), Infallible>| match result {
        Ok(()) => {}
        Err(never) => match never {},
    };

    match step {
        Step::Position(x) => renderer.set_globe_position(x),
        Step::Reticle { x, y } => renderer.set_reticle(x, y),
        Step::ClearReticle => renderer.clear_reticle(),
        Step::Target { id, x, y } => {
            if !renderer.set_target(id, x, y) {
                eprintln!("target {id}: slot busy or out of range, ignored");
            }
        }
        Step::ClearTarget(id) => {
            renderer.clear_target(id);
        }
        Step::Abduction { x, y } => renderer.play_abduction_animation(x, y),
        Step::Scanner { x, y } => renderer.play_scanner_animation(x, y),
        Step::ClearAnimation => renderer.clear_animation(),
        Step::Advance(count) => {
            for _ in 0..count {
                renderer.advance_animation();
            }
        }
        Step::Render(count) => {
            for _ in 0..count {
                renderer.driver_mut().frames.clear();
                ok(renderer.show_revolution());
                *revolution += 1;

                let geometry = *renderer.geometry();
                let rows = display::unroll(&geometry, &renderer.driver().frames);
                let state = renderer.state();
                println!(
                    "revolution {revolution}: offset {}, targets {}, animation {}",
                    state.rotation_offset,
                    state.overlays.targets.len(),
                    state
                        .overlays
                        .animation
                        .map_or_else(|| "off".to_string(), |a| format!("radius {}", a.radius())),
                );
                print!("{}", display::format_rows(&rows, ascii));
            }
        }
        Step::Blank => {
            renderer.driver_mut().frames.clear();
            ok(renderer.show_blank());
            let lit = renderer
                .driver()
                .frames
                .iter()
                .flatten()
                .filter(|p| **p != RGB8::default())
                .count();
            println!("blank: {lit} LEDs lit");
        }
        Step::Reset => {
            ok(renderer.reset());
            println!("reset (self-test #{})", renderer.driver().initialized);
        }
        Step::Bytes(bytes) => {
            println!("bytes: {}", hex::encode(&bytes));
            let mut decoder = CommandDecoder::new();
            for result in decoder.feed_all(&bytes) {
                match result {
                    Ok(command) => {
                        println!("  {command:?}");
                        ok(renderer.apply(command));
                    }
                    Err(e) => eprintln!("  skipped: {e}"),
                }
            }
            if decoder.is_pending() {
                eprintln!("  incomplete command at end of bytes, dropped");
            }
        }
    }
}
