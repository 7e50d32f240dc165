use clap::{Parser, Subcommand};
use fitcanvas::imaging::{Image, ResizeMode, RustBackend};
use fitcanvas::{batch, config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fitcanvas")]
#[command(about = "Fit, crop, letterbox and composite PNG/JPEG images")]
#[command(long_about = "\
Fit, crop, letterbox and composite PNG/JPEG images

Resize modes:

  fit    Scale to fit inside the box, keeping aspect ratio. Either side may
         be omitted to leave that axis unconstrained.
  crop   Scale to cover the box exactly, trimming the overflow around the
         center.
  fill   Scale to fit inside the box, then pad to the exact size. PNG pads
         with transparency, JPEG pads with white.

Overlay draws one image unscaled onto another at a pixel offset and writes
the result over the background file. Pixels outside the background are
clipped.

Run 'fitcanvas gen-config' to generate a documented fitcanvas.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Target box shared by `resize` and `batch`.
#[derive(clap::Args, Clone)]
struct ResizeArgs {
    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Resize mode: fit, crop or fill
    #[arg(long, default_value = "fit")]
    mode: String,

    /// Directory the result is written to
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Print format and size read from an image header
    Info {
        file: PathBuf,
    },
    /// Resize a single image
    Resize {
        file: PathBuf,
        #[command(flatten)]
        resize: ResizeArgs,
        /// Output file name (defaults to the input's name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Draw FOREGROUND onto BACKGROUND at (x, y), overwriting BACKGROUND
    Overlay {
        foreground: PathBuf,
        background: PathBuf,
        /// Left offset; may be negative
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        x: i64,
        /// Top offset; may be negative
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        y: i64,
    },
    /// Resize every PNG/JPEG under a directory
    Batch {
        dir: PathBuf,
        #[command(flatten)]
        resize: ResizeArgs,
    },
    /// Print a stock fitcanvas.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let engine_config = config::load_config(&cli.config)?;
    let settings = engine_config.output.to_settings();
    let backend = RustBackend::with_filter(engine_config.resample.filter.to_filter_type());

    match cli.command {
        Command::Info { file } => {
            let image = Image::new(&backend, &file)?;
            output::print_image_info(&image);
        }
        Command::Resize { file, resize, name } => {
            let mode: ResizeMode = resize.mode.parse()?;
            let mut original = Image::new(&backend, &file)?.with_output_settings(settings);
            let mut edited = original.resize_to(resize.width, resize.height, mode)?;
            std::fs::create_dir_all(&resize.out_dir)?;
            let saved = edited.save(&resize.out_dir, name.as_deref())?;
            output::print_saved(&saved);
        }
        Command::Overlay {
            foreground,
            background,
            x,
            y,
        } => {
            let mut fg = Image::new(&backend, &foreground)?;
            let mut bg = Image::new(&backend, &background)?.with_output_settings(settings);
            let saved = fg.place_over(&mut bg, x, y)?;
            output::print_saved(&saved);
        }
        Command::Batch { dir, resize } => {
            init_thread_pool(&engine_config.processing);
            let job = batch::BatchJob {
                width: resize.width,
                height: resize.height,
                mode: resize.mode.parse()?,
                output: settings,
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::process_directory(&backend, &dir, &resize.out_dir, &job, Some(tx));
            printer.join().ok();
            let summary = result?;
            output::print_batch_summary(&summary);
            if !summary.is_success() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "fitcanvas=debug",
        _ => "fitcanvas=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
