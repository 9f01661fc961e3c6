use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ink_factory::{converter, inspector, DEFAULT_MAX_WIDTH, DEFAULT_THRESHOLD};
use std::{fs::File, io::BufReader, path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ink")]
#[command(version)]
#[command(about = "Turns images and videos into rectangle streams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an image or video into a .bin rectangle stream
    Convert {
        input: PathBuf,

        /// Output stream (defaults to the input path with a .bin extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the frames as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: u8,

        #[arg(short = 'w', long, default_value_t = DEFAULT_MAX_WIDTH)]
        max_width: u32,

        /// Keep the source resolution
        #[arg(long, default_value_t = false)]
        no_resize: bool,

        /// Number of copies of a still image to write
        #[arg(short, long, default_value_t = 1)]
        repeat: usize,

        #[arg(long, default_value_t = false)]
        gpu: bool,
    },

    /// Replay a stream on a canvas and print statistics
    Inspect {
        file: PathBuf,

        #[arg(long, default_value_t = DEFAULT_MAX_WIDTH as usize)]
        width: usize,

        #[arg(long, default_value_t = 768)]
        height: usize,
    },
}

fn inspect(file: PathBuf, width: usize, height: usize) -> Result<()> {
    let source = File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?;
    let report = inspector::inspect_stream(BufReader::new(source), width, height)?;

    println!("Stream:        {}", file.display());
    println!("Canvas:        {}x{}", report.width, report.height);
    println!("Frames:        {}", report.frames);
    println!("Rectangles:    {}", report.total_rects);
    println!("Avg per frame: {:.1}", report.average_rects());
    if let Some(frame) = report.busiest_frame {
        println!("Busiest frame: #{} ({} rects)", frame, report.max_rects);
    }
    println!("Overlaps:      {} px", report.overlapping_pixels);
    println!("Clipped rects: {}", report.out_of_bounds);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            json,
            threshold,
            max_width,
            no_resize,
            repeat,
            gpu,
        } => {
            let args = converter::ConvertArgs {
                input,
                output,
                json,
                threshold,
                max_width: (!no_resize).then_some(max_width),
                repeat,
                use_gpu: gpu,
            };
            converter::run_cli(args).context("Conversion failed")
        }

        Commands::Inspect {
            file,
            width,
            height,
        } => inspect(file, width, height).context("Inspection failed"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}
