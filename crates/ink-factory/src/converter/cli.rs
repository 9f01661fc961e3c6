use super::types::*;
use super::utils::is_video_path;
use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Builds the job described by command-line arguments.
pub fn job_from_args(args: ConvertArgs) -> Result<Job> {
    if !args.input.exists() {
        bail!("Input '{}' not found.", args.input.display());
    }
    if args.repeat == 0 {
        bail!("Repeat count must be at least 1.");
    }

    let output_path = args
        .output
        .unwrap_or_else(|| args.input.with_extension("bin"));
    let options = ConvertOptions {
        threshold: args.threshold,
        max_width: args.max_width,
    };

    let job = if is_video_path(&args.input) {
        Job::Video(ConvertJob {
            input_path: args.input,
            output_path,
            json_path: args.json,
            options,
            use_gpu: args.use_gpu,
        })
    } else {
        Job::Image(ImageJob {
            input_path: args.input,
            output_path,
            json_path: args.json,
            options,
            repeat: args.repeat,
        })
    };
    Ok(job)
}

pub fn run_cli(args: ConvertArgs) -> Result<()> {
    let job = job_from_args(args)?;
    let output_path = match &job {
        Job::Video(j) => j.output_path.clone(),
        Job::Image(j) => j.output_path.clone(),
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {eta} {msg}",
        )?
        .progress_chars("#>-"),
    );

    let pb_clone = pb.clone();
    job.run(move |status| match status {
        ConverterStatus::Starting => pb_clone.set_message("Starting..."),
        ConverterStatus::Analyzing(msg) => pb_clone.set_message(msg),
        ConverterStatus::Processing {
            current_frame,
            total_frames,
            ..
        } => {
            pb_clone.set_length(total_frames.max(current_frame));
            pb_clone.set_position(current_frame);
        }
        ConverterStatus::Finished => pb_clone.finish_with_message("Done!"),
        ConverterStatus::Error(e) => pb_clone.abandon_with_message(format!("Error: {e}")),
    })?;

    println!("Wrote {}", output_path.display());
    Ok(())
}
