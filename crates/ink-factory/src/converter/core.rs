use super::types::*;
use super::utils::{fit_to_width, get_frame_count, probe_dimensions};
use crate::binarizer::{binarize_serial_into, PixelGrid};
use crate::stream::{write_json, FrameWriter, ReorderBuffer};
use crate::tiler::{tile_mask, Frame};
use anyhow::{anyhow, bail, ensure, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use image::imageops::FilterType;
use rayon::iter::{IntoParallelRefIterator, ParallelBridge, ParallelIterator};
use std::{
    fs::File,
    io::{BufWriter, ErrorKind, Read, Write},
    path::Path,
    process::{Child, Command, Stdio},
    thread,
    time::Instant,
};
use tracing::{debug, info, warn};

const QUEUE_SIZE: usize = 64;
const WRITE_BUFFER: usize = 4 * 1024 * 1024;

/// Binarizes and tiles one frame using the calling thread's scratch buffers.
///
/// Runs entirely on the calling thread: frames are the unit of parallelism
/// here, and the scratch mask stays borrowed for the whole call.
pub fn convert_frame(grid: &PixelGrid, threshold: u8) -> Frame {
    SCRATCH_MASK.with(|cell| {
        let mut mask = cell.borrow_mut();
        binarize_serial_into(grid, threshold, &mut mask);
        tile_mask(&mask)
    })
}

/// Converts already-decoded frames in parallel, keeping input order.
pub fn convert_grids(grids: &[PixelGrid], options: &ConvertOptions) -> Vec<Frame> {
    grids
        .par_iter()
        .map(|grid| convert_frame(grid, options.threshold))
        .collect()
}

impl Job {
    pub fn run<F>(self, callback: F) -> Result<()>
    where
        F: Fn(ConverterStatus) + Send + Clone + 'static,
    {
        match self {
            Job::Video(job) => process_conversion(job, callback),
            Job::Image(job) => convert_image(job, callback).map(|_| ()),
        }
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output {}", path.display()))?;
    Ok(BufWriter::with_capacity(WRITE_BUFFER, file))
}

fn export_json(path: &Path, frames: &[Frame]) -> Result<()> {
    let out = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    write_json(out, frames).context("Failed to write JSON export")?;
    debug!(path = %path.display(), frames = frames.len(), "json export written");
    Ok(())
}

/// Still image -> stream. Returns the tiled frame.
pub fn convert_image<F>(job: ImageJob, callback: F) -> Result<Frame>
where
    F: Fn(ConverterStatus),
{
    callback(ConverterStatus::Starting);
    callback(ConverterStatus::Analyzing("Decoding image...".into()));

    let start = Instant::now();
    let mut rgb = image::open(&job.input_path)
        .with_context(|| format!("Failed to decode {}", job.input_path.display()))?
        .to_rgb8();

    let (width, height) = fit_to_width(rgb.width(), rgb.height(), job.options.max_width);
    if (width, height) != rgb.dimensions() {
        rgb = image::imageops::resize(&rgb, width, height, FilterType::Triangle);
    }

    let grid = PixelGrid::new(rgb.as_raw(), width as usize, height as usize)?;
    let rects = convert_frame(&grid, job.options.threshold);
    info!(rects = rects.len(), width, height, "image tiled");

    let mut writer = FrameWriter::new(create_output(&job.output_path)?);
    let total_frames = job.repeat as u64;
    for _ in 0..job.repeat {
        writer.write_frame(&rects)?;
    }
    writer.into_inner()?;

    if let Some(json_path) = &job.json_path {
        let frames = vec![rects.clone(); job.repeat];
        export_json(json_path, &frames)?;
    }

    let elapsed = start.elapsed().as_secs_f64();
    callback(ConverterStatus::Processing {
        current_frame: total_frames,
        total_frames,
        fps_speed: if elapsed > 0.0 {
            total_frames as f64 / elapsed
        } else {
            0.0
        },
    });
    callback(ConverterStatus::Finished);
    Ok(rects)
}

/// Puts processed frames back in source order and appends them to the stream.
///
/// Returns the number of frames written. A frame that never arrives is an
/// error rather than a shorter stream.
pub(crate) fn write_in_order<W, F>(
    frames: Receiver<ProcessedFrame>,
    recycle: Sender<Vec<u8>>,
    mut writer: FrameWriter<W>,
    json_path: Option<&Path>,
    total_frames: u64,
    callback: F,
) -> Result<u64>
where
    W: Write,
    F: Fn(ConverterStatus),
{
    let mut reorder: ReorderBuffer<Frame> = ReorderBuffer::new();
    let mut exported: Vec<Frame> = Vec::new();

    let start_time = Instant::now();
    let mut last_report = Instant::now();

    for frame in frames {
        reorder.push(frame.id, frame.rects);
        // Only fails once the reader is gone, when the buffer is not needed.
        let _ = recycle.send(frame.recycled_buffer);

        while let Some(rects) = reorder.pop_ready() {
            writer.write_frame(&rects)?;
            if json_path.is_some() {
                exported.push(rects);
            }

            let written = writer.frames_written();
            if written % 30 == 0 || last_report.elapsed().as_millis() > 100 {
                let elapsed = start_time.elapsed().as_secs_f64();
                callback(ConverterStatus::Processing {
                    current_frame: written,
                    total_frames,
                    fps_speed: if elapsed > 0.0 {
                        written as f64 / elapsed
                    } else {
                        0.0
                    },
                });
                last_report = Instant::now();
            }
        }
    }

    ensure!(
        reorder.pending() == 0,
        "Frame {} never arrived, {} later frames were dropped",
        reorder.next_id(),
        reorder.pending()
    );

    let written = writer.frames_written();
    writer.into_inner()?;
    if let Some(path) = json_path {
        export_json(path, &exported)?;
    }
    Ok(written)
}

/// Kills ffmpeg after a failure downstream so it stops decoding.
fn stop_decoder(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "ffmpeg already exited");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "failed to reap ffmpeg");
    }
}

/// Video -> stream.
///
/// ffmpeg decodes and scales to raw RGB; a reader thread feeds recycled
/// buffers to rayon workers that binarize and tile frames concurrently; the
/// writer thread puts them back in order before appending to the stream.
pub fn process_conversion<F>(job: ConvertJob, callback: F) -> Result<()>
where
    F: Fn(ConverterStatus) + Send + Clone + 'static,
{
    callback(ConverterStatus::Starting);

    // 1. Analyze Video
    callback(ConverterStatus::Analyzing("Detecting Metadata...".into()));
    let total_frames = get_frame_count(&job.input_path).unwrap_or_else(|| {
        warn!(path = %job.input_path.display(), "frame count unknown");
        0
    });
    let (src_w, src_h) =
        probe_dimensions(&job.input_path).context("Failed to read video dimensions")?;
    let (width, height) = fit_to_width(src_w, src_h, job.options.max_width);
    ensure!(width > 0 && height > 0, "Video reports an empty frame size");
    debug!(src_w, src_h, width, height, total_frames, "video probed");

    // 2. FFmpeg Setup
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-loglevel").arg("error");
    if job.use_gpu {
        cmd.arg("-hwaccel").arg("cuda");
    }
    cmd.arg("-i")
        .arg(&job.input_path)
        .arg("-vf")
        .arg(format!("scale={width}:{height}:flags=bilinear"))
        .arg("-f")
        .arg("rawvideo")
        .arg("-pix_fmt")
        .arg("rgb24")
        .arg("-");

    let output = create_output(&job.output_path)?;

    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to spawn ffmpeg")?;
    let mut stdout = child.stdout.take().context("Failed to open stdout")?;
    let mut stderr = child.stderr.take().context("Failed to open stderr")?;

    // Drained on its own thread so a chatty ffmpeg never blocks on a full pipe.
    let stderr_handle = thread::spawn(move || {
        let mut log = String::new();
        stderr.read_to_string(&mut log).map(|_| log)
    });

    // 3. Channel Setup
    let (tx_raw, rx_raw): (Sender<RawFrame>, Receiver<RawFrame>) = bounded(QUEUE_SIZE);
    let (tx_processed, rx_processed): (Sender<ProcessedFrame>, Receiver<ProcessedFrame>) =
        bounded(QUEUE_SIZE);
    let (tx_recycle, rx_recycle): (Sender<Vec<u8>>, Receiver<Vec<u8>>) = bounded(QUEUE_SIZE);

    let frame_size = width as usize * height as usize * PixelGrid::CHANNELS;
    for _ in 0..QUEUE_SIZE {
        tx_recycle
            .send(vec![0u8; frame_size])
            .context("Failed to fill the frame pool")?;
    }

    // 4. Writer Thread (reorder + disk I/O + reporting)
    let json_path = job.json_path.clone();
    let cb_writer = callback.clone();
    let write_handle = thread::spawn(move || {
        write_in_order(
            rx_processed,
            tx_recycle,
            FrameWriter::new(output),
            json_path.as_deref(),
            total_frames,
            cb_writer,
        )
    });

    // 5. Reader Thread
    let read_handle = thread::spawn(move || -> Result<u64> {
        let mut frame_id = 0;
        // The pool closes when the writer stops; nothing would consume more frames.
        while let Ok(mut buffer) = rx_recycle.recv() {
            if let Err(e) = stdout.read_exact(&mut buffer) {
                if e.kind() == ErrorKind::UnexpectedEof {
                    break;
                }
                return Err(e).context(format!("Failed to read frame {frame_id} from ffmpeg"));
            }
            let raw = RawFrame {
                id: frame_id,
                data: buffer,
            };
            if tx_raw.send(raw).is_err() {
                break;
            }
            frame_id += 1;
        }
        Ok(frame_id)
    });

    // 6. Parallel Compute
    let threshold = job.options.threshold;
    let computed = rx_raw
        .into_iter()
        .par_bridge()
        .try_for_each(|raw| -> Result<()> {
            let grid = PixelGrid::new(&raw.data, width as usize, height as usize)
                .with_context(|| format!("Frame {} has the wrong size", raw.id))?;
            let rects = convert_frame(&grid, threshold);
            tx_processed
                .send(ProcessedFrame {
                    id: raw.id,
                    rects,
                    recycled_buffer: raw.data,
                })
                .map_err(|_| anyhow!("Writer stopped before frame {}", raw.id))
        });
    drop(tx_processed);

    // Writer errors come first: they are the cause when compute sees a closed channel.
    let written = write_handle
        .join()
        .map_err(|_| anyhow!("Writer thread panicked"))
        .and_then(|r| r)
        .and_then(|frames| computed.map(|_| frames));
    let frames = match written {
        Ok(frames) => frames,
        Err(e) => {
            stop_decoder(&mut child);
            return Err(e);
        }
    };

    let decoded = read_handle
        .join()
        .map_err(|_| anyhow!("Reader thread panicked"))?;
    let status = child.wait().context("Failed to wait for ffmpeg")?;
    let log = stderr_handle
        .join()
        .map_err(|_| anyhow!("ffmpeg log thread panicked"))?
        .unwrap_or_default();
    if !status.success() {
        bail!("ffmpeg failed ({status}): {}", log.trim());
    }
    let decoded = decoded?;
    ensure!(
        decoded == frames,
        "Decoded {decoded} frames but wrote {frames}"
    );

    info!(frames, output = %job.output_path.display(), "video converted");
    callback(ConverterStatus::Finished);
    Ok(())
}
