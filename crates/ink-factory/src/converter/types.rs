use crate::binarizer::Mask;
use crate::tiler::Frame;
use ink_core::{DEFAULT_MAX_WIDTH, DEFAULT_THRESHOLD};
use std::cell::RefCell;
use std::path::PathBuf;

/// Knobs shared by every conversion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Gray level at or below which a pixel is ink.
    pub threshold: u8,
    /// Frames are scaled to this width, keeping aspect ratio. `None` keeps
    /// the source size.
    pub max_width: Option<u32>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_width: Some(DEFAULT_MAX_WIDTH),
        }
    }
}

/// One video -> one stream file
#[derive(Debug, Clone)]
pub struct ConvertJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub json_path: Option<PathBuf>,
    pub options: ConvertOptions,
    pub use_gpu: bool,
}

/// One still image -> one stream file holding `repeat` identical frames
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub json_path: Option<PathBuf>,
    pub options: ConvertOptions,
    pub repeat: usize,
}

#[derive(Debug, Clone)]
pub enum Job {
    Video(ConvertJob),
    Image(ImageJob),
}

/// Status updates sent from the core logic to the CLI or a background caller
#[derive(Debug, Clone)]
pub enum ConverterStatus {
    Starting,
    Analyzing(String),
    Processing {
        current_frame: u64,
        total_frames: u64,
        fps_speed: f64, // frames converted per second
    },
    Finished,
    Error(String),
}

pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub threshold: u8,
    pub max_width: Option<u32>,
    pub repeat: usize,
    pub use_gpu: bool,
}

// Internal structures for the pipeline
pub(crate) struct RawFrame {
    pub id: u64,
    pub data: Vec<u8>,
}

pub(crate) struct ProcessedFrame {
    pub id: u64,
    pub rects: Frame,
    pub recycled_buffer: Vec<u8>,
}

// Per-worker mask so binarizing a frame does not allocate.
thread_local! {
    pub static SCRATCH_MASK: RefCell<Mask> = RefCell::new(Mask::default());
}
