use std::path::Path;
use std::process::Command;

pub const VIDEO_EXTENSIONS: [&str; 5] = ["mkv", "mp4", "avi", "mov", "webm"];

/// Target size for a source frame: `max_width` wide, height scaled by the
/// source aspect ratio and rounded down.
pub fn fit_to_width(src_width: u32, src_height: u32, max_width: Option<u32>) -> (u32, u32) {
    let Some(width) = max_width else {
        return (src_width, src_height);
    };
    if src_width == 0 || src_height == 0 {
        return (width, 1);
    }
    let ratio = src_width as f64 / src_height as f64;
    let height = (width as f64 / ratio) as u32;
    (width, height.max(1))
}

pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
}

fn ffprobe(path: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("ffprobe")
        .args(["-v", "error"])
        .args(args)
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .output()
        .ok()?;
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Parses an ffprobe rate such as `30000/1001` or `25`.
pub fn parse_rate(raw: &str) -> Option<f64> {
    match raw.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.parse().ok()?;
            (den != 0.0).then_some(num.parse::<f64>().ok()? / den)
        }
        None => raw.parse().ok(),
    }
}

pub fn detect_fps(path: &Path) -> Option<u16> {
    let out = ffprobe(
        path,
        &["-select_streams", "v:0", "-show_entries", "stream=r_frame_rate"],
    )?;
    parse_rate(out.lines().next()?).map(|f| f.round() as u16)
}

/// Source frame size of the first video stream.
pub fn probe_dimensions(path: &Path) -> Option<(u32, u32)> {
    let out = ffprobe(
        path,
        &["-select_streams", "v:0", "-show_entries", "stream=width,height"],
    )?;
    let mut lines = out.lines();
    let width = lines.next()?.trim().parse().ok()?;
    let height = lines.next()?.trim().parse().ok()?;
    Some((width, height))
}

pub fn get_frame_count(path: &Path) -> Option<u64> {
    let frames = ffprobe(
        path,
        &["-select_streams", "v:0", "-show_entries", "stream=nb_frames"],
    )?;
    if let Ok(count) = frames.parse::<u64>() {
        return Some(count);
    }

    // Containers without nb_frames: estimate from duration.
    let duration: f64 = ffprobe(path, &["-show_entries", "format=duration"])?
        .parse()
        .ok()?;
    Some((duration * detect_fps(path)? as f64).round() as u64)
}
