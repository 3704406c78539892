//! Detect red disks in a synthetic I420 frame and print a JSON report.
//!
//! Usage: detect_synthetic [params.json]

use chroma_circles::core::{YuvFrame, YuvFrameView};
use chroma_circles::{CircleCandidate, CircleDetector, CircleDetectorParams, DetectScratch};
use serde::Serialize;

#[cfg(feature = "tracing")]
use chroma_circles::core::{init_tracing, TraceFormat};

const WIDTH: usize = 320;
const HEIGHT: usize = 240;

#[derive(Serialize)]
struct Report {
    width: usize,
    height: usize,
    raw_labels: usize,
    params: CircleDetectorParams,
    circles: Vec<CircleCandidate>,
}

fn load_params() -> Result<CircleDetectorParams, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(CircleDetectorParams::default()),
    }
}

fn paint_disk(frame: &mut YuvFrame, cx: usize, cy: usize, r: usize, yuv: (u8, u8, u8)) {
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            let dx = x as isize - cx as isize;
            let dy = y as isize - cy as isize;
            if dx * dx + dy * dy <= (r * r) as isize {
                frame.put(x, y, yuv);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(TraceFormat::Text);
    #[cfg(not(feature = "tracing"))]
    chroma_circles::core::init_with_level(log::LevelFilter::Debug)?;

    let params = load_params()?;

    let mut frame = YuvFrame::new(WIDTH, HEIGHT);
    frame.fill_y(60);
    let red = (150, 91, 240);
    paint_disk(&mut frame, 60, 60, 18, red);
    paint_disk(&mut frame, 200, 80, 30, red);
    paint_disk(&mut frame, 120, 180, 10, red);
    // Blue disk: ignored by the default red target.
    paint_disk(&mut frame, 260, 190, 20, (90, 240, 110));

    // Round-trip through a packed buffer, the way a decoder hands frames over.
    let i420 = frame.to_i420();
    let view = YuvFrameView::from_i420(WIDTH, HEIGHT, &i420)?;

    let detector = CircleDetector::new(params);
    let mut scratch = DetectScratch::new(WIDTH, HEIGHT);
    let mut out = vec![CircleCandidate::default(); detector.params().max_output.max(1)];
    let report = detector.detect_into(&view, &mut scratch, &mut out)?;
    out.truncate(report.candidates);

    let report = Report {
        width: WIDTH,
        height: HEIGHT,
        raw_labels: report.raw_labels,
        params: detector.params().clone(),
        circles: out,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
