//! Coverage, disjointness and round-trip checks over randomized masks.

use ink_factory::binarizer::{binarize, Mask, PixelGrid};
use ink_factory::inspector::{inspect_stream, render_frame};
use ink_factory::stream::{read_frames, read_json, write_frames, write_json};
use ink_factory::tiler::{tile_frames, tile_mask, Frame, Rect, Tiler};
use ink_factory::{PixelRect, RECORD_SIZE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_mask(rng: &mut StdRng, width: usize, height: usize, density: f64) -> Mask {
    let cells = (0..width * height).map(|_| rng.gen_bool(density)).collect();
    Mask::from_cells(cells, width, height).unwrap()
}

/// Asserts every ink cell is covered exactly once and nothing else is.
fn assert_exact_cover(mask: &Mask, rects: &[Rect]) {
    let mut hits = vec![0u32; mask.width() * mask.height()];
    for r in rects {
        assert!(r.w >= 1 && r.h >= 1, "empty rect {r:?}");
        assert!(r.x + r.w <= mask.width() && r.y + r.h <= mask.height(), "{r:?} out of bounds");
        for y in r.y..r.y + r.h {
            for x in r.x..r.x + r.w {
                hits[y * mask.width() + x] += 1;
            }
        }
    }
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            let expected = u32::from(mask.get(x, y));
            assert_eq!(hits[y * mask.width() + x], expected, "cell ({x}, {y})");
        }
    }
}

#[test]
fn random_masks_are_covered_exactly() {
    let mut rng = StdRng::seed_from_u64(0x1ee7);
    let mut tiler = Tiler::new();
    for _ in 0..300 {
        let width = rng.gen_range(1..=24);
        let height = rng.gen_range(1..=24);
        let density = rng.gen_range(0.0..=1.0);
        let mask = random_mask(&mut rng, width, height, density);
        let rects = tiler.tile(&mask);
        assert_exact_cover(&mask, &rects);
    }
}

#[test]
fn rects_come_out_in_scan_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let mask = random_mask(&mut rng, 40, 30, 0.5);
    let rects = tile_mask(&mask);
    for pair in rects.windows(2) {
        assert!((pair[0].y, pair[0].x) < (pair[1].y, pair[1].x));
    }
}

#[test]
fn tiling_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    let masks: Vec<Mask> = (0..16)
        .map(|_| random_mask(&mut rng, 33, 17, 0.6))
        .collect();

    let sequential: Vec<Frame> = masks.iter().map(|m| Tiler::new().tile(m)).collect();
    assert_eq!(tile_frames(&masks), sequential);
    assert_eq!(tile_frames(&masks), sequential);
}

#[test]
fn degenerate_shapes() {
    for (w, h) in [(1, 1), (1, 9), (9, 1), (5, 5)] {
        let full = Mask::from_cells(vec![true; w * h], w, h).unwrap();
        assert_eq!(tile_mask(&full), vec![Rect::new(0, 0, w, h)]);

        let empty = Mask::new(w, h).unwrap();
        assert!(tile_mask(&empty).is_empty());
    }
}

#[test]
fn checkerboard_is_all_single_pixels() {
    let rows = ["1010", "0101", "1010"];
    let mask = Mask::from_rows(&rows).unwrap();
    let rects = tile_mask(&mask);
    assert_eq!(rects.len(), 6);
    assert!(rects.iter().all(|r| r.w == 1 && r.h == 1));
}

#[test]
fn binary_and_json_carry_the_same_frames() {
    let mut rng = StdRng::seed_from_u64(99);
    let masks: Vec<Mask> = (0..8)
        .map(|i| random_mask(&mut rng, 20, 12, i as f64 / 7.0))
        .collect();
    let frames = tile_frames(&masks);

    let bytes = write_frames(Vec::new(), &frames).unwrap();
    let total_rects: usize = frames.iter().map(Vec::len).sum();
    assert_eq!(bytes.len(), (total_rects + frames.len()) * RECORD_SIZE);

    let decoded: Vec<Frame> = read_frames(&bytes)
        .unwrap()
        .into_iter()
        .map(|f| f.into_iter().map(Rect::from).collect())
        .collect();
    assert_eq!(decoded, frames);

    let mut json = Vec::new();
    write_json(&mut json, &frames).unwrap();
    assert_eq!(read_json(json.as_slice()).unwrap(), decoded);
}

#[test]
fn playback_reproduces_the_mask() {
    let mut rng = StdRng::seed_from_u64(5);
    let mask = random_mask(&mut rng, 31, 23, 0.45);
    let bytes = write_frames(Vec::new(), &[tile_mask(&mask)]).unwrap();

    let frames = read_frames(&bytes).unwrap();
    assert_eq!(render_frame(&frames[0], 31, 23).unwrap(), mask);

    let report = inspect_stream(bytes.as_slice(), 31, 23).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.ink_pixels, mask.count_foreground() as u64);
}

#[test]
fn image_to_bytes_end_to_end() {
    // 3x3 image: dark 2x2 block top-left, dark pixel bottom-right, gray 153
    // at the threshold counts as ink.
    let px = |v: u8| [v, v, v];
    let rows = [
        [px(0), px(20), px(255)],
        [px(153), px(10), px(154)],
        [px(255), px(255), px(0)],
    ];
    let data: Vec<u8> = rows.iter().flatten().flatten().copied().collect();
    let grid = PixelGrid::new(&data, 3, 3).unwrap();

    let frame = tile_mask(&binarize(&grid, 153));
    let bytes = write_frames(Vec::new(), &[frame]).unwrap();

    assert_eq!(bytes.len(), 24);
    assert_eq!(
        read_frames(&bytes).unwrap(),
        vec![vec![PixelRect::new(0, 0, 2, 2), PixelRect::new(2, 2, 1, 1)]]
    );
}
