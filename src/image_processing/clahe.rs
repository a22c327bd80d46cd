//! Contrast-limited adaptive histogram equalization on one 8-bit channel.
//!
//! The image is split into a grid of tiles, each tile gets its own clipped
//! histogram mapping, and every pixel is remapped by bilinear blending of the
//! mappings of the four nearest tile centres.

use image::GrayImage;

use super::params::TileGrid;

const HIST_SIZE: usize = 256;

type Lut = [u8; HIST_SIZE];

/// Mirror an out-of-range coordinate back into `0..len` without repeating the
/// edge sample (`dcb|abcd|cba`).
fn reflect_101(i: u32, len: u32) -> u32 {
    if len <= 1 {
        return 0;
    }
    if i < len {
        i
    } else {
        // padding never exceeds len - 1, so one reflection is enough
        (2 * len - 2).saturating_sub(i)
    }
}

/// Number of samples a bin may hold before it is clipped
fn clip_count(clip_limit: f64, tile_area: u32) -> u32 {
    let limit = (clip_limit * f64::from(tile_area) / HIST_SIZE as f64).floor();
    if limit.is_finite() && limit >= 1.0 {
        limit as u32
    } else {
        1
    }
}

/// Cap every bin at `limit` and hand the excess back evenly
fn clip_histogram(hist: &mut [u32; HIST_SIZE], limit: u32) {
    let mut clipped = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / HIST_SIZE as u32;
    let mut residual = clipped - batch * HIST_SIZE as u32;

    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (HIST_SIZE / residual as usize).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn identity_lut() -> Lut {
    let mut lut = [0u8; HIST_SIZE];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = i as u8;
    }
    lut
}

fn tile_lut(mut hist: [u32; HIST_SIZE], tile_area: u32, clip_limit: f64) -> Lut {
    // a flat tile has nothing to equalize
    if hist.iter().filter(|&&count| count > 0).count() <= 1 {
        return identity_lut();
    }

    clip_histogram(&mut hist, clip_count(clip_limit, tile_area));

    let scale = (HIST_SIZE - 1) as f64 / f64::from(tile_area);
    let mut lut = [0u8; HIST_SIZE];
    let mut sum = 0u32;
    for (i, count) in hist.iter().enumerate() {
        sum += count;
        lut[i] = (f64::from(sum) * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Interpolation coordinates along one axis: (lower tile, upper tile, weight of upper)
fn axis_weights(len: u32, tile_len: u32, tiles: u32) -> Vec<(usize, usize, f64)> {
    let inv = 1.0 / f64::from(tile_len);
    (0..len)
        .map(|i| {
            let pos = f64::from(i) * inv - 0.5;
            let lower = pos.floor();
            let weight = pos - lower;
            let lower = lower as i64;
            let t1 = lower.max(0) as usize;
            let t2 = (lower + 1).min(i64::from(tiles) - 1).max(0) as usize;
            (t1, t2, weight)
        })
        .collect()
}

/// Equalize `gray` tile by tile.
///
/// Output has the same dimensions as the input. Grids finer than one pixel
/// per tile are capped to the image size.
pub fn equalize_adaptive(gray: &GrayImage, clip_limit: f64, grid: TileGrid) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tiles_x = grid.cols.clamp(1, width);
    let tiles_y = grid.rows.clamp(1, height);
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;

    let mut luts: Vec<Lut> = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; HIST_SIZE];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect_101(y, height);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect_101(x, width);
                    hist[gray.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }
            luts.push(tile_lut(hist, tile_area, clip_limit));
        }
    }

    let xs = axis_weights(width, tile_w, tiles_x);
    let ys = axis_weights(height, tile_h, tiles_y);
    let cols = tiles_x as usize;

    GrayImage::from_fn(width, height, |x, y| {
        let v = gray.get_pixel(x, y)[0] as usize;
        let (tx1, tx2, xa) = xs[x as usize];
        let (ty1, ty2, ya) = ys[y as usize];

        let top = f64::from(luts[ty1 * cols + tx1][v]) * (1.0 - xa)
            + f64::from(luts[ty1 * cols + tx2][v]) * xa;
        let bottom = f64::from(luts[ty2 * cols + tx1][v]) * (1.0 - xa)
            + f64::from(luts[ty2 * cols + tx2][v]) * xa;
        let value = top * (1.0 - ya) + bottom * ya;

        image::Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}
