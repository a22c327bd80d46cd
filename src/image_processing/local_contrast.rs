use image::{DynamicImage, GrayImage, Luma, RgbImage};

use super::clahe::equalize_adaptive;
use super::lab::{lab_to_rgb, rgb_to_lab, Lightness};
use super::params::TileGrid;
use super::Enhancement;

/// Local-contrast enhancement.
///
/// Grayscale images are equalized directly. Color images are equalized on
/// their L* channel only, so hue and chroma stay put. Any other channel count
/// is handed back untouched with a diagnostic note.
pub fn enhance_local_contrast(
    image: &DynamicImage,
    clip_limit: f64,
    tile_grid: TileGrid,
) -> Enhancement {
    match image.color().channel_count() {
        1 => {
            let gray = image.to_luma8();
            Enhancement::applied(DynamicImage::ImageLuma8(equalize_adaptive(
                &gray, clip_limit, tile_grid,
            )))
        }
        3 => {
            let rgb = image.to_rgb8();
            Enhancement::applied(DynamicImage::ImageRgb8(equalize_lightness(
                &rgb, clip_limit, tile_grid,
            )))
        }
        channels => Enhancement::unsupported(
            image.clone(),
            format!("format not supported ({} channels), image left unchanged", channels),
        ),
    }
}

/// Equalize the lightness channel of a color image, leaving a*/b* untouched
pub fn equalize_lightness(rgb: &RgbImage, clip_limit: f64, tile_grid: TileGrid) -> RgbImage {
    let (width, height) = rgb.dimensions();

    let labs: Vec<_> = rgb.pixels().map(|p| rgb_to_lab(p.0)).collect();
    let lightness = GrayImage::from_fn(width, height, |x, y| {
        Luma([labs[(y * width + x) as usize].lightness_u8()])
    });

    let equalized = equalize_adaptive(&lightness, clip_limit, tile_grid);

    let mut output = RgbImage::new(width, height);
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let before = lightness.get_pixel(x, y)[0];
        let after = equalized.get_pixel(x, y)[0];

        if before == after {
            *pixel = *rgb.get_pixel(x, y);
            continue;
        }

        let mut lab = labs[(y * width + x) as usize];
        lab.shift_lightness(i32::from(after) - i32::from(before));
        pixel.0 = lab_to_rgb(lab);
    }

    output
}
