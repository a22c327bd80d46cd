use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// ITU-R 601-2 luma in 16.16 fixed point (`(299 R + 587 G + 114 B) / 1000`, rounded)
pub fn luminance(rgb: [u8; 3]) -> u8 {
    let weighted = u32::from(rgb[0]) * 19_595 + u32::from(rgb[1]) * 38_470 + u32::from(rgb[2]) * 7_471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Single-channel luminance projection of a color image
pub fn luminance_projection(img: &RgbImage) -> GrayImage {
    let (width, height) = img.dimensions();
    GrayImage::from_fn(width, height, |x, y| Luma([luminance(img.get_pixel(x, y).0)]))
}

/// Scale color saturation by `factor`.
///
/// Each sample becomes `lum + factor * (value - lum)`: 0.0 gives the
/// luminance image, 1.0 the input, larger values push colors further from
/// gray. The input is expanded to RGB first, so alpha and palette data are
/// dropped.
pub fn enhance_saturation(image: &DynamicImage, factor: f64) -> RgbImage {
    let rgb = image.to_rgb8();
    let gray = luminance_projection(&rgb);

    let (width, height) = rgb.dimensions();
    let mut output = RgbImage::new(width, height);

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let lum = f64::from(gray.get_pixel(x, y)[0]);
        let mut channels = [0u8; 3];
        for (out, &value) in channels.iter_mut().zip(pixel.0.iter()) {
            *out = (lum + factor * (f64::from(value) - lum))
                .round()
                .clamp(0.0, 255.0) as u8;
        }
        output.put_pixel(x, y, Rgb(channels));
    }

    output
}
