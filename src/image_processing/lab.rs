//! sRGB <-> CIE L*a*b* (D65) conversion in double precision.
//!
//! Lightness is carried as a float so that pixels the equalizer leaves alone
//! come back bit-exact after the round trip.

use palette::white_point::D65;
use palette::{FromColor, LinSrgb, Srgb};

pub type Lab = palette::Lab<D65, f64>;

/// 8-bit view of L* used for histogramming
pub trait Lightness {
    /// Lightness scaled to the 8-bit range
    fn lightness_u8(&self) -> u8;

    /// Shift lightness by a step expressed in 8-bit lightness units
    fn shift_lightness(&mut self, delta_u8: i32);
}

impl Lightness for Lab {
    fn lightness_u8(&self) -> u8 {
        (self.l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8
    }

    fn shift_lightness(&mut self, delta_u8: i32) {
        self.l += f64::from(delta_u8) * 100.0 / 255.0;
    }
}

fn to_u8(c: f64) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

pub fn rgb_to_lab(rgb: [u8; 3]) -> Lab {
    let srgb = Srgb::new(
        f64::from(rgb[0]) / 255.0,
        f64::from(rgb[1]) / 255.0,
        f64::from(rgb[2]) / 255.0,
    );
    let linear: LinSrgb<f64> = srgb.into_linear();
    Lab::from_color(linear)
}

/// Convert back to 8-bit sRGB, clamping anything that fell out of gamut
pub fn lab_to_rgb(lab: Lab) -> [u8; 3] {
    let linear = LinSrgb::<f64>::from_color(lab);
    let linear = LinSrgb::new(
        linear.red.clamp(0.0, 1.0),
        linear.green.clamp(0.0, 1.0),
        linear.blue.clamp(0.0, 1.0),
    );
    let srgb: Srgb<f64> = Srgb::from_linear(linear);
    [to_u8(srgb.red), to_u8(srgb.green), to_u8(srgb.blue)]
}
