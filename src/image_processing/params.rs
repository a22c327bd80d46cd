//! Enhancement parameters and the parse-or-default contract.
//!
//! Parameter text can come from a prompt, a config file or the command line.
//! Whatever the source, empty or malformed input never fails the run: it is
//! replaced by the documented default.

use std::fmt;

pub const DEFAULT_CLIP_LIMIT: f64 = 2.0;
pub const DEFAULT_TILE_GRID: TileGrid = TileGrid { cols: 8, rows: 8 };
pub const DEFAULT_SATURATION_FACTOR: f64 = 1.5;

/// Number of tiles the image is split into for local equalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub cols: u32,
    pub rows: u32,
}

impl TileGrid {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        DEFAULT_TILE_GRID
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// Parse a clip limit; `None` unless the text is a finite real > 0
pub fn parse_clip_limit(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Parse a saturation factor; `None` unless the text is a finite real >= 0
pub fn parse_saturation_factor(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parse a tile grid written as `8x8`, `8,8` or `8`
pub fn parse_tile_grid(raw: &str) -> Option<TileGrid> {
    let raw = raw.trim().to_lowercase();
    let parts: Vec<&str> = raw.split(['x', ',']).map(str::trim).collect();

    let (cols, rows) = match parts.as_slice() {
        [n] => {
            let n = n.parse::<u32>().ok()?;
            (n, n)
        }
        [c, r] => (c.parse::<u32>().ok()?, r.parse::<u32>().ok()?),
        _ => return None,
    };

    if cols == 0 || rows == 0 {
        return None;
    }

    Some(TileGrid { cols, rows })
}

pub fn clip_limit_or_default(raw: &str) -> f64 {
    parse_clip_limit(raw).unwrap_or(DEFAULT_CLIP_LIMIT)
}

pub fn saturation_factor_or_default(raw: &str) -> f64 {
    parse_saturation_factor(raw).unwrap_or(DEFAULT_SATURATION_FACTOR)
}

pub fn tile_grid_or_default(raw: &str) -> TileGrid {
    parse_tile_grid(raw).unwrap_or(DEFAULT_TILE_GRID)
}
