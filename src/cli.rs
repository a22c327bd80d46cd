use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use strum_macros::{Display, EnumString};

use crate::image_processing::params::{
    parse_clip_limit, parse_saturation_factor, parse_tile_grid, DEFAULT_CLIP_LIMIT,
    DEFAULT_SATURATION_FACTOR, DEFAULT_TILE_GRID,
};
use crate::image_processing::{BatchConfig, Enhancer, InputSpec, NamingPolicy};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    /// Contrast-limited adaptive histogram equalization on the lightness channel
    #[value(name = "clahe")]
    #[strum(to_string = "clahe", serialize = "localContrast", serialize = "local-contrast")]
    Clahe,
    /// Global color saturation scaling
    #[value(name = "saturation")]
    #[strum(to_string = "saturation", serialize = "color")]
    Saturation,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputNaming {
    /// Write `{name}_enhanced.{ext}`
    #[value(name = "suffix")]
    Suffix,
    /// Keep the original file name (use a separate output directory)
    #[value(name = "preserve")]
    Preserve,
}

impl From<OutputNaming> for NamingPolicy {
    fn from(naming: OutputNaming) -> Self {
        match naming {
            OutputNaming::Suffix => NamingPolicy::Suffix,
            OutputNaming::Preserve => NamingPolicy::Preserve,
        }
    }
}

impl From<NamingPolicy> for OutputNaming {
    fn from(naming: NamingPolicy) -> Self {
        match naming {
            NamingPolicy::Suffix => OutputNaming::Suffix,
            NamingPolicy::Preserve => OutputNaming::Preserve,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "image-enhancer",
    about = "Batch image enhancement: local contrast (CLAHE) or color saturation",
    long_about = "
Image Enhancer

Applies one enhancement to every image of a folder (or an explicit list of
files) and writes the results to an output folder. A file that cannot be read
or written is reported and skipped; the rest of the batch carries on.

Algorithms:
• clahe       contrast-limited adaptive histogram equalization on the L* channel
• saturation  scale color saturation (0 = gray, 1 = unchanged, >1 = more vivid)

Parameters that are empty or not numbers fall back to their defaults.

Example Usage:
  # Local contrast on a folder, default clip limit 2.0 and 8x8 tiles
  image-enhancer -i ~/Photos -o ~/enhanced

  # Stronger contrast with a coarser grid
  image-enhancer -i ~/Photos -o ~/enhanced --clip-limit 3.5 --tile-grid 4x4

  # Boost saturation of two files, keeping their names
  image-enhancer -i a.jpg -i b.png -o ~/vivid -a saturation --factor 1.8 --naming preserve

  # See what would be written
  image-enhancer -i ~/Photos -o ~/enhanced --dry-run --verbose"
)]
pub struct Args {
    /// Input directory or image files (can be specified multiple times)
    #[arg(short = 'i', long = "input", value_name = "DIR|FILE")]
    pub input_paths: Vec<PathBuf>,

    /// Output directory for enhanced images (created if missing)
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "enhanced")]
    pub output_dir: PathBuf,

    /// Enhancement algorithm
    #[arg(short = 'a', long = "algorithm", default_value = "clahe")]
    pub algorithm: Algorithm,

    /// CLAHE clip limit (positive number)
    #[arg(long = "clip-limit", default_value = "2.0", value_name = "LIMIT")]
    pub clip_limit: String,

    /// CLAHE tile grid (COLSxROWS)
    #[arg(long = "tile-grid", default_value = "8x8", value_name = "COLSxROWS")]
    pub tile_grid: String,

    /// Saturation factor (0 = grayscale, 1 = unchanged)
    #[arg(long = "factor", default_value = "1.5", value_name = "FACTOR")]
    pub factor: String,

    /// Output naming: suffix (`photo_enhanced.jpg`) or preserve (`photo.jpg`)
    #[arg(long = "naming", default_value = "suffix")]
    pub naming: OutputNaming,

    /// Scan subdirectories of the input directory too
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Number of parallel jobs (1 = sequential, 0 = one per CPU core)
    #[arg(short = 'j', long = "jobs", default_value = "1", value_name = "N")]
    pub jobs: usize,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Emit progress and results as JSON lines instead of console output
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Resolve inputs and show output paths without reading or writing images
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// JSON configuration file; command-line values take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl Args {
    /// The enhancer described by the arguments, with defaults substituted
    pub fn enhancer(&self) -> Enhancer {
        match self.algorithm {
            Algorithm::Clahe => Enhancer::local_contrast_from_input(&self.clip_limit, &self.tile_grid),
            Algorithm::Saturation => Enhancer::saturation_from_input(&self.factor),
        }
    }

    /// One warning per parameter of the chosen algorithm that had to be defaulted
    pub fn parameter_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.algorithm {
            Algorithm::Clahe => {
                if parse_clip_limit(&self.clip_limit).is_none() {
                    warnings.push(format!(
                        "Invalid clip limit '{}', using default {}",
                        self.clip_limit, DEFAULT_CLIP_LIMIT
                    ));
                }
                if parse_tile_grid(&self.tile_grid).is_none() {
                    warnings.push(format!(
                        "Invalid tile grid '{}', using default {}",
                        self.tile_grid, DEFAULT_TILE_GRID
                    ));
                }
            }
            Algorithm::Saturation => {
                if parse_saturation_factor(&self.factor).is_none() {
                    warnings.push(format!(
                        "Invalid saturation factor '{}', using default {}",
                        self.factor, DEFAULT_SATURATION_FACTOR
                    ));
                }
            }
        }
        warnings
    }

    pub fn input_spec(&self) -> InputSpec {
        InputSpec::from_paths(&self.input_paths, self.recursive)
    }

    pub fn parallel_jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            output_dir: self.output_dir.clone(),
            naming: self.naming.into(),
            jobs: self.parallel_jobs(),
            dry_run: self.dry_run,
            // verbose lines would corrupt the JSON stream
            verbose: self.verbose && !self.json_progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::TileGrid;

    #[test]
    fn test_parse_command_line() {
        let args = Args::try_parse_from([
            "image-enhancer",
            "-i",
            "a.jpg",
            "-i",
            "b.jpg",
            "-o",
            "out",
            "-a",
            "saturation",
            "--factor",
            "0.5",
            "--naming",
            "preserve",
        ])
        .unwrap();

        assert_eq!(args.input_paths, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
        assert_eq!(args.algorithm, Algorithm::Saturation);
        assert_eq!(args.enhancer(), Enhancer::Saturation { factor: 0.5 });
        assert_eq!(args.batch_config().naming, NamingPolicy::Preserve);
        assert!(args.parameter_warnings().is_empty());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["image-enhancer", "-i", "photos"]).unwrap();
        assert_eq!(args.output_dir, PathBuf::from("enhanced"));
        assert_eq!(
            args.enhancer(),
            Enhancer::LocalContrast { clip_limit: 2.0, tile_grid: TileGrid::new(8, 8) }
        );
        assert_eq!(args.parallel_jobs(), 1);
    }

    #[test]
    fn test_bad_numbers_fall_back_with_warnings() {
        let args = Args::try_parse_from([
            "image-enhancer",
            "-i",
            "photos",
            "--clip-limit",
            "",
            "--tile-grid",
            "lots",
        ])
        .unwrap();

        assert_eq!(args.enhancer(), Enhancer::default());
        assert_eq!(args.parameter_warnings().len(), 2);
    }

    #[test]
    fn test_algorithm_names_from_text() {
        assert_eq!("clahe".parse::<Algorithm>().unwrap(), Algorithm::Clahe);
        assert_eq!("localContrast".parse::<Algorithm>().unwrap(), Algorithm::Clahe);
        assert_eq!("Saturation".parse::<Algorithm>().unwrap(), Algorithm::Saturation);
        assert!("sharpen".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Saturation.to_string(), "saturation");
    }

    #[test]
    fn test_json_mode_silences_verbose() {
        let args = Args {
            verbose: true,
            json_progress: true,
            ..Default::default()
        };
        assert!(!args.batch_config().verbose);
    }
}

// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            input_paths: vec![],
            output_dir: PathBuf::new(),
            algorithm: Algorithm::Clahe,
            clip_limit: "2.0".to_string(),
            tile_grid: "8x8".to_string(),
            factor: "1.5".to_string(),
            naming: OutputNaming::Suffix,
            recursive: false,
            jobs: 1,
            verbose: false,
            json_progress: false,
            dry_run: false,
            config_file: None,
        }
    }
}
