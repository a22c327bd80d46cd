pub mod batch;
pub mod clahe;
pub mod discovery;
pub mod lab;
pub mod local_contrast;
pub mod params;
pub mod saturation;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub use batch::{BatchOutcome, BatchSummary};
pub use discovery::{
    discover, discover_excluding, BatchItem, DiscoveryError, InputSpec, ScanExclusions,
    RECOGNIZED_EXTENSIONS,
};
pub use local_contrast::enhance_local_contrast;
pub use params::TileGrid;
pub use saturation::enhance_saturation;

use crate::utils::{create_output_filename, verbose_println};

pub const ENHANCED_SUFFIX: &str = "_enhanced";

/// An enhanced image plus any non-fatal diagnostic raised while producing it
#[derive(Debug, Clone)]
pub struct Enhancement {
    pub image: DynamicImage,
    pub note: Option<String>,
}

impl Enhancement {
    pub fn applied(image: DynamicImage) -> Self {
        Self { image, note: None }
    }

    pub fn unsupported(image: DynamicImage, note: impl Into<String>) -> Self {
        Self {
            image,
            note: Some(note.into()),
        }
    }
}

/// The enhancement strategy applied to every image of a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Enhancer {
    /// CLAHE on the lightness channel
    LocalContrast { clip_limit: f64, tile_grid: TileGrid },
    /// Interpolate/extrapolate between the luminance image and the original
    Saturation { factor: f64 },
}

impl Enhancer {
    /// Build a local-contrast enhancer from raw parameter text, falling back
    /// to defaults for anything unparseable
    pub fn local_contrast_from_input(clip_limit: &str, tile_grid: &str) -> Self {
        Enhancer::LocalContrast {
            clip_limit: params::clip_limit_or_default(clip_limit),
            tile_grid: params::tile_grid_or_default(tile_grid),
        }
    }

    pub fn saturation_from_input(factor: &str) -> Self {
        Enhancer::Saturation {
            factor: params::saturation_factor_or_default(factor),
        }
    }

    pub fn apply(&self, image: &DynamicImage) -> Enhancement {
        match *self {
            Enhancer::LocalContrast { clip_limit, tile_grid } => {
                enhance_local_contrast(image, clip_limit, tile_grid)
            }
            Enhancer::Saturation { factor } => {
                Enhancement::applied(DynamicImage::ImageRgb8(enhance_saturation(image, factor)))
            }
        }
    }
}

impl Default for Enhancer {
    fn default() -> Self {
        Enhancer::LocalContrast {
            clip_limit: params::DEFAULT_CLIP_LIMIT,
            tile_grid: params::DEFAULT_TILE_GRID,
        }
    }
}

impl fmt::Display for Enhancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enhancer::LocalContrast { clip_limit, tile_grid } => {
                write!(f, "local contrast (clip limit {}, tiles {})", clip_limit, tile_grid)
            }
            Enhancer::Saturation { factor } => write!(f, "saturation (factor {})", factor),
        }
    }
}

/// How output files are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NamingPolicy {
    /// `{stem}_enhanced{.ext}`
    #[default]
    Suffix,
    /// Original file name, written into the output directory
    Preserve,
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Refusing to write over the inputs in {0}: preserve naming needs a separate output directory")]
    OverwritesInputs(PathBuf),
    #[error("Failed to initialize worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub output_dir: PathBuf,
    pub naming: NamingPolicy,
    /// 1 processes items strictly one after another
    pub jobs: usize,
    pub dry_run: bool,
    pub verbose: bool,
}

impl BatchConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            naming: NamingPolicy::default(),
            jobs: 1,
            dry_run: false,
            verbose: false,
        }
    }
}

/// Applies one enhancer to every discovered image, isolating failures per item
pub struct BatchRunner {
    enhancer: Enhancer,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(enhancer: Enhancer, config: BatchConfig) -> Self {
        Self { enhancer, config }
    }

    pub fn enhancer(&self) -> &Enhancer {
        &self.enhancer
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Create the output directory (and parents); a no-op if it already exists
    pub fn ensure_output_dir(&self) -> Result<(), BatchError> {
        std::fs::create_dir_all(&self.config.output_dir).map_err(|source| BatchError::OutputDir {
            path: self.config.output_dir.clone(),
            source,
        })
    }

    pub fn output_path_for(&self, item: &BatchItem) -> PathBuf {
        self.config
            .output_dir
            .join(create_output_filename(&item.source, self.config.naming))
    }

    pub fn run(&self, input: &InputSpec) -> Result<Vec<BatchOutcome>, BatchError> {
        self.run_with_progress(input, |_, _, _| {})
    }

    /// Discover inputs and process them, calling `on_item(outcome, done, total)`
    /// after each item. Outcomes come back in discovery order.
    pub fn run_with_progress<F>(
        &self,
        input: &InputSpec,
        on_item: F,
    ) -> Result<Vec<BatchOutcome>, BatchError>
    where
        F: Fn(&BatchOutcome, usize, usize) + Send + Sync,
    {
        let suffix = match self.config.naming {
            NamingPolicy::Suffix => Some(ENHANCED_SUFFIX),
            NamingPolicy::Preserve => None,
        };
        let exclusions = ScanExclusions::new(&self.config.output_dir, suffix);
        let items = discover_excluding(input, &exclusions)?;
        verbose_println(
            self.config.verbose,
            &format!("Found {} image files", items.len()),
        );
        self.run_items(&items, on_item)
    }

    pub fn run_items<F>(&self, items: &[BatchItem], on_item: F) -> Result<Vec<BatchOutcome>, BatchError>
    where
        F: Fn(&BatchOutcome, usize, usize) + Send + Sync,
    {
        self.check_preserve_target(items)?;
        if !self.config.dry_run {
            self.ensure_output_dir()?;
        }

        let processed = AtomicUsize::new(0);
        let process = |item: &BatchItem| {
            let outcome = self.process_item(item);
            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            on_item(&outcome, done, items.len());
            outcome
        };

        if self.config.jobs <= 1 {
            return Ok(items.iter().map(process).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()?;
        Ok(pool.install(|| items.par_iter().map(process).collect()))
    }

    /// Preserve naming into a directory that holds one of the sources would
    /// replace that source with its enhanced copy
    fn check_preserve_target(&self, items: &[BatchItem]) -> Result<(), BatchError> {
        if self.config.naming != NamingPolicy::Preserve {
            return Ok(());
        }
        // a directory that does not exist yet cannot hold any source
        let Ok(output_dir) = fs::canonicalize(&self.config.output_dir) else {
            return Ok(());
        };

        for item in items {
            let parent = match item.source.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            if fs::canonicalize(parent).is_ok_and(|p| p == output_dir) {
                return Err(BatchError::OverwritesInputs(self.config.output_dir.clone()));
            }
        }
        Ok(())
    }

    /// Process one item; nothing that goes wrong here escapes as an error
    pub fn process_item(&self, item: &BatchItem) -> BatchOutcome {
        catch_unwind(AssertUnwindSafe(|| self.process_item_unguarded(item))).unwrap_or_else(
            |panic| {
                let detail = if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else {
                    "unknown panic".to_string()
                };
                BatchOutcome::Failed {
                    source: item.source.clone(),
                    error: format!("panicked while processing: {}", detail),
                }
            },
        )
    }

    fn process_item_unguarded(&self, item: &BatchItem) -> BatchOutcome {
        let output = self.output_path_for(item);

        if self.config.dry_run {
            return BatchOutcome::Succeeded {
                source: item.source.clone(),
                output,
                note: Some("dry run, nothing written".to_string()),
            };
        }

        verbose_println(
            self.config.verbose,
            &format!("Processing: {}", item.source.display()),
        );

        let image = match open_image(&item.source) {
            Ok(image) => image,
            Err(e) => {
                return BatchOutcome::Skipped {
                    source: item.source.clone(),
                    reason: format!("{:#}", e),
                }
            }
        };

        let enhancement = self.enhancer.apply(&image);
        drop(image);

        if let Err(e) = save_image(&enhancement.image, &output) {
            return BatchOutcome::Failed {
                source: item.source.clone(),
                error: format!("{:#}", e),
            };
        }

        BatchOutcome::Succeeded {
            source: item.source.clone(),
            output,
            note: enhancement.note,
        }
    }
}

/// Decode an image, sniffing the format from content rather than extension.
///
/// GIF frames always decode as RGBA; a fully opaque one is handed on as RGB.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image header: {}", path.display()))?;
    let format = reader.format();
    let image = reader
        .decode()
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;

    if format == Some(ImageFormat::Gif) {
        return Ok(drop_opaque_alpha(image));
    }
    Ok(image)
}

fn drop_opaque_alpha(image: DynamicImage) -> DynamicImage {
    let opaque = matches!(
        &image,
        DynamicImage::ImageRgba8(rgba) if rgba.pixels().all(|p| p[3] == u8::MAX)
    );
    if opaque {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image
    }
}

/// Encode in the format implied by the output extension
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("Failed to save image: {}", path.display()))
}

/// Run one batch with the default sequential configuration
pub fn run_batch(
    input: &InputSpec,
    output_dir: &Path,
    enhancer: Enhancer,
    naming: NamingPolicy,
) -> Result<Vec<BatchOutcome>, BatchError> {
    let config = BatchConfig {
        naming,
        ..BatchConfig::new(output_dir)
    };
    BatchRunner::new(enhancer, config).run(input)
}
