use crate::cli::{Algorithm, Args, OutputNaming};
use crate::image_processing::NamingPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_DIR: &str = "enhanced";
const DEFAULT_CLIP_LIMIT: &str = "2.0";
const DEFAULT_TILE_GRID: &str = "8x8";
const DEFAULT_FACTOR: &str = "1.5";

/// Saved enhancer preset
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub config: EnhancerConfigJson,
}

/// Numeric parameters may be written as JSON numbers or strings; both end
/// up as the raw text the command line would have given.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancerConfigJson {
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub algorithm: Option<String>,
    pub clip_limit: Option<Value>,
    pub tile_grid: Option<Value>,
    pub factor: Option<Value>,
    pub naming: Option<String>,
    pub recursive: Option<bool>,
    pub jobs: Option<usize>,
    pub dry_run: Option<bool>,
    pub verbose: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let config = ConfigFile::load(&config_path)?;
            self.merge_from_config(config.config);

            if self.verbose && !self.json_progress {
                eprintln!("Loaded configuration from: {:?}", config_path);
            }
        }
        Ok(())
    }

    /// A value is taken from the file only while the argument still holds its default
    pub fn merge_from_config(&mut self, config: EnhancerConfigJson) {
        if self.input_paths.is_empty() {
            if let Some(input) = config.input_path {
                self.input_paths = vec![PathBuf::from(input)];
            }
        }

        if self.output_dir == Path::new(DEFAULT_OUTPUT_DIR) {
            if let Some(output) = config.output_path {
                self.output_dir = PathBuf::from(output);
            }
        }

        if self.algorithm == Algorithm::Clahe {
            if let Some(algorithm) = config.algorithm {
                self.algorithm = algorithm.parse().unwrap_or(self.algorithm);
            }
        }

        if self.naming == OutputNaming::Suffix {
            if let Some(naming) = config.naming {
                self.naming = naming
                    .parse::<NamingPolicy>()
                    .map(OutputNaming::from)
                    .unwrap_or(self.naming);
            }
        }

        // Numeric parameters - unparseable text is kept and later defaulted with a warning
        if self.clip_limit == DEFAULT_CLIP_LIMIT {
            if let Some(limit) = config.clip_limit.and_then(value_text) {
                self.clip_limit = limit;
            }
        }

        if self.tile_grid == DEFAULT_TILE_GRID {
            if let Some(grid) = config.tile_grid.and_then(value_text) {
                self.tile_grid = grid;
            }
        }

        if self.factor == DEFAULT_FACTOR {
            if let Some(factor) = config.factor.and_then(value_text) {
                self.factor = factor;
            }
        }

        if self.jobs == 1 {
            if let Some(jobs) = config.jobs {
                self.jobs = jobs;
            }
        }

        // Boolean flags - only apply if currently false (default)
        if !self.recursive {
            self.recursive = config.recursive.unwrap_or(false);
        }

        if !self.dry_run {
            self.dry_run = config.dry_run.unwrap_or(false);
        }

        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::{Enhancer, TileGrid};
    use tempfile::TempDir;

    fn cli_defaults() -> Args {
        Args {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ..Default::default()
        }
    }

    #[test]
    fn test_load_and_merge_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("preset.json");
        fs::write(
            &path,
            r#"{
                "name": "vivid",
                "config": {
                    "inputPath": "/photos",
                    "outputPath": "/photos/out",
                    "algorithm": "saturation",
                    "factor": 1.8,
                    "naming": "preserve",
                    "recursive": true,
                    "jobs": 4
                }
            }"#,
        )
        .unwrap();

        let mut args = Args {
            config_file: Some(path),
            ..cli_defaults()
        };
        args.load_and_merge_config().unwrap();

        assert_eq!(args.input_paths, vec![PathBuf::from("/photos")]);
        assert_eq!(args.output_dir, PathBuf::from("/photos/out"));
        assert_eq!(args.algorithm, Algorithm::Saturation);
        assert_eq!(args.enhancer(), Enhancer::Saturation { factor: 1.8 });
        assert_eq!(args.naming, OutputNaming::Preserve);
        assert!(args.recursive);
        assert_eq!(args.jobs, 4);
    }

    #[test]
    fn test_command_line_takes_precedence() {
        let mut args = Args {
            input_paths: vec![PathBuf::from("cli-in")],
            output_dir: PathBuf::from("cli-out"),
            clip_limit: "3.0".to_string(),
            ..cli_defaults()
        };
        args.merge_from_config(EnhancerConfigJson {
            input_path: Some("file-in".to_string()),
            output_path: Some("file-out".to_string()),
            clip_limit: Some(Value::from(9.0)),
            tile_grid: Some(Value::from("4x2")),
            ..Default::default()
        });

        assert_eq!(args.input_paths, vec![PathBuf::from("cli-in")]);
        assert_eq!(args.output_dir, PathBuf::from("cli-out"));
        assert_eq!(
            args.enhancer(),
            Enhancer::LocalContrast { clip_limit: 3.0, tile_grid: TileGrid::new(4, 2) }
        );
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let mut args = cli_defaults();
        args.merge_from_config(EnhancerConfigJson {
            algorithm: Some("sharpen".to_string()),
            naming: Some("random".to_string()),
            clip_limit: Some(Value::Bool(true)),
            ..Default::default()
        });

        assert_eq!(args.algorithm, Algorithm::Clahe);
        assert_eq!(args.naming, OutputNaming::Suffix);
        assert_eq!(args.clip_limit, DEFAULT_CLIP_LIMIT);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let mut args = Args {
            config_file: Some(path),
            ..cli_defaults()
        };
        assert!(args.load_and_merge_config().is_err());

        let mut args = Args {
            config_file: Some(tmp.path().join("missing.json")),
            ..cli_defaults()
        };
        assert!(args.load_and_merge_config().is_err());
    }
}
