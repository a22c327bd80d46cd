use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;
use crate::image_processing::{NamingPolicy, ENHANCED_SUFFIX};

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
    )
    .map(|s| s.progress_chars("#>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    if args.input_paths.is_empty() {
        return Err(anyhow::anyhow!("No input files or directories specified"));
    }

    if args.output_dir.is_file() {
        return Err(anyhow::anyhow!(
            "Output path exists and is a file: {}",
            args.output_dir.display()
        ));
    }

    if args.jobs > 64 {
        return Err(anyhow::anyhow!(
            "Job count too high (max 64), got: {}",
            args.jobs
        ));
    }

    Ok(())
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the specified extensions
pub fn has_valid_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    match get_file_extension(path) {
        Some(ext) => extensions.iter().any(|e| e.as_ref().eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

/// Output file name for `input_path` under the given naming policy.
///
/// `Suffix` gives `{stem}_enhanced{.ext}`, `Preserve` keeps the name as is.
pub fn create_output_filename(input_path: &Path, naming: NamingPolicy) -> String {
    let file_name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    match naming {
        NamingPolicy::Preserve => file_name,
        NamingPolicy::Suffix => {
            let stem = input_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            match input_path.extension() {
                Some(ext) => format!("{}{}.{}", stem, ENHANCED_SUFFIX, ext.to_string_lossy()),
                None => format!("{}{}", stem, ENHANCED_SUFFIX),
            }
        }
    }
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_has_valid_extension() {
        let exts = ["jpg", "png", "tiff"];
        assert!(has_valid_extension(Path::new("a/b.JPG"), &exts));
        assert!(has_valid_extension(Path::new("b.Tiff"), &exts));
        assert!(!has_valid_extension(Path::new("b.tif"), &exts));
        assert!(!has_valid_extension(Path::new("README"), &exts));

        let owned = vec!["png".to_string()];
        assert!(has_valid_extension(Path::new("x.png"), &owned));
    }

    #[test]
    fn test_create_output_filename_suffix() {
        assert_eq!(
            create_output_filename(Path::new("/in/holiday.jpg"), NamingPolicy::Suffix),
            "holiday_enhanced.jpg"
        );
        assert_eq!(
            create_output_filename(Path::new("scan.v2.TIFF"), NamingPolicy::Suffix),
            "scan.v2_enhanced.TIFF"
        );
        assert_eq!(
            create_output_filename(Path::new("raw"), NamingPolicy::Suffix),
            "raw_enhanced"
        );
    }

    #[test]
    fn test_create_output_filename_preserve() {
        assert_eq!(
            create_output_filename(&PathBuf::from("/in/holiday.jpg"), NamingPolicy::Preserve),
            "holiday.jpg"
        );
    }

    #[test]
    fn test_validate_inputs() {
        let args = Args {
            input_paths: vec![PathBuf::from("photos")],
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_ok());

        let args = Args::default();
        assert!(validate_inputs(&args).is_err());

        let args = Args {
            input_paths: vec![PathBuf::from("photos")],
            jobs: 500,
            ..Default::default()
        };
        assert!(validate_inputs(&args).is_err());
    }
}
