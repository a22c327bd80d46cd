//! Resolve the batch input into an ordered, duplicate-free list of items.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::utils::has_valid_extension;

/// Extensions picked up by a directory scan (matched case-insensitively)
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff"];

/// Depth limit for recursive scans
const MAX_SCAN_DEPTH: usize = 10;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Input directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to read directory entry: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No images found in {0}")]
    NoImages(String),
}

/// Where the batch gets its images from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Explicit paths, processed in the order given. Directories among them
    /// are scanned in place.
    Files { paths: Vec<PathBuf>, recursive: bool },
    /// Every recognized image in a directory
    Directory { path: PathBuf, recursive: bool },
}

impl InputSpec {
    /// Explicit list without recursion into listed directories
    pub fn files(paths: Vec<PathBuf>) -> Self {
        InputSpec::Files {
            paths,
            recursive: false,
        }
    }

    /// A single directory means a scan, anything else is an explicit list.
    ///
    /// A lone path that does not exist and has no image extension is taken
    /// as a directory, so a mistyped folder fails discovery instead of
    /// becoming a one-item batch.
    pub fn from_paths(paths: &[PathBuf], recursive: bool) -> Self {
        match paths {
            [single]
                if single.is_dir()
                    || (!single.exists() && !has_valid_extension(single, RECOGNIZED_EXTENSIONS)) =>
            {
                InputSpec::Directory {
                    path: single.clone(),
                    recursive,
                }
            }
            _ => InputSpec::Files {
                paths: paths.to_vec(),
                recursive,
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            InputSpec::Files { .. } => "the input list".to_string(),
            InputSpec::Directory { path, .. } => path.display().to_string(),
        }
    }
}

/// Files a directory scan must not pick up again: the batch's own output
/// directory and, under suffix naming, earlier `*_enhanced.*` results.
#[derive(Debug, Clone, Default)]
pub struct ScanExclusions {
    output_dir: Option<PathBuf>,
    suffix: Option<String>,
}

impl ScanExclusions {
    pub fn new(output_dir: &Path, suffix: Option<&str>) -> Self {
        Self {
            output_dir: fs::canonicalize(output_dir).ok(),
            suffix: suffix.map(str::to_string),
        }
    }

    fn is_output_dir(&self, path: &Path) -> bool {
        match &self.output_dir {
            Some(out) => fs::canonicalize(path).is_ok_and(|p| &p == out),
            None => false,
        }
    }

    fn is_previous_output(&self, path: &Path) -> bool {
        match (&self.suffix, path.file_stem()) {
            (Some(suffix), Some(stem)) => stem.to_string_lossy().ends_with(suffix.as_str()),
            _ => false,
        }
    }
}

/// One unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub source: PathBuf,
}

impl BatchItem {
    pub fn new(source: PathBuf) -> Self {
        Self { source }
    }
}

/// Resolve `spec` into batch items.
pub fn discover(spec: &InputSpec) -> Result<Vec<BatchItem>, DiscoveryError> {
    discover_excluding(spec, &ScanExclusions::default())
}

/// Resolve `spec` into batch items, leaving `exclusions` out of directory scans.
///
/// Explicit lists keep their order and their files are not filtered by
/// extension; a file that turns out not to be an image is reported per item
/// later. Directory scans are sorted by file name so repeated runs see the
/// same order.
pub fn discover_excluding(
    spec: &InputSpec,
    exclusions: &ScanExclusions,
) -> Result<Vec<BatchItem>, DiscoveryError> {
    let paths = match spec {
        InputSpec::Files { paths, recursive } => {
            let mut expanded = Vec::with_capacity(paths.len());
            for path in paths {
                if path.is_dir() {
                    expanded.extend(scan_directory(path, *recursive, exclusions)?);
                } else {
                    expanded.push(path.clone());
                }
            }
            expanded
        }
        InputSpec::Directory { path, recursive } => scan_directory(path, *recursive, exclusions)?,
    };

    let mut seen = HashSet::new();
    let items: Vec<BatchItem> = paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .map(BatchItem::new)
        .collect();

    if items.is_empty() {
        return Err(DiscoveryError::NoImages(spec.describe()));
    }

    Ok(items)
}

fn scan_directory(
    dir: &Path,
    recursive: bool,
    exclusions: &ScanExclusions,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.exists() {
        return Err(DiscoveryError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    // the scan root itself may be the output directory (suffix naming in place)
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .min_depth(1)
        .max_depth(if recursive { MAX_SCAN_DEPTH } else { 1 })
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && exclusions.is_output_dir(e.path())));

    let mut image_files = Vec::new();
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && has_valid_extension(path, RECOGNIZED_EXTENSIONS)
            && !exclusions.is_previous_output(path)
        {
            image_files.push(path.to_path_buf());
        }
    }

    Ok(image_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    fn names(items: &[BatchItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| i.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_directory_scan_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.PNG");
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "c.Tiff");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "d.gif");
        touch(tmp.path(), "noext");

        let spec = InputSpec::Directory { path: tmp.path().to_path_buf(), recursive: false };
        assert_eq!(names(&discover(&spec).unwrap()), vec!["a.jpg", "b.PNG", "c.Tiff", "d.gif"]);
    }

    #[test]
    fn test_scan_order_is_stable() {
        let tmp = TempDir::new().unwrap();
        for name in ["z.bmp", "m.jpeg", "a.tif", "k.png"] {
            touch(tmp.path(), name);
        }
        let spec = InputSpec::Directory { path: tmp.path().to_path_buf(), recursive: false };
        assert_eq!(discover(&spec).unwrap(), discover(&spec).unwrap());
    }

    #[test]
    fn test_subdirectories_only_with_recursive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "top.jpg");
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "inner.png");

        let flat = InputSpec::Directory { path: tmp.path().to_path_buf(), recursive: false };
        assert_eq!(discover(&flat).unwrap().len(), 1);

        let deep = InputSpec::Directory { path: tmp.path().to_path_buf(), recursive: true };
        assert_eq!(discover(&deep).unwrap().len(), 2);
    }

    #[test]
    fn test_explicit_list_keeps_order_and_drops_duplicates() {
        let list = vec![
            PathBuf::from("/photos/3.jpg"),
            PathBuf::from("/photos/1.jpg"),
            PathBuf::from("/photos/3.jpg"),
            PathBuf::from("/photos/2.txt"),
        ];
        let items = discover(&InputSpec::files(list)).unwrap();
        assert_eq!(names(&items), vec!["3.jpg", "1.jpg", "2.txt"]);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let spec = InputSpec::Directory { path: tmp.path().join("absent"), recursive: false };
        assert!(matches!(discover(&spec), Err(DiscoveryError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_file_given_as_directory_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let file = touch(tmp.path(), "a.jpg");
        let spec = InputSpec::Directory { path: file, recursive: false };
        assert!(matches!(discover(&spec), Err(DiscoveryError::NotADirectory(_))));
    }

    #[test]
    fn test_empty_inputs_are_fatal() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "readme.md");
        let spec = InputSpec::Directory { path: tmp.path().to_path_buf(), recursive: false };
        assert!(matches!(discover(&spec), Err(DiscoveryError::NoImages(_))));
        assert!(matches!(discover(&InputSpec::files(vec![])), Err(DiscoveryError::NoImages(_))));
    }

    #[test]
    fn test_from_paths_picks_mode() {
        let tmp = TempDir::new().unwrap();
        let dir = vec![tmp.path().to_path_buf()];
        assert!(matches!(InputSpec::from_paths(&dir, true), InputSpec::Directory { recursive: true, .. }));

        let file = touch(tmp.path(), "a.png");
        assert_eq!(
            InputSpec::from_paths(&[file.clone()], false),
            InputSpec::files(vec![file])
        );

        let missing_image = tmp.path().join("gone.jpg");
        assert_eq!(
            InputSpec::from_paths(&[missing_image.clone()], false),
            InputSpec::files(vec![missing_image])
        );

        let two_dirs = vec![tmp.path().join("d1"), tmp.path().join("d2")];
        assert_eq!(
            InputSpec::from_paths(&two_dirs, true),
            InputSpec::Files { paths: two_dirs.clone(), recursive: true }
        );

        let missing_dir = tmp.path().join("photos");
        assert!(matches!(
            InputSpec::from_paths(&[missing_dir], false),
            InputSpec::Directory { .. }
        ));
    }

    #[test]
    fn test_directories_in_a_list_are_scanned() {
        let tmp = TempDir::new().unwrap();
        let d1 = tmp.path().join("d1");
        let d2 = tmp.path().join("d2");
        fs::create_dir(&d1).unwrap();
        fs::create_dir(&d2).unwrap();
        touch(&d1, "one.png");
        touch(&d1, "notes.txt");
        let two = touch(&d2, "two.png");
        let loose = touch(tmp.path(), "loose.jpg");

        let spec = InputSpec::from_paths(&[d2.clone(), loose.clone(), d1.clone(), two], false);
        let items = discover(&spec).unwrap();
        assert_eq!(names(&items), vec!["two.png", "loose.jpg", "one.png"]);
    }

    #[test]
    fn test_scan_skips_output_directory_and_previous_results() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.png");
        touch(tmp.path(), "a_enhanced.png");
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();
        touch(&out, "b.png");
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "c.png");

        let spec = InputSpec::Directory { path: tmp.path().to_path_buf(), recursive: true };
        let exclusions = ScanExclusions::new(&out, Some("_enhanced"));
        assert_eq!(names(&discover_excluding(&spec, &exclusions).unwrap()), vec!["a.png", "c.png"]);

        // without a suffix only the output directory is left out
        let exclusions = ScanExclusions::new(&out, None);
        assert_eq!(
            names(&discover_excluding(&spec, &exclusions).unwrap()),
            vec!["a.png", "a_enhanced.png", "c.png"]
        );

        // scanning the output directory itself still works
        let in_place = InputSpec::Directory { path: out.clone(), recursive: false };
        let exclusions = ScanExclusions::new(&out, Some("_enhanced"));
        assert_eq!(names(&discover_excluding(&in_place, &exclusions).unwrap()), vec!["b.png"]);
    }
}
