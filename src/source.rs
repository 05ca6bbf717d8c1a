//! Rust source discovery and parsing for the source-based type provider.

use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collects Rust source files under a root directory.
///
/// The `target` directory and hidden directories (those starting with `.`) are
/// skipped.
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::source::SourceScanner;
/// use std::path::PathBuf;
///
/// let scanner = SourceScanner::new(PathBuf::from("./src"));
/// let result = scanner.scan();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct SourceScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// List of paths to all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

/// A successfully parsed Rust file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl SourceScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walk the directory tree and collect every `.rs` file.
    ///
    /// Entries that cannot be accessed are recorded as warnings and scanning
    /// continues; a missing root shows up the same way.
    pub fn scan(&self) -> ScanResult {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} Rust files",
            self.root_path.display(),
            rust_files.len()
        );

        ScanResult {
            rust_files,
            warnings,
        }
    }
}

/// Parse a single Rust source file.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    debug!("Parsing file: {}", path.display());

    let content = fs::read_to_string(path)?;
    let syntax_tree = syn::parse_file(&content).map_err(|e| Error::from(e).in_file(path))?;

    Ok(ParsedFile {
        path: path.to_path_buf(),
        syntax_tree,
    })
}

/// Parse every file, skipping (and logging) the ones that fail.
pub fn parse_sources(paths: &[PathBuf]) -> Vec<ParsedFile> {
    let parsed: Vec<ParsedFile> = paths
        .iter()
        .filter_map(|path| match parse_file(path) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    debug!(
        "Parsing complete: {} succeeded, {} failed",
        parsed.len(),
        paths.len() - parsed.len()
    );
    parsed
}

/// Scan and parse every source root.
pub fn load_sources(roots: &[PathBuf]) -> Vec<ParsedFile> {
    let mut files = Vec::new();
    for root in roots {
        let scan = SourceScanner::new(root.clone()).scan();
        files.extend(parse_sources(&scan.rust_files));
    }

    if !roots.is_empty() {
        info!("Loaded {} Rust source files", files.len());
    }
    files
}
