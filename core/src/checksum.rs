//! Directory checksum comparison
//!
//! Hashes every regular file below two roots, keyed by path relative to the
//! root, and reports which files match, differ, or exist on one side only.

use crate::error::{BidsError, Result};
use clap::ValueEnum;
use log::{debug, info};
use sha2::{Digest, Sha256, Sha512};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const CHUNK_SIZE: usize = 4096;

/// Digest used for file comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

/// Relative path to hex digest (or `ERROR: ...` when unreadable)
pub type ChecksumMap = BTreeMap<PathBuf, String>;

fn hash_reader<D: Digest>(mut reader: impl Read) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

/// Hex digest of a single file
pub fn file_checksum(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let file = File::open(path)?;
    let digest = match algorithm {
        HashAlgorithm::Sha256 => hash_reader::<Sha256>(file)?,
        HashAlgorithm::Sha512 => hash_reader::<Sha512>(file)?,
    };
    Ok(digest)
}

/// Hashes every file under `root`
///
/// Files that cannot be read are kept in the map with an `ERROR: ...` value
/// so they surface as differences rather than aborting the walk.
pub fn directory_checksums(root: &Path, algorithm: HashAlgorithm) -> Result<ChecksumMap> {
    if !root.is_dir() {
        return Err(BidsError::InvalidArgument(format!(
            "Directory does not exist: {}",
            root.display()
        )));
    }

    let mut checksums = ChecksumMap::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let digest = file_checksum(entry.path(), algorithm)
            .unwrap_or_else(|e| format!("ERROR: {}", e));
        debug!("{} {}", digest, relative.display());
        checksums.insert(relative, digest);
    }
    Ok(checksums)
}

/// Outcome of comparing two directories, all lists sorted by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumComparison {
    pub first: PathBuf,
    pub second: PathBuf,
    pub matching: Vec<PathBuf>,
    pub different: Vec<PathBuf>,
    pub only_in_first: Vec<PathBuf>,
    pub only_in_second: Vec<PathBuf>,
}

impl ChecksumComparison {
    /// True when both trees hold the same files with the same content
    pub fn is_identical(&self) -> bool {
        self.different.is_empty() && self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }
}

/// Compares two precomputed checksum maps
pub fn compare_checksums(first: &ChecksumMap, second: &ChecksumMap) -> ChecksumComparison {
    let mut comparison = ChecksumComparison::default();

    for (path, digest) in first {
        match second.get(path) {
            Some(other) if other == digest => comparison.matching.push(path.clone()),
            Some(_) => comparison.different.push(path.clone()),
            None => comparison.only_in_first.push(path.clone()),
        }
    }
    comparison.only_in_second = second
        .keys()
        .filter(|path| !first.contains_key(*path))
        .cloned()
        .collect();

    comparison
}

/// Hashes and compares two directory trees
pub fn compare_directories(
    first: &Path,
    second: &Path,
    algorithm: HashAlgorithm,
) -> Result<ChecksumComparison> {
    info!("Calculating checksums for {}", first.display());
    let first_sums = directory_checksums(first, algorithm)?;
    info!("Calculating checksums for {}", second.display());
    let second_sums = directory_checksums(second, algorithm)?;

    let mut comparison = compare_checksums(&first_sums, &second_sums);
    comparison.first = first.to_path_buf();
    comparison.second = second.to_path_buf();
    Ok(comparison)
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, paths: &[PathBuf]) -> fmt::Result {
    if paths.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{} ({}):", title, paths.len())?;
    for path in paths {
        writeln!(f, "  {}", path.display())?;
    }
    Ok(())
}

/// `{:#}` additionally lists the matching files
impl fmt::Display for ChecksumComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comparison Results")?;
        writeln!(f, "  First:  {}", self.first.display())?;
        writeln!(f, "  Second: {}", self.second.display())?;
        writeln!(f)?;
        writeln!(f, "  Matching files:        {}", self.matching.len())?;
        writeln!(f, "  Different files:       {}", self.different.len())?;
        writeln!(f, "  Only in first:         {}", self.only_in_first.len())?;
        write!(f, "  Only in second:        {}", self.only_in_second.len())?;

        if f.alternate() {
            write_section(f, "Matching files", &self.matching)?;
        }
        write_section(f, "Files with different checksums", &self.different)?;
        write_section(f, "Files only in first directory", &self.only_in_first)?;
        write_section(f, "Files only in second directory", &self.only_in_second)?;

        if self.is_identical() {
            writeln!(f)?;
            write!(f, "\nDirectories are identical")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[rstest]
    #[case(
        HashAlgorithm::Sha256,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    )]
    #[case(
        HashAlgorithm::Sha512,
        "9b71d224bd62f3785d96d46ad3ea3d73319bfbc2890caadae2dff72519673ca72323c3d99ba5c11d7c7acc6e14b8c5da0c4663475c2e5c3adef46f73bcdec043"
    )]
    fn test_file_checksum(#[case] algorithm: HashAlgorithm, #[case] expected: &str) {
        let dir = tree(&[("a.txt", "hello")]);
        let digest = file_checksum(&dir.path().join("a.txt"), algorithm).unwrap();
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_compare_directories() {
        let first = tree(&[
            ("same.txt", "x"),
            ("sub/changed.txt", "1"),
            ("left.txt", "l"),
        ]);
        let second = tree(&[
            ("same.txt", "x"),
            ("sub/changed.txt", "2"),
            ("right.txt", "r"),
        ]);

        let result =
            compare_directories(first.path(), second.path(), HashAlgorithm::Sha256).unwrap();
        assert_eq!(result.matching, vec![PathBuf::from("same.txt")]);
        assert_eq!(result.different, vec![PathBuf::from("sub/changed.txt")]);
        assert_eq!(result.only_in_first, vec![PathBuf::from("left.txt")]);
        assert_eq!(result.only_in_second, vec![PathBuf::from("right.txt")]);
        assert!(!result.is_identical());

        let text = result.to_string();
        assert!(text.contains("Different files:       1"));
        assert!(text.contains("  sub/changed.txt"));
        assert!(!text.contains("Matching files (1):"));

        let verbose = format!("{:#}", result);
        assert!(verbose.contains("Matching files (1):\n  same.txt"));
    }

    #[test]
    fn test_identical_directories() {
        let first = tree(&[("a", "1"), ("b/c", "2")]);
        let second = tree(&[("a", "1"), ("b/c", "2")]);

        let result =
            compare_directories(first.path(), second.path(), HashAlgorithm::Sha512).unwrap();
        assert!(result.is_identical());
        assert_eq!(result.matching.len(), 2);
        assert!(result.to_string().ends_with("Directories are identical"));
    }

    #[test]
    fn test_error_entries_compare_as_different() {
        let mut first = ChecksumMap::new();
        first.insert(PathBuf::from("x"), "ERROR: denied".to_string());
        let mut second = ChecksumMap::new();
        second.insert(PathBuf::from("x"), "abc".to_string());

        assert_eq!(compare_checksums(&first, &second).different.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = directory_checksums(&dir.path().join("nope"), HashAlgorithm::Sha256);
        assert!(matches!(result, Err(BidsError::InvalidArgument(_))));
    }
}
