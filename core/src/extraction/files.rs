use crate::error::Result;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collects DICOM files under `directory`
///
/// Accepts `.dcm` / `.dicom` (any case) and extension-less files carrying
/// the `DICM` magic. Paths are returned sorted.
pub fn collect_dicom_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(directory).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        match path.extension() {
            Some(ext) => {
                if ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom") {
                    files.push(path.to_path_buf());
                }
            }
            None => {
                if is_dicom_file(path) {
                    debug!("Found headerless DICOM file: {}", path.display());
                    files.push(path.to_path_buf());
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Checks if a file has a DICOM header
///
/// DICOM files typically have a 128-byte preamble followed by the 4-byte
/// "DICM" magic string.
pub fn is_dicom_file(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    // Read first 132 bytes (128-byte preamble + 4-byte "DICM" magic)
    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => &buffer[128..132] == b"DICM",
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_magic(path: &Path) {
        let mut file = File::create(path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"DICM").unwrap();
        file.write_all(b"additional data").unwrap();
    }

    #[test]
    fn test_is_dicom_file_with_valid_header() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("IM0001");
        write_magic(&file_path);

        assert!(is_dicom_file(&file_path));
    }

    #[test]
    fn test_is_dicom_file_too_small() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("small");
        File::create(&file_path).unwrap().write_all(b"small").unwrap();

        assert!(!is_dicom_file(&file_path));
    }

    #[test]
    fn test_is_dicom_file_wrong_magic() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("wrong_magic");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"NOTM").unwrap();

        assert!(!is_dicom_file(&file_path));
    }

    #[test]
    fn test_collect_recurses_into_series_folders() {
        let temp_dir = TempDir::new().unwrap();
        let series = temp_dir.path().join("3 - T1w MPRAGE");
        fs::create_dir_all(&series).unwrap();

        File::create(series.join("a.dcm")).unwrap();
        File::create(series.join("b.DICOM")).unwrap();
        File::create(series.join("notes.txt")).unwrap();
        write_magic(&temp_dir.path().join("IM0001"));
        File::create(temp_dir.path().join("README")).unwrap();

        let files = collect_dicom_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.ends_with("IM0001")));
    }
}
