//! Catalogue sizing from the study data directory.
//!
//! Every item ships as two compressed payloads named `file*.zlib`.

use std::io;
use std::path::Path;

const PAYLOADS_PER_ITEM: usize = 2;

/// Counts items in `data_dir`.
pub fn count_items(data_dir: &Path) -> io::Result<usize> {
    let mut payloads = 0;
    for entry in std::fs::read_dir(data_dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("file") && name.ends_with(".zlib") {
            payloads += 1;
        }
    }
    Ok(payloads / PAYLOADS_PER_ITEM)
}

#[cfg(test)]
mod tests {
    use super::count_items;
    use std::fs;

    #[test]
    fn counts_payload_pairs_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["file1.zlib", "file2.zlib", "file3.zlib", "file4.zlib", "file5.zlib"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::write(dir.path().join("notes.zlib"), b"x").unwrap();
        fs::write(dir.path().join("file6.txt"), b"x").unwrap();

        assert_eq!(count_items(dir.path()).unwrap(), 2);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(count_items(&dir.path().join("absent")).is_err());
    }
}
