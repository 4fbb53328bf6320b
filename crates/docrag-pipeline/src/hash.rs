//! File hashing for deduplication.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Streaming sha-256 over 8 KiB blocks, hex-encoded.
///
/// The digest over the full file bytes is the uniqueness key for
/// deduplication: two uploads with the same hash must not both ingest.
pub fn compute_file_hash(path: &Path) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut block = [0u8; 8192];

    loop {
        let read = reader.read(&mut block)?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_known_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello world").unwrap();

        assert_eq!(
            compute_file_hash(&path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_identical_bytes_identical_hash() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"same content").unwrap();
        std::fs::write(&b, b"same content").unwrap();

        assert_eq!(
            compute_file_hash(&a).unwrap(),
            compute_file_hash(&b).unwrap()
        );
    }

    #[test]
    fn test_different_bytes_different_hash() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"content one").unwrap();
        std::fs::write(&b, b"content two").unwrap();

        assert_ne!(
            compute_file_hash(&a).unwrap(),
            compute_file_hash(&b).unwrap()
        );
    }

    #[test]
    fn test_spans_multiple_blocks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        // Larger than one 8 KiB block.
        std::fs::write(&path, vec![0xAB; 20_000]).unwrap();

        let hash = compute_file_hash(&path).unwrap();
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(compute_file_hash(Path::new("/nonexistent/file")).is_err());
    }
}
