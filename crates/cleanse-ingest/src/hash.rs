//! Input fingerprinting for execution reports.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use cleanse_model::{PipelineError, Result};

/// SHA-256 of a file as lowercase hex.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|error| PipelineError::read(path, error))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|error| PipelineError::read(path, error))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hashes_known_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        file.flush().unwrap();
        assert_eq!(
            compute_file_hash(file.path()).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn missing_file() {
        let err = compute_file_hash(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound { .. }));
    }
}
