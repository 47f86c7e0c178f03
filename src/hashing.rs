use std::fmt;
use std::fs::File;
use std::path::Path;

use blake3::Hasher;
use memmap2::Mmap;

use crate::error::JettisonError;

/// BLAKE3 fingerprint of a file's full content.
///
/// Two files with equal digests are treated as byte-identical without any
/// further comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; blake3::OUT_LEN]);

impl ContentDigest {
    #[cfg(test)]
    pub(crate) fn of_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes the BLAKE3 digest of a file using memory mapping and parallel
/// processing.
///
/// The whole file is mapped at once. Symbolic links and directories are
/// rejected.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The path points to a symbolic link or directory
/// - Memory mapping fails
pub fn digest_file(path: &Path) -> Result<ContentDigest, JettisonError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|source| JettisonError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_symlink() {
        return Err(JettisonError::InvalidFileType {
            path: path.to_path_buf(),
            message: "Symbolic links are not supported".to_string(),
        });
    }

    if metadata.is_dir() {
        return Err(JettisonError::InvalidFileType {
            path: path.to_path_buf(),
            message: "Directories are not supported".to_string(),
        });
    }

    // Zero-length files cannot be mapped
    if metadata.len() == 0 {
        return Ok(ContentDigest(*Hasher::new().finalize().as_bytes()));
    }

    let file = File::open(path).map_err(|source| JettisonError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| JettisonError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Hasher::new();
    hasher.update_rayon(&mmap);

    Ok(ContentDigest(*hasher.finalize().as_bytes()))
}
