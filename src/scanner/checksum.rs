//! Rolling content signatures.
//!
//! # Overview
//!
//! A [`Signature`] is a pair of 32-bit accumulators: a shift/xor register
//! (`crc`) and a rotate-add sum (`sum`). It is cheap, deterministic and
//! order-dependent, and makes no cryptographic claims.
//!
//! Two flavours are computed:
//!
//! - **Partial**: the first [`PARTIAL_WINDOW`] bytes, followed by mixing the
//!   exact file length into `sum`. Used to place a file in the candidate tree.
//! - **Full**: every byte of the file, read in [`FULL_CHUNK_SIZE`] chunks, with
//!   no length mixing. Only computed when two partial signatures collide.
//!
//! Equal partial signatures make two files *candidates*; they never prove
//! duplication on their own.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::ReadError;

/// Number of leading bytes folded into a partial signature.
pub const PARTIAL_WINDOW: usize = 32 * 1024;

/// Read size used when folding a whole file.
pub const FULL_CHUNK_SIZE: usize = 64 * 1024;

/// Two-word rolling checksum state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    /// Shift/xor register.
    pub crc: u32,
    /// Rotate-left-by-one running sum.
    pub sum: u32,
}

impl Signature {
    /// Fresh, all-zero state.
    #[must_use]
    pub const fn new() -> Self {
        Self { crc: 0, sum: 0 }
    }

    /// Fold a buffer into the accumulators.
    pub fn update(&mut self, bytes: &[u8]) {
        let mut crc = self.crc;
        let mut sum = self.sum;
        for &b in bytes {
            let b = u32::from(b);
            let reg = crc ^ b;
            crc = (reg >> 8) ^ ((reg & 0xff) << 24) ^ ((reg & 0xff) << 9);
            sum = sum.wrapping_add(b).rotate_left(1);
        }
        self.crc = crc;
        self.sum = sum;
    }

    /// Mix a file length into `sum` so equal prefixes of different-sized
    /// files do not collide.
    pub fn mix_length(&mut self, len: u64) {
        // Both halves participate so sizes past 4 GiB still disturb the sum.
        let folded = (len as u32) ^ ((len >> 32) as u32);
        self.sum = self.sum.wrapping_add(folded);
    }

    /// Signature of an in-memory buffer, without length mixing.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let mut sig = Self::new();
        sig.update(bytes);
        sig
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}{:08x}", self.crc, self.sum)
    }
}

/// Compute the partial signature of a file whose size is already known.
///
/// Reads `min(size, PARTIAL_WINDOW)` bytes; reading fewer than that is an
/// error, since the file changed or cannot be read as reported.
///
/// # Errors
///
/// Returns [`ReadError`] if the file cannot be opened or the requested
/// number of bytes cannot be read.
pub fn partial_signature(path: &Path, size: u64) -> Result<Signature, ReadError> {
    let file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let wanted = size.min(PARTIAL_WINDOW as u64);
    let mut buffer = Vec::with_capacity(wanted as usize);
    file.take(wanted)
        .read_to_end(&mut buffer)
        .map_err(|source| ReadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if buffer.len() as u64 != wanted {
        return Err(ReadError::ShortRead {
            path: path.to_path_buf(),
            expected: wanted,
            actual: buffer.len() as u64,
        });
    }

    let mut sig = Signature::of(&buffer);
    sig.mix_length(size);
    Ok(sig)
}

/// Compute the signature of an entire file.
///
/// # Errors
///
/// Returns [`ReadError`] if the file cannot be opened or a read fails.
pub fn full_signature(path: &Path) -> Result<Signature, ReadError> {
    let mut file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut sig = Signature::new();
    let mut buffer = vec![0u8; FULL_CHUNK_SIZE];
    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ReadError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        sig.update(&buffer[..n]);
    }
    Ok(sig)
}

/// Byte-for-byte comparison of two files.
///
/// Used as the extra check in paranoid mode once full signatures agree.
///
/// # Errors
///
/// Returns [`ReadError`] naming whichever file failed.
pub fn contents_equal(a: &Path, b: &Path) -> Result<bool, ReadError> {
    let open = |path: &Path| {
        File::open(path).map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })
    };
    let mut fa = open(a)?;
    let mut fb = open(b)?;

    let mut buf_a = vec![0u8; FULL_CHUNK_SIZE];
    let mut buf_b = vec![0u8; FULL_CHUNK_SIZE];
    loop {
        let na = fill(&mut fa, &mut buf_a).map_err(|source| ReadError::Read {
            path: a.to_path_buf(),
            source,
        })?;
        let nb = fill(&mut fb, &mut buf_b).map_err(|source| ReadError::Read {
            path: b.to_path_buf(),
            source,
        })?;
        if na != nb || buf_a[..na] != buf_b[..nb] {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
    }
}

/// Read until the buffer is full or EOF.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
