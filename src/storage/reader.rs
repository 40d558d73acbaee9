use crate::{
    errors::{BlobRole, CasError},
    image::{ContentDigest, ContentHasher},
};
use std::{io, io::Read};

/// How a finished stream compared with what was asked for
#[derive(Clone, Debug)]
enum Outcome {
    Verified,
    WrongSize(u64),
    WrongDigest(ContentDigest),
}

/// Reader that hashes blob content on its way to the caller
///
/// The digest is checked when the underlying file reaches its end. On a
/// mismatch, the read that would have reported end of stream returns an
/// error instead, so `read_to_end`, `io::copy` and friends all fail before
/// the caller can treat the data as complete. Any read after a failure fails
/// again.
///
/// When an expected size is known, reading past it fails immediately rather
/// than waiting for the end of the file.
#[derive(Debug)]
pub struct BlobReader<R> {
    inner: R,
    role: BlobRole,
    expected: ContentDigest,
    expected_size: Option<u64>,
    hasher: Option<ContentHasher>,
    bytes_read: u64,
    outcome: Option<Outcome>,
}

impl<R: Read> BlobReader<R> {
    /// Wrap a reader with verification against a digest
    ///
    /// Fails if the digest uses an algorithm we can't compute.
    pub fn new(
        inner: R,
        role: BlobRole,
        expected: ContentDigest,
        expected_size: Option<u64>,
    ) -> Result<Self, CasError> {
        let hasher = expected.algorithm()?.hasher();
        Ok(BlobReader {
            inner,
            role,
            expected,
            expected_size,
            hasher: Some(hasher),
            bytes_read: 0,
            outcome: None,
        })
    }

    /// Number of bytes passed through so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// True once the whole stream has been read and matched its digest
    pub fn is_verified(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Verified))
    }

    /// Read and discard the rest of the stream, returning the total size
    pub fn verify_to_end(&mut self) -> Result<u64, CasError> {
        io::copy(self, &mut io::sink())?;
        Ok(self.bytes_read)
    }

    fn failure(&self, outcome: &Outcome) -> Option<CasError> {
        match outcome {
            Outcome::Verified => None,
            Outcome::WrongSize(found) => Some(CasError::SizeMismatch {
                role: self.role,
                digest: self.expected.clone(),
                expected: self.expected_size.unwrap_or(0),
                found: *found,
            }),
            Outcome::WrongDigest(found) => Some(CasError::DigestMismatch {
                role: self.role,
                expected: self.expected.clone(),
                found: found.clone(),
            }),
        }
    }

    fn report(&self, outcome: &Outcome) -> io::Result<usize> {
        match self.failure(outcome) {
            None => Ok(0),
            Some(err) => Err(err.into_io()),
        }
    }

    fn finish(&mut self) -> Outcome {
        if let Some(expected_size) = self.expected_size {
            if self.bytes_read != expected_size {
                return Outcome::WrongSize(self.bytes_read);
            }
        }
        let found = match self.hasher.take() {
            Some(hasher) => hasher.finalize(),
            None => return Outcome::Verified,
        };
        if found == self.expected {
            log::debug!("verified {} blob {}, {} bytes", self.role, found, self.bytes_read);
            Outcome::Verified
        } else {
            Outcome::WrongDigest(found)
        }
    }
}

impl<R: Read> Read for BlobReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(outcome) = &self.outcome {
            return self.report(outcome);
        }
        // an empty buffer reads nothing, it doesn't mean end of stream
        if buf.is_empty() {
            return Ok(0);
        }
        let count = self.inner.read(buf)?;
        if count == 0 {
            let outcome = self.finish();
            let result = self.report(&outcome);
            self.outcome = Some(outcome);
            return result;
        }
        self.bytes_read += count as u64;
        if let Some(expected_size) = self.expected_size {
            if self.bytes_read > expected_size {
                let outcome = Outcome::WrongSize(self.bytes_read);
                let result = self.report(&outcome);
                self.outcome = Some(outcome);
                return result;
            }
        }
        if let Some(hasher) = &mut self.hasher {
            hasher.update(&buf[..count]);
        }
        Ok(count)
    }
}
