use crate::errors::CasError;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha512};
use std::{
    cmp::{Ord, Ordering, PartialOrd},
    fmt,
    hash::{Hash, Hasher},
    ops::Range,
    str,
    str::FromStr,
};

/// A digest securely identifies the specific contents of a binary object
///
/// Digests include the hash format, followed by a colon and the lowercase
/// hexadecimal hash value. Any well-formed digest can be parsed, but content
/// can only be verified against the algorithms in [DigestAlgorithm].
#[derive(Clone)]
pub struct ContentDigest {
    serialized: String,
    format_pos: Range<usize>,
    hex_pos: Range<usize>,
}

/// Hash algorithms we can verify content against
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Number of hex digits in an encoded hash of this type
    pub fn hex_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }

    pub(crate) fn hasher(&self) -> ContentHasher {
        match self {
            DigestAlgorithm::Sha256 => ContentHasher::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => ContentHasher::Sha512(Sha512::new()),
        }
    }
}

/// Incremental hash state for one of the supported algorithms
#[derive(Clone, Debug)]
pub(crate) enum ContentHasher {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl ContentHasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            ContentHasher::Sha256(hasher) => hasher.update(data),
            ContentHasher::Sha512(hasher) => hasher.update(data),
        }
    }

    pub fn finalize(self) -> ContentDigest {
        match self {
            ContentHasher::Sha256(hasher) => {
                ContentDigest::from_hash(DigestAlgorithm::Sha256, &hasher.finalize())
            }
            ContentHasher::Sha512(hasher) => {
                ContentDigest::from_hash(DigestAlgorithm::Sha512, &hasher.finalize())
            }
        }
    }
}

impl Eq for ContentDigest {}

impl PartialEq for ContentDigest {
    fn eq(&self, other: &Self) -> bool {
        self.serialized.eq(&other.serialized)
    }
}

impl FromStr for ContentDigest {
    type Err = CasError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentDigest::parse(s)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Hash for ContentDigest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialized.hash(state);
    }
}

impl Ord for ContentDigest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialized.cmp(&other.serialized)
    }
}

impl PartialOrd for ContentDigest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.serialized.partial_cmp(&other.serialized)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentDigest::parse(&s).map_err(de::Error::custom)
    }
}

impl ContentDigest {
    /// Returns a reference to the existing string representation of a
    /// [ContentDigest]
    ///
    /// This string always has a single colon. After the colon is 32 or more
    /// characters which will always be lowercase hexadecimal digits. The format
    /// specifier before this colon is alphanumeric, with plus, dash,
    /// underscore, or dot characters allowed as separators between valid
    /// groups of alphanumeric characters.
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    /// Create a new ContentDigest from the output of a hash function
    pub(crate) fn from_hash<T: fmt::LowerHex>(algorithm: DigestAlgorithm, hash: &T) -> Self {
        let format_part = algorithm.as_str();
        let serialized = format!("{}:{:x}", format_part, hash);
        let hex_start = format_part.len() + 1;
        ContentDigest {
            format_pos: 0..format_part.len(),
            hex_pos: hex_start..serialized.len(),
            serialized,
        }
    }

    /// Create a new ContentDigest from content data
    ///
    /// This hashes the content using the the `sha256` algorithm.
    ///
    /// ```
    /// # use ocicas::ContentDigest;
    /// let digest = ContentDigest::from_content(b"cat");
    /// assert_eq!(digest.as_str(), "sha256:77af778b51abd4a3c51c5ddd97204a9c3ae614ebccb75a606c3b6865aed6744e");
    /// ```
    pub fn from_content(content_bytes: &[u8]) -> Self {
        ContentDigest::from_hash(DigestAlgorithm::Sha256, &Sha256::digest(content_bytes))
    }

    /// Parse a [prim@str] as a [ContentDigest]
    ///
    /// ```
    /// # use ocicas::ContentDigest;
    /// let digest = ContentDigest::parse("format:00112233445566778899aabbccddeeff").unwrap();
    /// assert_eq!(digest.format_str(), "format");
    /// assert_eq!(digest.hex_str(), "00112233445566778899aabbccddeeff")
    /// ```
    pub fn parse(s: &str) -> Result<Self, CasError> {
        lazy_static! {
            static ref RE: Regex =
                Regex::new(&format!("^{}$", ContentDigest::regex_str(),)).unwrap();
        }
        let captures = match RE.captures(s) {
            None => return Err(CasError::InvalidDigest(s.to_owned())),
            Some(captures) => captures,
        };
        match (captures.name("dig_f"), captures.name("dig_h")) {
            (Some(format_match), Some(hex_match)) => Ok(ContentDigest {
                serialized: s.to_owned(),
                format_pos: format_match.range(),
                hex_pos: hex_match.range(),
            }),
            _ => Err(CasError::InvalidDigest(s.to_owned())),
        }
    }

    /// Return a reference to the format string portion of this digest.
    pub fn format_str(&self) -> &str {
        &self.serialized[self.format_pos.clone()]
    }

    /// Return a reference to the hexadecimal string portion of this digest.
    ///
    /// This is guaranteed to be a string of at least 32 hex digits.
    pub fn hex_str(&self) -> &str {
        &self.serialized[self.hex_pos.clone()]
    }

    /// Determine which algorithm this digest can be verified with
    ///
    /// Fails if the format is unknown, or if the hex portion has the wrong
    /// length for the algorithm it names.
    pub fn algorithm(&self) -> Result<DigestAlgorithm, CasError> {
        let algorithm = match self.format_str() {
            "sha256" => DigestAlgorithm::Sha256,
            "sha512" => DigestAlgorithm::Sha512,
            _ => return Err(CasError::UnsupportedDigest(self.clone())),
        };
        if self.hex_str().len() == algorithm.hex_len() {
            Ok(algorithm)
        } else {
            Err(CasError::UnsupportedDigest(self.clone()))
        }
    }

    pub(crate) fn regex_str() -> &'static str {
        concat!(
            "(?P<dig>", // digest group
            /*  */ "(?P<dig_f>", // digest format group
            /* -- */ "(?:", // first format component
            /* -- -- */ "[a-zA-Z]",
            /* -- -- */ "[a-zA-Z0-9]*",
            /* -- */ ")",
            /* -- */ "(?:", // Additional format component
            /* -- -- */ "[-_+.]", // separators allowed in the digest format
            /* -- -- */ "[a-zA-Z]",
            /* -- -- */ "[a-zA-Z0-9]*",
            /* -- */ ")*",
            /*  */ ")", // end digest format group
            /*  */ "[:]", // Main separator
            /*  */ "(?P<dig_h>", // digest hex group
            /* -- */ "[a-f0-9]{32,}",
            /*  */ ")",
            ")",
        )
    }
}
