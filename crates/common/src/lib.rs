use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One catalog entry. Unicode fields fall back to their romanised counterparts
/// when the catalog leaves them empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", from = "RawSongRecord")]
pub struct SongRecord {
    pub title: String,
    pub title_unicode: String,
    pub artist: String,
    pub artist_unicode: String,
    pub source: String,
    pub tags: Vec<String>,
    pub audio_hash: String,
    #[serde(rename = "BGHashes")]
    pub bg_hashes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSongRecord {
    title: String,
    #[serde(default)]
    title_unicode: String,
    artist: String,
    #[serde(default)]
    artist_unicode: String,
    source: String,
    tags: Vec<String>,
    audio_hash: String,
    #[serde(rename = "BGHashes")]
    bg_hashes: Vec<String>,
}

impl From<RawSongRecord> for SongRecord {
    fn from(raw: RawSongRecord) -> Self {
        SongRecord::new(
            raw.title,
            raw.title_unicode,
            raw.artist,
            raw.artist_unicode,
            raw.source,
            raw.tags,
            raw.audio_hash,
            raw.bg_hashes,
        )
    }
}

impl SongRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        title_unicode: String,
        artist: String,
        artist_unicode: String,
        source: String,
        tags: Vec<String>,
        audio_hash: String,
        bg_hashes: Vec<String>,
    ) -> Self {
        let title_unicode = if title_unicode.is_empty() {
            title.clone()
        } else {
            title_unicode
        };
        let artist_unicode = if artist_unicode.is_empty() {
            artist.clone()
        } else {
            artist_unicode
        };
        Self {
            title,
            title_unicode,
            artist,
            artist_unicode,
            source,
            tags,
            audio_hash,
            bg_hashes,
        }
    }

    pub fn joined_tags(&self) -> String {
        self.tags.join(" ")
    }

    /// Audio hash first, then backgrounds in catalog order.
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.audio_hash.as_str()).chain(self.bg_hashes.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    InvalidHash(String),
}

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashError::InvalidHash(hash) => write!(f, "invalid content hash: {:?}", hash),
        }
    }
}

impl std::error::Error for HashError {}

/// Maps content hashes onto the `root/h[0]/h[0..2]/h` layout. Never touches
/// the filesystem; callers check existence themselves.
#[derive(Clone, Debug)]
pub struct HashStore {
    root: PathBuf,
}

impl HashStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, hash: &str) -> Result<PathBuf, HashError> {
        Ok(self.root.join(relative_path(hash)?))
    }
}

pub fn relative_path(hash: &str) -> Result<PathBuf, HashError> {
    validate_hash(hash)?;
    let mut out = PathBuf::from(&hash[0..1]);
    out.push(&hash[0..2]);
    out.push(hash);
    Ok(out)
}

// Alphanumeric only, so a hash can never smuggle in a separator or `..`.
fn validate_hash(hash: &str) -> Result<(), HashError> {
    if hash.len() < 2 || !hash.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(HashError::InvalidHash(hash.to_string()));
    }
    Ok(())
}
