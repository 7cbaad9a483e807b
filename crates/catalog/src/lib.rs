use std::fs;
use std::path::Path;

use common::SongRecord;
use serde::Serialize;
use tracing::info;

/// Read-only, in-memory song catalog. Positions in load order double as
/// client-facing ids.
#[derive(Debug, Default)]
pub struct SongIndex {
    records: Vec<SongRecord>,
    // Lowercased search fields, computed once per record.
    haystacks: Vec<[String; 6]>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit<'a> {
    pub index: usize,
    pub song: &'a SongRecord,
}

impl SongIndex {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        let index = Self::from_json_str(&contents)?;
        info!("Loaded {} songs from {:?}", index.len(), path);
        Ok(index)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, CatalogError> {
        let records: Vec<SongRecord> = serde_json::from_str(contents)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<SongRecord>) -> Result<Self, CatalogError> {
        for (index, record) in records.iter().enumerate() {
            if record.audio_hash.is_empty() {
                return Err(CatalogError::InvalidRecord {
                    index,
                    reason: "AudioHash is empty".to_string(),
                });
            }
        }
        let haystacks = records.iter().map(haystack).collect();
        Ok(Self { records, haystacks })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SongRecord] {
        &self.records
    }

    pub fn list(&self) -> impl Iterator<Item = (usize, &SongRecord)> {
        self.records.iter().enumerate()
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        let needle = query.to_lowercase();
        self.haystacks
            .iter()
            .zip(&self.records)
            .enumerate()
            .filter(|(_, (fields, _))| fields.iter().any(|field| field.contains(&needle)))
            .map(|(index, (_, song))| SearchHit { index, song })
            .collect()
    }
}

fn haystack(record: &SongRecord) -> [String; 6] {
    [
        record.title.to_lowercase(),
        record.artist.to_lowercase(),
        record.source.to_lowercase(),
        record.title_unicode.to_lowercase(),
        record.artist_unicode.to_lowercase(),
        record.joined_tags().to_lowercase(),
    ]
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidRecord { index: usize, reason: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "catalog io error: {}", err),
            CatalogError::Json(err) => write!(f, "catalog parse error: {}", err),
            CatalogError::InvalidRecord { index, reason } => {
                write!(f, "invalid catalog record {}: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            CatalogError::InvalidRecord { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Json(err)
    }
}
