/// A single `bytes=start-end` or `bytes=start-` request, before it is checked
/// against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
    pub end: Option<u64>,
}

/// Inclusive byte interval within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    Invalid,
    Unsatisfiable,
}

impl RangeRequest {
    pub fn parse(value: &str) -> Result<Self, RangeError> {
        let value = value.trim();
        let range = value.strip_prefix("bytes=").ok_or(RangeError::Invalid)?;
        if range.contains(',') {
            return Err(RangeError::Invalid);
        }

        let (start_str, end_str) = range.split_once('-').ok_or(RangeError::Invalid)?;
        let start_str = start_str.trim();
        let end_str = end_str.trim();
        // Suffix ranges (`bytes=-N`) are not supported.
        if start_str.is_empty() {
            return Err(RangeError::Invalid);
        }

        let start: u64 = start_str.parse().map_err(|_| RangeError::Invalid)?;
        let end = if end_str.is_empty() {
            None
        } else {
            Some(end_str.parse::<u64>().map_err(|_| RangeError::Invalid)?)
        };
        Ok(Self { start, end })
    }

    pub fn resolve(self, size: u64) -> Result<ByteRange, RangeError> {
        if size == 0 || self.start >= size {
            return Err(RangeError::Unsatisfiable);
        }
        let end = match self.end {
            Some(end) if end < self.start => return Err(RangeError::Invalid),
            Some(end) => end.min(size - 1),
            None => size - 1,
        };
        Ok(ByteRange {
            start: self.start,
            end,
        })
    }
}

pub fn parse_range_header(value: &str, size: u64) -> Result<ByteRange, RangeError> {
    RangeRequest::parse(value)?.resolve(size)
}
