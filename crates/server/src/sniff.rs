/// Number of leading bytes handed to a sniffer.
pub const SNIFF_LEN: usize = 8 * 1024;

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Detects a MIME type from the first bytes of a file. Content-addressed files
/// carry no extension, so the bytes are all there is to go on.
pub trait ContentSniffer: Send + Sync {
    fn detect(&self, head: &[u8]) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InferSniffer;

impl ContentSniffer for InferSniffer {
    fn detect(&self, head: &[u8]) -> String {
        infer::get(head)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| FALLBACK_MIME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentSniffer, InferSniffer, FALLBACK_MIME};

    #[test]
    fn detects_common_media() {
        let sniffer = InferSniffer;
        assert_eq!(sniffer.detect(b"\x89PNG\r\n\x1a\n\x00\x00"), "image/png");
        assert_eq!(sniffer.detect(b"ID3\x04\x00\x00\x00\x00\x00\x00"), "audio/mpeg");
        assert_eq!(sniffer.detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]), "image/jpeg");
    }

    #[test]
    fn falls_back_to_octet_stream() {
        let sniffer = InferSniffer;
        assert_eq!(sniffer.detect(b"plain words"), FALLBACK_MIME);
        assert_eq!(sniffer.detect(&[]), FALLBACK_MIME);
    }
}
