/// Result of producing an image asset for a page
///
/// Missing and undecodable assets are expected conditions, not errors: the
/// page composer matches on this and degrades to a visible fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Encoded image bytes (JPEG or PNG), ready to embed
    Ready(Vec<u8>),
    /// Nothing to show: no reference, unknown reference or empty content
    NotFound,
    /// Content exists but cannot be turned into an embeddable image
    DecodeError(String),
}
