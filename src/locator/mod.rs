use url::Url;

use crate::VidbriefError;

/// A validated, canonical video identifier.
///
/// Derived from an arbitrary input URL by extracting the `v=` query parameter
/// and re-assembling the plain watch URL, dropping playlist ids and every other
/// extraneous parameter. Canonicalization is idempotent: parsing a canonical
/// URL yields the same locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLocator {
    /// The bare video id as found in the `v=` parameter.
    pub video_id: String,

    /// Canonical watch URL handed to the caption tool.
    pub canonical_url: String,
}

impl VideoLocator {
    /// Parse an arbitrary input URL into a canonical locator.
    pub fn parse(input: &str) -> Result<Self, VidbriefError> {
        let trimmed = input.trim();
        let parsed = Url::parse(trimmed)
            .map_err(|_| VidbriefError::InvalidLocator(format!("not a valid URL: {trimmed}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(VidbriefError::InvalidLocator(
                "URL must use HTTP or HTTPS protocol".to_string(),
            ));
        }

        let video_id = parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                VidbriefError::InvalidLocator(format!("no v= video id parameter in {trimmed}"))
            })?;

        Ok(Self::from_id(&video_id))
    }

    /// Build a locator from a bare video id.
    ///
    /// Query parsing percent-decodes the id, so it is re-encoded here to keep
    /// the reassembled URL well-formed for unusual ids.
    pub fn from_id(video_id: &str) -> Self {
        let canonical_url = format!(
            "https://www.youtube.com/watch?v={}",
            urlencoding::encode(video_id)
        );
        Self {
            video_id: video_id.to_string(),
            canonical_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_extra_query_parameters() {
        let locator = VideoLocator::parse("https://youtube.com/watch?v=abc123&list=XYZ").unwrap();
        assert_eq!(locator.video_id, "abc123");
        assert_eq!(locator.canonical_url, "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let first = VideoLocator::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").unwrap();
        let second = VideoLocator::parse(&first.canonical_url).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let locator = VideoLocator::parse("https://m.youtube.com/watch?list=PL1&v=xyz_789").unwrap();
        assert_eq!(locator.canonical_url, "https://www.youtube.com/watch?v=xyz_789");
    }

    #[test]
    fn rejects_url_without_video_id() {
        let err = VideoLocator::parse("https://www.youtube.com/feed/subscriptions").unwrap_err();
        assert!(matches!(err, VidbriefError::InvalidLocator(_)));
    }

    #[test]
    fn rejects_non_url_input() {
        assert!(VideoLocator::parse("not a url").is_err());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(VideoLocator::parse("ftp://youtube.com/watch?v=abc").is_err());
    }

    #[test]
    fn rejects_empty_video_id() {
        assert!(VideoLocator::parse("https://youtube.com/watch?v=&list=XYZ").is_err());
    }
}
