//! Artifact naming from URL fingerprints and capture instants

use chrono::{DateTime, TimeZone};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the URL digest
pub const FINGERPRINT_LEN: usize = 8;

/// Suffix distinguishing response artifacts from request artifacts
pub const RESPONSE_SUFFIX: &str = "_response";

/// File extension of every artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// Timestamp layout of the leading name segment
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Which side of a transaction an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Request-observed artifact
    Request,
    /// Response-observed artifact
    Response,
}

impl ArtifactKind {
    /// Classify an artifact file stem by its suffix
    #[must_use]
    pub fn from_stem(stem: &str) -> Self {
        if stem.ends_with(RESPONSE_SUFFIX) {
            Self::Response
        } else {
            Self::Request
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Request => "",
            Self::Response => RESPONSE_SUFFIX,
        }
    }
}

/// Short content fingerprint of a URL string
///
/// Only used to keep file names apart; not an integrity check.
#[must_use]
pub fn url_fingerprint(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..FINGERPRINT_LEN / 2])
}

/// Build the artifact file stem `{YYYYMMDD_HHMMSS}_{fingerprint}[_response]`
///
/// Two captures of the same URL within one second yield the same name; the
/// later write replaces the earlier one.
#[must_use]
pub fn artifact_name<Tz>(url: &str, at: &DateTime<Tz>, kind: ArtifactKind) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}{}",
        at.format(STAMP_FORMAT),
        url_fingerprint(url),
        kind.suffix()
    )
}

/// Artifact file name including the extension
#[must_use]
pub fn artifact_file_name<Tz>(url: &str, at: &DateTime<Tz>, kind: ArtifactKind) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}.{ARTIFACT_EXTENSION}", artifact_name(url, at, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use proptest::prelude::*;

    fn instant() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-05T07:08:09+00:00").unwrap()
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let fp1 = url_fingerprint("http://example.com/a?x=1");
        let fp2 = url_fingerprint("http://example.com/a?x=1");

        assert_eq!(fp1, fp2, "Fingerprint must be deterministic");
    }

    #[test]
    fn test_fingerprint_different_urls() {
        let fp1 = url_fingerprint("http://example.com/a");
        let fp2 = url_fingerprint("http://example.com/b");

        assert_ne!(fp1, fp2, "Different URLs should produce different fingerprints");
    }

    #[test]
    fn test_fingerprint_matches_digest_prefix() {
        let full = hex::encode(Sha256::digest(b"http://example.com/"));
        assert_eq!(url_fingerprint("http://example.com/"), &full[..FINGERPRINT_LEN]);
    }

    #[test]
    fn test_request_name_layout() {
        let name = artifact_name("http://example.com/a", &instant(), ArtifactKind::Request);
        let fp = url_fingerprint("http://example.com/a");

        assert_eq!(name, format!("20240305_070809_{fp}"));
    }

    #[test]
    fn test_response_name_shares_fingerprint() {
        let url = "http://example.com/a";
        let request = artifact_name(url, &instant(), ArtifactKind::Request);
        let response = artifact_name(url, &instant(), ArtifactKind::Response);

        assert_ne!(request, response);
        assert_eq!(response, format!("{request}{RESPONSE_SUFFIX}"));
    }

    #[test]
    fn test_same_second_same_url_collides() {
        let url = "http://example.com/a";
        let a = artifact_name(url, &instant(), ArtifactKind::Request);
        let b = artifact_name(url, &instant(), ArtifactKind::Request);

        assert_eq!(a, b);
    }

    #[test]
    fn test_file_name_extension() {
        let name = artifact_file_name("http://example.com/", &Utc::now(), ArtifactKind::Response);
        assert!(name.ends_with("_response.json"));
    }

    #[test]
    fn test_kind_from_stem() {
        assert_eq!(
            ArtifactKind::from_stem("20240305_070809_abcd1234_response"),
            ArtifactKind::Response
        );
        assert_eq!(
            ArtifactKind::from_stem("20240305_070809_abcd1234"),
            ArtifactKind::Request
        );
    }

    proptest! {
        #[test]
        fn prop_fingerprint_stable(url in ".*") {
            prop_assert_eq!(url_fingerprint(&url), url_fingerprint(&url));
        }

        #[test]
        fn prop_fingerprint_fixed_length_hex(url in ".*") {
            let fp = url_fingerprint(&url);
            prop_assert_eq!(fp.len(), FINGERPRINT_LEN);
            prop_assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }

        #[test]
        fn prop_name_is_filesystem_safe(url in ".*") {
            let name = artifact_name(&url, &instant(), ArtifactKind::Response);
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }
}
