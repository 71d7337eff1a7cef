use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("cannot read image file {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves an image reference (file path or HTTP(S) URL) to raw bytes.
pub trait ImageLoader: Send {
    fn load(&self, reference: &str) -> Result<Vec<u8>, ImageLoadError>;
}

/// True when `reference` should be fetched over HTTP rather than read from disk.
pub fn is_url(reference: &str) -> bool {
    reference
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}

/// Final segment of a path or URL, splitting on both `/` and `\`.
///
/// Used as the external image tag when enrolling a face.
pub fn file_name_of(reference: &str) -> &str {
    reference
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.com/a.jpg", true)]
    #[case("HTTPS://example.com/a.jpg", true)]
    #[case("Http://x", true)]
    #[case("images/portrait.jpg", false)]
    #[case("htt", false)]
    #[case("", false)]
    #[case("httpdocs/face.png", true)]
    fn test_is_url(#[case] reference: &str, #[case] expected: bool) {
        assert_eq!(is_url(reference), expected);
    }

    #[rstest]
    #[case("images/portrait.jpg", "portrait.jpg")]
    #[case(r"images\tampabay.jpg", "tampabay.jpg")]
    #[case(r"C:\faces/mixed\old.jpg", "old.jpg")]
    #[case("https://m.example.com/img/face.jpg", "face.jpg")]
    #[case("plain.png", "plain.png")]
    #[case("dir/", "")]
    fn test_file_name_of(#[case] reference: &str, #[case] expected: &str) {
        assert_eq!(file_name_of(reference), expected);
    }
}
