//! Media locators as typed by the operator.
//!
//! A locator is carried verbatim from the input line to the engine. The
//! only processing is stripping the line terminator; classification into a
//! [`MediaFormat`] is for diagnostics and never changes what is forwarded.

mod format;

pub use format::{detect_media_format, MediaFormat};

use std::fmt;

/// A media URL (DASH or HLS manifest address, usually) read from one input line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Builds a locator from a raw line as returned by `read_until(b'\n')`,
    /// removing a trailing `\n` or `\r\n` and nothing else.
    ///
    /// Bytes that are not valid UTF-8 become U+FFFD; the line is never rejected.
    pub fn from_line(mut line: Vec<u8>) -> Self {
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        match String::from_utf8(line) {
            Ok(text) => Self(text),
            Err(e) => {
                tracing::debug!("locator is not valid UTF-8; replacing invalid bytes");
                Self(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn format(&self) -> MediaFormat {
        detect_media_format(&self.0)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_line_strips_only_terminator() {
        assert_eq!(
            Locator::from_line(b"http://a/manifest.mpd\n".to_vec()).as_str(),
            "http://a/manifest.mpd"
        );
        assert_eq!(
            Locator::from_line(b"http://b/playlist.m3u8\r\n".to_vec()).as_str(),
            "http://b/playlist.m3u8"
        );
        assert_eq!(
            Locator::from_line(b"  padded  \n".to_vec()).as_str(),
            "  padded  "
        );
    }

    #[test]
    fn from_line_without_terminator() {
        // Last line of a stream that doesn't end in a newline.
        assert_eq!(Locator::from_line(b"tail".to_vec()).as_str(), "tail");
    }

    #[test]
    fn empty_line_is_empty_locator() {
        let loc = Locator::from_line(b"\n".to_vec());
        assert!(loc.is_empty());
        assert_eq!(loc.format(), MediaFormat::Unknown);
    }

    #[test]
    fn lone_carriage_return_is_kept() {
        assert_eq!(Locator::from_line(b"a\rb\n".to_vec()).as_str(), "a\rb");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let loc = Locator::from_line(b"http://a/caf\xe9.mpd\n".to_vec());
        assert_eq!(loc.as_str(), "http://a/caf\u{fffd}.mpd");
        assert_eq!(loc.format(), MediaFormat::Dash);
    }
}
