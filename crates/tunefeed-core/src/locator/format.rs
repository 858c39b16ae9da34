//! Media format detection from a locator.

use std::fmt;

/// Coarse kind of media a locator points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Dash,
    Hls,
    /// Single-file media (mp4, mp3, ...).
    Progressive,
    /// `hdmiin:` source.
    HdmiIn,
    /// `cvbsin:` source.
    CompositeIn,
    /// `live:`, `tune:` or `mr:` over-the-air tuner.
    Ota,
    /// `ocap://` RMF source.
    Rmf,
    Unknown,
}

impl MediaFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaFormat::Dash => "DASH",
            MediaFormat::Hls => "HLS",
            MediaFormat::Progressive => "PROGRESSIVE",
            MediaFormat::HdmiIn => "HDMI_IN",
            MediaFormat::CompositeIn => "COMPOSITE_IN",
            MediaFormat::Ota => "OTA",
            MediaFormat::Rmf => "RMF",
            MediaFormat::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SCHEME_PREFIXES: &[(&str, MediaFormat)] = &[
    ("hdmiin:", MediaFormat::HdmiIn),
    ("cvbsin:", MediaFormat::CompositeIn),
    ("live:", MediaFormat::Ota),
    ("tune:", MediaFormat::Ota),
    ("mr:", MediaFormat::Ota),
    ("ocap://", MediaFormat::Rmf),
    ("srt:", MediaFormat::Progressive),
];

/// Local recording proxy; the real locator travels in its `recordedUrl` parameter.
const RECORDING_PROXY_HOST: &str = "127.0.0.1";
const RECORDED_URL_PARAM: &str = "recordedUrl";

const EXTENSIONS: &[(&str, MediaFormat)] = &[
    ("m3u8", MediaFormat::Hls),
    ("m3u", MediaFormat::Hls),
    ("mpd", MediaFormat::Dash),
    ("mp4", MediaFormat::Progressive),
    ("mp3", MediaFormat::Progressive),
    ("mkv", MediaFormat::Progressive),
    ("webm", MediaFormat::Progressive),
    ("ts", MediaFormat::Progressive),
    ("aac", MediaFormat::Progressive),
    ("m4a", MediaFormat::Progressive),
];

/// Classifies a locator by scheme prefix, then by the extension of its path.
///
/// When the locator parses as a URL, query and fragment are ignored; otherwise
/// the raw text is matched. Matching is ASCII case-insensitive. A
/// `http://127.0.0.1` URL carrying a `recordedUrl` query parameter is
/// classified by the decoded value of that parameter.
pub fn detect_media_format(locator: &str) -> MediaFormat {
    for (prefix, format) in SCHEME_PREFIXES {
        if starts_with_ignore_case(locator, prefix) {
            return *format;
        }
    }

    let path = match url::Url::parse(locator) {
        Ok(parsed) => {
            if let Some(recorded) = recorded_url(&parsed) {
                tracing::trace!(recorded = %recorded, "classifying recorded locator");
                return detect_media_format(&recorded);
            }
            parsed.path().to_string()
        }
        Err(_) => locator.to_string(),
    };
    extension_format(&path)
}

/// Decoded `recordedUrl` of a recording-proxy URL. The value is always
/// shorter than the URL it came from, so classification terminates.
fn recorded_url(parsed: &url::Url) -> Option<String> {
    if parsed.scheme() != "http" || parsed.host_str() != Some(RECORDING_PROXY_HOST) {
        return None;
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == RECORDED_URL_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn extension_format(path: &str) -> MediaFormat {
    let last_segment = path.rsplit('/').next().unwrap_or("");
    let ext = match last_segment.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return MediaFormat::Unknown,
    };

    EXTENSIONS
        .iter()
        .find(|(candidate, _)| ext.eq_ignore_ascii_case(candidate))
        .map(|(_, format)| *format)
        .unwrap_or(MediaFormat::Unknown)
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}
