//! Codec negotiation: decides whether an input type needs remuxing and what
//! output codec/MIME string the sink should be given.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

/// Track category a buffer is created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

static CONTAINER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mp2t").expect("valid container pattern"));

/// Pre-standard `avc1.<profile-decimal>.<level-decimal>` codec strings.
static LEGACY_AVC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"avc1\.(\d+)\.(\d+)").expect("valid codec pattern"));

/// Whether this media type must be remuxed before reaching the sink. Only
/// the MPEG transport-stream family is in scope for the transform.
#[must_use]
pub fn needs_remux(mime_type: &str) -> bool {
    let lower = mime_type.to_ascii_lowercase();
    lower.starts_with("video/mp2t") || lower.starts_with("audio/mp2t")
}

/// Output type handed to the sink when the input requires remuxing.
///
/// The transport-stream container token is rewritten to its
/// fragmented-container equivalent; an input already under `audio/` maps
/// straight to the audio equivalent, otherwise audio tracks also get the
/// top-level category token rewritten from `video/` to `audio/`. Legacy
/// codec strings are normalized along the way.
#[must_use]
pub fn negotiate_output_type(mime_type: &str, kind: TrackKind) -> String {
    let mut output = CONTAINER_TOKEN.replacen(mime_type, 1, "mp4").into_owned();
    if kind == TrackKind::Audio && !output.contains("audio/") {
        output = output.replacen("video/", "audio/", 1);
    }
    normalize_legacy_codecs(&output)
}

/// Rewrite pre-standard `avc1` codec strings to the standardized
/// four-hex-digit-profile-plus-two-hex-digit-level form. Unknown profiles
/// and out-of-range levels are reported and passed through unmodified.
#[must_use]
pub fn normalize_legacy_codecs(mime_type: &str) -> String {
    LEGACY_AVC
        .replace_all(mime_type, |caps: &Captures<'_>| {
            let profile = &caps[1];
            let level = &caps[2];
            let profile_hex = match profile {
                "66" => "4200",
                "77" => "4d00",
                "100" => "6400",
                _ => {
                    warn!(profile, level, "unknown legacy avc1 profile, passing through");
                    return caps[0].to_string();
                }
            };
            let Ok(level) = level.parse::<u32>() else {
                warn!(profile, level, "unparseable legacy avc1 level, passing through");
                return caps[0].to_string();
            };
            if level >= 256 {
                warn!(profile, level, "legacy avc1 level out of range, passing through");
                return caps[0].to_string();
            }
            format!("avc1.{profile_hex}{level:02x}")
        })
        .into_owned()
}
