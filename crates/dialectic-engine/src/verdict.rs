//! Parsers for the two verdict grammars the model is asked to follow.
//!
//! Model output is untrusted free text. These functions are the only place
//! it is interpreted; the rest of the engine sees a boolean and an optional
//! explanation.

/// Prefix of a positive contradiction verdict.
pub const CONTRADICTION_MARKER: &str = "CONTRADICTION:";

/// The whole of a negative contradiction verdict.
pub const NO_CONTRADICTION: &str = "NO_CONTRADICTION";

pub const RESOLVED: &str = "RESOLVED";
pub const UNRESOLVED: &str = "UNRESOLVED";
pub const NOT_RESOLVED: &str = "NOT_RESOLVED";

/// The parsed reply to a contradiction-detection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContradictionVerdict {
  /// Output began with [`CONTRADICTION_MARKER`]. Carries the explanation
  /// after the marker, if any.
  Found(Option<String>),
  /// Output was exactly [`NO_CONTRADICTION`].
  Clear,
  /// Anything else. Treated as no contradiction by the caller.
  Unrecognised,
}

/// Parse contradiction-detector output.
///
/// Only a case-insensitive [`CONTRADICTION_MARKER`] prefix counts as a
/// positive verdict.
pub fn parse_contradiction(output: &str) -> ContradictionVerdict {
  let output = output.trim();
  let marker_len = CONTRADICTION_MARKER.len();

  let has_marker = output
    .get(..marker_len)
    .is_some_and(|head| head.eq_ignore_ascii_case(CONTRADICTION_MARKER));

  if has_marker {
    let details = output[marker_len..].trim();
    return ContradictionVerdict::Found(
      (!details.is_empty()).then(|| details.to_owned()),
    );
  }

  if output.eq_ignore_ascii_case(NO_CONTRADICTION) {
    ContradictionVerdict::Clear
  } else {
    ContradictionVerdict::Unrecognised
  }
}

/// Parse resolution-check output. Fails closed.
///
/// Resolved only if a `RESOLVED` token appears and no negated form does
/// (`UNRESOLVED`, `NOT_RESOLVED`, or `NOT` directly before `RESOLVED`).
pub fn parse_resolution(output: &str) -> bool {
  let tokens: Vec<String> = output
    .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
    .filter(|t| !t.is_empty())
    .map(str::to_ascii_uppercase)
    .collect();

  let mut resolved = false;
  for (i, token) in tokens.iter().enumerate() {
    match token.as_str() {
      UNRESOLVED | NOT_RESOLVED => return false,
      RESOLVED if i > 0 && tokens[i - 1] == "NOT" => return false,
      RESOLVED => resolved = true,
      _ => {}
    }
  }
  resolved
}
