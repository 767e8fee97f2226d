//! Reasoning-trace removal.

use std::sync::LazyLock;

use regex::Regex;

/// Matches `<think>…</think>` blocks: case-insensitive, non-greedy, spanning
/// newlines.
static THINK_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)<think>.*?</think>").expect("static regex is valid")
});

/// Remove every enclosed reasoning-trace block from `raw` and trim the
/// result.
///
/// An unterminated `<think>` is left in place; there is no reliable way to
/// tell where the trace would have ended.
pub fn strip_reasoning(raw: &str) -> String {
  THINK_BLOCK.replace_all(raw.trim(), "").trim().to_owned()
}
