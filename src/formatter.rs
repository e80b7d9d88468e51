//! Message text escaping and render-time markup.
//!
//! Two distinct stages with a precise ordering contract:
//!
//! 1. [`escape_text`] runs once at send time and its output is what the
//!    state store keeps and persists.
//! 2. [`apply_markup`] runs on every render over the already-escaped text
//!    and its output is never stored.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.*?)_").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(https?://[^\s]+)").unwrap());

/// Escape angle brackets in raw message input.
///
/// Only `<` and `>` are replaced; quotes, ampersands and everything else
/// pass through untouched. This partial escaping is the full extent of the
/// sanitization contract.
///
/// # Arguments
///
/// * `raw` - Raw message text as typed
///
/// # Returns
///
/// The input with every `<` replaced by `&lt;` and every `>` by `&gt;`
pub fn escape_text(raw: &str) -> String {
    raw.replace('<', "&lt;").replace('>', "&gt;")
}

/// Apply lightweight inline markup to already-escaped message text.
///
/// Three sequential whole-string passes, each non-greedy and
/// leftmost-match: `*X*` becomes `<b>X</b>`, then `_X_` becomes
/// `<i>X</i>`, then bare `http(s)://...` URLs become anchors opening in a
/// new context. Each pass runs over the output of the previous one, so
/// underscores inside bold spans or URLs are visible to the italic pass.
/// That interaction is part of the contract of this best-effort pass, not
/// something to fix here.
///
/// # Arguments
///
/// * `escaped` - Message text that already went through [`escape_text`]
///
/// # Returns
///
/// The marked-up display string
pub fn apply_markup(escaped: &str) -> String {
    let bolded = BOLD_RE.replace_all(escaped, "<b>$1</b>");
    let italicized = ITALIC_RE.replace_all(&bolded, "<i>$1</i>");
    LINK_RE
        .replace_all(&italicized, r#"<a href="$1" target="_blank">$1</a>"#)
        .into_owned()
}
