/// Fence delimiter emitted by chat models around code answers.
const FENCE: &str = "```";

/// Strip a leading and a trailing fenced-code-block marker from raw model output.
///
/// The opening fence may carry a language tag (```` ```tsx ````). Only whole
/// fence lines are removed; everything between them is returned byte-for-byte.
/// Text with no fences comes back unchanged, so the function is idempotent.
pub fn normalize_source(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut body = trimmed;
    let mut stripped = false;

    if let Some(after_open) = opening_fence_end(body) {
        body = after_open;
        stripped = true;
    }

    if let Some(before_close) = closing_fence_start(body) {
        body = before_close;
        stripped = true;
    }

    if !stripped {
        tracing::debug!("source already clean, nothing to normalize");
        return raw.to_string();
    }

    body.to_string()
}

/// If `text` starts with a fence line, return what follows that line.
fn opening_fence_end(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let (tag, after) = match rest.split_once('\n') {
        Some((tag, after)) => (tag, after),
        // A lone opening fence with nothing after it.
        None => (rest, ""),
    };
    if !is_language_tag(tag.trim_end_matches('\r')) {
        return None;
    }
    Some(after)
}

/// If `text` ends with a fence on its own line, return what precedes it.
fn closing_fence_start(text: &str) -> Option<&str> {
    let before = text.strip_suffix(FENCE)?;
    if before.is_empty() {
        return Some(before);
    }
    let before = before.strip_suffix('\n')?;
    Some(before.strip_suffix('\r').unwrap_or(before))
}

fn is_language_tag(tag: &str) -> bool {
    tag.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_' | '.'))
}
