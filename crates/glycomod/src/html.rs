// Standard Library Imports
use std::sync::LazyLock;

// External Crate Imports
use regex::{Captures, Regex};

// Public API ==========================================================================================================

/// Pulls the readable text out of a search service page. Only the text following the first `<hr>` is kept, since
/// everything before it is navigation. Text that isn't HTML is returned unchanged.
#[must_use]
pub fn extract_text(body: &str) -> String {
    let Some(rule) = HORIZONTAL_RULE.find(body) else {
        return body.to_owned();
    };
    let results = &body[rule.end()..];

    let results = INVISIBLE.replace_all(results, "");
    let results = LINE_BREAK.replace_all(&results, "\n");
    let results = TAG.replace_all(&results, "");
    ENTITY
        .replace_all(&results, |caps: &Captures| decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_owned()))
        .into_owned()
}

// Private Functions ===================================================================================================

static HORIZONTAL_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<hr\b[^>]*>").unwrap());
static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->").unwrap()
});
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "Delta" => 'Δ',
        numeric => {
            let code = numeric.strip_prefix('#')?;
            let code = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

// Unit Tests ==========================================================================================================
