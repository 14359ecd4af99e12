//! Content cleanup and splitting for post records.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Default maximum size, in bytes, of the `content` of one record.
pub const DEFAULT_CONTENT_MAX_SIZE: usize = 2000;

/// Prefix of every part but the first, marking that the text was cut.
pub const CONTINUATION_PREFIX: &str = "… ";

static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<!\[CDATA\[.*?\]\]>|<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>",
    )
    .expect("noise pattern is valid")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("entity pattern is valid")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Turn rendered post HTML into plain searchable text.
///
/// Scripts, styles, comments and CDATA sections are dropped with their content,
/// remaining tags are removed, entities decoded and whitespace collapsed.
pub fn prepare_content(html: &str) -> String {
    let without_noise = NOISE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_noise, " ");
    let decoded = ENTITY.replace_all(&without_tags, |caps: &Captures| decode_entity(&caps[1], &caps[0]));
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entity(entity: &str, raw: &str) -> String {
    let numeric = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    if let Some(code) = numeric {
        return char::from_u32(code).map_or_else(|| raw.to_string(), String::from);
    }

    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "hellip" => "…",
        "mdash" => "—",
        "ndash" => "–",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "laquo" => "«",
        "raquo" => "»",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "euro" => "€",
        _ => return raw.to_string(),
    };
    decoded.to_string()
}

/// Split `content` into parts of at most `max_size` bytes (plus the continuation prefix).
///
/// Cuts happen at the last space before the limit, or at the limit itself when a
/// single word is longer than `max_size`. The result is never empty: empty
/// content yields one empty part.
pub fn explode_content(content: &str, max_size: usize) -> Vec<String> {
    let max_size = max_size.max(1);
    let mut parts = Vec::new();
    let mut rest = content.trim();
    let mut prefix = "";

    loop {
        if rest.len() <= max_size {
            parts.push(format!("{}{}", prefix, rest));
            return parts;
        }

        let window = floor_char_boundary(rest, max_size);
        let mut cut = if rest[window..].starts_with(' ') {
            window
        } else {
            rest[..window].rfind(' ').unwrap_or(window)
        };
        if cut == 0 {
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        parts.push(format!("{}{}", prefix, rest[..cut].trim_end()));
        rest = rest[cut..].trim_start();
        prefix = CONTINUATION_PREFIX;
    }
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    (0..=index.min(s.len()))
        .rev()
        .find(|i| s.is_char_boundary(*i))
        .unwrap_or(0)
}
