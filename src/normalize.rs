//! Comment text cleanup ahead of scoring.
//!
//! The steps run in a fixed order: typographic folding must come before the
//! character allowlist (or curly quotes and dashes are lost instead of mapped),
//! and emoji must become name tokens before the allowlist strips the glyphs.

use regex::{Captures, Regex};
use std::sync::OnceLock;

const ALLOWED_PUNCT: &str = ".,!?'\":;-_()%";
/// Sentence punctuation directly after a link stays in the text.
const URL_TRAILING: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"'];
const MAX_EMOJI_CHARS: usize = 12;

/// Tags that wrap text inline; removing them must not split words.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "del", "em", "i", "ins", "kbd", "mark", "s", "small", "span", "strike",
    "strong", "sub", "sup", "u",
];

struct Patterns {
    url: Regex,
    mention: Regex,
    tag: Regex,
    empty_brackets: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        url: Regex::new(r"(?i)\b(?:[a-z][a-z0-9+.\-]*://|www\.)[^\s()\[\]<>]+").unwrap(),
        mention: Regex::new(r"(^|\s)(?:/?u/|@)[A-Za-z0-9_\-]+").unwrap(),
        tag: Regex::new(r"</?([A-Za-z][A-Za-z0-9]*)\b[^<>]*>").unwrap(),
        empty_brackets: Regex::new(r"\(\s*\)|\[\s*\]").unwrap(),
        whitespace: Regex::new(r"\s+").unwrap(),
    })
}

/// Normalize raw comment text. Pure and total.
pub fn normalize(raw: &str) -> String {
    let p = patterns();
    let folded = fold_typography(raw);
    let named = emoji_to_names(&folded);
    // Tags go first: attribute values hold links that would otherwise
    // swallow the closing `>`.
    let no_tags = p.tag.replace_all(&named, |caps: &Captures| {
        let name = caps[1].to_ascii_lowercase();
        if INLINE_TAGS.contains(&name.as_str()) { "" } else { " " }
    });
    let no_urls = p.url.replace_all(&no_tags, |caps: &Captures| {
        let url = &caps[0];
        url[url.trim_end_matches(URL_TRAILING).len()..].to_string()
    });
    let no_urls = p.empty_brackets.replace_all(&no_urls, " ");
    let no_mentions = p.mention.replace_all(&no_urls, "${1}");
    let decoded = decode_entities(&no_mentions);
    let filtered: String = decoded
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCT.contains(*c))
        .collect();
    p.whitespace.replace_all(&filtered, " ").trim().to_lowercase()
}

/// Map typographic code points to their ASCII equivalents.
pub fn fold_typography(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{2039}' | '\u{203A}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}' | '\u{00BB}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2002}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => out.push(' '),
            '\u{2022}' | '\u{2023}' | '\u{2043}' => out.push('*'),
            '\u{00B7}' | '\u{2027}' | '\u{2219}' => out.push('.'),
            '\u{200B}' | '\u{FEFF}' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Replace emoji (longest match, ZWJ sequences included) with ` :name: ` tokens.
pub fn emoji_to_names(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if c.is_ascii() {
            out.push(c);
            rest = &rest[c.len_utf8()..];
            continue;
        }
        // Standalone skin-tone modifiers carry no meaning on their own.
        if ('\u{1F3FB}'..='\u{1F3FF}').contains(&c) {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        match longest_emoji(rest) {
            Some((len, emoji)) => {
                out.push_str(" :");
                out.push_str(&emoji_token(emoji.name()));
                out.push_str(": ");
                rest = &rest[len..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

fn longest_emoji(s: &str) -> Option<(usize, &'static emojis::Emoji)> {
    let ends: Vec<usize> = s
        .char_indices()
        .skip(1)
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .take(MAX_EMOJI_CHARS)
        .collect();
    ends.iter().rev().find_map(|&end| emojis::get(&s[..end]).map(|e| (end, e)))
}

/// "face with tears of joy" -> "face_with_tears_of_joy"
fn emoji_token(name: &str) -> String {
    let mut token = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            token.push(c.to_ascii_lowercase());
        } else if !token.ends_with('_') {
            token.push('_');
        }
    }
    token.trim_matches('_').to_string()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
