//! Formatting utilities (config markdown → Telegram HTML, plain-text fallback).

use std::sync::OnceLock;

use regex::Regex;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Convert the Telegram-markdown subset used in configured texts to HTML.
///
/// Supports `*bold*`, `_italic_` and `` `code` ``. Emphasis never spans lines.
pub fn markdown_to_html(input: &str) -> String {
    let escaped = escape_html(input);
    escaped
        .split('\n')
        .map(|line| {
            let l = replace_single_delim(line, '`', "<code>", "</code>");
            let l = replace_single_delim(&l, '*', "<b>", "</b>");
            replace_single_delim(&l, '_', "<i>", "</i>")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn Telegram HTML back into plain text for the no-parse-mode retry.
pub fn strip_html(html: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid tag regex"));

    tag.replace_all(html, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

fn replace_single_delim(text: &str, delim: char, open: &str, close: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i] != delim {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        // Doubled delimiters are literal.
        if i + 1 < chars.len() && chars[i + 1] == delim {
            out.push(delim);
            out.push(delim);
            i += 2;
            continue;
        }

        match chars[i + 1..].iter().position(|c| *c == delim) {
            Some(rel) if rel > 0 => {
                let j = i + 1 + rel;
                out.push_str(open);
                out.extend(&chars[i + 1..j]);
                out.push_str(close);
                i = j + 1;
            }
            _ => {
                out.push(delim);
                i += 1;
            }
        }
    }

    out
}
