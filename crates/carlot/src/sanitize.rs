//! Input sanitizing and coercion

use crate::entities::TermId;

/// Clean a single-line text field submitted by a visitor
///
/// Strips markup tags, drops percent-encoded octets, collapses all whitespace
/// runs (line breaks and tabs included) to one space and trims the result. A
/// `<` that does not open a tag is kept as text; templates escape it on render.
pub fn sanitize_text_field(input: &str) -> String {
    let stripped = strip_tags(input);
    let without_octets = strip_percent_octets(&stripped);
    without_octets.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Coerce a submitted id to a term handle
///
/// Reads the leading integer after optional whitespace. Anything without one,
/// and any negative value, becomes `TermId(0)`, which never names a real term.
pub fn coerce_term_id(input: &str) -> TermId {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if negative || leading.is_empty() {
        return TermId(0);
    }

    TermId(leading.parse().unwrap_or(u64::MAX))
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }

        // A tag opens with a letter, '/', '!' or '?'; anything else is a literal '<'
        let opens_tag = matches!(
            chars.peek(),
            Some((_, next)) if next.is_ascii_alphabetic() || matches!(*next, '/' | '!' | '?')
        );
        if !opens_tag {
            out.push(c);
            continue;
        }

        match input[i..].find('>') {
            Some(end) => {
                let tag = &input[i..i + end + 1];
                let lowered = tag.to_ascii_lowercase();
                let skip_to = if lowered.starts_with("<script") || lowered.starts_with("<style") {
                    // Drop the element's body along with its tags
                    let name = if lowered.starts_with("<script") { "script" } else { "style" };
                    let closing = format!("</{}", name);
                    input[i..]
                        .to_ascii_lowercase()
                        .find(&closing)
                        .and_then(|close| {
                            input[i + close..].find('>').map(|gt| i + close + gt + 1)
                        })
                        .unwrap_or(input.len())
                } else {
                    i + end + 1
                };

                while let Some((j, _)) = chars.peek() {
                    if *j < skip_to {
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            // Unterminated tag swallows the rest
            None => break,
        }
    }

    out
}

/// Drop `%XX` octets until none remain
///
/// Removing one octet can join its neighbours into a new one (`%2%2020`).
fn strip_percent_octets(input: &str) -> String {
    let mut current = strip_octets_once(input);
    loop {
        let next = strip_octets_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_octets_once(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            i += 3;
            continue;
        }

        let ch_len = utf8_len(bytes[i]);
        out.push_str(&input[i..i + ch_len]);
        i += ch_len;
    }

    out
}

fn utf8_len(first: u8) -> usize {
    match first {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}
