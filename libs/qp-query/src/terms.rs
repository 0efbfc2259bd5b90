//! Free-text search term normalization.

/// The engine's match-everything query.
pub const MATCH_ALL: &str = "*";

// Characters with meaning in the engine's query syntax.
const RESERVED: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/',
];

/// Turn the user's `search_text` into the engine query string.
///
/// Blank or absent text, or a bare `*`, is [`MATCH_ALL`]. Otherwise
/// double-quoted phrases are kept as phrases and every other token is matched
/// literally.
pub fn search_terms(text: Option<&str>) -> String {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() || text == MATCH_ALL {
        return MATCH_ALL.to_string();
    }

    let tokens: Vec<String> = split_with_quotes(text)
        .into_iter()
        .map(|token| {
            if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
                token.replace('\\', "\\\\")
            } else {
                escape_term(token)
            }
        })
        .collect();

    if tokens.is_empty() {
        MATCH_ALL.to_string()
    } else {
        tokens.join(" ")
    }
}

/// Backslash-escape every reserved character.
pub fn escape_term(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split on whitespace, keeping `"quoted phrases"` together.
///
/// A token starts at any non-quote, non-space character and runs to the next
/// whitespace. A quote opens a phrase that ends at the next quote on the same
/// line; an unmatched quote is dropped.
pub(crate) fn split_with_quotes(input: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while let Some(c) = input[i..].chars().next() {
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }

        if c != '"' {
            let end = input[i..]
                .find(char::is_whitespace)
                .map_or(input.len(), |n| i + n);
            out.push(&input[i..end]);
            i = end;
            continue;
        }

        let open_end = i + 1;
        match phrase_end(input, open_end) {
            Some(close) => {
                out.push(&input[i..=close]);
                i = close + 1;
            }
            None => i = open_end,
        }
    }
    out
}

// Index of the quote closing a phrase whose body starts at `body_start`.
// The body holds at least one character and never crosses a newline.
fn phrase_end(input: &str, body_start: usize) -> Option<usize> {
    let first = input[body_start..].chars().next()?;
    if first == '\n' {
        return None;
    }
    let search_from = body_start + first.len_utf8();
    for (offset, c) in input[search_from..].char_indices() {
        match c {
            '"' => return Some(search_from + offset),
            '\n' => return None,
            _ => {}
        }
    }
    None
}
