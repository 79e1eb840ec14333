//! Splitting long replies into Telegram-sized messages.

/// Telegram rejects messages over 4096 characters; stay clear of it.
pub const DEFAULT_CHUNK_CHARS: usize = 4000;

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Produces `ceil(len / max_chars)` pieces that concatenate back to `text`
/// exactly, line breaks included. Empty input yields no pieces.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        current.push(c);
        count += 1;
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// First `max_chars` characters of `text`.
pub fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Escape text for inclusion in a Telegram HTML message.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
