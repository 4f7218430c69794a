/// Width used for response-body snippets embedded in error messages.
pub const SNIPPET_WIDTH: usize = 50;

const PLACEHOLDER: &str = " [...]";

/// Collapses whitespace and truncates `text` to at most `width` characters on a
/// word boundary, marking the cut with `[...]`. Hyphenated words may also be
/// cut right after a hyphen.
///
/// Widths are counted in `char`s, so a multi-byte character is never split.
pub fn shorten(text: &str, width: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(PLACEHOLDER.chars().count());
    let mut kept = String::new();
    let mut kept_len = 0;
    'words: for word in collapsed.split(' ') {
        for (i, piece) in hyphen_pieces(word).into_iter().enumerate() {
            let separator = i == 0 && !kept.is_empty();
            let needed = piece.chars().count() + usize::from(separator);
            if kept_len + needed > budget {
                break 'words;
            }
            if separator {
                kept.push(' ');
            }
            kept.push_str(piece);
            kept_len += needed;
        }
    }

    if kept.is_empty() {
        PLACEHOLDER.trim_start().to_string()
    } else {
        kept + PLACEHOLDER
    }
}

/// Splits `word` after every hyphen that sits between two alphanumerics,
/// keeping the hyphen on the left piece: `well-known` -> `well-`, `known`.
fn hyphen_pieces(word: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = word.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        let breakable = c == '-'
            && prev.is_some_and(char::is_alphanumeric)
            && next.is_some_and(char::is_alphanumeric);
        if breakable {
            let end = idx + c.len_utf8();
            pieces.push(&word[start..end]);
            start = end;
        }
        prev = Some(c);
    }
    pieces.push(&word[start..]);
    pieces
}
