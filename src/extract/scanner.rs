//! Balanced-span scanning over raw response text
//!
//! All structural characters are ASCII, so the scanners work on bytes and the
//! offsets they return are always valid `str` boundaries.

/// Returns true if the byte at `pos` is preceded by an odd number of backslashes
pub fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    let backslashes = bytes[..pos].iter().rev().take_while(|&&b| b == b'\\').count();
    backslashes % 2 == 1
}

/// Finds the closing brace matching the first `{` at or after `start`
///
/// Braces inside quoted strings are skipped. A quote only toggles the string
/// state when it is not escaped (see [`is_escaped`]), so `\\"` is an escaped
/// backslash followed by a real quote.
///
/// # Returns
/// * `Some(offset)` of the matching `}`
/// * `None` if there is no `{` after `start` or the object never closes
pub fn find_matching_brace(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let open = start + bytes.get(start..)?.iter().position(|&b| b == b'{')?;

    let mut depth = 0usize;
    let mut in_string = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'"' if !is_escaped(bytes, i) => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Finds the unescaped quote closing the string that opens at `open_quote`
pub fn find_string_end(text: &str, open_quote: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open_quote) != Some(&b'"') {
        return None;
    }

    (open_quote + 1..bytes.len()).find(|&i| bytes[i] == b'"' && !is_escaped(bytes, i))
}

/// Finds the `]` matching the `[` at `open`
///
/// Only bracket depth is tracked. Quoted brackets are NOT skipped: the arrays
/// this is used for never carry bracket literals inside their strings.
pub fn find_matching_bracket(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'[') {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
