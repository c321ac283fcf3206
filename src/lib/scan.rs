//! Trivia skipping shared by every grammar rule.
//!
//! Trivia is any mixture of whitespace, `//` line comments and `/* */` block
//! comments. Block comments do not nest; an unterminated one runs to the end
//! of the input.

/// Returns the first position at or after `pos` that is not trivia.
///
/// Never returns a position past the end of `text`, and returns `pos` itself
/// when there is nothing to skip.
pub fn skip_trivia(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = pos.min(bytes.len());
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => pos += 1,
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = text[pos..].find('\n').map_or(bytes.len(), |n| pos + n);
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = text[pos + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |n| pos + 2 + n + 2);
            }
            b if b < 0x80 => break,
            _ => match text[pos..].chars().next() {
                Some(ch) if ch.is_whitespace() => pos += ch.len_utf8(),
                _ => break,
            },
        }
    }
    pos
}

/// Finds the end of a `"..."` string starting at `pos` (which must hold the
/// opening quote): the position just past the closing quote, or `None` when
/// the string is never closed.
pub fn string_end(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Like [`string_end`], but an unclosed string runs to the end of the input.
pub fn skip_string(text: &str, pos: usize) -> usize { string_end(text, pos).unwrap_or(text.len()) }

/// Finds where statement-level recovery should resume after a failure at
/// `start`.
///
/// Stops after the first `;` at brace depth zero, or after the `}` that
/// closes a group opened inside the skipped span. A `}` closing an enclosing
/// block is left in place. Strings and comments are skipped as units.
pub fn sync_point(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut pos = start.min(bytes.len());
    while pos < bytes.len() {
        let next = skip_trivia(text, pos);
        if next != pos {
            pos = next;
            continue;
        }
        match bytes[pos] {
            b'"' => {
                pos = skip_string(text, pos);
                continue;
            }
            b'{' => depth += 1,
            b'}' if depth == 0 => return pos,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return pos + 1;
                }
            }
            b';' if depth == 0 => return pos + 1,
            _ => {}
        }
        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_width_skip() {
        assert_eq!(skip_trivia("model", 0), 0);
        assert_eq!(skip_trivia("", 0), 0);
    }

    #[test]
    fn skips_mixed_trivia() {
        let text = "  // line\n\t/* block\n comment */  model";
        assert_eq!(skip_trivia(text, 0), text.find("model").unwrap());
    }

    #[test]
    fn line_comment_at_end_of_input() {
        let text = "x // trailing";
        assert_eq!(skip_trivia(text, 1), text.len());
    }

    #[test]
    fn unterminated_block_comment_stops_at_end() {
        let text = "/* never closed";
        assert_eq!(skip_trivia(text, 0), text.len());
    }

    #[test]
    fn block_comments_do_not_nest() {
        let text = "/* a /* b */ c */";
        assert_eq!(skip_trivia(text, 0), text.find("c */").unwrap());
    }

    #[test]
    fn never_past_end() {
        assert_eq!(skip_trivia("ab", 10), 2);
    }

    #[test]
    fn unicode_whitespace() {
        let text = "\u{a0}\u{2003}x";
        assert_eq!(skip_trivia(text, 0), text.find('x').unwrap());
    }

    #[test]
    fn string_with_escaped_quote() {
        let text = r#""a\"b" rest"#;
        assert_eq!(skip_string(text, 0), 6);
    }

    #[test]
    fn unclosed_string_has_no_end() {
        assert_eq!(string_end(r#""a\""#, 0), None);
        assert_eq!(skip_string(r#""a\""#, 0), 4);
    }

    #[test]
    fn sync_after_semicolon() {
        let text = "op broken(; model A {}";
        assert_eq!(sync_point(text, 0), text.find(';').unwrap() + 1);
    }

    #[test]
    fn sync_after_balanced_block() {
        let text = "model A { a: { b: string } } model B {}";
        assert_eq!(sync_point(text, 0), text.find(" model B").unwrap());
    }

    #[test]
    fn sync_ignores_braces_in_strings_and_comments() {
        let text = "model A { a: \"}\" /* } */ } enum B {}";
        assert_eq!(sync_point(text, 0), text.find(" enum B").unwrap());
    }

    #[test]
    fn sync_stops_before_enclosing_close() {
        let text = "garbage }";
        assert_eq!(sync_point(text, 0), text.find('}').unwrap());
    }
}
