//! The cursor grammar rules read through, and the handful of combinators
//! they are composed from.
//!
//! A rule is any `FnOnce(&mut Cursor) -> Option<T>`: `Some` on a match, `None`
//! otherwise. Rules do not restore the cursor themselves; [`attempt`] does,
//! which is what makes an ordered choice (`attempt(a).or_else(attempt(b))`)
//! backtrack locally.
use super::parser::{GrammarError, Recovery};
use super::scan;

/// How deep type expressions and namespace blocks may nest
pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug)]
pub struct Cursor<'s> {
    src: &'s str,
    pos: usize,
    recovery: Recovery,
    furthest: usize,
    expected: &'static str,
    skipped: Vec<GrammarError>,
    depth: usize,
    aborted: Option<GrammarError>,
}

/// Everything [`attempt`] needs to undo a failed rule.
#[derive(Clone, Copy, Debug)]
pub struct Checkpoint {
    pos: usize,
    skipped: usize,
    depth: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(src: &'s str, recovery: Recovery) -> Cursor<'s> {
        Cursor {
            src,
            pos: 0,
            recovery,
            furthest: 0,
            expected: "statement",
            skipped: Vec::new(),
            depth: 0,
            aborted: None,
        }
    }

    #[inline]
    pub fn pos(&self) -> usize { self.pos }

    #[inline]
    pub fn recovery(&self) -> Recovery { self.recovery }

    #[inline]
    pub fn is_eof(&self) -> bool { self.pos >= self.src.len() }

    #[inline]
    pub fn peek(&self) -> Option<char> { self.src[self.pos..].chars().next() }

    #[inline]
    pub fn slice(&self, from: usize) -> &'s str { &self.src[from..self.pos] }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            skipped: self.skipped.len(),
            depth: self.depth,
        }
    }

    pub fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
        self.skipped.truncate(cp.skipped);
        self.depth = cp.depth;
    }

    /// Opens one nesting level, failing past [`MAX_DEPTH`]. A rule that
    /// fails after entering is rebalanced by the enclosing [`attempt`].
    pub fn enter(&mut self) -> Option<()> {
        if self.depth >= MAX_DEPTH {
            return self.fail("nesting too deep");
        }
        self.depth += 1;
        Some(())
    }

    pub fn leave(&mut self) { self.depth = self.depth.saturating_sub(1); }

    /// Stops the whole parse at the furthest mismatch seen so far.
    pub fn abort(&mut self) -> GrammarError {
        let error = self.error();
        self.aborted = Some(error);
        error
    }

    #[inline]
    pub fn aborted(&self) -> Option<GrammarError> { self.aborted }

    pub fn skip_trivia(&mut self) { self.pos = scan::skip_trivia(self.src, self.pos); }

    /// Records a mismatch at the current position and fails the rule.
    pub fn fail<T>(&mut self, expected: &'static str) -> Option<T> {
        if self.pos >= self.furthest {
            self.furthest = self.pos;
            self.expected = expected;
        }
        None
    }

    /// The furthest mismatch seen so far.
    pub fn error(&self) -> GrammarError {
        GrammarError {
            offset: self.furthest,
            expected: self.expected,
        }
    }

    /// Skips the statement that started at `start`, remembering why.
    pub fn skip_statement(&mut self, start: usize) -> GrammarError {
        let found = self.error();
        let error = GrammarError {
            offset: found.offset.max(start),
            expected: found.expected,
        };
        self.skipped.push(error);
        self.pos = scan::sync_point(self.src, start);
        if self.pos == start {
            let step = self.peek().map_or(1, char::len_utf8);
            self.pos += step;
        }
        self.furthest = self.pos;
        error
    }

    pub fn into_skipped(self) -> Vec<GrammarError> { self.skipped }

    /// Matches `lit` exactly, after trivia.
    pub fn token(&mut self, lit: &'static str) -> Option<()> {
        self.skip_trivia();
        let src = self.src;
        if src[self.pos..].starts_with(lit) {
            self.pos += lit.len();
            Some(())
        } else {
            self.fail(lit)
        }
    }

    /// Matches `kw` after trivia when it is not the prefix of a longer
    /// identifier.
    pub fn keyword(&mut self, kw: &'static str) -> Option<()> {
        self.skip_trivia();
        let src = self.src;
        let rest = &src[self.pos..];
        let boundary = || rest[kw.len()..].chars().next().map_or(true, |ch| !is_ident_char(ch));
        if rest.starts_with(kw) && boundary() {
            self.pos += kw.len();
            Some(())
        } else {
            self.fail(kw)
        }
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, after trivia.
    pub fn ident(&mut self) -> Option<&'s str> {
        self.skip_trivia();
        let src = self.src;
        let start = self.pos;
        let rest = src[start..].as_bytes();
        match rest.first() {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
            _ => return self.fail("identifier"),
        }
        let len = rest
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
            .unwrap_or(rest.len());
        self.pos += len;
        Some(self.slice(start))
    }

    /// A `"..."` literal, after trivia. Returns the text between the quotes.
    pub fn string_literal(&mut self) -> Option<&'s str> {
        self.skip_trivia();
        if self.peek() != Some('"') {
            return self.fail("string literal");
        }
        let src = self.src;
        let start = self.pos;
        match scan::string_end(src, start) {
            Some(end) => {
                self.pos = end;
                Some(&src[start + 1..end - 1])
            }
            None => self.fail("closing quote"),
        }
    }

    /// `[+-]?[0-9]+(\.[0-9]+)?`, after trivia.
    pub fn numeric_literal(&mut self) -> Option<&'s str> {
        self.skip_trivia();
        let src = self.src;
        let start = self.pos;
        let bytes = src.as_bytes();
        let mut i = start;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
        let whole = digits(i);
        if whole == 0 {
            return self.fail("number");
        }
        i += whole;
        if bytes.get(i) == Some(&b'.') {
            let frac = digits(i + 1);
            if frac > 0 {
                i += 1 + frac;
            }
        }
        self.pos = i;
        Some(self.slice(start))
    }

    /// Skips a balanced `open ... close` group, after trivia, and returns the
    /// text between the delimiters. Strings and comments inside are skipped as
    /// units.
    pub fn balanced(&mut self, open: u8, close: u8) -> Option<&'s str> {
        self.skip_trivia();
        let src = self.src;
        let bytes = src.as_bytes();
        if bytes.get(self.pos) != Some(&open) {
            return self.fail("opening delimiter");
        }
        let start = self.pos;
        let mut depth = 0usize;
        let mut i = start;
        while i < bytes.len() {
            let next = scan::skip_trivia(src, i);
            if next != i {
                i = next;
                continue;
            }
            match bytes[i] {
                b'"' => {
                    i = scan::skip_string(src, i);
                    continue;
                }
                b if b == open => depth += 1,
                b if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = i + 1;
                        return Some(&src[start + 1..i]);
                    }
                }
                _ => {}
            }
            i += src[i..].chars().next().map_or(1, char::len_utf8);
        }
        self.pos = bytes.len();
        self.fail("closing delimiter")
    }
}

pub fn is_ident_char(ch: char) -> bool { ch.is_ascii_alphanumeric() || ch == '_' }

/// Runs `rule`, rewinding the cursor if it does not match.
pub fn attempt<'s, T>(c: &mut Cursor<'s>, rule: impl FnOnce(&mut Cursor<'s>) -> Option<T>) -> Option<T> {
    let cp = c.checkpoint();
    let result = rule(c);
    if result.is_none() {
        c.restore(cp);
    }
    result
}

/// Zero or more matches of `rule`.
pub fn many<'s, T>(c: &mut Cursor<'s>, mut rule: impl FnMut(&mut Cursor<'s>) -> Option<T>) -> Vec<T> {
    let mut items = Vec::new();
    loop {
        let before = c.pos();
        match attempt(c, &mut rule) {
            Some(item) => {
                items.push(item);
                if c.pos() == before {
                    break;
                }
            }
            None => break,
        }
    }
    items
}

/// One or more `,`/`;` in a row.
pub fn separator(c: &mut Cursor<'_>) -> Option<()> {
    attempt(c, |c| c.token(",")).or_else(|| attempt(c, |c| c.token(";")))?;
    while attempt(c, |c| c.token(",")).or_else(|| attempt(c, |c| c.token(";"))).is_some() {}
    Some(())
}

/// Zero or more `rule` matches separated by `sep`, with an optional trailing
/// separator.
pub fn separated_by<'s, T>(
    c: &mut Cursor<'s>,
    mut rule: impl FnMut(&mut Cursor<'s>) -> Option<T>,
    mut sep: impl FnMut(&mut Cursor<'s>) -> Option<()>,
) -> Vec<T> {
    let mut items = Vec::new();
    match attempt(c, &mut rule) {
        Some(first) => items.push(first),
        None => return items,
    }
    loop {
        let before = c.pos();
        if attempt(c, &mut sep).is_none() {
            break;
        }
        match attempt(c, &mut rule) {
            Some(item) => items.push(item),
            None => break,
        }
        if c.pos() == before {
            break;
        }
    }
    items
}

/// [`separated_by`] with `,`/`;` separators, as used by model, enum and union
/// bodies.
pub fn separated<'s, T>(c: &mut Cursor<'s>, rule: impl FnMut(&mut Cursor<'s>) -> Option<T>) -> Vec<T> {
    separated_by(c, rule, separator)
}

/// [`separated_by`] with `,` separators only.
pub fn comma_separated<'s, T>(c: &mut Cursor<'s>, rule: impl FnMut(&mut Cursor<'s>) -> Option<T>) -> Vec<T> {
    separated_by(c, rule, |c| c.token(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cursor(src: &str) -> Cursor<'_> { Cursor::new(src, Recovery::SkipStatement) }

    #[test]
    fn attempt_rewinds_on_failure() {
        let mut c = cursor("model Foo");
        let result = attempt(&mut c, |c| {
            c.keyword("model")?;
            c.keyword("enum")
        });
        assert_eq!(result, None);
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn ordered_choice_takes_first_match() {
        let mut c = cursor("extends Base");
        let result = attempt(&mut c, |c| c.keyword("extends").map(|_| "extends"))
            .or_else(|| attempt(&mut c, |c| c.ident()));
        assert_eq!(result, Some("extends"));
    }

    #[test]
    fn keyword_respects_identifier_boundary() {
        let mut c = cursor("modelling");
        assert_eq!(c.keyword("model"), None);
        let mut c = cursor("model{");
        assert_eq!(c.keyword("model"), Some(()));
    }

    #[test]
    fn ident_skips_trivia() {
        let mut c = cursor("  /* c */ _user_1 rest");
        assert_eq!(c.ident(), Some("_user_1"));
        let mut c = cursor("1abc");
        assert_eq!(c.ident(), None);
    }

    #[test]
    fn literals() {
        let mut c = cursor(r#" "a b" -12.5 7."#);
        assert_eq!(c.string_literal(), Some("a b"));
        assert_eq!(c.numeric_literal(), Some("-12.5"));
        assert_eq!(c.numeric_literal(), Some("7"));
        assert_eq!(c.peek(), Some('.'));
    }

    #[test]
    fn unterminated_string_fails() {
        let mut c = cursor(r#""open"#);
        assert_eq!(c.string_literal(), None);
    }

    #[test]
    fn balanced_group() {
        let mut c = cursor(r#"(a, (b), ")") tail"#);
        assert_eq!(c.balanced(b'(', b')'), Some(r#"a, (b), ")""#));
        assert_eq!(c.ident(), Some("tail"));
    }

    #[test]
    fn separated_with_trailing_separator() {
        let mut c = cursor("a, b; c;; }");
        let items = separated(&mut c, |c| c.ident());
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(c.token("}"), Some(()));
    }

    #[test]
    fn nesting_is_bounded() {
        let mut c = cursor("");
        for _ in 0..MAX_DEPTH {
            assert_eq!(c.enter(), Some(()));
        }
        assert_eq!(c.enter(), None);
        assert_eq!(c.error().expected, "nesting too deep");
        c.leave();
        assert_eq!(c.enter(), Some(()));
    }

    #[test]
    fn attempt_restores_depth() {
        let mut c = cursor("x");
        let result: Option<()> = attempt(&mut c, |c| {
            c.enter()?;
            c.enter()?;
            c.token("y")
        });
        assert_eq!(result, None);
        for _ in 0..MAX_DEPTH {
            assert_eq!(c.enter(), Some(()));
        }
    }

    #[test]
    fn furthest_failure_is_reported() {
        let mut c = cursor("model Foo {");
        let _ = attempt(&mut c, |c| {
            c.keyword("model")?;
            c.ident()?;
            c.token("{")?;
            c.token("}")
        });
        let error = c.error();
        assert_eq!(error.offset, "model Foo {".len());
        assert_eq!(error.expected, "}");
    }
}
