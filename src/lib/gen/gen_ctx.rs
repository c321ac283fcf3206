use std::fmt::Write;

/// Output buffer plus the indentation of the block being written
pub struct GenCtx<'a> {
    pub indentation: String,
    pub out: &'a mut String,
}

impl<'a> GenCtx<'a> {
    pub fn new(out: &'a mut String) -> GenCtx<'a> {
        GenCtx {
            indentation: String::new(),
            out,
        }
    }

    #[inline]
    pub fn push_indent(&mut self) { self.indentation += "    "; }

    #[inline]
    pub fn pop_indent(&mut self) {
        self.indentation.truncate(self.indentation.len().saturating_sub(4));
    }

    /// Writes `line` at the current indentation, followed by a newline
    pub fn line(&mut self, line: impl std::fmt::Display) {
        append!(self.out, "{}{}\n", self.indentation, line);
    }
}
