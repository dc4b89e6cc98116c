//! Scanner support for regexp literals.
//!
//! Only the byte-cursor machinery the literal form needs lives here; the
//! scanner hands the raw body and flags to `Pattern::compile` and never
//! interprets the pattern syntax itself.

use crate::error::{VmError, VmResult};
use crate::regexp::RegExpFlags;

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Current byte position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Consumes one byte if it is `expected`.
    pub fn eat(&mut self, expected: u8) -> bool {
        if self.input.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Scans a regexp literal with the cursor placed just past the
    /// opening `/`. A backslash escapes exactly one byte, so an escaped
    /// `/` does not terminate the body. The flag run after the closing
    /// `/` is parsed in unbound mode: the first non-flag character ends
    /// it and the cursor is left there for the caller to resume.
    pub fn regexp_literal(&mut self) -> VmResult<(String, RegExpFlags)> {
        let start = self.pos;

        loop {
            match self.input.get(self.pos) {
                Some(b'/') => break,
                Some(b'\\') => self.pos += 2,
                Some(_) => self.pos += 1,
                None => {
                    return Err(VmError::syntax_error("unterminated RegExp literal"));
                }
            }
        }

        // Delimiters are ASCII, so the body spans whole characters.
        let body = &self.input[start..self.pos];
        let source = String::from_utf8_lossy(body).into_owned();
        self.pos += 1;

        let (flags, consumed) = RegExpFlags::parse(&self.input[self.pos..], false)?;
        self.pos += consumed;

        Ok((source, flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> VmResult<(String, RegExpFlags, usize)> {
        let mut lexer = Lexer::new(text);
        assert!(lexer.eat(b'/'));
        let (source, flags) = lexer.regexp_literal()?;
        Ok((source, flags, lexer.pos()))
    }

    #[test]
    fn literal_with_flags_and_trailing_code() {
        let (source, flags, pos) = scan("/ab+c/gi; x").unwrap();
        assert_eq!(source, "ab+c");
        assert!(flags.global && flags.ignore_case && !flags.multiline);
        assert_eq!(pos, 8);
        assert_eq!(&"/ab+c/gi; x"[pos..], "; x");
    }

    #[test]
    fn escaped_slash_stays_in_the_body() {
        let (source, _, _) = scan("/a\\/b/").unwrap();
        assert_eq!(source, "a\\/b");
    }

    #[test]
    fn empty_body_is_allowed() {
        let (source, flags, _) = scan("//").unwrap();
        assert_eq!(source, "");
        assert_eq!(flags.count(), 0);
    }

    #[test]
    fn unterminated_literal_is_a_syntax_error() {
        assert!(matches!(scan("/abc"), Err(VmError::SyntaxError(_))));
        // A trailing backslash cannot terminate the body either.
        assert!(matches!(scan("/abc\\"), Err(VmError::SyntaxError(_))));
    }

    #[test]
    fn flag_scan_stops_at_the_first_non_flag_byte() {
        let (_, flags, pos) = scan("/a/g1").unwrap();
        assert!(flags.global);
        assert_eq!(pos, 4);
    }

    #[test]
    fn duplicate_flag_errors_propagate() {
        assert!(matches!(scan("/a/gg"), Err(VmError::SyntaxError(_))));
    }
}
