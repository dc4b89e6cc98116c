use std::fmt;

use crate::error::{VmError, VmResult};

/// Compile-time regexp options: `g`, `i`, `m`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegExpFlags {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
}

impl RegExpFlags {
    /// Scans flag characters from the start of `text`.
    ///
    /// In bound mode (explicit flag-string construction) the first
    /// unrecognized character is a SyntaxError. In unbound mode (literal
    /// lexing) the scan stops silently there, and the returned position
    /// tells the surrounding lexer where to resume. A repeated flag is an
    /// error in both modes.
    pub fn parse(text: &[u8], bound: bool) -> VmResult<(Self, usize)> {
        let mut flags = Self::default();
        let mut pos = 0;

        while pos < text.len() {
            let slot = match text[pos] {
                b'g' => &mut flags.global,
                b'i' => &mut flags.ignore_case,
                b'm' => &mut flags.multiline,
                other => {
                    if bound {
                        return Err(VmError::syntax_error(format!(
                            "invalid RegExp flag \"{}\"",
                            other as char
                        )));
                    }
                    break;
                }
            };

            if *slot {
                return Err(VmError::syntax_error(format!(
                    "duplicate RegExp flag \"{}\"",
                    text[pos] as char
                )));
            }
            *slot = true;
            pos += 1;
        }

        Ok((flags, pos))
    }

    /// Number of active flags (size of the rendered suffix).
    pub fn count(&self) -> usize {
        self.global as usize + self.ignore_case as usize + self.multiline as usize
    }
}

/// Renders active flags in the fixed order `g`, `i`, `m` regardless of
/// the order they were written in.
impl fmt::Display for RegExpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            write!(f, "g")?;
        }
        if self.ignore_case {
            write!(f, "i")?;
        }
        if self.multiline {
            write!(f, "m")?;
        }
        Ok(())
    }
}
