use std::rc::Rc;

use crate::error::{VmError, VmResult};

use super::engine::{self, NarrowRegex, WideRegex};
use super::flags::RegExpFlags;

/// Immutable compiled representation of a regexp source plus flags.
///
/// One `Pattern` is shared by every instance created from the same
/// literal or constructor call and is never mutated after construction.
/// It holds up to two engine handles; either may be absent when the
/// engine declined that form (see `compile`).
#[derive(Debug)]
pub struct Pattern {
    flags: RegExpFlags,
    /// `/source/flags`; the `source` accessor slices the body back out
    /// rather than storing a second copy.
    display: String,
    narrow: Option<NarrowRegex>,
    wide: Option<WideRegex>,
    ncaptures: usize,
}

impl Pattern {
    /// Compiles `source` into both engine forms.
    ///
    /// A form the engine cannot build (e.g. a backreference pattern in
    /// the byte-oriented engine) is recorded as absent, not an error;
    /// the compile fails with a SyntaxError only when both forms are
    /// rejected. When both forms are present they must agree on the
    /// number of capture groups — a mismatch means the two compiled
    /// forms diverged semantically and is a fatal engine fault.
    pub fn compile(source: &str, flags: RegExpFlags) -> VmResult<Rc<Pattern>> {
        // The zero-width pattern stands in for an empty source.
        let source = if source.is_empty() { "(?:)" } else { source };
        let translated = engine::translate_pattern(source, flags);

        let mut first_diag = None;

        let narrow = match engine::compile_narrow(&translated) {
            Ok(re) => Some(re),
            Err(err) => {
                log::debug!("byte form of /{source}/ declined: {err}");
                first_diag = Some(err.to_string());
                None
            }
        };

        let wide = match engine::compile_wide(&translated) {
            Ok(re) => Some(re),
            Err(diag) => {
                log::debug!("UTF-8 form of /{source}/ declined: {diag}");
                first_diag.get_or_insert(diag);
                None
            }
        };

        let ncaptures = match (&narrow, &wide) {
            (Some(n), Some(w)) => {
                let (nn, nw) = (n.captures_len(), w.ncaptures());
                if nn != nw {
                    log::error!(
                        "capture counts of the byte and UTF-8 forms of RegExp \
                         /{source}/ differ: {nn} vs {nw}"
                    );
                    return Err(VmError::internal(format!(
                        "capture counts of the compiled forms of /{source}/ differ"
                    )));
                }
                nn
            }
            (Some(n), None) => n.captures_len(),
            (None, Some(w)) => w.ncaptures(),
            (None, None) => {
                return Err(VmError::syntax_error(
                    first_diag.unwrap_or_else(|| "invalid regular expression".to_string()),
                ));
            }
        };

        Ok(Rc::new(Pattern {
            flags,
            display: format!("/{source}/{flags}"),
            narrow,
            wide,
            ncaptures,
        }))
    }

    pub fn flags(&self) -> RegExpFlags {
        self.flags
    }

    /// The full `/source/flags` form, used by `toString`.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The pattern body without delimiters or flags.
    pub fn source(&self) -> &str {
        &self.display[1..self.display.len() - 1 - self.flags.count()]
    }

    /// Capture-group count, including the implicit group 0.
    pub fn ncaptures(&self) -> usize {
        self.ncaptures
    }

    pub fn narrow(&self) -> Option<&NarrowRegex> {
        self.narrow.as_ref()
    }

    pub fn wide(&self) -> Option<&WideRegex> {
        self.wide.as_ref()
    }
}
