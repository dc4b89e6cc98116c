//! The wrapped matching engine.
//!
//! One pattern source is compiled into up to two engine handles: a
//! byte-oriented form (`regex::bytes`, Unicode mode off) for raw byte and
//! single-byte-width subjects, and a str-oriented form for multi-byte
//! subjects. The str form prefers `fancy_regex`, which covers the
//! JavaScript-only constructs (backreferences, lookaround), and falls
//! back to `regex::Regex` when fancy's parser rejects the pattern.

use crate::error::{VmError, VmResult};

use super::flags::RegExpFlags;

pub type NarrowRegex = regex::bytes::Regex;

/// Compiled str-oriented handle.
#[derive(Debug)]
pub enum WideRegex {
    Fancy(fancy_regex::Regex),
    Standard(regex::Regex),
}

impl WideRegex {
    /// Number of capture groups, including the implicit group 0.
    pub fn ncaptures(&self) -> usize {
        match self {
            WideRegex::Fancy(r) => r.capture_names().count(),
            WideRegex::Standard(r) => r.captures_len(),
        }
    }
}

/// Compiles the byte-oriented form. Case-insensitivity and multiline
/// options ride along as inline flags in the translated pattern.
pub fn compile_narrow(translated: &str) -> Result<NarrowRegex, regex::Error> {
    regex::bytes::RegexBuilder::new(translated)
        .unicode(false)
        .build()
}

/// Compiles the str-oriented form, fancy first. On failure the fancy
/// diagnostic is reported; it names the JavaScript-level construct.
pub fn compile_wide(translated: &str) -> Result<WideRegex, String> {
    match fancy_regex::Regex::new(translated) {
        Ok(re) => Ok(WideRegex::Fancy(re)),
        Err(fancy_err) => match regex::Regex::new(translated) {
            Ok(re) => Ok(WideRegex::Standard(re)),
            Err(_) => Err(fancy_err.to_string()),
        },
    }
}

/// Capture-offset buffer: one `(start, end)` byte pair per group, `None`
/// for groups that did not participate. Reused across `test` calls.
#[derive(Default)]
pub struct CaptureBuf {
    pairs: Vec<Option<(usize, usize)>>,
}

impl CaptureBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: usize) -> Option<(usize, usize)> {
        self.pairs.get(group).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn reset(&mut self, ncaptures: usize) {
        self.pairs.clear();
        self.pairs.resize(ncaptures, None);
    }
}

/// Runs the byte-oriented handle. Offsets in `buf` are relative to
/// `haystack`. The byte engine has no runtime failure mode.
pub fn match_narrow(re: &NarrowRegex, haystack: &[u8], buf: &mut CaptureBuf) -> bool {
    buf.reset(re.captures_len());
    match re.captures(haystack) {
        Some(caps) => {
            for i in 0..caps.len() {
                buf.pairs[i] = caps.get(i).map(|m| (m.start(), m.end()));
            }
            true
        }
        None => false,
    }
}

/// Runs the str-oriented handle. A fancy runtime failure (e.g. the
/// backtrack limit) is an engine fault, not a no-match.
pub fn match_wide(re: &WideRegex, haystack: &str, buf: &mut CaptureBuf) -> VmResult<bool> {
    buf.reset(re.ncaptures());
    match re {
        WideRegex::Fancy(r) => match r.captures(haystack) {
            Ok(Some(caps)) => {
                for i in 0..caps.len() {
                    buf.pairs[i] = caps.get(i).map(|m| (m.start(), m.end()));
                }
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) => Err(VmError::internal(err.to_string())),
        },
        WideRegex::Standard(r) => match r.captures(haystack) {
            Some(caps) => {
                for i in 0..caps.len() {
                    buf.pairs[i] = caps.get(i).map(|m| (m.start(), m.end()));
                }
                Ok(true)
            }
            None => Ok(false),
        },
    }
}

fn is_syntax_char(c: char) -> bool {
    matches!(
        c,
        '^' | '$' | '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
    )
}

fn push_literal(out: &mut String, c: char) {
    if is_syntax_char(c) || c == '/' {
        out.push('\\');
    }
    out.push(c);
}

fn hex_value(chars: &[char]) -> Option<u32> {
    let text: String = chars.iter().collect();
    u32::from_str_radix(&text, 16).ok()
}

/// Rewrites a JavaScript pattern into the engine's syntax, the analog of
/// a JS-compatibility compile option. Flags become inline `(?i)`/`(?m)`
/// prefixes so one translated string serves both compiled forms.
///
/// Rewrites: `(?<name>` → `(?P<name>` (lookbehind untouched), `\k<name>`
/// → `(?P=name)`, `\uHHHH`/`\u{...}`/`\xHH`/`\cX`/`\0` escapes resolved
/// to literal characters, `\v` → U+000B. Everything else passes through.
pub fn translate_pattern(source: &str, flags: RegExpFlags) -> String {
    let mut out = String::with_capacity(source.len() + 8);
    if flags.ignore_case {
        out.push_str("(?i)");
    }
    if flags.multiline {
        out.push_str("(?m)");
    }

    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let mut in_class = false;

    while i < len {
        let c = chars[i];

        match c {
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                i += 1;
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
                i += 1;
            }
            '(' if !in_class
                && i + 2 < len
                && chars[i + 1] == '?'
                && chars[i + 2] == '<'
                && !matches!(chars.get(i + 3), Some('=') | Some('!')) =>
            {
                out.push_str("(?P<");
                i += 3;
            }
            '\\' if i + 1 < len => {
                i = translate_escape(&mut out, &chars, i, in_class);
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Handles one backslash escape starting at `chars[at]`; returns the
/// index of the first untranslated character.
fn translate_escape(out: &mut String, chars: &[char], at: usize, in_class: bool) -> usize {
    let len = chars.len();
    let next = chars[at + 1];

    match next {
        'k' if !in_class && chars.get(at + 2) == Some(&'<') => {
            let name_start = at + 3;
            if let Some(rel) = chars[name_start..].iter().position(|&c| c == '>') {
                let name: String = chars[name_start..name_start + rel].iter().collect();
                out.push_str("(?P=");
                out.push_str(&name);
                out.push(')');
                return name_start + rel + 1;
            }
            out.push_str("\\k");
            at + 2
        }
        '0' if !matches!(chars.get(at + 2), Some(c) if c.is_ascii_digit()) => {
            out.push('\0');
            at + 2
        }
        'c' if matches!(chars.get(at + 2), Some(c) if c.is_ascii_alphabetic()) => {
            out.push((chars[at + 2] as u8 % 32) as char);
            at + 3
        }
        'v' => {
            out.push('\x0B');
            at + 2
        }
        'x' if at + 3 < len => match hex_value(&chars[at + 2..at + 4]) {
            Some(cp) => {
                if let Some(c) = char::from_u32(cp) {
                    push_literal(out, c);
                }
                at + 4
            }
            None => {
                out.push('\\');
                out.push('x');
                at + 2
            }
        },
        'u' if chars.get(at + 2) == Some(&'{') => {
            let digits_start = at + 3;
            match chars[digits_start..].iter().position(|&c| c == '}') {
                Some(rel) => {
                    if let Some(c) =
                        hex_value(&chars[digits_start..digits_start + rel]).and_then(char::from_u32)
                    {
                        push_literal(out, c);
                    }
                    digits_start + rel + 1
                }
                None => {
                    out.push_str("\\u");
                    at + 2
                }
            }
        }
        'u' if at + 5 < len => match hex_value(&chars[at + 2..at + 6]).and_then(char::from_u32) {
            Some(c) => {
                push_literal(out, c);
                at + 6
            }
            None => {
                out.push_str("\\u");
                at + 2
            }
        },
        _ => {
            out.push('\\');
            out.push(next);
            at + 2
        }
    }
}
