use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::number;
use crate::object::RtObject;
use crate::regexp::RegExp;

/// Classification of a string's content. Determines which compiled form
/// of a pattern matches it and the unit in which offsets are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharKind {
    /// Raw bytes with no character semantics.
    Bytes,
    /// Single-byte-width characters; byte and character offsets coincide.
    Ascii,
    /// UTF-8 content with a separately tracked character count.
    Utf8,
}

/// Runtime string: a shared byte buffer plus a logical character count.
///
/// `length == 0` with non-empty bytes marks a raw byte string,
/// `length == size` single-byte-width content, `length < size` multi-byte
/// UTF-8 content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtString {
    bytes: Rc<[u8]>,
    length: usize,
}

impl RtString {
    pub fn from_str(s: &str) -> Self {
        Self {
            bytes: Rc::from(s.as_bytes()),
            length: s.chars().count(),
        }
    }

    /// A raw byte string; no character count is tracked.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: Rc::from(bytes),
            length: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_str("")
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Logical character count (0 for raw byte strings).
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// UTF-8 view of the content; `None` for raw byte strings.
    pub fn to_str(&self) -> Option<&str> {
        if self.char_kind() == CharKind::Bytes {
            return None;
        }
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn char_kind(&self) -> CharKind {
        if self.length == 0 && !self.bytes.is_empty() {
            CharKind::Bytes
        } else if self.length == self.bytes.len() {
            CharKind::Ascii
        } else {
            CharKind::Utf8
        }
    }

    /// Converts a byte offset into this string's own index units:
    /// character position for multi-byte content, the byte offset itself
    /// otherwise.
    pub fn unit_index(&self, byte_offset: usize) -> usize {
        match self.char_kind() {
            CharKind::Bytes | CharKind::Ascii => byte_offset,
            CharKind::Utf8 => utf8_length(&self.bytes[..byte_offset.min(self.bytes.len())]),
        }
    }

    /// Substring over a byte span. The logical length of the result is
    /// derived from this string's own encoding.
    pub fn slice(&self, start: usize, end: usize) -> RtString {
        let span = &self.bytes[start..end];
        let length = match self.char_kind() {
            CharKind::Bytes => 0,
            CharKind::Ascii => span.len(),
            CharKind::Utf8 => utf8_length(span),
        };
        Self {
            bytes: Rc::from(span),
            length,
        }
    }
}

/// Character count of a UTF-8 byte span (continuation bytes excluded).
fn utf8_length(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| (b & 0xC0) != 0x80).count()
}

impl fmt::Display for RtString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

/// Runtime value. Only the variants the regexp subsystem produces or
/// consumes; the full language has more.
#[derive(Clone, Debug)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(RtString),
    RegExp(Rc<RefCell<RegExp>>),
    Array(Rc<RefCell<RtObject>>),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn regexp(source: &str, flags: crate::regexp::RegExpFlags) -> crate::VmResult<Value> {
        let pattern = crate::regexp::Pattern::compile(source, flags)?;
        Ok(Value::RegExp(Rc::new(RefCell::new(RegExp::from_pattern(
            pattern,
        )))))
    }

    /// ToString for subjects and pattern sources. String values share
    /// their buffer; everything else goes through `Display`.
    pub fn to_rt_string(&self) -> RtString {
        match self {
            Value::String(s) => s.clone(),
            other => RtString::from_str(&other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", number::to_string(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::RegExp(r) => write!(f, "{}", r.borrow().pattern().display()),
            Value::Array(a) => {
                let a = a.borrow();
                for (i, element) in a.elements().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if !matches!(element, Value::Undefined | Value::Null) {
                        write!(f, "{element}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
