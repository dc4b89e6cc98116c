//! The RegExp built-in: shared compiled patterns, per-instance cursor
//! state, and the `test`/`exec` matching protocol.

mod engine;
mod flags;
mod pattern;

pub use engine::CaptureBuf;
pub use flags::RegExpFlags;
pub use pattern::Pattern;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{VmError, VmResult};
use crate::number;
use crate::object::RtObject;
use crate::types::{CharKind, RtString, Value};

use engine::{NarrowRegex, WideRegex};

/// Mutable regexp object: a shared immutable pattern plus the forward
/// search cursor used by global `exec` calls.
#[derive(Debug)]
pub struct RegExp {
    pattern: Rc<Pattern>,
    /// Byte offset into the last subject. The public `lastIndex` getter
    /// converts it into the subject's own index units.
    last_index: usize,
    last_subject: Option<RtString>,
}

impl RegExp {
    pub fn from_pattern(pattern: Rc<Pattern>) -> Self {
        Self {
            pattern,
            last_index: 0,
            last_subject: None,
        }
    }

    pub fn pattern(&self) -> &Rc<Pattern> {
        &self.pattern
    }

    /// The `lastIndex` property value, in the last subject's own index
    /// units.
    pub fn last_index(&self) -> usize {
        match &self.last_subject {
            Some(subject) => subject.unit_index(self.last_index),
            None => self.last_index,
        }
    }
}

/// VM-owned subsystem state: the scratch capture buffer shared by all
/// `test` calls, which never need the captures themselves.
#[derive(Default)]
pub struct Vm {
    scratch: CaptureBuf,
}

impl Vm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a prototype entry by name and invokes it with `args[0]`
    /// as the receiver.
    pub fn call(&mut self, name: &str, args: &[Value]) -> VmResult<Value> {
        match prototype_property(name) {
            Some(NativeProperty::Method(method)) => method(self, args),
            Some(NativeProperty::Getter(getter)) => {
                let re = regexp_receiver(args)?;
                let value = getter(&re.borrow());
                Ok(value)
            }
            None => Err(VmError::type_error(format!(
                "RegExp.prototype.{name} is not defined"
            ))),
        }
    }
}

pub type NativeFn = fn(&mut Vm, &[Value]) -> VmResult<Value>;

pub enum NativeProperty {
    Getter(fn(&RegExp) -> Value),
    Method(NativeFn),
}

/// RegExp.prototype layout, in definition order.
pub static REGEXP_PROTOTYPE_PROPERTIES: &[(&str, NativeProperty)] = &[
    ("lastIndex", NativeProperty::Getter(prototype_last_index)),
    ("global", NativeProperty::Getter(prototype_global)),
    ("ignoreCase", NativeProperty::Getter(prototype_ignore_case)),
    ("multiline", NativeProperty::Getter(prototype_multiline)),
    ("source", NativeProperty::Getter(prototype_source)),
    ("toString", NativeProperty::Method(regexp_prototype_to_string)),
    ("test", NativeProperty::Method(regexp_prototype_test)),
    ("exec", NativeProperty::Method(regexp_prototype_exec)),
];

pub fn prototype_property(name: &str) -> Option<&'static NativeProperty> {
    REGEXP_PROTOTYPE_PROPERTIES
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, property)| property)
}

/// Constructor metadata: `RegExp.name` and `RegExp.length`.
pub fn constructor_properties() -> Vec<(&'static str, Value)> {
    vec![
        ("name", Value::String(RtString::from_str("RegExp"))),
        ("length", Value::Number(2.0)),
    ]
}

fn prototype_last_index(re: &RegExp) -> Value {
    let mut slot = Value::Undefined;
    number::set_number(&mut slot, re.last_index() as f64);
    slot
}

fn prototype_global(re: &RegExp) -> Value {
    Value::Boolean(re.pattern.flags().global)
}

fn prototype_ignore_case(re: &RegExp) -> Value {
    Value::Boolean(re.pattern.flags().ignore_case)
}

fn prototype_multiline(re: &RegExp) -> Value {
    Value::Boolean(re.pattern.flags().multiline)
}

fn prototype_source(re: &RegExp) -> Value {
    Value::String(RtString::from_str(re.pattern.source()))
}

/// `new RegExp(source?, flags?)`. An absent or empty source compiles the
/// zero-width pattern; the flag string is parsed in bound mode, so any
/// character outside `gim` is a SyntaxError.
pub fn regexp_constructor(_vm: &mut Vm, args: &[Value]) -> VmResult<Value> {
    let flags = match args.get(1) {
        None | Some(Value::Undefined) => RegExpFlags::default(),
        Some(value) => {
            let text = value.to_rt_string();
            RegExpFlags::parse(text.as_bytes(), true)?.0
        }
    };

    let source = match args.first() {
        None | Some(Value::Undefined) => String::new(),
        Some(value) => value.to_string(),
    };

    let pattern = Pattern::compile(&source, flags)?;
    Ok(Value::RegExp(Rc::new(RefCell::new(RegExp::from_pattern(
        pattern,
    )))))
}

fn regexp_receiver(args: &[Value]) -> VmResult<Rc<RefCell<RegExp>>> {
    match args.first() {
        Some(Value::RegExp(re)) => Ok(re.clone()),
        _ => Err(VmError::type_error("receiver is not a RegExp")),
    }
}

fn subject_arg(args: &[Value]) -> RtString {
    match args.get(1) {
        None | Some(Value::Undefined) => RtString::empty(),
        Some(value) => value.to_rt_string(),
    }
}

enum Selected<'a> {
    Narrow(&'a NarrowRegex),
    Wide(&'a WideRegex, &'a str),
    Absent,
}

/// Picks the compiled form for a subject: the str-oriented handle only
/// when the subject actually contains multi-byte sequences.
fn select<'a>(pattern: &'a Pattern, subject: &'a RtString) -> Selected<'a> {
    if subject.char_kind() == CharKind::Utf8 {
        match (pattern.wide(), subject.to_str()) {
            (Some(re), Some(text)) => Selected::Wide(re, text),
            _ => Selected::Absent,
        }
    } else {
        match pattern.narrow() {
            Some(re) => Selected::Narrow(re),
            None => Selected::Absent,
        }
    }
}

pub fn regexp_prototype_to_string(_vm: &mut Vm, args: &[Value]) -> VmResult<Value> {
    let re = regexp_receiver(args)?;
    let display = RtString::from_str(re.borrow().pattern.display());
    Ok(Value::String(display))
}

/// `RegExp.prototype.test`. Always searches from the start of the
/// subject: unlike `exec` it neither reads nor updates `lastIndex`, even
/// for global patterns. Inherited behavior, preserved deliberately.
pub fn regexp_prototype_test(vm: &mut Vm, args: &[Value]) -> VmResult<Value> {
    let re = regexp_receiver(args)?;
    let subject = subject_arg(args);
    let pattern = re.borrow().pattern.clone();

    let matched = match select(&pattern, &subject) {
        Selected::Narrow(regex) => engine::match_narrow(regex, subject.as_bytes(), &mut vm.scratch),
        Selected::Wide(regex, text) => engine::match_wide(regex, text, &mut vm.scratch)?,
        Selected::Absent => false,
    };

    Ok(Value::Boolean(matched))
}

/// `RegExp.prototype.exec`. Searches from the instance's cursor, builds
/// the result array on a match, and maintains the cursor for global
/// patterns: advanced to the match end on success, reset to 0 on
/// failure. Non-global patterns leave the cursor untouched on success.
pub fn regexp_prototype_exec(_vm: &mut Vm, args: &[Value]) -> VmResult<Value> {
    let receiver = regexp_receiver(args)?;
    let subject = subject_arg(args);

    let mut re = receiver.borrow_mut();
    // `input` must reflect the string most recently searched, match or
    // not.
    re.last_subject = Some(subject.clone());

    let pattern = re.pattern.clone();
    let start = re.last_index;

    if start <= subject.size() {
        // One capture buffer per call; dropped on every exit path.
        let mut captures = CaptureBuf::new();

        match select(&pattern, &subject) {
            Selected::Narrow(regex) => {
                if engine::match_narrow(regex, &subject.as_bytes()[start..], &mut captures) {
                    return exec_result(&mut re, &subject, start, &captures);
                }
            }
            Selected::Wide(regex, text) => {
                let tail = text.get(start..).unwrap_or("");
                if engine::match_wide(regex, tail, &mut captures)? {
                    return exec_result(&mut re, &subject, start, &captures);
                }
            }
            Selected::Absent => {}
        }
    }

    re.last_index = 0;
    Ok(Value::Null)
}

/// Builds the exec result: positional captures, then the `index` and
/// `input` data properties, then the global-cursor update (which uses
/// raw byte offsets, before any unit conversion).
fn exec_result(
    re: &mut RegExp,
    subject: &RtString,
    search_start: usize,
    captures: &CaptureBuf,
) -> VmResult<Value> {
    let ncaptures = re.pattern.ncaptures();
    let mut array = RtObject::array(ncaptures);

    for i in 0..ncaptures {
        if let Some((start, end)) = captures.get(i) {
            let value = subject.slice(search_start + start, search_start + end);
            array.elements_mut()[i] = Value::String(value);
        }
    }

    let Some((match_start, match_end)) = captures.get(0) else {
        return Err(VmError::internal("match reported without a group 0 span"));
    };

    // `index` is reported in the subject's own index units.
    let mut index = Value::Undefined;
    number::set_number(
        &mut index,
        subject.unit_index(search_start + match_start) as f64,
    );
    array.insert_value("index", index);
    array.insert_value("input", Value::String(subject.clone()));

    if re.pattern.flags().global {
        re.last_index = search_start + match_end;
    }

    Ok(Value::Array(Rc::new(RefCell::new(array))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regexp(source: &str, flag_text: &str) -> Value {
        let (flags, _) = RegExpFlags::parse(flag_text.as_bytes(), true).unwrap();
        Value::regexp(source, flags).unwrap()
    }

    fn exec(vm: &mut Vm, re: &Value, subject: &str) -> Value {
        regexp_prototype_exec(
            vm,
            &[re.clone(), Value::String(RtString::from_str(subject))],
        )
        .unwrap()
    }

    fn test(vm: &mut Vm, re: &Value, subject: &str) -> bool {
        let result = regexp_prototype_test(
            vm,
            &[re.clone(), Value::String(RtString::from_str(subject))],
        )
        .unwrap();
        matches!(result, Value::Boolean(true))
    }

    fn match_index(result: &Value) -> f64 {
        let Value::Array(array) = result else {
            panic!("expected a match result, got {result:?}");
        };
        let Value::Number(n) = array.borrow().get_property("index") else {
            panic!("index property missing");
        };
        n
    }

    fn last_index(re: &Value) -> usize {
        let Value::RegExp(re) = re else {
            panic!("not a RegExp");
        };
        re.borrow().last_index()
    }

    #[test]
    fn global_cursor_is_monotonic_and_resets_on_failure() {
        let mut vm = Vm::new();
        let re = regexp("a", "g");

        for expected in [0.0, 1.0, 2.0] {
            let result = exec(&mut vm, &re, "aaa");
            assert_eq!(match_index(&result), expected);
        }
        assert!(exec(&mut vm, &re, "aaa").is_null());
        assert_eq!(last_index(&re), 0);

        // The cycle starts over after the reset.
        assert_eq!(match_index(&exec(&mut vm, &re, "aaa")), 0.0);
    }

    #[test]
    fn non_global_exec_never_moves_the_cursor() {
        let mut vm = Vm::new();
        let re = regexp("a", "");

        for _ in 0..3 {
            let result = exec(&mut vm, &re, "aaa");
            assert_eq!(match_index(&result), 0.0);
            assert_eq!(last_index(&re), 0);
        }
    }

    #[test]
    fn unmatched_groups_are_unset_not_empty() {
        let mut vm = Vm::new();
        let re = regexp("(a)(b)?", "");

        let Value::Array(array) = exec(&mut vm, &re, "a") else {
            panic!("expected a match");
        };
        let array = array.borrow();
        assert_eq!(array.len(), 3);
        assert_eq!(array.elements()[0].to_string(), "a");
        assert_eq!(array.elements()[1].to_string(), "a");
        assert!(array.elements()[2].is_undefined());
    }

    #[test]
    fn test_ignores_the_global_cursor() {
        let mut vm = Vm::new();
        let re = regexp("a", "g");

        assert!(test(&mut vm, &re, "a"));
        assert!(test(&mut vm, &re, "a"));
        assert_eq!(last_index(&re), 0);

        // A fresh exec still starts from the beginning.
        assert_eq!(match_index(&exec(&mut vm, &re, "aaa")), 0.0);
    }

    #[test]
    fn methods_require_a_regexp_receiver() {
        let mut vm = Vm::new();
        let err = regexp_prototype_test(&mut vm, &[Value::Null]).unwrap_err();
        assert!(matches!(err, VmError::TypeError(_)));
        let err = regexp_prototype_exec(&mut vm, &[Value::Number(1.0)]).unwrap_err();
        assert!(matches!(err, VmError::TypeError(_)));
    }

    #[test]
    fn subject_defaults_to_the_empty_string() {
        let mut vm = Vm::new();
        let re = regexp_constructor(&mut vm, &[]).unwrap();
        let result = regexp_prototype_test(&mut vm, &[re.clone()]).unwrap();
        assert!(matches!(result, Value::Boolean(true)));

        let result = regexp_prototype_exec(&mut vm, &[re]).unwrap();
        assert_eq!(match_index(&result), 0.0);
    }

    #[test]
    fn constructor_defaults_and_display() {
        let mut vm = Vm::new();
        let re = regexp_constructor(&mut vm, &[]).unwrap();
        let shown = regexp_prototype_to_string(&mut vm, &[re]).unwrap();
        assert_eq!(shown.to_string(), "/(?:)/");

        let re = regexp_constructor(
            &mut vm,
            &[
                Value::String(RtString::from_str("ab+c")),
                Value::String(RtString::from_str("mig")),
            ],
        )
        .unwrap();
        let shown = regexp_prototype_to_string(&mut vm, &[re]).unwrap();
        assert_eq!(shown.to_string(), "/ab+c/gim");
    }

    #[test]
    fn constructor_rejects_bad_flags() {
        let mut vm = Vm::new();
        for flag_text in ["gg", "x", "gx"] {
            let err = regexp_constructor(
                &mut vm,
                &[
                    Value::String(RtString::from_str("a")),
                    Value::String(RtString::from_str(flag_text)),
                ],
            )
            .unwrap_err();
            assert!(matches!(err, VmError::SyntaxError(_)), "{flag_text}");
        }
    }

    #[test]
    fn multibyte_subjects_report_character_units() {
        let mut vm = Vm::new();
        let re = regexp("дом", "g");

        let result = exec(&mut vm, &re, "дом дом");
        assert_eq!(match_index(&result), 0.0);
        assert_eq!(last_index(&re), 3);

        let result = exec(&mut vm, &re, "дом дом");
        assert_eq!(match_index(&result), 4.0);
        assert_eq!(last_index(&re), 7);

        assert!(exec(&mut vm, &re, "дом дом").is_null());
        assert_eq!(last_index(&re), 0);
    }

    #[test]
    fn multibyte_captures_track_logical_length() {
        let mut vm = Vm::new();
        let re = regexp("(д)(ом)", "");

        let Value::Array(array) = exec(&mut vm, &re, "дом") else {
            panic!("expected a match");
        };
        let array = array.borrow();
        assert_eq!(array.len(), 3);
        let Value::String(whole) = &array.elements()[0] else {
            panic!("group 0 missing");
        };
        assert_eq!(whole.size(), 6);
        assert_eq!(whole.length(), 3);
    }

    #[test]
    fn byte_strings_match_through_the_byte_form() {
        let mut vm = Vm::new();
        let re = regexp("a+", "");
        let subject = Value::String(RtString::from_bytes(b"\xff\xfeaaa"));

        let result = regexp_prototype_test(&mut vm, &[re.clone(), subject.clone()]).unwrap();
        assert!(matches!(result, Value::Boolean(true)));

        let result = regexp_prototype_exec(&mut vm, &[re, subject]).unwrap();
        assert_eq!(match_index(&result), 2.0);
    }

    #[test]
    fn absent_selected_handle_yields_no_match() {
        let mut vm = Vm::new();
        // Backreferences decline the byte form; an ASCII subject selects
        // exactly that form.
        let re = regexp("(a)\\1", "");
        assert!(!test(&mut vm, &re, "aa"));
        assert!(exec(&mut vm, &re, "aa").is_null());
    }

    #[test]
    fn result_properties_and_their_order() {
        let mut vm = Vm::new();
        let re = regexp("b", "");

        let Value::Array(array) = exec(&mut vm, &re, "abc") else {
            panic!("expected a match");
        };
        let array = array.borrow();
        let keys: Vec<&str> = array.keys().collect();
        assert_eq!(keys, ["index", "input"]);
        assert_eq!(array.get_property("input").to_string(), "abc");
        assert!(matches!(array.get_property("index"), Value::Number(n) if n == 1.0));
    }

    #[test]
    fn prototype_dispatch_and_getters() {
        let mut vm = Vm::new();
        let re = regexp("x", "gi");

        let global = vm.call("global", std::slice::from_ref(&re)).unwrap();
        assert!(matches!(global, Value::Boolean(true)));
        let multiline = vm.call("multiline", std::slice::from_ref(&re)).unwrap();
        assert!(matches!(multiline, Value::Boolean(false)));
        let source = vm.call("source", std::slice::from_ref(&re)).unwrap();
        assert_eq!(source.to_string(), "x");
        let cursor = vm.call("lastIndex", std::slice::from_ref(&re)).unwrap();
        assert!(matches!(cursor, Value::Number(n) if n == 0.0));

        let err = vm.call("compile", &[re]).unwrap_err();
        assert!(matches!(err, VmError::TypeError(_)));
    }

    #[test]
    fn instances_share_a_pattern_but_not_cursor_state() {
        let mut vm = Vm::new();
        let (flags, _) = RegExpFlags::parse(b"g", true).unwrap();
        let pattern = Pattern::compile("a", flags).unwrap();
        let first = Value::RegExp(Rc::new(RefCell::new(RegExp::from_pattern(pattern.clone()))));
        let second = Value::RegExp(Rc::new(RefCell::new(RegExp::from_pattern(pattern))));

        assert_eq!(match_index(&exec(&mut vm, &first, "aaa")), 0.0);
        assert_eq!(match_index(&exec(&mut vm, &first, "aaa")), 1.0);
        // The second instance keeps its own cursor.
        assert_eq!(match_index(&exec(&mut vm, &second, "aaa")), 0.0);
        assert_eq!(match_index(&exec(&mut vm, &first, "aaa")), 2.0);
    }

    #[test]
    fn constructor_metadata() {
        let properties = constructor_properties();
        assert_eq!(properties[0].1.to_string(), "RegExp");
        assert!(matches!(properties[1].1, Value::Number(n) if n == 2.0));
    }
}
