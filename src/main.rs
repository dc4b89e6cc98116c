use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;

use mjs::{Lexer, RtString, Value, Vm, VmError, VmResult};

/// Match a regexp literal against subject strings.
#[derive(Parser)]
#[command(name = "mjs-regexp", version)]
struct Cli {
    /// Regexp literal, e.g. '/ab+c/gi'
    pattern: String,

    /// Subject strings; read from stdin when omitted
    subjects: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let regexp = match compile_literal(&cli.pattern) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut vm = Vm::new();

    if cli.subjects.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            };
            if let Err(err) = run_subject(&mut vm, &regexp, &line) {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for subject in &cli.subjects {
            if let Err(err) = run_subject(&mut vm, &regexp, subject) {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Parses a `/source/flags` literal into a live RegExp value.
fn compile_literal(text: &str) -> VmResult<Value> {
    let mut lexer = Lexer::new(text);
    if !lexer.eat(b'/') {
        return Err(VmError::syntax_error(
            "pattern must be a /source/flags literal",
        ));
    }
    let (source, flags) = lexer.regexp_literal()?;
    if lexer.pos() != text.len() {
        return Err(VmError::syntax_error(format!(
            "unexpected characters after RegExp literal: \"{}\"",
            &text[lexer.pos()..]
        )));
    }
    Value::regexp(&source, flags)
}

fn cursor(vm: &mut Vm, regexp: &Value) -> VmResult<f64> {
    match vm.call("lastIndex", std::slice::from_ref(regexp))? {
        Value::Number(n) => Ok(n),
        _ => Ok(0.0),
    }
}

/// Runs exec over one subject, printing every match for a global pattern
/// and at most one otherwise.
fn run_subject(vm: &mut Vm, regexp: &Value, subject: &str) -> VmResult<()> {
    let global = matches!(
        vm.call("global", std::slice::from_ref(regexp))?,
        Value::Boolean(true)
    );
    let args = [regexp.clone(), Value::String(RtString::from_str(subject))];

    let mut matched_any = false;
    loop {
        let before = cursor(vm, regexp)?;
        let Value::Array(result) = vm.call("exec", &args)? else {
            break;
        };
        matched_any = true;

        let result = result.borrow();
        let whole = result
            .elements()
            .first()
            .cloned()
            .unwrap_or(Value::Undefined);
        println!("{subject}: \"{whole}\" at {}", result.get_property("index"));
        for (group, capture) in result.elements().iter().enumerate().skip(1) {
            println!("  group {group}: {capture}");
        }

        if !global {
            break;
        }
        // A zero-width match leaves the cursor in place; stop rather
        // than rematch the same position forever.
        if cursor(vm, regexp)? <= before {
            break;
        }
    }

    if !matched_any {
        println!("{subject}: no match");
    }
    Ok(())
}
