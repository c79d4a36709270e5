use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sluice::{fmt, parse_expression, parse_file, ErrorList, Evaluator, Scope, Value};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    match parse_cli(&args)? {
        Command::Fmt { input, write } => run_fmt(&input, write),
        Command::Check { input } => run_check(&input),
        Command::Eval { expr } => run_eval(&expr),
    }
}

#[derive(Debug)]
enum Command {
    /// Pretty-print a file to stdout, or rewrite it in place.
    Fmt { input: PathBuf, write: bool },
    /// Parse a file and report every diagnostic found.
    Check { input: PathBuf },
    /// Evaluate a single expression and print the resulting value.
    Eval { expr: String },
}

fn parse_cli(args: &[String]) -> Result<Command, String> {
    let mut rest = args.iter().skip(1);

    let command = match rest.next().map(String::as_str) {
        Some("fmt") => {
            let mut write = false;
            let mut input = None;
            for arg in rest {
                match arg.as_str() {
                    "-w" | "--write" => write = true,
                    other if input.is_none() => input = Some(PathBuf::from(other)),
                    other => return Err(format!("unexpected argument `{other}`")),
                }
            }
            let input = input.ok_or_else(|| usage("fmt expects a file argument"))?;
            Command::Fmt { input, write }
        }
        Some("check") => {
            let input = rest
                .next()
                .map(PathBuf::from)
                .ok_or_else(|| usage("check expects a file argument"))?;
            Command::Check { input }
        }
        Some("eval") => {
            let expr = rest
                .next()
                .cloned()
                .ok_or_else(|| usage("eval expects an expression argument"))?;
            Command::Eval { expr }
        }
        Some(other) => return Err(usage(&format!("unknown command `{other}`"))),
        None => return Err(usage("missing command")),
    };

    Ok(command)
}

fn usage(message: &str) -> String {
    format!(
        "{message}\n\nusage:\n  sluice fmt [-w] <file>\n  sluice check <file>\n  sluice eval <expression>"
    )
}

fn read_source(input: &Path) -> Result<Vec<u8>, String> {
    fs::read(input).map_err(|err| format!("failed to read `{}`: {err}", input.display()))
}

fn run_fmt(input: &Path, write: bool) -> Result<(), String> {
    let source = read_source(input)?;
    let file = parse_file(&input.display().to_string(), &source)
        .map_err(|errors| render_errors(&errors))?;

    let formatted = fmt::format(&file);
    if write {
        fs::write(input, formatted.as_bytes())
            .map_err(|err| format!("failed to write `{}`: {err}", input.display()))?;
    } else {
        println!("{formatted}");
    }
    Ok(())
}

fn run_check(input: &Path) -> Result<(), String> {
    let source = read_source(input)?;
    match parse_file(&input.display().to_string(), &source) {
        Ok(_) => Ok(()),
        Err(errors) => Err(render_errors(&errors)),
    }
}

fn run_eval(expr: &str) -> Result<(), String> {
    let parsed = parse_expression(expr).map_err(|errors| render_errors(&errors))?;
    let value: Value = Evaluator::new(&parsed)
        .evaluate(&Scope::new())
        .map_err(|err| err.to_string())?;
    println!("{value}");
    Ok(())
}

fn render_errors(errors: &ErrorList) -> String {
    let mut out = String::new();
    for (i, err) in errors.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&err.to_string());
    }
    out
}
