use minilisp::Error;
use minilisp::evaluator::{create_root_env, eval};
use minilisp::parser::parse_program;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let [_, path] = args.as_slice() else {
        eprintln!("Usage: minilisp <source-file>");
        process::exit(1);
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: cannot read '{path}': {err}");
            process::exit(1);
        }
    };

    if let Err(err) = run(&source) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

/// Parse the whole source, then evaluate each top-level form in order
/// against a single root environment. The only output is whatever the
/// program itself prints through message.
fn run(source: &str) -> Result<(), Error> {
    let program = parse_program(source)?;
    let env = create_root_env();
    for form in &program {
        eval(form, &env)?;
    }
    Ok(())
}
