//! hotlisp: a live-reloading Lisp runtime with step-granular,
//! snapshot-resumable evaluation.
//!
//! Usage banner and `eprintln!` progress-line style, and the
//! distinction between a parse-error exit code and a runtime-error exit
//! code, are grounded in `aicheye-crustty`'s `main.rs`.

use hotlisp::demo::DEMO_SOURCE;
use hotlisp::errors::RunError;
use hotlisp::runner::Runner;

use std::io;
use std::path::PathBuf;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut script: Option<PathBuf> = None;
    let mut watch = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--watch" => watch = true,
            other => script = Some(PathBuf::from(other)),
        }
    }

    let script_path = match script {
        Some(path) => path,
        None => match write_demo_to_temp_file() {
            Ok(path) => {
                eprintln!("No script given; running the built-in demo at {}", path.display());
                path
            }
            Err(e) => {
                eprintln!("Error: could not write demo script: {}", e);
                std::process::exit(2);
            }
        },
    };

    match run(&script_path, watch) {
        Ok(()) => std::process::exit(0),
        Err(RunError::Parse(e)) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
        Err(RunError::Eval(e)) => {
            eprintln!("Runtime error: {}", e);
            std::process::exit(2);
        }
    }
}

fn write_demo_to_temp_file() -> io::Result<PathBuf> {
    let mut path = std::env::temp_dir();
    path.push(format!("hotlisp_demo_{}.lisp", std::process::id()));
    std::fs::write(&path, DEMO_SOURCE)?;
    Ok(path)
}

fn run(script_path: &PathBuf, watch: bool) -> Result<(), RunError> {
    eprintln!("Parsing {}...", script_path.display());
    let mut runner = Runner::new_headless(script_path)?;
    eprintln!("Watching {} for changes (poll every 1s)...", script_path.display());

    if watch {
        hotlisp::ui::run_status_view(&mut runner).map_err(|e| {
            RunError::Eval(hotlisp::errors::EvalError::RuntimeError {
                message: format!("status view error: {}", e),
                location: Default::default(),
            })
        })?;
        return Ok(());
    }

    let value = runner.run_to_completion()?;
    eprintln!("Done: {}", value.display_form());
    Ok(())
}
