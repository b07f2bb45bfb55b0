//! Rill CLI
//!
//! Checks or runs a single source written in the line syntax of
//! [`rillc::testing::LineParser`].

use rill_eval::{EvalConfig, StreamRegistry};
use rillc::testing::LineParser;
use rillc::{Project, ProjectError};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    rillc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    let (Some(command), Some(path)) = (args.get(1), args.get(2)) else {
        print_usage();
        return ExitCode::FAILURE;
    };
    let project = match load(Path::new(path)) {
        Ok(project) => project,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    match command.as_str() {
        "check" => check(&project),
        "run" => run(&project),
        _ => {
            eprintln!("unknown command: {command}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Usage: rill <command> <file>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  check    Report static conflicts");
    eprintln!("  run      Evaluate and print the final value");
}

fn load(path: &Path) -> Result<Project, String> {
    let text =
        std::fs::read_to_string(path).map_err(|error| format!("{}: {error}", path.display()))?;
    let name = path
        .file_stem()
        .map_or_else(|| "main".to_owned(), |stem| stem.to_string_lossy().into_owned());
    Project::parse(name.clone(), &[(&name, &text)], &LineParser::new())
        .map_err(|error: ProjectError| error.to_string())
}

fn check(project: &Project) -> ExitCode {
    let mut blocked = false;
    for (source, analysis) in project.sources().iter().zip(project.analyze_all()) {
        for conflict in analysis.conflicts() {
            println!("{}: {conflict}", source.name());
        }
        blocked |= analysis.is_blocked();
    }
    if blocked {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(project: &Project) -> ExitCode {
    let streams = StreamRegistry::standard(project.interner()).bindings();
    match project.evaluate(EvalConfig::default(), &streams, None) {
        Ok(value) => {
            println!("{value}");
            if value.is_exception() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
