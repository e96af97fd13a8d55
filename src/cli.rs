//! Oxichart CLI - Command Line Interface for statechart compilation

use std::env;
use std::fs;
use std::process;

use oxichart::{generate_rust_code, CodegenError, FsmDefinition, RenderConfig};

struct Options {
    model: String,
    config: Option<String>,
    out: Option<String>,
}

fn print_usage() {
    println!("Oxichart CLI - Statechart Compiler");
    println!("Usage: oxichart-cli <model.json> [--config <render.json>] [--out <file.rs>]");
    println!();
    println!("Example: oxichart-cli blinky.json --out src/blinky_sm.rs");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut model = None;
    let mut config = None;
    let mut out = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config = Some(iter.next().ok_or("--config needs a file name")?.clone());
            }
            "--out" | "-o" => {
                out = Some(iter.next().ok_or("--out needs a file name")?.clone());
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option '{}'", flag)),
            file if model.is_none() => model = Some(file.to_string()),
            extra => return Err(format!("Unexpected argument '{}'", extra)),
        }
    }

    let model = model.ok_or("Missing model file")?;
    Ok(Options { model, config, out })
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("❌ {}", e);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(message) = run(&options) {
        eprintln!("❌ {}", message);
        process::exit(1);
    }
}

fn run(options: &Options) -> Result<(), String> {
    let definition = FsmDefinition::from_file(&options.model)
        .map_err(|e| format!("Could not load '{}': {}", options.model, e))?;

    let config = match &options.config {
        Some(path) => RenderConfig::from_file(path).map_err(|e| format!("Could not load '{}': {}", path, e))?,
        None => RenderConfig::default(),
    };

    let sm = definition.build().map_err(|e| e.to_string())?;
    log::info!("Loaded state machine '{}' ({} vertices)", sm.name(), sm.vertex_count());

    let code = match generate_rust_code(&sm, &config) {
        Ok(code) => code,
        Err(CodegenError::Validation(problems)) => {
            for problem in &problems {
                eprintln!("  - {}", problem);
            }
            return Err(format!("{} validation problem(s)", problems.len()));
        }
        Err(e) => return Err(e.to_string()),
    };

    match &options.out {
        Some(path) => {
            fs::write(path, &code).map_err(|e| format!("Could not write '{}': {}", path, e))?;
            println!("✅ Generated {}", path);
        }
        None => print!("{}", code),
    }

    Ok(())
}
