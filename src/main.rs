mod report;

use std::io::{self, IsTerminal};

use serde_json::Value;
use validus::{RuleSpec, Validation};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut validation = Validation::new(config.data, config.rules);
    validation.at_scene(config.scene);
    validation.set_stop_on_error(config.stop_on_error);

    if let Err(err) = validation.validate() {
        eprintln!("error: {err}");
        std::process::exit(2);
    }

    report::print_run(&validation, config.color);
    std::process::exit(if validation.is_ok() { 0 } else { 1 });
}

struct CliConfig {
    data: Value,
    rules: Vec<RuleSpec>,
    scene: String,
    stop_on_error: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut data: Option<Value> = None;
    let mut rules: Option<Vec<RuleSpec>> = None;
    let mut scene = String::new();
    let mut stop_on_error = true;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("validus {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--no-stop-on-error" => stop_on_error = false,
            "--scene" => {
                scene = args.next().ok_or_else(|| "error: --scene expects a value".to_string())?;
            }
            "--data" | "-d" => {
                let value = args.next().ok_or_else(|| "error: --data expects a value".to_string())?;
                if data.is_some() {
                    return Err("error: --data provided multiple times".to_string());
                }
                data = Some(parse_data(&value)?);
            }
            "--rules" | "-r" => {
                let value = args.next().ok_or_else(|| "error: --rules expects a value".to_string())?;
                if rules.is_some() {
                    return Err("error: --rules provided multiple times".to_string());
                }
                rules = Some(parse_rules(&value)?);
            }
            _ if arg.starts_with("--scene=") => {
                scene = arg.trim_start_matches("--scene=").to_string();
            }
            _ if arg.starts_with("--data=") => {
                if data.is_some() {
                    return Err("error: --data provided multiple times".to_string());
                }
                data = Some(parse_data(arg.trim_start_matches("--data="))?);
            }
            _ if arg.starts_with("--rules=") => {
                if rules.is_some() {
                    return Err("error: --rules provided multiple times".to_string());
                }
                rules = Some(parse_rules(arg.trim_start_matches("--rules="))?);
            }
            _ => {
                return Err(format!("error: unknown option '{arg}'"));
            }
        }
    }

    let data = data.ok_or_else(|| format!("error: --data is required\n\n{}", help_text()))?;
    let rules = rules.ok_or_else(|| format!("error: --rules is required\n\n{}", help_text()))?;

    Ok(CliConfig { data, rules, scene, stop_on_error, color })
}

/// A JSON literal, or `@path` to read it from a file.
fn load_source(value: &str) -> Result<String, String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("error: failed to read '{path}': {err}")),
        None => Ok(value.to_string()),
    }
}

fn parse_data(value: &str) -> Result<Value, String> {
    let raw = load_source(value)?;
    serde_json::from_str(&raw).map_err(|err| format!("error: invalid --data JSON: {err}"))
}

fn parse_rules(value: &str) -> Result<Vec<RuleSpec>, String> {
    let raw = load_source(value)?;
    let parsed: Value =
        serde_json::from_str(&raw).map_err(|err| format!("error: invalid --rules JSON: {err}"))?;
    let Value::Array(entries) = parsed else {
        return Err("error: --rules must be a JSON array of rule entries".to_string());
    };
    Ok(entries.iter().map(RuleSpec::from_json).collect())
}

fn help_text() -> String {
    format!(
        "validus {version}

Rule-driven validation engine CLI.

Usage:
  validus --data <json|@file> --rules <json|@file> [OPTIONS]

Options:
  -d, --data <json|@file>    Record to validate, as a JSON object.
  -r, --rules <json|@file>   Rule table, as a JSON array of entries shaped
                             [fields, checker, ...args, {{options}}].
  --scene <name>             Active scene for rule filtering.
  --no-stop-on-error         Collect every failure instead of halting at the first.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Validation passed.
  1  Validation failed.
  2  Invalid arguments or a fatal rule error.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
