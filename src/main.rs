use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "codeblock", version, about = "Normalize and check documentation code samples", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "CODEBLOCK_PROFILE", help = "Profile name")]
    profile: Option<String>,

    #[arg(long, global = true, help = "Pretty-print JSON output")]
    pretty: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Verbose logging")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Dedent a code sample read from a file or stdin
    Normalize {
        file: Option<PathBuf>,
        #[arg(long, help = "Parse input as a JSON content tree")]
        tree: bool,
        #[arg(long, help = "Emit a JSON object instead of plain text")]
        json: bool,
    },
    /// Report formatting issues in CodeBlock samples
    Scan {
        paths: Vec<PathBuf>,
        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
    },
    /// Collapse stray space runs inside CodeBlock samples
    Fix {
        paths: Vec<PathBuf>,
        #[arg(long, help = "Report files that would change without writing them")]
        check: bool,
    },
    Config(ConfigCommand),
}

#[derive(Parser)]
struct ConfigCommand {
    #[command(subcommand)]
    subcommand: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    Init {
        #[arg(long)]
        global: bool,
    },
    Show,
    List,
    Path {
        #[arg(long)]
        global: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Config(cmd) => handle_config(cmd, cli.config.as_ref(), cli.profile.as_ref()),
        Command::Normalize { file, tree, json } => {
            let input = read_input(file.as_ref())?;
            let text = if tree {
                let value: serde_json::Value =
                    serde_json::from_str(&input).context("Failed to parse content tree JSON")?;
                codeblock::normalize(&codeblock::ContentNode::from_json(&value))
            } else {
                codeblock::normalize_text(&input)
            };

            if json {
                output_json(&normalized_json(&text), cli.pretty)?;
            } else {
                println!("{}", text);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Scan { paths, json } => {
            let config = codeblock::Config::load(cli.config.as_ref(), cli.profile.as_ref())?;
            let paths = if paths.is_empty() { config.scan.paths.clone() } else { paths };

            let reports = codeblock::source::scan_paths(&paths, &config.scan)?;
            if json {
                output_json(&serde_json::to_value(&reports)?, cli.pretty)?;
            } else {
                print_scan_report(&reports);
            }

            Ok(ExitCode::from(scan_status(&reports)))
        }
        Command::Fix { paths, check } => {
            let config = codeblock::Config::load(cli.config.as_ref(), cli.profile.as_ref())?;
            let paths = if paths.is_empty() { config.scan.paths.clone() } else { paths };

            let outcomes = codeblock::source::fix_paths(&paths, &config.scan, !check)?;
            let changed: Vec<_> = outcomes.iter().filter(|o| o.changed).collect();

            for outcome in &changed {
                if check {
                    println!("Would fix: {}", outcome.file.display());
                } else {
                    println!("Fixed: {}", outcome.file.display());
                }
            }
            println!(
                "\n{} of {} files {}",
                changed.len(),
                outcomes.len(),
                if check { "need fixing" } else { "fixed" }
            );

            Ok(ExitCode::from(fix_status(check, &outcomes)))
        }
    }
}

fn normalized_json(text: &str) -> serde_json::Value {
    let lines = if text.is_empty() { 0 } else { text.split('\n').count() };
    serde_json::json!({ "text": text, "lines": lines })
}

/// 1 when any block has issues.
fn scan_status(reports: &[codeblock::source::BlockReport]) -> u8 {
    u8::from(!reports.is_empty())
}

/// 1 in check mode when any file would change; writing always succeeds.
fn fix_status(check: bool, outcomes: &[codeblock::source::FixOutcome]) -> u8 {
    u8::from(check && outcomes.iter().any(|o| o.changed))
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn print_scan_report(reports: &[codeblock::source::BlockReport]) {
    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!("CODE BLOCK FORMATTING SCAN RESULTS");
    println!("{}\n", rule);

    if reports.is_empty() {
        println!("No formatting issues found");
        return;
    }

    println!("Found {} code blocks with potential issues:\n", reports.len());
    for report in reports {
        println!("\n{}:{}", report.file.display(), report.line);
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        println!("  Preview: {}...", report.preview);
    }

    println!("\n{}", rule);
    println!("Total issues: {}", reports.len());
    println!("{}\n", rule);
}

fn handle_config(
    cmd: ConfigCommand,
    config_path: Option<&PathBuf>,
    profile: Option<&String>,
) -> Result<ExitCode> {
    match cmd.subcommand {
        ConfigSubcommand::Init { global } => {
            let path = codeblock::Config::init_config(global)?;
            println!("Created config file: {:?}", path);
        }
        ConfigSubcommand::Show => {
            let config = codeblock::Config::load_without_validation(config_path, profile)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigSubcommand::List => {
            println!("Configuration files (in precedence order):\n");

            if let Some(global) = codeblock::Config::global_config_path() {
                let status = if global.exists() { "✓" } else { "✗" };
                println!("Global:  {:?} {}", global, status);
            }

            if let Some(project) = codeblock::Config::project_config_path() {
                println!("Project: {:?} ✓", project);
            } else {
                println!("Project: (none)");
            }

            println!("\nEnvironment variables:");
            for key in [
                "CODEBLOCK_SCAN_PATHS",
                "CODEBLOCK_EXTENSIONS",
                "CODEBLOCK_MIN_SPACE_RUN",
                "CODEBLOCK_INDENT_STEP",
                "CODEBLOCK_PREVIEW_LEN",
            ] {
                let value = std::env::var(key).unwrap_or_else(|_| "(not set)".to_string());
                println!("  {}: {}", key, value);
            }
        }
        ConfigSubcommand::Path { global } => {
            let path = if global {
                codeblock::Config::global_config_path()
            } else {
                codeblock::Config::project_config_path()
            };

            if let Some(p) = path {
                println!("{}", p.display());
            } else {
                anyhow::bail!("Config file not found");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn output_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeblock::source::{BlockReport, FixOutcome, ScanIssue};

    fn outcome(name: &str, changed: bool) -> FixOutcome {
        FixOutcome {
            file: PathBuf::from(name),
            changed,
        }
    }

    #[test]
    fn test_normalized_json_counts_lines() {
        let value = normalized_json("a\n\nb");
        assert_eq!(value["text"], "a\n\nb");
        assert_eq!(value["lines"], 3);
    }

    #[test]
    fn test_normalized_json_empty_text() {
        let value = normalized_json("");
        assert_eq!(value["text"], "");
        assert_eq!(value["lines"], 0);
    }

    #[test]
    fn test_scan_status() {
        assert_eq!(scan_status(&[]), 0);

        let report = BlockReport {
            file: PathBuf::from("page.tsx"),
            line: 4,
            issues: vec![ScanIssue::OddIndentation { levels: vec![3] }],
            preview: "x".into(),
        };
        assert_eq!(scan_status(&[report]), 1);
    }

    #[test]
    fn test_fix_status_check_mode() {
        assert_eq!(fix_status(true, &[outcome("a.tsx", false)]), 0);
        assert_eq!(
            fix_status(true, &[outcome("a.tsx", false), outcome("b.tsx", true)]),
            1
        );
    }

    #[test]
    fn test_fix_status_write_mode() {
        assert_eq!(fix_status(false, &[outcome("a.tsx", true)]), 0);
        assert_eq!(fix_status(false, &[]), 0);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["codeblock", "fix", "--check", "app/docs", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Fix { paths, check } => {
                assert!(check);
                assert_eq!(paths, vec![PathBuf::from("app/docs")]);
            }
            _ => panic!("expected fix command"),
        }
    }
}
