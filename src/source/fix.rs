use super::blocks::find_code_blocks;
use super::discover::discover_files;
use super::rules::Rules;
use crate::config::ScanConfig;
use crate::snippet::is_blank;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixOutcome {
    pub file: PathBuf,
    pub changed: bool,
}

/// Empties whitespace-only lines and collapses long space runs after each
/// line's indentation. The indentation itself is left as written.
pub fn fix_block(body: &str, rules: &Rules) -> String {
    body.split('\n')
        .map(|line| {
            if is_blank(line) {
                return String::new();
            }
            let rest = line.trim_start();
            let indent = &line[..line.len() - rest.len()];
            format!("{}{}", indent, rules.space_run.replace_all(rest, " "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites every `CodeBlock` literal in `source`, leaving the markup
/// around them untouched.
pub fn fix_source(source: &str, rules: &Rules) -> String {
    let mut out = String::with_capacity(source.len());
    let mut copied_to = 0;

    for block in find_code_blocks(source) {
        out.push_str(&source[copied_to..block.body_range.start]);
        out.push_str(&fix_block(block.body, rules));
        copied_to = block.body_range.end;
    }
    out.push_str(&source[copied_to..]);

    out
}

/// Fixes every discovered file. Files are only written when `write` is set
/// and their content actually changed.
pub fn fix_paths(paths: &[PathBuf], config: &ScanConfig, write: bool) -> Result<Vec<FixOutcome>> {
    let rules = Rules::from_config(config)?;
    let files = discover_files(paths, &config.extensions)?;

    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let source = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read source file: {:?}", file))?;
        let fixed = fix_source(&source, &rules);
        let changed = fixed != source;

        if changed && write {
            fs::write(&file, &fixed)
                .with_context(|| format!("Failed to write source file: {:?}", file))?;
            tracing::info!("Fixed {:?}", file);
        } else {
            tracing::debug!("{:?}: changed={}", file, changed);
        }

        outcomes.push(FixOutcome { file, changed });
    }

    Ok(outcomes)
}
