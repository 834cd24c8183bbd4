use super::blocks::find_code_blocks;
use super::discover::discover_files;
use super::rules::Rules;
use crate::config::ScanConfig;
use crate::snippet::{indent_width, is_blank};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const PROPERTY_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanIssue {
    /// Lines (1-based within the block) with a long run of spaces after
    /// their indentation.
    MultipleSpaces { lines: Vec<usize> },
    /// A line that follows an opening `{` or `[` but is not indented.
    UnindentedProperty { line: usize, text: String },
    /// Indent widths that are not a multiple of the configured step.
    OddIndentation { levels: Vec<usize> },
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleSpaces { lines } => {
                write!(f, "Multiple consecutive spaces on lines: {:?}", lines)
            }
            Self::UnindentedProperty { line, text } => {
                write!(f, "Unindented property at line {}: '{}'", line, text)
            }
            Self::OddIndentation { levels } => {
                write!(f, "Odd indentation levels found: {:?}", levels)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    pub file: PathBuf,
    pub line: usize,
    pub issues: Vec<ScanIssue>,
    pub preview: String,
}

pub fn scan_block(body: &str, rules: &Rules) -> Vec<ScanIssue> {
    let lines: Vec<&str> = body.split('\n').collect();
    let mut issues = Vec::new();

    let spaced: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| rules.space_run.is_match(line.trim_start()))
        .map(|(i, _)| i + 1)
        .collect();
    if !spaced.is_empty() {
        issues.push(ScanIssue::MultipleSpaces { lines: spaced });
    }

    for (i, pair) in lines.windows(2).enumerate() {
        let (prev, line) = (pair[0], pair[1]);
        if !prev.trim_end().ends_with(['{', '[']) {
            continue;
        }
        let trimmed = line.trim();
        let starts_unindented = line.chars().next().is_some_and(|c| !c.is_whitespace());
        if starts_unindented && !trimmed.is_empty() && !trimmed.starts_with(['/', '}', ']']) {
            issues.push(ScanIssue::UnindentedProperty {
                line: i + 2,
                text: trimmed.chars().take(PROPERTY_PREVIEW_CHARS).collect(),
            });
        }
    }

    let mut levels: Vec<usize> = lines
        .iter()
        .filter(|line| !is_blank(line) && !line.trim().starts_with("//"))
        .map(|line| indent_width(line))
        .filter(|&width| width > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();
    if levels.len() > 1 {
        let odd: Vec<usize> = levels
            .into_iter()
            .filter(|level| level % rules.indent_step != 0)
            .collect();
        if !odd.is_empty() {
            issues.push(ScanIssue::OddIndentation { levels: odd });
        }
    }

    issues
}

pub fn scan_source(file: &Path, source: &str, rules: &Rules) -> Vec<BlockReport> {
    find_code_blocks(source)
        .into_iter()
        .filter_map(|block| {
            let issues = scan_block(block.body, rules);
            if issues.is_empty() {
                return None;
            }
            Some(BlockReport {
                file: file.to_path_buf(),
                line: block.line,
                issues,
                preview: preview(block.body, rules.preview_len),
            })
        })
        .collect()
}

pub fn scan_paths(paths: &[PathBuf], config: &ScanConfig) -> Result<Vec<BlockReport>> {
    let rules = Rules::from_config(config)?;
    let files = discover_files(paths, &config.extensions)?;
    tracing::debug!("Scanning {} files", files.len());

    let mut reports = Vec::new();
    for file in files {
        let source = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read source file: {:?}", file))?;
        let found = scan_source(&file, &source, &rules);
        tracing::debug!("{:?}: {} blocks with issues", file, found.len());
        reports.extend(found);
    }

    Ok(reports)
}

fn preview(body: &str, len: usize) -> String {
    body.chars().take(len).collect::<String>().replace('\n', "\\n")
}
