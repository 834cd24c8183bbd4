use crate::config::ScanConfig;
use anyhow::{Context, Result};
use regex::Regex;

/// Compiled form of [`ScanConfig`] shared by the scanner and the fixer.
#[derive(Debug, Clone)]
pub struct Rules {
    pub(crate) space_run: Regex,
    pub(crate) indent_step: usize,
    pub(crate) preview_len: usize,
}

impl Rules {
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        if config.min_space_run < 2 {
            anyhow::bail!("min_space_run must be at least 2, got {}", config.min_space_run);
        }
        if config.indent_step == 0 {
            anyhow::bail!("indent_step must be greater than 0");
        }

        let pattern = format!(" {{{},}}", config.min_space_run);
        let space_run = Regex::new(&pattern)
            .with_context(|| format!("Invalid space run length: {}", config.min_space_run))?;

        Ok(Self {
            space_run,
            indent_step: config.indent_step,
            preview_len: config.preview_len,
        })
    }
}

#[cfg(test)]
impl Rules {
    pub(crate) fn defaults() -> Self {
        Self::from_config(&ScanConfig::default()).unwrap()
    }
}
