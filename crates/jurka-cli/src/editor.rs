use std::fs;
use std::io::Write;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};

pub const COMMENT_TEMPLATE: &str =
    "\n# Write your comment above. Lines starting with # are ignored.\n";

/// Drop `#` lines and surrounding whitespace; `None` when nothing is left.
pub fn strip_comment_lines(text: &str) -> Option<String> {
    let body = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let body = body.trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

fn editor_command() -> Result<Vec<String>> {
    let raw = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "vi".to_string());
    let parts = shell_words::split(&raw).with_context(|| format!("parse editor command '{raw}'"))?;
    if parts.is_empty() {
        bail!("editor command is empty");
    }
    Ok(parts)
}

/// Open the user's editor on the comment template and return the stripped text.
pub fn edit_comment() -> Result<Option<String>> {
    let parts = editor_command()?;
    let (program, args) = parts
        .split_first()
        .ok_or_else(|| anyhow!("editor command is empty"))?;
    let program = which::which(program).with_context(|| format!("editor '{program}' not found"))?;

    let mut file = tempfile::Builder::new()
        .prefix("jurka-comment-")
        .suffix(".md")
        .tempfile()
        .context("create comment file")?;
    file.write_all(COMMENT_TEMPLATE.as_bytes())?;
    file.flush()?;

    let status = Command::new(&program)
        .args(args)
        .arg(file.path())
        .status()
        .with_context(|| format!("run editor {}", program.display()))?;
    if !status.success() {
        bail!("editor exited with {status}");
    }
    let edited = fs::read_to_string(file.path()).context("read comment file")?;
    Ok(strip_comment_lines(&edited))
}
