use anyhow::{Context, Result};
use std::io::Write;
use std::process::Command;

/// Open `initial` in `editor` and return the saved text.
///
/// The editor runs through `sh -c` so commands with arguments such as
/// `code --wait` work. A non-zero exit means the edit was abandoned and
/// yields `Ok(None)`. The caller must release the terminal first.
pub fn edit_text(editor: &str, initial: &str) -> Result<Option<String>> {
    let mut file = tempfile::Builder::new()
        .prefix("tuiman-")
        .suffix(".json")
        .tempfile()
        .context("failed to create temp file")?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    let path = file.path().to_path_buf();
    tracing::debug!("launching {editor} on {}", path.display());
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{editor} \"$1\""))
        .arg("sh")
        .arg(&path)
        .status()
        .with_context(|| format!("failed to launch {editor}"))?;
    if !status.success() {
        tracing::info!("editor exited with {status}");
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(text))
}
