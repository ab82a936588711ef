use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// `$VEIL_HOME`, or `~/.veil` when unset.
pub fn veil_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("VEIL_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or set VEIL_HOME)")?;
    Ok(PathBuf::from(home).join(".veil"))
}

pub fn ensure_veil_home() -> Result<PathBuf> {
    let dir = veil_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a statement text file. `-` reads stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut s = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut s).context("read stdin")?;
        return Ok(s);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Name recorded as a transaction's source when none is given: the input's
/// file name, or `stdin`.
pub fn default_source(path: &Path) -> String {
    if path == Path::new("-") {
        return "stdin".to_string();
    }
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_uses_file_name() {
        assert_eq!(default_source(Path::new("/tmp/in/2025-10.txt")), "2025-10.txt");
        assert_eq!(default_source(Path::new("-")), "stdin");
    }
}
