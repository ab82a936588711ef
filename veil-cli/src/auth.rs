use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::state::ensure_veil_home;

pub const API_KEY_ENV: &str = "VEIL_API_KEY";

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub api_key: Option<String>,
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_veil_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    restrict_permissions(&p)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(p: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(p, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("chmod {}", p.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_p: &std::path::Path) -> Result<()> {
    Ok(())
}

/// `$VEIL_API_KEY`, else the stored key.
pub fn resolve_api_key() -> Result<String> {
    if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
        return Ok(key.trim().to_string());
    }
    match load_auth()?.api_key {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => bail!("no API key: set {API_KEY_ENV} or run `veil auth set-key`"),
    }
}

fn prompt_secret(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn set_key() -> Result<()> {
    let key = prompt_secret("Paste API key for the model endpoint")?;
    if key.is_empty() {
        bail!("empty key; nothing saved");
    }
    let mut auth = load_auth()?;
    auth.api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved API key to {}", auth_path()?.display());
    Ok(())
}
