use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::state::{ensure_greenscore_home, read_if_exists, write_replace};

pub const TOKEN_ENV: &str = "HF_API_TOKEN";
const TOKEN_PREFIX: &str = "hf_";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub hf_token: Option<String>,
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_greenscore_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    match read_if_exists(&auth_path()?)? {
        Some(s) => serde_json::from_str(&s).context("parse auth.json"),
        None => Ok(AuthState::default()),
    }
}

/// Returns where the credential was written.
pub fn save_auth(auth: &AuthState) -> Result<PathBuf> {
    let p = auth_path()?;
    write_replace(&p, &serde_json::to_string_pretty(auth)?)?;
    Ok(p)
}

/// Bearer token for the classifier: `$HF_API_TOKEN`, else auth.json.
///
/// Missing is not an error here; the remote call will reject it.
pub fn resolve_token() -> Result<String> {
    match std::env::var(TOKEN_ENV) {
        Ok(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
        _ => Ok(load_auth()?.hf_token.unwrap_or_default()),
    }
}

/// Trimmed token, if it has the Hugging Face shape.
fn validate_token(raw: &str) -> Result<&str> {
    let token = raw.trim();
    if !token.starts_with(TOKEN_PREFIX) || token.len() == TOKEN_PREFIX.len() {
        bail!("token didn't look like a Hugging Face token (expected prefix {TOKEN_PREFIX})");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("token contains whitespace");
    }
    Ok(token)
}

pub fn paste_token() -> Result<()> {
    print!("Paste Hugging Face token ({TOKEN_PREFIX}...): ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let token = validate_token(&line)?;

    let mut auth = load_auth()?;
    auth.hf_token = Some(token.to_string());
    let p = save_auth(&auth)?;
    println!("Saved token to {}", p.display());
    Ok(())
}
