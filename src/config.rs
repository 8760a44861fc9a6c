//! Credential configuration for child processes.
//!
//! The OAuth token is never written into this process's environment. It is
//! carried as a value and applied to one child [`Command`] at a time.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

/// Environment variable the agent CLI reads its OAuth token from.
pub const OAUTH_TOKEN_ENV: &str = "CLAUDE_CODE_OAUTH_TOKEN";
/// API-key variable that would otherwise take precedence over the token.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Config directory under the user's home.
const CONFIG_DIR: &str = ".agentprobe";
const CONFIG_FILE: &str = "config";

/// An OAuth token scoped to the child processes it is applied to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    oauth_token: String,
}

impl Credential {
    /// Wraps a token. Blank tokens yield `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self { oauth_token: token })
        }
    }

    /// Default location of the token file: `~/.agentprobe/config`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Reads a token file. Missing or blank files yield `None`.
    pub fn from_file(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "Loaded OAuth token from config file");
                Self::new(content)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Could not read token file");
                None
            }
        }
    }

    /// Explicit token first, then the default config file.
    pub fn resolve(explicit: Option<&str>) -> Option<Self> {
        explicit
            .and_then(Self::new)
            .or_else(|| Self::default_path().and_then(|p| Self::from_file(&p)))
    }

    /// Injects the token into `cmd` and hides the competing API key from it.
    pub fn apply(&self, cmd: &mut Command) {
        cmd.env(OAUTH_TOKEN_ENV, &self.oauth_token);
        cmd.env_remove(API_KEY_ENV);
    }

    pub fn token(&self) -> &str {
        &self.oauth_token
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.oauth_token.chars().take(6).collect();
        f.debug_struct("Credential")
            .field("oauth_token", &format!("{}... ({} chars)", prefix, self.oauth_token.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blank_token_is_none() {
        assert!(Credential::new("   \n").is_none());
        assert_eq!(Credential::new(" tok \n").unwrap().token(), "tok");
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        assert!(Credential::from_file(&path).is_none());

        fs::write(&path, "sk-ant-oat-123\n").unwrap();
        let cred = Credential::from_file(&path).unwrap();
        assert_eq!(cred.token(), "sk-ant-oat-123");
    }

    #[test]
    fn test_explicit_wins() {
        let cred = Credential::resolve(Some("explicit")).unwrap();
        assert_eq!(cred.token(), "explicit");
    }

    #[test]
    fn test_debug_redacts() {
        let cred = Credential::new("sk-ant-oat-secret-value").unwrap();
        let printed = format!("{:?}", cred);
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("sk-ant"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_apply_scopes_env_to_child() {
        let cred = Credential::new("scoped-token").unwrap();
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("printf '%s|%s' \"${}\" \"${{{}:-unset}}\"", OAUTH_TOKEN_ENV, API_KEY_ENV))
            .env(API_KEY_ENV, "should-be-removed");
        cred.apply(&mut cmd);

        let output = cmd.output().await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "scoped-token|unset");
        assert!(std::env::var(OAUTH_TOKEN_ENV).map_or(true, |v| v != "scoped-token"));
    }
}
