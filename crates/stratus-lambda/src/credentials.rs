//! Credential resolution.
//!
//! Standard cloud-credential precedence: an explicit key pair wins over a
//! named profile, which wins over the ambient environment.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{LambdaError, LambdaResult};

/// A resolved set of signing credentials.
#[derive(Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    // Secret material stays out of debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

/// Credential inputs taken from the deployment configuration.
#[derive(Debug, Clone, Default)]
pub struct CredentialConfig {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub profile: Option<String>,
}

/// Resolve credentials with the standard precedence chain.
///
/// 1. Explicit access/secret key pair from the configuration.
/// 2. A named profile in the shared credentials file.
/// 3. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` from the environment.
pub fn resolve(config: &CredentialConfig) -> LambdaResult<Credentials> {
    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        if !access_key.is_empty() && !secret_key.is_empty() {
            debug!("using explicit credentials");
            return Ok(Credentials {
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
                session_token: config.session_token.clone().filter(|t| !t.is_empty()),
            });
        }
    }

    if let Some(profile) = config.profile.as_deref().filter(|p| !p.is_empty()) {
        let path = shared_credentials_path();
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            LambdaError::credentials(format!(
                "cannot read shared credentials file {}: {e}",
                path.display()
            ))
        })?;
        return parse_shared_credentials(&contents, profile).ok_or_else(|| {
            LambdaError::credentials(format!(
                "profile {profile} not found in {}",
                path.display()
            ))
        });
    }

    if let (Ok(access_key), Ok(secret_key)) = (
        std::env::var("AWS_ACCESS_KEY_ID"),
        std::env::var("AWS_SECRET_ACCESS_KEY"),
    ) {
        debug!("using credentials from the environment");
        return Ok(Credentials {
            access_key,
            secret_key,
            session_token: std::env::var("AWS_SESSION_TOKEN").ok().filter(|t| !t.is_empty()),
        });
    }

    Err(LambdaError::credentials(
        "no credentials available: set an access/secret key pair, a profile, \
         or AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY",
    ))
}

fn shared_credentials_path() -> PathBuf {
    std::env::var("AWS_SHARED_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME").map(|home| PathBuf::from(home).join(".aws/credentials"))
        })
        .unwrap_or_else(|_| PathBuf::from(".aws/credentials"))
}

/// Extract one profile's keys from a shared credentials file.
///
/// The file is the usual INI shape: `[name]` section headers followed by
/// `key = value` lines. Lines that parse as neither are ignored.
fn parse_shared_credentials(contents: &str, profile: &str) -> Option<Credentials> {
    let mut in_profile = false;
    let mut access_key = None;
    let mut secret_key = None;
    let mut session_token = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if in_profile {
                break;
            }
            in_profile = section.trim() == profile;
            continue;
        }

        if !in_profile {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().to_owned();
            match key.trim() {
                "aws_access_key_id" => access_key = Some(value),
                "aws_secret_access_key" => secret_key = Some(value),
                "aws_session_token" => session_token = Some(value),
                _ => {}
            }
        }
    }

    Some(Credentials {
        access_key: access_key?,
        secret_key: secret_key?,
        session_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHARED_FILE: &str = "\
# comment
[default]
aws_access_key_id = AKIDDEFAULT
aws_secret_access_key = defaultsecret

[deployer]
aws_access_key_id = AKIDDEPLOY
aws_secret_access_key = deploysecret
aws_session_token = tok123
region = eu-west-1
";

    #[test]
    fn explicit_keys_win() {
        let config = CredentialConfig {
            access_key: Some("AKIDEXPLICIT".to_owned()),
            secret_key: Some("secret".to_owned()),
            session_token: Some(String::new()),
            profile: Some("deployer".to_owned()),
        };

        let credentials = resolve(&config).unwrap();
        assert_eq!(credentials.access_key, "AKIDEXPLICIT");
        // Empty token is treated as absent.
        assert!(credentials.session_token.is_none());
    }

    #[test]
    fn profile_parsing_picks_the_named_section() {
        let credentials = parse_shared_credentials(SHARED_FILE, "deployer").unwrap();
        assert_eq!(credentials.access_key, "AKIDDEPLOY");
        assert_eq!(credentials.secret_key, "deploysecret");
        assert_eq!(credentials.session_token.as_deref(), Some("tok123"));
    }

    #[test]
    fn profile_parsing_stops_at_the_next_section() {
        let credentials = parse_shared_credentials(SHARED_FILE, "default").unwrap();
        assert_eq!(credentials.access_key, "AKIDDEFAULT");
        assert!(credentials.session_token.is_none());
    }

    #[test]
    fn missing_profile_is_none() {
        assert!(parse_shared_credentials(SHARED_FILE, "absent").is_none());
    }

    #[test]
    fn incomplete_profile_is_none() {
        let contents = "[partial]\naws_access_key_id = AKID\n";
        assert!(parse_shared_credentials(contents, "partial").is_none());
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let credentials = Credentials {
            access_key: "AKID".to_owned(),
            secret_key: "verysecret".to_owned(),
            session_token: None,
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("verysecret"));
    }
}
