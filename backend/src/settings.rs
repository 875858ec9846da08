//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `WORKOUT_*` environment variables and config
//! files, in that order of precedence. Derived values (page limits, session
//! cookie settings) are validated once at startup so a misconfigured server
//! fails before it binds.

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use pagination::{PageLimits, PageRequestError};
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_SESSION_KEY_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const SAME_SITE_EXPECTED: &str = "strict|lax|none";

/// Errors raised while deriving runtime settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Page size defaults are inconsistent.
    #[error(transparent)]
    PageLimits(#[from] PageRequestError),
    /// `same_site` is not a recognised policy.
    #[error("invalid same_site '{value}'; expected {SAME_SITE_EXPECTED}")]
    InvalidSameSite {
        /// Rejected value.
        value: String,
    },
    /// `SameSite=None` cookies must be secure.
    #[error("same_site=none requires cookie_secure=true")]
    InsecureSameSiteNone,
    /// Reading the session key file failed and ephemeral keys are disabled.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short to derive a signing key from.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file location.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Required bytes.
        min_len: usize,
    },
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WORKOUT")]
pub struct AppSettings {
    /// Interface to bind; defaults to all interfaces.
    pub host: Option<String>,
    /// Port to bind.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// Page size used when a list request omits one.
    #[ortho_config(default = 20)]
    pub default_page_size: u32,
    /// Largest page size honoured.
    #[ortho_config(default = 100)]
    pub max_page_size: u32,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`; unset means `true`.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for session cookies: `strict`, `lax` or `none`.
    pub same_site: Option<String>,
    /// Fall back to a random key when the key file cannot be read.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
}

/// Cookie session parameters derived from [`AppSettings`].
pub struct SessionSettings {
    /// Signing and encryption key.
    pub key: Key,
    /// Whether cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl AppSettings {
    /// Address to bind.
    #[must_use]
    pub fn bind_addr(&self) -> (String, u16) {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        (host.to_owned(), self.port)
    }

    /// Whether session cookies carry the `Secure` attribute.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Validated page limits.
    ///
    /// # Errors
    /// [`SettingsError::PageLimits`] when the default is zero or exceeds the
    /// maximum.
    pub fn page_limits(&self) -> Result<PageLimits, SettingsError> {
        Ok(PageLimits::new(self.default_page_size, self.max_page_size)?)
    }

    /// Session cookie parameters, reading the key file.
    ///
    /// # Errors
    /// Fails on an unknown or insecure `same_site`, or when the key file is
    /// unreadable (without `allow_ephemeral_session_key`) or too short.
    pub fn session_settings(&self) -> Result<SessionSettings, SettingsError> {
        let same_site = self.same_site()?;
        let key = self.session_key()?;
        Ok(SessionSettings {
            key,
            cookie_secure: self.cookie_secure(),
            same_site,
        })
    }

    fn same_site(&self) -> Result<SameSite, SettingsError> {
        let Some(value) = self.same_site.as_deref() else {
            return Ok(SameSite::Lax);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if self.cookie_secure() => Ok(SameSite::None),
            "none" => Err(SettingsError::InsecureSameSiteNone),
            _ => Err(SettingsError::InvalidSameSite {
                value: value.to_owned(),
            }),
        }
    }

    fn session_key(&self) -> Result<Key, SettingsError> {
        let path = self
            .session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_PATH));
        match std::fs::read(&path) {
            Ok(bytes) => key_from_bytes(&path, bytes),
            Err(error) if self.allow_ephemeral_session_key => {
                warn!(
                    path = %path.display(),
                    %error,
                    "using temporary session key; sessions end on restart"
                );
                Ok(Key::generate())
            }
            Err(source) => Err(SettingsError::KeyRead { path, source }),
        }
    }
}

fn key_from_bytes(path: &Path, mut bytes: Vec<u8>) -> Result<Key, SettingsError> {
    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        return Err(SettingsError::KeyTooShort {
            path: path.to_path_buf(),
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    //! Settings loading and derivation.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 8] = [
        "WORKOUT_HOST",
        "WORKOUT_PORT",
        "WORKOUT_DEFAULT_PAGE_SIZE",
        "WORKOUT_MAX_PAGE_SIZE",
        "WORKOUT_SESSION_KEY_FILE",
        "WORKOUT_COOKIE_SECURE",
        "WORKOUT_SAME_SITE",
        "WORKOUT_ALLOW_EPHEMERAL_SESSION_KEY",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("workout-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(settings.bind_addr(), ("0.0.0.0".to_owned(), 8080));
        assert_eq!(
            settings.page_limits().expect("default limits"),
            PageLimits::default()
        );
        assert!(settings.cookie_secure());
        assert!(!settings.allow_ephemeral_session_key);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("WORKOUT_HOST", "127.0.0.1"),
            ("WORKOUT_PORT", "9090"),
            ("WORKOUT_DEFAULT_PAGE_SIZE", "10"),
            ("WORKOUT_MAX_PAGE_SIZE", "50"),
        ]);

        assert_eq!(settings.bind_addr(), ("127.0.0.1".to_owned(), 9090));
        let limits = settings.page_limits().expect("valid limits");
        assert_eq!((limits.default_page_size(), limits.max_page_size()), (10, 50));
    }

    #[rstest]
    #[case::explicitly_off("false", false)]
    #[case::explicitly_on("true", true)]
    fn cookie_secure_reads_the_environment(#[case] raw: &str, #[case] expected: bool) {
        let settings = load_with(&[("WORKOUT_COOKIE_SECURE", raw)]);

        assert_eq!(settings.cookie_secure(), expected);
    }

    #[rstest]
    fn unset_cookie_secure_still_marks_session_cookies_secure() {
        let mut settings = load_with(&[]);
        settings.allow_ephemeral_session_key = true;
        settings.session_key_file = Some(PathBuf::from("/nonexistent/session_key"));

        let session = settings.session_settings().expect("ephemeral session settings");

        assert!(session.cookie_secure);
    }

    #[rstest]
    #[case::zero_default("0", "100")]
    #[case::default_above_max("200", "100")]
    fn inconsistent_page_limits_fail(#[case] default: &str, #[case] max: &str) {
        let settings = load_with(&[
            ("WORKOUT_DEFAULT_PAGE_SIZE", default),
            ("WORKOUT_MAX_PAGE_SIZE", max),
        ]);

        assert!(matches!(
            settings.page_limits(),
            Err(SettingsError::PageLimits(_))
        ));
    }

    #[rstest]
    #[case::lax("Lax", true, Some(SameSite::Lax))]
    #[case::strict("strict", true, Some(SameSite::Strict))]
    #[case::secure_none("none", true, Some(SameSite::None))]
    #[case::insecure_none("none", false, None)]
    #[case::unknown("sideways", true, None)]
    fn same_site_parses_known_policies(
        #[case] raw: &str,
        #[case] secure: bool,
        #[case] expected: Option<SameSite>,
    ) {
        let mut settings = load_with(&[]);
        settings.same_site = Some(raw.to_owned());
        settings.cookie_secure = Some(secure);

        assert_eq!(settings.same_site().ok(), expected);
    }

    #[rstest]
    fn missing_key_file_needs_ephemeral_opt_in() {
        let mut settings = load_with(&[]);
        settings.session_key_file = Some(PathBuf::from("/nonexistent/session_key"));

        assert!(matches!(
            settings.session_settings(),
            Err(SettingsError::KeyRead { .. })
        ));

        settings.allow_ephemeral_session_key = true;
        assert!(settings.session_settings().is_ok());
    }

    #[rstest]
    fn short_key_files_are_rejected() {
        let path = std::env::temp_dir().join(format!("workout_short_key_{}", std::process::id()));
        std::fs::write(&path, b"short").expect("write key");
        let mut settings = load_with(&[]);
        settings.session_key_file = Some(path.clone());

        let result = settings.session_settings();
        std::fs::remove_file(&path).expect("remove key");

        assert!(matches!(
            result,
            Err(SettingsError::KeyTooShort { length: 5, .. })
        ));
    }
}
