//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use pagination::PageLimits;

use backend::settings::{AppSettings, SettingsError};

/// Validated configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: (String, u16),
    pub(crate) page_limits: PageLimits,
}

impl ServerConfig {
    /// Derive server configuration from loaded settings.
    ///
    /// # Errors
    /// Propagates [`SettingsError`] for inconsistent page limits, cookie
    /// policy or an unusable session key.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        let session = settings.session_settings()?;
        Ok(Self {
            key: session.key,
            cookie_secure: session.cookie_secure,
            same_site: session.same_site,
            bind_addr: settings.bind_addr(),
            page_limits: settings.page_limits()?,
        })
    }

    /// Return the address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.bind_addr.0.as_str(), self.bind_addr.1)
    }
}
