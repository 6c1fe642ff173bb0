// Shared transport configuration for building reqwest::Client instances.
//
// Every collaborator client shares TLS, timeout and user-agent settings
// through this module; clients that authenticate inject their own default
// headers.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const USER_AGENT: &str = concat!("skylight/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled webpki roots.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (home automation hubs on the LAN with
    /// self-signed certificates).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Hard deadline for every request issued by the client.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(15),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by clients that authenticate with a bearer token or an API key
    /// header on every request.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Build a client that sends `Authorization: Bearer <token>`.
    pub fn build_bearer_client(&self, token: &SecretString) -> Result<reqwest::Client, Error> {
        let value = format!("Bearer {}", token.expose_secret());
        self.build_client_with_headers(secret_header(reqwest::header::AUTHORIZATION, &value)?)
    }

    /// Build a client that sends the secret in a custom header.
    pub fn build_keyed_client(
        &self,
        header: &'static str,
        key: &SecretString,
    ) -> Result<reqwest::Client, Error> {
        let name = HeaderName::from_static(header);
        self.build_client_with_headers(secret_header(name, key.expose_secret())?)
    }
}

fn secret_header(name: HeaderName, value: &str) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    let mut header_value = HeaderValue::from_str(value).map_err(|e| Error::Authentication {
        message: format!("invalid credential header value: {e}"),
    })?;
    header_value.set_sensitive(true);
    headers.insert(name, header_value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_fifteen_seconds() {
        assert_eq!(TransportConfig::default().timeout, Duration::from_secs(15));
    }

    #[test]
    fn rejects_header_unsafe_credentials() {
        let token = SecretString::from("bad\ntoken");
        let result = TransportConfig::default().build_bearer_client(&token);
        assert!(matches!(result, Err(Error::Authentication { .. })));
    }
}
