//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, redirect, Certificate, Client, Identity, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::errors::InventoryError;

/// Transport settings for the director connection.
///
/// Built once and owned by the client. Certificate verification is on when a
/// CA certificate is given and off otherwise; the choice only affects this
/// client.
#[derive(Debug)]
pub struct TransportOptions {
    pub username: String,

    pub password: SecretString,

    /// PEM encoded CA certificate of the director
    pub ca_cert_pem: Option<Vec<u8>>,

    /// PEM encoded client certificate and private key
    pub client_identity_pem: Option<Vec<u8>>,

    pub request_timeout: Duration,
}

impl TransportOptions {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            ca_cert_pem: None,
            client_identity_pem: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the BOSH director API
pub struct HttpClient {
    client: Client,
    base_url: String,
    username: String,
    password: SecretString,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// Redirects are never followed: task submission answers with a 302 whose
    /// `Location` the poller has to read itself.
    pub fn new(base_url: &str, options: TransportOptions) -> Result<Self, InventoryError> {
        let mut builder = Client::builder()
            .timeout(options.request_timeout)
            .redirect(redirect::Policy::none());

        match &options.ca_cert_pem {
            Some(pem) => {
                let cert = Certificate::from_pem(pem)
                    .map_err(|e| InventoryError::TlsError(format!("Invalid CA certificate: {}", e)))?;
                builder = builder.add_root_certificate(cert);
            }
            None => {
                debug!("No CA certificate configured, certificate verification disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(pem) = &options.client_identity_pem {
            let identity = Identity::from_pem(pem)
                .map_err(|e| InventoryError::TlsError(format!("Invalid client certificate: {}", e)))?;
            builder = builder.identity(identity);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: options.username,
            password: options.password,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL for a `Location` header.
    ///
    /// Only the path is kept and re-rooted on the configured base URL, since
    /// directors behind a NAT advertise addresses the caller cannot reach.
    pub fn resolve_location(&self, location: &str) -> Result<String, url::ParseError> {
        let base = Url::parse(&self.base_url)?;
        let resolved = base.join(location)?;
        Ok(self.url(resolved.path()))
    }

    /// Make an authenticated GET request.
    ///
    /// Any status is returned to the caller; only transport failures are errors.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, InventoryError> {
        self.send_get(url, query, None).await
    }

    /// GET with `Accept: text/plain`, used for task output
    pub async fn get_plain(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Response, InventoryError> {
        self.send_get(url, query, Some("text/plain")).await
    }

    async fn send_get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: Option<&str>,
    ) -> Result<Response, InventoryError> {
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .query(query);

        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }

        let response = request.send().await?;
        debug!("GET {} -> {}", url, response.status());
        Ok(response)
    }
}
