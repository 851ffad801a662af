#![deny(rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self
)]

//! # dataway_client
//!
//! Uploads measurement points to a dataway.
//!
//! Every upload is a single `POST` to
//! `{host}/v1/write/metrics?template={route}&token={token}&shortrp={shortrp}`
//! whose body is the line protocol encoding of the points, gzip compressed
//! unless disabled, optionally carrying a `DWAY` signature. Nothing is
//! retried or batched: an error at any step is returned to the caller and
//! nothing is sent.
//!
//! ```no_run
//! # use dataway_client::{Client, ClientConfig, Point, Time, UrlParam};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let client = Client::new(
//!     ClientConfig::new("http://127.0.0.1:9528")
//!         .with_credentials("access-key", "secret-key")
//!         .with_user_agent("my-agent/1.0"),
//! )?;
//!
//! let point = Point::builder("cpu", Time::from_timestamp_nanos(1_700_000_000_000_000_000))
//!     .tag("host", "server01")
//!     .field("usage", 0.5_f64)
//!     .build();
//!
//! let response = client
//!     .upload(&UrlParam::new("cpu_template", "token", "autogen"), [&point], true)
//!     .await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod gzip;
pub mod signature;
pub mod transport;

pub use dataway_line_protocol::{FieldValue, Point, PointBuilder};
pub use dataway_time::{MockProvider, SystemProvider, Time, TimeProvider};
pub use transport::{HttpTransport, ReqwestTransport, Request, Response, TransportError};

use bytes::Bytes;
use dataway_line_protocol::encode;
use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use tracing::debug;

/// Header names set on every upload.
pub mod header {
    pub const X_TRACE_ID: &str = "X-Trace-Id";
    pub const X_DATAKIT_UUID: &str = "X-Datakit-UUID";
    pub const X_VERSION: &str = "X-Version";
    pub const USER_AGENT: &str = "User-Agent";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const CONTENT_ENCODING: &str = "Content-Encoding";
    pub const DATE: &str = "Date";
    pub const AUTHORIZATION: &str = "Authorization";
}

const WRITE_PATH: &str = "/v1/write/metrics";

/// Primary error type for the [`Client`]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid option, dataway host is empty")]
    EmptyHost,

    #[error("failed to gzip compress the request body: {0}")]
    Compression(#[source] std::io::Error),

    #[error(transparent)]
    Transport(TransportError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Connection settings and credentials of a [`Client`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `protocol://server:port` of the dataway
    pub host: String,
    /// Keys the request signature
    pub access_key: Secret<String>,
    /// Sent in the clear in the `Authorization` header
    pub secret_key: Secret<String>,
    pub trace_id: String,
    pub client_uuid: String,
    pub version: String,
    pub user_agent: String,
    /// Send the encoded points as-is instead of gzip compressed
    pub disable_compression: bool,
}

impl ClientConfig {
    /// Settings for `host` with every other value left empty and compression on.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            access_key: Secret::new(String::new()),
            secret_key: Secret::new(String::new()),
            trace_id: String::new(),
            client_uuid: String::new(),
            version: String::new(),
            user_agent: String::new(),
            disable_compression: false,
        }
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Secret::new(access_key.into());
        self.secret_key = Secret::new(secret_key.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn with_client_uuid(mut self, client_uuid: impl Into<String>) -> Self {
        self.client_uuid = client_uuid.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_compression_disabled(mut self, set_to: bool) -> Self {
        self.disable_compression = set_to;
        self
    }
}

/// Routing values substituted into the write URL, passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParam {
    pub route: String,
    pub token: String,
    pub shortrp: String,
}

impl UrlParam {
    pub fn new(
        route: impl Into<String>,
        token: impl Into<String>,
        shortrp: impl Into<String>,
    ) -> Self {
        Self {
            route: route.into(),
            token: token.into(),
            shortrp: shortrp.into(),
        }
    }
}

/// Client to a dataway.
///
/// Holds only immutable settings plus shared handles to its transport and
/// clock, so one instance can serve any number of uploads, concurrent ones
/// included.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Client {
    /// Create a new [`Client`] sending through [`ReqwestTransport`].
    ///
    /// Fails if the host is empty; nothing else is validated.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // checked before reqwest sets up its TLS backend
        check_host(&config)?;
        Self::new_with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a new [`Client`] sending through `transport`.
    pub fn new_with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        check_host(&config)?;

        Ok(Self {
            config,
            transport,
            time_provider: Arc::new(SystemProvider::new()),
        })
    }

    /// Replace the clock used for the `Date` header.
    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The write URL for `param`. Values are substituted as-is, without
    /// any percent-encoding.
    pub fn write_url(&self, param: &UrlParam) -> String {
        format!(
            "{}{WRITE_PATH}?template={}&token={}&shortrp={}",
            self.config.host, param.route, param.token, param.shortrp
        )
    }

    /// Build the upload request for `points` without sending it.
    ///
    /// When `sign` is set the `Authorization` header covers the final body,
    /// after compression, and the same date sent in the `Date` header.
    pub fn prepare<'a, I, P>(&self, param: &UrlParam, points: I, sign: bool) -> Result<Request>
    where
        I: IntoIterator<Item = P>,
        P: Into<Option<&'a Point>>,
    {
        let date = self.time_provider.now().to_rfc1123();
        let compress = !self.config.disable_compression;

        let mut body = encode(points);
        if compress {
            body = gzip::compress(&body).map_err(Error::Compression)?;
        }

        let mut headers = vec![
            (header::X_TRACE_ID, self.config.trace_id.clone()),
            (header::X_DATAKIT_UUID, self.config.client_uuid.clone()),
            (header::X_VERSION, self.config.version.clone()),
            (header::USER_AGENT, self.config.user_agent.clone()),
            (header::CONTENT_TYPE, signature::TEXT_PLAIN.to_owned()),
            (header::CONTENT_LENGTH, body.len().to_string()),
            (header::DATE, date.clone()),
        ];
        if compress {
            headers.push((header::CONTENT_ENCODING, "gzip".to_owned()));
        }
        if sign {
            headers.push((header::AUTHORIZATION, self.signature(&body, &date)));
        }

        Ok(Request {
            method: Method::POST,
            url: self.write_url(param),
            headers,
            body: Bytes::from(body),
        })
    }

    /// Encode `points` and upload them in one request.
    ///
    /// `None` entries and points without fields are left out. Whatever the
    /// dataway answers is returned, error statuses included; transport
    /// failures are returned as [`Error::Transport`].
    pub async fn upload<'a, I, P>(
        &self,
        param: &UrlParam,
        points: I,
        sign: bool,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = P> + Send,
        P: Into<Option<&'a Point>>,
    {
        let request = self.prepare(param, points, sign)?;
        debug!(
            url = %request.url,
            bytes = request.body.len(),
            compressed = !self.config.disable_compression,
            signed = sign,
            "uploading points to dataway"
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(Error::Transport)?;
        debug!(status = %response.status, "dataway responded");

        Ok(response)
    }

    fn signature(&self, body: &[u8], date: &str) -> String {
        signature::sign(
            body,
            date,
            self.config.access_key.expose_secret(),
            self.config.secret_key.expose_secret(),
        )
    }
}

fn check_host(config: &ClientConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(Error::EmptyHost);
    }
    Ok(())
}
