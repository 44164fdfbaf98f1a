//! HTTP Fetcher
//!
//! Pulls resources over the network. Relative locators are resolved
//! against a base URL; URL-shaped dependency names are fetched as they are.

use crate::context::LoaderContext;
use crate::fetch::{FetchFuture, FetchRequest, Fetcher, SourceHandler};
use crate::naming::is_url;
use crate::FetchError;
use reqwest::StatusCode;
use smol::future::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// User agent sent with every request
const USER_AGENT: &str = concat!("intention/", env!("CARGO_PKG_VERSION"));

/// Request timeout
const TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches locators over HTTP(S) and hands the body to a source handler
///
/// Requests run on the blocking thread pool so the loader's executor
/// never waits on the network.
#[derive(Clone)]
pub struct HttpFetcher {
    base: Url,
    client: reqwest::blocking::Client,
    handler: SourceHandler,
}

impl HttpFetcher {
    pub fn new<F>(base: Url, handler: F) -> Result<Self, FetchError>
    where
        F: Fn(&LoaderContext, &FetchRequest, Vec<u8>) + Send + Sync + 'static,
    {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .map_err(|source| FetchError::Http {
                locator: base.to_string(),
                source,
            })?;

        Ok(Self::with_client(base, client, handler))
    }

    /// Use a preconfigured client (proxies, headers, TLS roots)
    pub fn with_client<F>(base: Url, client: reqwest::blocking::Client, handler: F) -> Self
    where
        F: Fn(&LoaderContext, &FetchRequest, Vec<u8>) + Send + Sync + 'static,
    {
        Self {
            base,
            client,
            handler: Arc::new(handler),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL a request maps to
    ///
    /// A URL-shaped name without a scheme is fetched over https.
    pub fn url_for(&self, request: &FetchRequest) -> Result<Url, url::ParseError> {
        if is_url(&request.name) && !request.name.contains("://") {
            return Url::parse(&format!("https://{}", request.name));
        }

        self.base.join(&request.locator)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, request: FetchRequest, loader: LoaderContext) -> FetchFuture {
        let url = self.url_for(&request);
        let client = self.client.clone();
        let handler = self.handler.clone();

        async move {
            let url = url.map_err(|err| FetchError::Failed(format!("Invalid locator {}: {}", request.locator, err)))?;
            tracing::debug!("GET {}", url);

            let (status, body) = smol::unblock(move || {
                let response = client.get(url).send()?;
                let status = response.status();
                Ok::<_, reqwest::Error>((status, response.bytes()?))
            })
            .await
            .map_err(|source| FetchError::Http {
                locator: request.locator.clone(),
                source,
            })?;

            if status == StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(request.locator));
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    locator: request.locator,
                    status: status.as_u16(),
                });
            }

            tracing::debug!("Got {} bytes for {}", body.len(), request.locator);
            handler(&loader, &request, body.to_vec());
            Ok(())
        }
        .boxed()
    }
}
