//! HTTP client with connection pooling and retry logic

use pyembed_config::NetworkConfig;
use pyembed_errors::{Error, NetworkError};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large downloads
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
            user_agent: format!("pyembed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            retry_count: config.retries,
            retry_delay: Duration::from_secs(config.retry_delay),
            ..Self::default()
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a GET request with retries.
    ///
    /// The returned response may still carry a non-success status; callers
    /// decide what that means for them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts or the
    /// server rate-limits us.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.retry_request(|| self.client.get(url).send()).await
    }

    /// Execute a request with retries
    async fn retry_request<F, Fut>(&self, mut f: F) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay * attempt).await;
            }

            match f().await {
                Ok(response) => {
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                        {
                            return Err(NetworkError::RateLimited {
                                seconds: retry_after,
                            }
                            .into());
                        }
                    }

                    // Server errors are worth another attempt; the last one is
                    // handed back so the caller sees the status.
                    if response.status().is_server_error() && attempt < self.config.retry_count {
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let retry = Self::should_retry(&e);
                    last_error = Some(e);
                    if !retry {
                        break;
                    }
                }
            }
        }

        match last_error {
            Some(e) if e.is_timeout() => Err(NetworkError::Timeout {
                url: e
                    .url()
                    .map(std::string::ToString::to_string)
                    .unwrap_or_default(),
            }
            .into()),
            Some(e) if e.is_connect() => Err(NetworkError::ConnectionRefused(e.to_string()).into()),
            Some(e) => Err(NetworkError::DownloadFailed(e.to_string()).into()),
            None => Err(NetworkError::DownloadFailed("Unknown error".to_string()).into()),
        }
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        error.is_timeout()
            || error.is_connect()
            || error.status().is_some_and(|s| s.is_server_error())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_network_config() {
        let network = NetworkConfig {
            timeout: 10,
            connect_timeout: 2,
            retries: 0,
            retry_delay: 5,
        };
        let config = NetConfig::from(&network);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.retry_count, 0);
        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert!(config.user_agent.starts_with("pyembed/"));
    }
}
