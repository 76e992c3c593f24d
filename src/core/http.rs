use std::{
    future::Future,
    time::Duration,
};

use reqwest::{
    header::USER_AGENT,
    Client,
    Response,
};
use tracing::warn;

use crate::core::KosakataError;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

pub fn http_client(timeout: Duration) -> Result<Client, KosakataError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| KosakataError::Custom(format!("HTTP client build failed: {e}")))
}

/// GETs `url` and returns the body as text, failing on any non-2xx status.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, KosakataError> {
    let resp = client.get(url).header(USER_AGENT, "kosakata/0.1 (+reqwest)").send().await?;
    ensure_success(&resp)?;
    Ok(resp.text().await?)
}

pub fn ensure_success(resp: &Response) -> Result<(), KosakataError> {
    if !resp.status().is_success() {
        return Err(KosakataError::Custom(format!(
            "HTTP error {} from {}",
            resp.status(),
            resp.url()
        )));
    }
    Ok(())
}

/// Bounded retry with a linear delay (`delay * attempt`) between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, delay: Duration::from_secs(2) }
    }
}

#[derive(Debug)]
pub struct Exhausted {
    pub attempts: usize,
    pub last_error: KosakataError,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, Exhausted>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, KosakataError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempts: usize = 0;
        loop {
            attempts += 1;
            match op(attempts).await {
                Ok(value) => return Ok(value),
                Err(e) if attempts < max_attempts => {
                    warn!(%label, attempt = attempts, max_attempts, error = %e, "attempt failed, retrying");
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay * attempts as u32).await;
                    }
                }
                Err(e) => return Err(Exhausted { attempts, last_error: e }),
            }
        }
    }
}
