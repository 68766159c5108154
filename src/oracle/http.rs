use async_trait::async_trait;
use reqwest::StatusCode;

use super::{PaddingOracle, Verdict, BAD_PADDING_STATUS};
use crate::{Encoding, OracleError};

/// Posts encoded candidates to an oracle service such as the one behind
/// [`crate::router`].
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    url: String,
    encoding: Encoding,
}

impl HttpOracle {
    pub fn new(url: impl Into<String>, encoding: Encoding) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            encoding,
        }
    }
}

#[async_trait]
impl PaddingOracle for HttpOracle {
    async fn query(&self, candidate: &[u8]) -> Result<Verdict, OracleError> {
        let response = self
            .client
            .post(&self.url)
            .body(self.encoding.encode(candidate))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        match status {
            StatusCode::OK | StatusCode::FORBIDDEN => Ok(Verdict::from_output(&body)),
            // A 400 also comes from the framework itself when it cannot read
            // the request, and that carries no status line.
            StatusCode::BAD_REQUEST if body.contains(BAD_PADDING_STATUS) => Ok(Verdict::BadPadding),
            _ => Err(OracleError::Unavailable(format!(
                "oracle answered {status}: {body}"
            ))),
        }
    }
}
