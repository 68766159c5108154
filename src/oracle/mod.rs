// Padding oracles: anything that takes a candidate `IV ‖ C` and says whether
// its padding decrypted cleanly.
mod command;
mod http;

pub use command::CommandOracle;
pub use http::HttpOracle;

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{decrypt, Key, OracleError, SchemeError};

pub const SUCCESS_STATUS: &str = "SUCCESS";
pub const BAD_PADDING_STATUS: &str = "INVALID PADDING";
pub const BAD_MAC_STATUS: &str = "INVALID MAC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    BadPadding,
    BadMac,
}

impl Verdict {
    /// Reads a verdict from free-form oracle output. Only a padding failure
    /// has to be recognised; anything unrecognised counts as success.
    pub fn from_output(output: &str) -> Self {
        if output.contains(BAD_PADDING_STATUS) {
            Verdict::BadPadding
        } else if output.contains(BAD_MAC_STATUS) {
            Verdict::BadMac
        } else {
            Verdict::Success
        }
    }

    pub fn padding_accepted(self) -> bool {
        self != Verdict::BadPadding
    }
}

impl TryFrom<Result<Vec<u8>, SchemeError>> for Verdict {
    type Error = OracleError;

    fn try_from(decryption: Result<Vec<u8>, SchemeError>) -> Result<Self, Self::Error> {
        match decryption {
            Ok(_) => Ok(Verdict::Success),
            Err(SchemeError::BadPadding) => Ok(Verdict::BadPadding),
            Err(SchemeError::BadMac) => Ok(Verdict::BadMac),
            Err(SchemeError::Length(e)) => Err(OracleError::Rejected(e.to_string())),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => f.write_str(SUCCESS_STATUS),
            Verdict::BadPadding => f.write_str(BAD_PADDING_STATUS),
            Verdict::BadMac => f.write_str(BAD_MAC_STATUS),
        }
    }
}

#[async_trait]
pub trait PaddingOracle: Send + Sync {
    async fn query(&self, candidate: &[u8]) -> Result<Verdict, OracleError>;
}

#[async_trait]
impl<O: PaddingOracle + ?Sized> PaddingOracle for Arc<O> {
    async fn query(&self, candidate: &[u8]) -> Result<Verdict, OracleError> {
        self.as_ref().query(candidate).await
    }
}

/// Runs the scheme's own decryption in process.
#[derive(Debug)]
pub struct LocalOracle {
    key: Key,
    queries: AtomicU64,
}

impl LocalOracle {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            queries: AtomicU64::new(0),
        }
    }

    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PaddingOracle for LocalOracle {
    async fn query(&self, candidate: &[u8]) -> Result<Verdict, OracleError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        Verdict::try_from(decrypt(candidate, &self.key))
    }
}

/// Lets one query through at a time, for oracles that cannot take
/// concurrent requests.
#[derive(Debug)]
pub struct Serialized<O> {
    inner: O,
    gate: Mutex<()>,
}

impl<O> Serialized<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

#[async_trait]
impl<O: PaddingOracle> PaddingOracle for Serialized<O> {
    async fn query(&self, candidate: &[u8]) -> Result<Verdict, OracleError> {
        let _guard = self.gate.lock().await;
        self.inner.query(candidate).await
    }
}
