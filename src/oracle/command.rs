use std::{
    io::{self, Write},
    path::PathBuf,
};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::{PaddingOracle, Verdict};
use crate::{Encoding, OracleError};

/// Talks to an oracle program through probe files: each query writes the
/// candidate to a fresh temporary file and runs `<program> <args..> -i <file>`.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: PathBuf,
    args: Vec<String>,
    encoding: Encoding,
}

impl CommandOracle {
    pub fn new(program: impl Into<PathBuf>, encoding: Encoding) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            encoding,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

fn write_probe_file(encoded: &str) -> io::Result<NamedTempFile> {
    let mut probe = tempfile::Builder::new()
        .prefix("probe-")
        .suffix(".txt")
        .tempfile()?;
    probe.write_all(encoded.as_bytes())?;
    probe.flush()?;
    Ok(probe)
}

#[async_trait]
impl PaddingOracle for CommandOracle {
    async fn query(&self, candidate: &[u8]) -> Result<Verdict, OracleError> {
        let encoded = self.encoding.encode(candidate);
        let probe = tokio::task::spawn_blocking(move || write_probe_file(&encoded))
            .await
            .map_err(|e| OracleError::Unavailable(format!("probe file task failed: {e}")))??;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("-i")
            .arg(probe.path())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                OracleError::Unavailable(format!(
                    "could not run {}: {e}",
                    self.program.display()
                ))
            })?;
        if !output.status.success() {
            return Err(OracleError::Unavailable(format!(
                "{} exited with {}",
                self.program.display(),
                output.status
            )));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(Verdict::from_output(&text))
    }
}
