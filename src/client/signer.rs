//! Request signing seam
//!
//! The platform rejects API calls that lack its anti-bot signature headers.
//! The signing algorithm lives outside this crate; [`Signer`] is the
//! boundary it is plugged in through.

use crate::{Result, ZhihuError};
use serde::Deserialize;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Signature headers for one request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignatureHeaders {
    #[serde(rename = "x-zst-81")]
    pub x_zst_81: String,

    #[serde(rename = "x-zse-96")]
    pub x_zse_96: String,
}

impl SignatureHeaders {
    /// Header name/value pairs to merge into a request
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [("x-zst-81", &self.x_zst_81), ("x-zse-96", &self.x_zse_96)]
    }
}

/// Produces signature headers for a request
///
/// `path_with_query` is the request path including its serialized query
/// string, exactly as it will be sent; the signature covers both.
///
/// Requests call signers on tokio's blocking pool, so implementations may
/// block.
pub trait Signer: Send + Sync {
    fn sign(&self, path_with_query: &str, cookie_header: &str) -> Result<SignatureHeaders>;
}

impl<F> Signer for F
where
    F: Fn(&str, &str) -> Result<SignatureHeaders> + Send + Sync,
{
    fn sign(&self, path_with_query: &str, cookie_header: &str) -> Result<SignatureHeaders> {
        self(path_with_query, cookie_header)
    }
}

/// Signs by running an external program
///
/// The program receives the path (with query) as its last argument and the
/// cookie header as one line on stdin. It must print a JSON object with
/// `x-zst-81` and `x-zse-96` string fields to stdout.
///
/// The cookie never appears on the command line, where other local users
/// could read it from the process table.
#[derive(Debug, Clone)]
pub struct CommandSigner {
    program: String,
    args: Vec<String>,
}

impl CommandSigner {
    /// Creates a signer from an argv-style command line
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ZhihuError::Sign("signer command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Signer for CommandSigner {
    fn sign(&self, path_with_query: &str, cookie_header: &str) -> Result<SignatureHeaders> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path_with_query)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ZhihuError::Sign(format!("failed to run {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A signer that exits without reading stdin closes the pipe early
            match writeln!(stdin, "{}", cookie_header) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(ZhihuError::Sign(format!(
                        "failed to pass cookie to {}: {}",
                        self.program, e
                    )));
                }
                _ => {}
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ZhihuError::Sign(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(ZhihuError::Sign(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ZhihuError::Sign(format!("unreadable signer output: {}", e)))
    }
}
