use anyhow::{bail, Context, Result};
use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Frame header that starts every zstd stream
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Request method. It only changes what is sent, never how the reply is processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(anyhow::anyhow!("unsupported method: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Bytes,
}

/// Sends a body-less request and hands back the raw reply
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn send(&self, method: Method, url: &str) -> Result<HttpReply>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, method: Method, url: &str) -> Result<HttpReply> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        let response = request
            .send()
            .with_context(|| format!("{} {} failed", method, url))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(HttpReply { status, body })
    }
}

/// Where a target string points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
    Stdin,
}

/// Fetches XML text for a user-supplied target
pub struct Fetcher<T> {
    transport: T,
    base_url: Option<Url>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, base_url: Option<Url>) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    pub fn resolve(&self, target: &str) -> Result<Source> {
        if target == "-" {
            return Ok(Source::Stdin);
        }

        if let Ok(url) = Url::parse(target) {
            match url.scheme() {
                "http" | "https" => return Ok(Source::Remote(url)),
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| anyhow::anyhow!("Invalid file URL: {}", target))?;
                    return Ok(Source::Local(path));
                }
                _ => {}
            }
        }

        // Relative targets resolve against the base URL when there is one
        match &self.base_url {
            Some(base) => {
                let url = base
                    .join(target)
                    .with_context(|| format!("Cannot resolve {} against {}", target, base))?;
                Ok(Source::Remote(url))
            }
            None => Ok(Source::Local(PathBuf::from(target))),
        }
    }

    /// Fetch `target`, mapping every failure to an empty string.
    ///
    /// An empty string never parses, so failed fetches are classified as
    /// invalid documents downstream.
    pub fn fetch(&self, method: Method, target: &str) -> String {
        match self.try_fetch(method, target) {
            Ok(text) => text,
            Err(err) => {
                warn!(location = target, error = %format!("{:#}", err), "fetch failed, using empty response");
                String::new()
            }
        }
    }

    pub fn try_fetch(&self, method: Method, target: &str) -> Result<String> {
        let body = match self.resolve(target)? {
            Source::Remote(url) => {
                info!(%method, %url, "sending request");
                let reply = self.transport.send(method, url.as_str())?;
                if reply.status != 200 {
                    bail!("{} {} returned status {}", method, url, reply.status);
                }
                reply.body.to_vec()
            }
            Source::Local(path) => {
                debug!(path = %path.display(), "reading local file");
                std::fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?
            }
            Source::Stdin => {
                let mut buffer = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buffer)
                    .context("Failed to read standard input")?;
                buffer
            }
        };

        decode_body(body)
    }
}

/// Turn a raw body into text, decompressing zstd frames first
pub fn decode_body(body: Vec<u8>) -> Result<String> {
    let body = if body.starts_with(&ZSTD_MAGIC) {
        debug!(compressed = body.len(), "decompressing zstd body");
        zstd::decode_all(body.as_slice()).context("Failed to decompress zstd body")?
    } else {
        body
    };

    match String::from_utf8(body) {
        Ok(text) => Ok(text),
        Err(err) => {
            warn!("body is not valid UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}
