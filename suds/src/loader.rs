//! Fetches the raw WSDL text from a local path or an http(s) URL.

use std::{
    fs, io,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use reqwest::{blocking::Client, header::ACCEPT};
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!("suds/", env!("CARGO_PKG_VERSION"));
const ACCEPTED_TYPES: &str = "text/xml, application/xml, */*";
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("Unable to convert provided path {}", .path.display())]
    PathConversionError {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    #[error("Unable to read {}", .path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to get document from server")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Giving up on {url} after {attempts} attempts: {message}")]
    RetriesExhausted {
        url: Url,
        attempts: u32,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Remote(Url),
}

impl Source {
    pub fn classify<S: AsRef<str>>(input: S) -> Result<Self, FetchError> {
        let input = input.as_ref();

        match Url::parse(input) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::File)
                    .map_err(|()| FetchError::PathConversionError {
                        path: PathBuf::from(input),
                        source: None,
                    }),
                // A Windows drive letter, not a scheme.
                scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(input))),
                scheme => Err(FetchError::UnsupportedScheme(scheme.to_owned())),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Self::File(PathBuf::from(input))),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loader {
    attempts: u32,
    timeout: Duration,
}

impl Loader {
    /// `attempts` counts the first try; zero is treated as one.
    pub fn new(attempts: u32, timeout: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            timeout,
        }
    }

    pub fn load<S: AsRef<str>>(&self, input: S) -> Result<String, FetchError> {
        match Source::classify(input)? {
            Source::File(path) => read_file(&path),
            Source::Remote(url) => self.download(&url),
        }
    }

    fn download(&self, url: &Url) -> Result<String, FetchError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let mut last_error = None;

        for attempt in 0..self.attempts {
            if attempt > 0 {
                tracing::debug!(attempt, "Retrying after {:?}", RETRY_DELAY);
                thread::sleep(RETRY_DELAY);
            }

            tracing::info!("Fetching {}", url);

            match client
                .get(url.clone())
                .header(ACCEPT, ACCEPTED_TYPES)
                .send()
            {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            status = %status,
                            attempt = attempt + 1,
                            max_attempts = self.attempts,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {}", status));
                        continue;
                    }

                    // Client errors will not improve on retry.
                    return Ok(response.error_for_status()?.text()?);
                }

                Err(err) if err.is_connect() || err.is_timeout() => {
                    tracing::warn!(
                        error = %err,
                        attempt = attempt + 1,
                        max_attempts = self.attempts,
                        "Connection error, will retry"
                    );
                    last_error = Some(err.to_string());
                }

                Err(err) => return Err(err.into()),
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.clone(),
            attempts: self.attempts,
            message: last_error.unwrap_or_else(|| "Unknown error".to_owned()),
        })
    }
}

fn read_file(path: &Path) -> Result<String, FetchError> {
    let path = path
        .canonicalize()
        .map_err(|err| FetchError::PathConversionError {
            path: path.to_owned(),
            source: Some(err),
        })?;

    tracing::info!("Reading {}", path.display());

    fs::read_to_string(&path).map_err(|source| FetchError::FileReadError { path, source })
}
