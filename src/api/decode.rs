//! Buffered and raw response decoding

use std::io::Read;

use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::transport::Response;
use crate::Result;

const CHUNK_SIZE: usize = 8 * 1024;

/// Turn a non-2xx response into an [`ApiError`]
///
/// `101 Switching Protocols` counts as success for hijacked connections.
pub fn check_status(response: Response) -> Result<Response> {
    let status = response.status;
    if status.is_success() || status == StatusCode::SWITCHING_PROTOCOLS {
        return Ok(response);
    }
    let body = match response.bytes() {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(status = status.as_u16(), error = %e, "failed to read error body");
            Vec::new()
        }
    };
    let err = ApiError::from_body(status, &body);
    tracing::debug!(status = status.as_u16(), error = %err, "daemon returned error");
    Err(err.into())
}

/// Read the whole body and parse it as JSON; an empty body decodes as `null`
pub fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes()?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Drain and discard the body
pub fn no_content(response: Response) -> Result<()> {
    let mut body = response.body;
    std::io::copy(&mut body, &mut std::io::sink())?;
    Ok(())
}

/// Single-pass byte chunk iterator over a response body
///
/// Dropping or [`RawStream::close`]-ing releases the connection.
pub struct RawStream {
    reader: Option<Box<dyn Read + Send>>,
    chunk_size: usize,
}

impl RawStream {
    pub fn new(response: Response) -> Self {
        Self::from_reader(response.body)
    }

    pub fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader: Some(reader),
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Read everything that is left
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut reader) = self.reader.take() {
            reader.read_to_end(&mut buf)?;
        }
        Ok(buf)
    }

    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            tracing::trace!("raw stream closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl Iterator for RawStream {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut buf = vec![0u8; self.chunk_size];
        match reader.read(&mut buf) {
            Ok(0) => {
                self.reader = None;
                None
            }
            Ok(n) => {
                buf.truncate(n);
                Some(Ok(buf))
            }
            Err(e) => {
                self.reader = None;
                Some(Err(e.into()))
            }
        }
    }
}

impl Read for RawStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf),
            None => Ok(0),
        }
    }
}
