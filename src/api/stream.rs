//! Newline-delimited JSON event streams (pull, push, build, stats, events)

use std::io::Read;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::de::IoRead;
use serde_json::{Map, StreamDeserializer, Value};

use crate::transport::Response;
use crate::{Error, Result};

type Inner<T> = StreamDeserializer<'static, IoRead<Box<dyn Read + Send>>, T>;

/// Lazy, single-pass sequence of JSON values read off a response body
///
/// Values may span transport chunks. A value cut off by end-of-stream is a
/// [`Error::StreamParse`].
pub struct JsonStream<T> {
    inner: Option<Inner<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonStream<T> {
    pub fn new(response: Response) -> Self {
        Self::from_reader(response.body)
    }

    pub fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        Self {
            inner: Some(serde_json::Deserializer::from_reader(reader).into_iter::<T>()),
            _marker: PhantomData,
        }
    }

    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!("json stream closed");
        }
    }
}

impl<T: DeserializeOwned> Iterator for JsonStream<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        match inner.next() {
            Some(Ok(value)) => Some(Ok(value)),
            Some(Err(e)) => {
                self.inner = None;
                if e.is_io() {
                    Some(Err(Error::Io(e.into())))
                } else {
                    Some(Err(Error::StreamParse(e.to_string())))
                }
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// One event from a pull, push, or build stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(rename = "progressDetail", default, skip_serializing_if = "Option::is_none")]
    pub progress_detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "errorDetail", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux: Option<Value>,
    /// Keys this client does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressEvent {
    /// Error text carried by this event, if any
    pub fn error_message(&self) -> Option<String> {
        self.error.clone().or_else(|| {
            self.error_detail
                .as_ref()
                .map(|d| d.message.clone())
                .filter(|m| !m.is_empty())
        })
    }

    /// Best human-readable text for the event
    pub fn text(&self) -> String {
        self.error_message()
            .or_else(|| self.stream.clone())
            .or_else(|| self.status.clone())
            .unwrap_or_else(|| serde_json::to_string(self).unwrap_or_default())
    }
}

/// Progress events where an `error` event ends the stream with an `Err`
///
/// Events before the error have already been yielded; the failure still
/// surfaces as [`Error::Progress`].
pub struct ProgressStream {
    events: JsonStream<ProgressEvent>,
    failed: bool,
}

impl ProgressStream {
    pub fn new(response: Response) -> Self {
        Self::from_reader(response.body)
    }

    pub fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        Self {
            events: JsonStream::from_reader(reader),
            failed: false,
        }
    }

    /// Consume the stream, keeping every event
    pub fn finish(self) -> Result<Vec<ProgressEvent>> {
        self.collect()
    }

    pub fn close(&mut self) {
        self.events.close();
    }
}

impl Iterator for ProgressStream {
    type Item = Result<ProgressEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.events.next()? {
            Ok(event) => match event.error_message() {
                Some(message) => {
                    self.failed = true;
                    self.events.close();
                    tracing::debug!(error = %message, "progress stream reported failure");
                    Some(Err(Error::Progress(message)))
                }
                None => Some(Ok(event)),
            },
            Err(e) => Some(Err(e)),
        }
    }
}

const BUILD_SUCCESS_PREFIX: &str = "Successfully built ";

/// Consume build output and return the image id
///
/// Success is a `stream` event reading `Successfully built <hex>`; newer
/// daemons also report the id in an `aux` event. An `error` event, or an
/// exhausted stream without a success marker, is an [`Error::Build`].
pub fn build_image_id<I>(events: I) -> Result<String>
where
    I: IntoIterator<Item = Result<ProgressEvent>>,
{
    let mut image_id = None;
    let mut last = None;
    for event in events {
        let event = match event {
            Ok(event) => event,
            Err(Error::Progress(message)) => return Err(Error::Build(message)),
            Err(e) => return Err(e),
        };
        if let Some(message) = event.error_message() {
            return Err(Error::Build(message));
        }
        if let Some(id) = event
            .stream
            .as_deref()
            .and_then(|s| s.trim().strip_prefix(BUILD_SUCCESS_PREFIX))
            .and_then(|rest| rest.split_whitespace().next())
            .filter(|id| id.chars().all(|c| c.is_ascii_hexdigit()))
        {
            image_id = Some(id.to_string());
        } else if let Some(id) = event
            .aux
            .as_ref()
            .and_then(|aux| aux.get("ID"))
            .and_then(Value::as_str)
        {
            image_id.get_or_insert_with(|| id.to_string());
        }
        last = Some(event);
    }

    image_id.ok_or_else(|| {
        Error::Build(
            last.map(|e| e.text().trim().to_string())
                .unwrap_or_else(|| "build produced no output".to_string()),
        )
    })
}
