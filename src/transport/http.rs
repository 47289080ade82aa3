//! Built-in HTTP/1.1 transport over Unix sockets, TCP, or named pipes
//!
//! hyper drives each request on a private tokio runtime; callers see a
//! blocking API. One connection is opened per request so that a streaming
//! body owns its socket outright and releases it when dropped.

use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1::SendRequest;
use hyper::upgrade::Upgraded;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::runtime::Runtime;

use super::{Deadline, Request, Response, Transport};
use crate::config::{ClientConfig, Host};
use crate::{Error, Result};

pub struct HttpTransport {
    host: Host,
    runtime: Arc<Runtime>,
    timeout: Duration,
    user_agent: String,
}

impl HttpTransport {
    /// Build a transport for the configured host
    ///
    /// `https` hosts are rejected: certificate loading is left to callers,
    /// who can plug their own [`Transport`] into the client instead.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if let Host::Tcp { tls: true, .. } = config.host {
            return Err(Error::Connection(format!(
                "TLS connections to {} require a custom transport",
                config.host
            )));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("docker-client-io")
            .enable_all()
            .build()?;

        tracing::debug!(host = %config.host, "HTTP transport initialized");

        Ok(Self {
            host: config.host.clone(),
            runtime: Arc::new(runtime),
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
        })
    }

    fn authority(&self) -> String {
        self.host.authority()
    }

    async fn connect(&self) -> Result<SendRequest<Full<Bytes>>> {
        match &self.host {
            #[cfg(unix)]
            Host::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path).await.map_err(|e| {
                    Error::Connection(format!("failed to connect to {}: {}", path.display(), e))
                })?;
                handshake(stream).await
            }
            #[cfg(not(unix))]
            Host::Unix(path) => Err(Error::Connection(format!(
                "unix sockets are not supported on this platform: {}",
                path.display()
            ))),
            Host::Tcp { host, port, .. } => {
                let stream = tokio::net::TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(|e| {
                        Error::Connection(format!("failed to connect to {}:{}: {}", host, port, e))
                    })?;
                handshake(stream).await
            }
            #[cfg(windows)]
            Host::NamedPipe(name) => {
                let pipe = tokio::net::windows::named_pipe::ClientOptions::new()
                    .open(name)
                    .map_err(|e| Error::Connection(format!("failed to open {}: {}", name, e)))?;
                handshake(pipe).await
            }
            #[cfg(not(windows))]
            Host::NamedPipe(name) => Err(Error::Connection(format!(
                "named pipes are not supported on this platform: {}",
                name
            ))),
        }
    }

    async fn execute(&self, request: Request) -> Result<(hyper::Response<Incoming>, bool)> {
        let upgrade = request.is_upgrade();
        let mut builder = hyper::Request::builder()
            .method(request.method)
            .uri(format!("http://{}{}", self.authority(), request.path))
            .header(hyper::header::HOST, self.authority())
            .header(hyper::header::USER_AGENT, self.user_agent.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        let body = match request.body {
            Some(body) => {
                builder = builder.header(hyper::header::CONTENT_TYPE, body.content_type);
                Full::new(Bytes::from(body.data))
            }
            None => Full::new(Bytes::new()),
        };
        let http_request = builder.body(body)?;

        let mut sender = self.connect().await?;
        let response = sender
            .send_request(http_request)
            .await
            .map_err(|e| Error::Connection(format!("request failed: {}", e)))?;
        Ok((response, upgrade))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> Result<Response> {
        let timeout = match request.timeout {
            Deadline::Default => Some(self.timeout),
            Deadline::After(t) => Some(t),
            Deadline::Never => None,
        };
        let stream = request.stream;
        let method = request.method.clone();
        let path = request.path.clone();

        let (mut response, upgrade) = self
            .runtime
            .block_on(within(timeout, self.execute(request)))
            .map_err(|_| {
                Error::Connection(format!("{} {} timed out after {:?}", method, path, timeout.unwrap_or_default()))
            })??;

        let status = response.status();
        let headers = response.headers().clone();
        tracing::debug!(%method, %path, status = status.as_u16(), "daemon responded");

        let source = if upgrade && status == hyper::StatusCode::SWITCHING_PROTOCOLS {
            let upgraded = self
                .runtime
                .block_on(hyper::upgrade::on(&mut response))
                .map_err(|e| Error::Connection(format!("connection upgrade failed: {}", e)))?;
            BodySource::Upgraded(TokioIo::new(upgraded))
        } else {
            BodySource::Incoming(Box::new(response.into_body()))
        };

        let reader = BodyReader {
            runtime: Arc::clone(&self.runtime),
            source,
            buffer: Bytes::new(),
            timeout: if stream { None } else { timeout },
            done: false,
        };

        Ok(Response {
            status,
            headers,
            body: Box::new(reader),
        })
    }
}

async fn handshake<T>(io: T) -> Result<SendRequest<Full<Bytes>>>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(io))
        .await
        .map_err(|e| Error::Connection(format!("HTTP handshake failed: {}", e)))?;

    tokio::spawn(async move {
        if let Err(e) = conn.with_upgrades().await {
            tracing::debug!(error = %e, "daemon connection closed");
        }
    });

    Ok(sender)
}

enum BodySource {
    Incoming(Box<Incoming>),
    Upgraded(TokioIo<Upgraded>),
}

/// Blocking `Read` over a hyper body or an upgraded connection
struct BodyReader {
    runtime: Arc<Runtime>,
    source: BodySource,
    buffer: Bytes,
    timeout: Option<Duration>,
    done: bool,
}

async fn within<F: std::future::Future>(timeout: Option<Duration>, fut: F) -> io::Result<F::Output> {
    match timeout {
        Some(t) => tokio::time::timeout(t, fut)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "timed out reading response body")),
        None => Ok(fut.await),
    }
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let BodyReader {
            runtime,
            source,
            buffer,
            timeout,
            done,
        } = self;

        match source {
            BodySource::Upgraded(io) => runtime.block_on(within(*timeout, io.read(buf)))?,
            BodySource::Incoming(body) => {
                while buffer.is_empty() {
                    if *done {
                        return Ok(0);
                    }
                    match runtime.block_on(within(*timeout, body.frame()))? {
                        Some(Ok(frame)) => {
                            if let Ok(data) = frame.into_data() {
                                *buffer = data;
                            }
                        }
                        Some(Err(e)) => return Err(io::Error::new(io::ErrorKind::Other, e)),
                        None => *done = true,
                    }
                }
                let n = buf.len().min(buffer.len());
                buf[..n].copy_from_slice(&buffer.split_to(n));
                Ok(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_is_rejected() {
        let config = ClientConfig::builder()
            .base_url("https://127.0.0.1:2376")
            .unwrap()
            .build();
        assert!(matches!(HttpTransport::new(&config), Err(Error::Connection(_))));
    }

    #[test]
    fn test_authority_for_local_sockets() {
        let config = ClientConfig::builder()
            .base_url("unix:///var/run/docker.sock")
            .unwrap()
            .build();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.authority(), "localhost");

        let config = ClientConfig::builder()
            .base_url("tcp://10.0.0.5:2375")
            .unwrap()
            .build();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.authority(), "10.0.0.5:2375");

        let config = ClientConfig::builder()
            .base_url("tcp://[fe80::1]:2375")
            .unwrap()
            .build();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.authority(), "[fe80::1]:2375");
    }

    #[cfg(unix)]
    fn slow_daemon(delay: Duration, reply: &'static str) -> (tempfile::TempDir, ClientConfig) {
        use std::io::Write;
        use std::os::unix::net::UnixListener;

        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("docker.sock");
        let listener = UnixListener::bind(&socket).unwrap();
        std::thread::spawn(move || {
            if let Ok((mut conn, _)) = listener.accept() {
                let mut head = [0u8; 1024];
                let _ = conn.read(&mut head);
                std::thread::sleep(delay);
                let _ = write!(
                    conn,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                    reply.len(),
                    reply
                );
            }
        });
        let config = ClientConfig::builder()
            .host(Host::Unix(socket))
            .timeout(Duration::from_millis(300))
            .build();
        (dir, config)
    }

    #[cfg(unix)]
    #[test]
    fn test_unbounded_request_outlives_client_timeout() {
        let (_dir, config) = slow_daemon(Duration::from_millis(900), r#"{"StatusCode":0}"#);
        let transport = HttpTransport::new(&config).unwrap();
        let response = transport
            .send(Request::post("/v1.24/containers/abc/wait").no_timeout())
            .unwrap();
        assert_eq!(response.status, hyper::StatusCode::OK);
        assert_eq!(response.bytes().unwrap(), br#"{"StatusCode":0}"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_default_deadline_times_out() {
        let (_dir, config) = slow_daemon(Duration::from_millis(900), "{}");
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport
            .send(Request::post("/v1.24/containers/abc/wait"))
            .unwrap_err();
        assert!(matches!(err, Error::Connection(msg) if msg.contains("timed out")));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_socket_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::builder()
            .host(Host::Unix(dir.path().join("absent.sock")))
            .timeout(Duration::from_secs(2))
            .build();
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport.send(Request::get("/_ping")).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
