//! Test doubles for the traits of this crate.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{future, stream, StreamExt};
use parking_lot::Mutex;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

use crate::{
    ToolError, ToolRunner, Upstream, UpstreamError, UpstreamHeaders, UpstreamResponse,
};

pub struct FakeTool {
    calls: AtomicUsize,
    output: Mutex<Result<String, ToolError>>,
    hang_next: AtomicBool,
}

impl FakeTool {
    pub fn succeeding(output: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output: Mutex::new(Ok(output.to_string())),
            hang_next: AtomicBool::new(false),
        }
    }

    pub fn failing(error: ToolError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output: Mutex::new(Err(error)),
            hang_next: AtomicBool::new(false),
        }
    }

    pub fn set_output(&self, output: Result<String, ToolError>) {
        *self.output.lock() = output;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes the next invocation never finish.
    pub fn hang_next(&self) {
        self.hang_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ToolRunner for FakeTool {
    async fn run(&self, _args: &[String]) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hang_next.swap(false, Ordering::SeqCst) {
            future::pending::<()>().await;
        }

        // Give concurrent callers a chance to pile up behind this invocation.
        tokio::task::yield_now().await;

        self.output.lock().clone()
    }

    async fn probe(&self) -> bool {
        true
    }
}

/// Marks the body of a [FakeUpstream] response as dropped once the stream goes away.
struct BodyGuard {
    dropped: Arc<AtomicBool>,
    read: Arc<AtomicUsize>,
}

impl BodyGuard {
    fn count_read(&self) {
        self.read.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for BodyGuard {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// An upstream that answers every request with the same canned response.
pub struct FakeUpstream {
    pub requests: Mutex<Vec<(String, Option<String>)>>,
    /// Set once the body stream of the last response was dropped
    pub body_dropped: Arc<AtomicBool>,
    /// Chunks pulled out of response bodies so far
    pub chunks_read: Arc<AtomicUsize>,
    status: u16,
    headers: UpstreamHeaders,
    chunks: Vec<&'static str>,
    fail: bool,
}

impl FakeUpstream {
    pub fn new(status: u16, headers: UpstreamHeaders, chunks: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            requests: Default::default(),
            body_dropped: Default::default(),
            chunks_read: Default::default(),
            status,
            headers,
            chunks,
            fail: false,
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            requests: Default::default(),
            body_dropped: Default::default(),
            chunks_read: Default::default(),
            status: 0,
            headers: Default::default(),
            chunks: vec![],
            fail: true,
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn fetch(&self, url: &str, range: Option<&str>) -> Result<UpstreamResponse, UpstreamError> {
        self.requests
            .lock()
            .push((url.to_string(), range.map(str::to_string)));

        if self.fail {
            return Err(UpstreamError("connection refused".to_string()));
        }

        let chunks: Vec<Result<Bytes, UpstreamError>> = self
            .chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();

        self.body_dropped.store(false, Ordering::SeqCst);
        let guard = BodyGuard {
            dropped: self.body_dropped.clone(),
            read: self.chunks_read.clone(),
        };

        let body = stream::iter(chunks).map(move |chunk| {
            guard.count_read();
            chunk
        });

        Ok(UpstreamResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: body.boxed(),
        })
    }
}

/// Serves a single canned raw HTTP response on a local port.
///
/// Returns the base URL of the server and a receiver for the raw request head.
pub async fn serve_once(response: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("binds");
    let address = listener.local_addr().expect("has address");
    let (sender, receiver) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accepts");
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];

        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = socket.read(&mut buf).await.expect("reads");
            if read == 0 {
                break;
            }
            head.extend_from_slice(&buf[..read]);
        }

        socket
            .write_all(response.as_bytes())
            .await
            .expect("writes");
        socket.shutdown().await.ok();

        sender.send(String::from_utf8_lossy(&head).to_string()).ok();
    });

    (format!("http://{}", address), receiver)
}
