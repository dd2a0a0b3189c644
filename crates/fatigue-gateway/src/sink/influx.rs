//! InfluxDB v2 write buffer.
//!
//! Points are encoded to line protocol on the caller's task and pushed onto a
//! bounded queue with `try_send`. A single background task drains the queue into
//! a [`BatchBuffer`] and POSTs batches to `/api/v2/write`.
//!
//! Delivery policy:
//! - network errors, 429 and 5xx are retried with exponential backoff
//!   (a `Retry-After` header, when present, replaces the computed delay)
//! - any other non-2xx status drops the batch immediately
//! - a batch that exhausts its retries is dropped and logged

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use fatigue_core::error::{FatigueError, Result};
use fatigue_core::Point;

use crate::config::{InfluxSection, WriteSection};
use crate::sink::buffer::BatchBuffer;
use crate::sink::PointWriter;

enum Command {
    Line(String),
    Flush(oneshot::Sender<Result<()>>),
    Close(oneshot::Sender<Result<()>>),
}

/// Shared write-buffer handle. Cheap to call from many request tasks at once.
pub struct InfluxWriter {
    tx: mpsc::Sender<Command>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InfluxWriter {
    /// Build the HTTP client and start the background flusher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(influx: &InfluxSection, write: &WriteSection) -> Result<Self> {
        let delivery = Delivery::new(influx, write)?;
        let (tx, rx) = mpsc::channel(write.queue_capacity.max(1));
        let flusher = Flusher {
            rx,
            buffer: BatchBuffer::new(write.batch_size, write.flush_interval()),
            tick: write.flush_interval(),
            delivery,
        };
        let task = tokio::spawn(flusher.run());

        tracing::info!(
            bucket = %influx.bucket,
            org = %influx.org,
            batch_size = write.batch_size,
            flush_interval_ms = write.flush_interval_ms,
            "write buffer started"
        );

        Ok(Self {
            tx,
            task: Mutex::new(Some(task)),
        })
    }

    async fn request(&self, make: fn(oneshot::Sender<Result<()>>) -> Command) -> Option<Result<()>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(make(reply_tx)).await.ok()?;
        reply_rx.await.ok()
    }
}

#[async_trait]
impl PointWriter for InfluxWriter {
    fn write(&self, point: &Point) -> Result<()> {
        let line = point.to_line_protocol()?;
        self.tx.try_send(Command::Line(line)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                FatigueError::StorageWrite("write buffer queue is full".into())
            }
            mpsc::error::TrySendError::Closed(_) => {
                FatigueError::StorageWrite("write buffer is closed".into())
            }
        })
    }

    async fn flush(&self) -> Result<()> {
        self.request(Command::Flush)
            .await
            .unwrap_or_else(|| Err(FatigueError::StorageWrite("write buffer is closed".into())))
    }

    async fn close(&self) -> Result<()> {
        // Already closed: nothing left to deliver.
        let res = self.request(Command::Close).await.unwrap_or(Ok(()));

        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "write buffer task ended abnormally");
            }
        }
        res
    }
}

struct Flusher {
    rx: mpsc::Receiver<Command>,
    buffer: BatchBuffer,
    tick: Duration,
    delivery: Delivery,
}

impl Flusher {
    async fn run(mut self) {
        let mut tick = tokio::time::interval(self.tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Line(line)) => {
                        if let Some(batch) = self.buffer.push(line) {
                            let _ = self.delivery.deliver(batch).await;
                        }
                    }
                    Some(Command::Flush(reply)) => {
                        let res = self.drain().await;
                        let _ = reply.send(res);
                    }
                    Some(Command::Close(reply)) => {
                        let res = self.drain().await;
                        let _ = reply.send(res);
                        break;
                    }
                    None => {
                        let _ = self.drain().await;
                        break;
                    }
                },
                _ = tick.tick() => {
                    if self.buffer.is_due() {
                        let batch = self.buffer.take();
                        let _ = self.delivery.deliver(batch).await;
                    }
                }
            }
        }

        self.rx.close();
        tracing::info!("write buffer stopped");
    }

    async fn drain(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = self.buffer.take();
        self.delivery.deliver(batch).await
    }
}

enum AttemptError {
    Retryable {
        reason: String,
        retry_after: Option<Duration>,
    },
    Rejected(String),
}

struct Delivery {
    client: reqwest::Client,
    write_url: Url,
    auth: String,
    max_retries: u32,
    retry_interval: Duration,
    max_retry_delay: Duration,
}

impl Delivery {
    fn new(influx: &InfluxSection, write: &WriteSection) -> Result<Self> {
        let write_url = Url::parse_with_params(
            &format!("{}/api/v2/write", influx.url),
            &[
                ("org", influx.org.as_str()),
                ("bucket", influx.bucket.as_str()),
                ("precision", "ns"),
            ],
        )
        .map_err(|e| FatigueError::Configuration(format!("invalid INFLUX_URL: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(write.request_timeout())
            .build()
            .map_err(|e| FatigueError::Configuration(format!("http client init failed: {e}")))?;

        Ok(Self {
            client,
            write_url,
            auth: format!("Token {}", influx.token),
            max_retries: write.max_retries,
            retry_interval: write.retry_interval(),
            max_retry_delay: write.max_retry_delay(),
        })
    }

    async fn deliver(&self, lines: Vec<String>) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let count = lines.len();
        let body = lines.join("\n");
        let mut delay = self.retry_interval;
        let mut attempt = 0;

        loop {
            match self.post(&body).await {
                Ok(()) => {
                    tracing::debug!(lines = count, attempt, "batch delivered");
                    return Ok(());
                }
                Err(AttemptError::Retryable { reason, retry_after }) if attempt < self.max_retries => {
                    let wait = retry_after.unwrap_or(delay).min(self.max_retry_delay);
                    tracing::warn!(lines = count, attempt, wait_ms = wait.as_millis() as u64, %reason, "batch delivery failed, retrying");
                    tokio::time::sleep(wait).await;
                    delay = (delay * 2).min(self.max_retry_delay);
                    attempt += 1;
                }
                Err(AttemptError::Retryable { reason, .. }) | Err(AttemptError::Rejected(reason)) => {
                    tracing::error!(lines = count, attempt, %reason, "dropping batch");
                    return Err(FatigueError::StorageWrite(reason));
                }
            }
        }
    }

    async fn post(&self, body: &str) -> std::result::Result<(), AttemptError> {
        let resp = self
            .client
            .post(self.write_url.clone())
            .header(AUTHORIZATION, &self.auth)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body.to_owned())
            .send()
            .await
            .map_err(|e| AttemptError::Retryable {
                reason: e.to_string(),
                retry_after: None,
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let text = resp.text().await.unwrap_or_default();
        let reason = format!("backend returned {status}: {}", text.trim());

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(AttemptError::Retryable { reason, retry_after })
        } else {
            Err(AttemptError::Rejected(reason))
        }
    }
}
