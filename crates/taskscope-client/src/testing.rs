//! Helpers for tests: an in-process fake service and a counting delay.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use crate::{ClientConfig, Delay, TaskClient};

/// Delay that records calls instead of sleeping.
#[derive(Default)]
pub(crate) struct CountingDelay {
    calls: AtomicUsize,
    durations: Mutex<Vec<Duration>>,
}

impl CountingDelay {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn durations(&self) -> Vec<Duration> {
        self.durations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for CountingDelay {
    async fn sleep(&self, duration: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.durations.lock().unwrap().push(duration);
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Client pointed at `root_url` with a counting delay.
pub(crate) fn test_client(root_url: &str) -> (TaskClient, Arc<CountingDelay>) {
    let delay = Arc::new(CountingDelay::default());
    let config = ClientConfig::default()
        .with_root_url(root_url)
        .with_retry_delay(Duration::from_millis(1));
    let client = TaskClient::new(config).unwrap().with_delay(delay.clone());
    (client, delay)
}

/// A small valid zip archive with a single entry.
pub(crate) fn zip_bytes() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("grcov.info", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"SF:dom/base/nsDocument.cpp\nend_of_record\n").unwrap();
    writer.finish().unwrap().into_inner()
}
