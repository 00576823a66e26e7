//! Debounced persistence
//!
//! A [`Debouncer`] holds the latest value pushed to it and hands that value to
//! a [`FlushSink`] once no newer value has arrived for the quiet window.
//! Flushes are fire-and-forget: each runs as its own task, a failure is
//! logged and dropped, and a push made while a flush is in flight simply
//! starts a new window. Dropping the debouncer flushes any pending value
//! immediately.
//!
//! A debouncer must be created inside a tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::editor::SaveQueue;
use crate::serializer::PersistedDocument;
use crate::services::backend::{PageUpdate, PersistenceBackend};
use crate::services::ServiceError;

/// Destination of debounced values
#[async_trait]
pub trait FlushSink<T: Send + 'static>: Send + Sync {
    async fn flush(&self, value: T) -> Result<(), ServiceError>;
}

/// Coalesces bursts of values into one flush of the latest
pub struct Debouncer<T: Send + 'static> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn(window: Duration, sink: Arc<dyn FlushSink<T>>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            // Sender dropped: flush what is pending now
                            None => break,
                        },
                        _ = tokio::time::sleep(window) => break,
                    }
                }

                let sink = sink.clone();
                tokio::spawn(async move {
                    if let Err(e) = sink.flush(latest).await {
                        if e.is_stale_write() {
                            tracing::warn!("Discarded out-of-order save: {}", e);
                        } else {
                            tracing::warn!("Debounced save failed: {}", e);
                        }
                    }
                });
            }
            tracing::debug!("Debouncer stopped");
        });

        Self { tx }
    }

    /// Replace the pending value and restart the quiet window
    pub fn push(&self, value: T) {
        if self.tx.send(value).is_err() {
            tracing::warn!("Debouncer has shut down, value dropped");
        }
    }
}

/// Content save scheduled by an editor session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub revision: u64,
    pub document: PersistedDocument,
}

/// Writes page content
pub struct PageContentSink {
    backend: Arc<dyn PersistenceBackend>,
    page: String,
}

impl PageContentSink {
    pub fn new(backend: Arc<dyn PersistenceBackend>, page: impl Into<String>) -> Self {
        Self {
            backend,
            page: page.into(),
        }
    }
}

#[async_trait]
impl FlushSink<PendingSave> for PageContentSink {
    async fn flush(&self, save: PendingSave) -> Result<(), ServiceError> {
        tracing::debug!("Flushing page {} revision {}", self.page, save.revision);
        self.backend
            .update_page(&self.page, PageUpdate::content(save.document, save.revision))
            .await?;
        Ok(())
    }
}

/// Writes page titles
pub struct PageTitleSink {
    backend: Arc<dyn PersistenceBackend>,
    page: String,
}

impl PageTitleSink {
    pub fn new(backend: Arc<dyn PersistenceBackend>, page: impl Into<String>) -> Self {
        Self {
            backend,
            page: page.into(),
        }
    }
}

#[async_trait]
impl FlushSink<String> for PageTitleSink {
    async fn flush(&self, title: String) -> Result<(), ServiceError> {
        tracing::debug!("Renaming page {} to '{}'", self.page, title);
        self.backend.update_page(&self.page, PageUpdate::title(title)).await?;
        Ok(())
    }
}

/// [`SaveQueue`] that debounces editor saves into a sink
pub struct DocumentSaver {
    debouncer: Debouncer<PendingSave>,
}

impl DocumentSaver {
    pub fn new(window: Duration, sink: Arc<dyn FlushSink<PendingSave>>) -> Self {
        Self {
            debouncer: Debouncer::spawn(window, sink),
        }
    }
}

impl SaveQueue for DocumentSaver {
    fn enqueue(&self, revision: u64, document: PersistedDocument) {
        self.debouncer.push(PendingSave { revision, document });
    }
}
