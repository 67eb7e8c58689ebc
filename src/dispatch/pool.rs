// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::dispatch::{Dispatcher, WorkItem};
use crate::errors::TransportError;

/// Fixed set of workers handling work items one at a time each.
///
/// Workers share one bounded channel, so [`WorkerPool::submit`] waits once
/// `queue_depth` items are pending. The transport reader never runs a work item
/// itself.
pub struct WorkerPool {
    sender: mpsc::Sender<WorkItem>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(dispatcher: Arc<Dispatcher>, workers: usize, queue_depth: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..workers.max(1))
            .map(|id| {
                let receiver = receiver.clone();
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    loop {
                        // Hold the receiver only while waiting, never while handling.
                        let next = { receiver.lock().await.recv().await };
                        match next {
                            Some(item) => dispatcher.handle(item).await,
                            None => break,
                        }
                    }
                    tracing::debug!(worker = id, "Worker stopped");
                })
            })
            .collect();

        Self { sender, workers }
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Queue an item, waiting for room when the queue is full.
    pub async fn submit(&self, item: WorkItem) -> Result<(), TransportError> {
        self.sender
            .send(item)
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Stop accepting items, let the workers drain the queue and wait for them.
    pub async fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }
    }
}
