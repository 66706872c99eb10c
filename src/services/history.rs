use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::database::models::{DashboardRevision, SaveDashboardRequest};
use crate::database::HistoryRepository;

/// Hands saved dashboards to the history recorder without blocking the caller.
/// A full queue drops the newest revision.
#[derive(Clone)]
pub struct HistoryPublisher {
    tx: mpsc::Sender<SaveDashboardRequest>,
}

impl HistoryPublisher {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SaveDashboardRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Returns whether the request was queued
    pub fn publish(&self, req: SaveDashboardRequest) -> bool {
        match self.tx.try_send(req) {
            Ok(()) => true,
            Err(TrySendError::Full(req)) => {
                warn!(dashboard_id = %req.dashboard.id, "history queue full, dropping revision");
                false
            }
            Err(TrySendError::Closed(req)) => {
                warn!(dashboard_id = %req.dashboard.id, "history recorder stopped, dropping revision");
                false
            }
        }
    }
}

/// Drains the history queue into the revision store
pub struct HistoryRecorder {
    rx: mpsc::Receiver<SaveDashboardRequest>,
    store: Arc<dyn HistoryRepository>,
}

impl HistoryRecorder {
    pub fn new(rx: mpsc::Receiver<SaveDashboardRequest>, store: Arc<dyn HistoryRepository>) -> Self {
        Self { rx, store }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every publisher has been dropped
    pub async fn run(mut self) {
        while let Some(req) = self.rx.recv().await {
            self.record(req).await;
        }
        info!("history recorder stopped");
    }

    async fn record(&self, req: SaveDashboardRequest) {
        let Some(revision) = DashboardRevision::from_request(req) else {
            warn!("skipping history entry for unsaved dashboard");
            return;
        };

        if let Err(e) = self.store.record(&revision).await {
            error!(dashboard_id = %revision.dashboard_id, error = %e, "record dashboard history error");
        }
    }
}
