//! Maintenance scheduler for automated table upkeep
//!
//! Provides background tasks for:
//! - Expired session cleanup
//! - Periodic compaction of `contact_messages` and `sessions` (merge small files)
//! - Vacuum (physically remove deleted contact messages)
//!
//! Each task is a message to the actor that owns the table, so maintenance
//! commits are serialized with that actor's own writes.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::auth::AuthHandle;
use crate::contact::ContactHandle;
use crate::error::Result;

/// Outcome of a one-shot maintenance cycle
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub expired_sessions: usize,
    pub files_compacted: usize,
    pub files_vacuumed: usize,
}

/// Background maintenance scheduler
pub struct MaintenanceScheduler {
    auth: AuthHandle,
    contacts: ContactHandle,
    handles: Vec<JoinHandle<()>>,
}

impl MaintenanceScheduler {
    /// Create a new scheduler driving the table-owning actors
    pub fn new(auth: AuthHandle, contacts: ContactHandle) -> Self {
        Self {
            auth,
            contacts,
            handles: Vec::new(),
        }
    }

    /// Start all background maintenance tasks
    ///
    /// - Session cleanup: every 1 hour
    /// - Compaction: every 6 hours
    /// - Vacuum: every 24 hours
    pub fn start(&mut self) {
        self.start_session_cleanup(Duration::from_secs(3600));
        self.start_compaction(Duration::from_secs(6 * 3600));
        self.start_vacuum(Duration::from_secs(24 * 3600));

        info!("Maintenance scheduler started");
    }

    fn spawn_every<F, Fut>(&mut self, interval: Duration, task: F)
    where
        F: Fn(AuthHandle, ContactHandle) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let auth = self.auth.clone();
        let contacts = self.contacts.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                task(auth.clone(), contacts.clone()).await;
            }
        });
        self.handles.push(handle);
    }

    /// Start periodic expired session cleanup
    pub fn start_session_cleanup(&mut self, interval: Duration) {
        self.spawn_every(interval, |auth, _| async move {
            if let Err(e) = auth.purge_expired_sessions().await {
                error!(error = ?e, "Session cleanup failed");
            }
        });
    }

    /// Start periodic compaction of the contact and session tables
    pub fn start_compaction(&mut self, interval: Duration) {
        self.spawn_every(interval, |auth, contacts| async move {
            if let Err(e) = contacts.compact().await {
                error!(table = "contact_messages", error = ?e, "Compaction failed");
            }
            if let Err(e) = auth.compact_sessions().await {
                error!(table = "sessions", error = ?e, "Compaction failed");
            }
        });
    }

    /// Start periodic vacuum of the contact messages table
    pub fn start_vacuum(&mut self, interval: Duration) {
        self.spawn_every(interval, |_, contacts| async move {
            if let Err(e) = contacts.vacuum().await {
                error!(error = ?e, "Vacuum failed");
            }
        });
    }

    /// Run a one-shot maintenance cycle (useful for CLI or tests)
    pub async fn run_once(
        auth: &AuthHandle,
        contacts: &ContactHandle,
    ) -> Result<MaintenanceReport> {
        info!("Running one-shot maintenance cycle");
        let expired_sessions = auth.purge_expired_sessions().await?;
        let files_compacted = contacts.compact().await?.files_removed
            + auth.compact_sessions().await?.files_removed;
        let files_vacuumed = contacts.vacuum().await?.files_deleted;

        let report = MaintenanceReport {
            expired_sessions,
            files_compacted,
            files_vacuumed,
        };
        info!(?report, "Maintenance cycle complete");
        Ok(report)
    }

    /// Number of running background tasks
    pub fn active_tasks(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Stop all background tasks
    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Maintenance scheduler stopped");
    }
}

impl Drop for MaintenanceScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
