//! ContactActor: owner of the `contact_messages` table
//!
//! Every read and write goes through one mailbox, so a delete observes the
//! result of any delete queued before it. Two concurrent deletes of the same
//! id therefore report one removal and one miss. Compaction and vacuum of
//! the table also run in this mailbox, so they never race a delete commit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use deltalake::arrow::array::{ArrayRef, RecordBatch, StringArray};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{LakehouseError, Result};
use crate::schema::{self, sql_literal};
use crate::store::{CompactMetrics, DeltaStore, VacuumMetrics};
use crate::workflow::ContactStore;

use super::types::*;

// ─── Messages ───

enum ContactMsg {
    Submit {
        draft: NewContactMessage,
        reply: oneshot::Sender<Result<ContactMessage>>,
    },
    List {
        reply: oneshot::Sender<Result<Vec<ContactMessage>>>,
    },
    Get {
        id: String,
        reply: oneshot::Sender<Result<Option<ContactMessage>>>,
    },
    Delete {
        id: String,
        reply: oneshot::Sender<Result<bool>>,
    },
    Compact {
        reply: oneshot::Sender<Result<CompactMetrics>>,
    },
    Vacuum {
        reply: oneshot::Sender<Result<VacuumMetrics>>,
    },
}

// ─── Actor ───

pub struct ContactActor {
    store: Arc<DeltaStore>,
    rx: mpsc::Receiver<ContactMsg>,
}

impl ContactActor {
    /// Spawn the contact actor with a shared DeltaStore
    pub fn spawn(store: Arc<DeltaStore>) -> ContactHandle {
        let (tx, rx) = mpsc::channel(store.config().mailbox_capacity);
        let actor = Self { store, rx };
        tokio::spawn(actor.run());
        info!("ContactActor spawned");
        ContactHandle { tx }
    }

    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                ContactMsg::Submit { draft, reply } => {
                    let _ = reply.send(self.handle_submit(draft).await);
                }
                ContactMsg::List { reply } => {
                    let _ = reply.send(self.handle_list().await);
                }
                ContactMsg::Get { id, reply } => {
                    let _ = reply.send(self.handle_get(&id).await);
                }
                ContactMsg::Delete { id, reply } => {
                    let _ = reply.send(self.handle_delete(&id).await);
                }
                ContactMsg::Compact { reply } => {
                    let _ = reply.send(self.store.compact(schema::TABLE_CONTACT_MESSAGES).await);
                }
                ContactMsg::Vacuum { reply } => {
                    let retention = self.store.config().vacuum_retention_hours;
                    let result = self.store.vacuum(schema::TABLE_CONTACT_MESSAGES, retention).await;
                    let _ = reply.send(result);
                }
            }
        }
        info!("ContactActor stopped");
    }

    async fn handle_submit(&self, draft: NewContactMessage) -> Result<ContactMessage> {
        let draft = draft.validated()?;
        let msg = ContactMessage {
            id: Uuid::new_v4().to_string(),
            email: draft.email,
            subject: draft.subject,
            message: draft.message,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        let batch = RecordBatch::try_new(
            Arc::new(schema::contact_messages_arrow_schema()),
            vec![
                Arc::new(StringArray::from(vec![msg.id.as_str()])) as ArrayRef,
                Arc::new(StringArray::from(vec![msg.email.as_str()])),
                Arc::new(StringArray::from(vec![msg.subject.as_str()])),
                Arc::new(StringArray::from(vec![msg.message.as_str()])),
                Arc::new(StringArray::from(vec![msg.created_at.as_str()])),
            ],
        )?;

        self.store.append(schema::TABLE_CONTACT_MESSAGES, batch).await?;
        info!(contact_id = %msg.id, "Contact message stored");
        Ok(msg)
    }

    async fn handle_list(&self) -> Result<Vec<ContactMessage>> {
        let batches = self.store.scan(schema::TABLE_CONTACT_MESSAGES).await?;
        let mut messages = schema::rows(&batches)
            .map(|(batch, row)| message_from_row(batch, row))
            .collect::<Result<Vec<_>>>()?;
        // Fixed-width UTC timestamps sort lexicographically
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn handle_get(&self, id: &str) -> Result<Option<ContactMessage>> {
        let batches = self
            .store
            .query(schema::TABLE_CONTACT_MESSAGES, &format!("id = {}", sql_literal(id)))
            .await?;

        let found = schema::rows(&batches)
            .next()
            .map(|(batch, row)| message_from_row(batch, row))
            .transpose();
        found
    }

    async fn handle_delete(&self, id: &str) -> Result<bool> {
        let metrics = self
            .store
            .delete(schema::TABLE_CONTACT_MESSAGES, &format!("id = {}", sql_literal(id)))
            .await?;

        let removed = metrics.num_deleted_rows > 0;
        if removed {
            info!(contact_id = id, version = metrics.new_version, "Contact message deleted");
        } else {
            debug!(contact_id = id, "Delete matched no contact message");
        }
        Ok(removed)
    }
}

fn message_from_row(batch: &RecordBatch, row: usize) -> Result<ContactMessage> {
    Ok(ContactMessage {
        id: schema::string_at(batch, 0, row)?,
        email: schema::string_at(batch, 1, row)?,
        subject: schema::string_at(batch, 2, row)?,
        message: schema::string_at(batch, 3, row)?,
        created_at: schema::string_at(batch, 4, row)?,
    })
}

// ─── Handle ───

/// Thread-safe handle to communicate with the ContactActor
#[derive(Clone)]
pub struct ContactHandle {
    tx: mpsc::Sender<ContactMsg>,
}

impl ContactHandle {
    async fn call<T>(&self, msg: ContactMsg, rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| LakehouseError::ActorUnavailable("ContactActor".into()))?;
        rx.await
            .map_err(|_| LakehouseError::ActorUnavailable("ContactActor dropped".into()))?
    }

    pub async fn submit(&self, draft: NewContactMessage) -> Result<ContactMessage> {
        let (reply, rx) = oneshot::channel();
        self.call(ContactMsg::Submit { draft, reply }, rx).await
    }

    /// All messages, newest first
    pub async fn list(&self) -> Result<Vec<ContactMessage>> {
        let (reply, rx) = oneshot::channel();
        self.call(ContactMsg::List { reply }, rx).await
    }

    pub async fn get(&self, id: String) -> Result<Option<ContactMessage>> {
        let (reply, rx) = oneshot::channel();
        self.call(ContactMsg::Get { id, reply }, rx).await
    }

    /// Remove a message; `true` only for the call that actually removed it
    pub async fn delete(&self, id: String) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.call(ContactMsg::Delete { id, reply }, rx).await
    }

    pub async fn compact(&self) -> Result<CompactMetrics> {
        let (reply, rx) = oneshot::channel();
        self.call(ContactMsg::Compact { reply }, rx).await
    }

    /// Physically remove files of deleted messages older than the configured retention
    pub async fn vacuum(&self) -> Result<VacuumMetrics> {
        let (reply, rx) = oneshot::channel();
        self.call(ContactMsg::Vacuum { reply }, rx).await
    }
}

#[async_trait]
impl ContactStore for ContactHandle {
    async fn find_by_id(&self, id: &str) -> Result<Option<ContactMessage>> {
        self.get(id.to_string()).await
    }

    async fn list_all(&self) -> Result<Vec<ContactMessage>> {
        self.list().await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        self.delete(id.to_string()).await
    }
}
