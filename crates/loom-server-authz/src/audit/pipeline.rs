// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use loom_authz_core::AuthzDecision;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::SendError};
use tracing::{debug, error, instrument, warn};

use super::event::AuditEntry;
use super::AuditSink;
use crate::config::{AuditConfig, QueueOverflowPolicy};
use crate::context::AuthzContext;

#[derive(Debug, Error)]
pub enum AuditPublishError {
	/// The destination may accept the entry later (timeouts, backpressure).
	#[error("transient publish failure: {0}")]
	Transient(String),

	/// The destination rejected the entry or is misconfigured; the entry is lost.
	#[error("permanent publish failure: {0}")]
	Permanent(String),
}

impl AuditPublishError {
	pub fn is_permanent(&self) -> bool {
		matches!(self, Self::Permanent(_))
	}
}

/// Asynchronous destination for audit entries (a log shipper, a database table).
#[async_trait]
pub trait AuditPublisher: Send + Sync {
	fn name(&self) -> &str;

	async fn publish(&self, entry: Arc<AuditEntry>) -> Result<(), AuditPublishError>;
}

/// An [`AuditSink`] that queues decisions and fans them out to publishers on
/// a background task, so slow publishers never hold up `authorize`.
///
/// Must be created inside a Tokio runtime.
pub struct QueuedAuditSink {
	tx: mpsc::Sender<AuditEntry>,
	overflow_policy: QueueOverflowPolicy,
}

impl QueuedAuditSink {
	pub fn new(
		queue_capacity: usize,
		overflow_policy: QueueOverflowPolicy,
		publishers: Vec<Arc<dyn AuditPublisher>>,
	) -> Self {
		if overflow_policy == QueueOverflowPolicy::DropOldest {
			warn!("audit queue overflow policy drop_oldest is not supported, dropping newest entries instead");
		}
		let (tx, rx) = mpsc::channel(queue_capacity.max(1));

		tokio::spawn(Self::background_task(rx, publishers));

		Self {
			tx,
			overflow_policy,
		}
	}

	/// Returns `None` when auditing is disabled, so no decisions are queued.
	pub fn from_config(
		config: &AuditConfig,
		publishers: Vec<Arc<dyn AuditPublisher>>,
	) -> Option<Self> {
		if !config.enabled {
			debug!("audit disabled, no queued sink created");
			return None;
		}
		Some(Self::new(
			config.queue_capacity,
			config.queue_overflow_policy,
			publishers,
		))
	}

	async fn background_task(
		mut rx: mpsc::Receiver<AuditEntry>,
		publishers: Vec<Arc<dyn AuditPublisher>>,
	) {
		while let Some(entry) = rx.recv().await {
			let entry = Arc::new(entry);

			for publisher in &publishers {
				let publisher = Arc::clone(publisher);
				let entry = Arc::clone(&entry);

				tokio::spawn(async move {
					match publisher.publish(entry).await {
						Ok(()) => {}
						Err(e) if e.is_permanent() => {
							error!(publisher = publisher.name(), error = %e, "audit entry lost");
						}
						Err(e) => {
							warn!(publisher = publisher.name(), error = %e, "audit publish failed");
						}
					}
				});
			}
		}
	}

	/// Queue an entry for publishing.
	///
	/// Returns `true` if the entry was queued, `false` if it was dropped.
	///
	/// - `Block`: spawns a task that waits for queue space; never drops.
	/// - `DropNewest`: drops the incoming entry when the queue is full.
	/// - `DropOldest`: currently the same as `DropNewest`; an mpsc channel
	///   cannot evict from the head.
	#[instrument(skip(self, entry), fields(event_type = %entry.event_type))]
	pub fn log(&self, entry: AuditEntry) -> bool {
		match self.overflow_policy {
			QueueOverflowPolicy::Block => {
				let tx = self.tx.clone();
				tokio::spawn(async move {
					let _ = tx.send(entry).await;
				});
				true
			}
			QueueOverflowPolicy::DropNewest | QueueOverflowPolicy::DropOldest => {
				self.tx.try_send(entry).is_ok()
			}
		}
	}

	pub async fn log_blocking(&self, entry: AuditEntry) -> Result<(), SendError<AuditEntry>> {
		self.tx.send(entry).await
	}
}

impl AuditSink for QueuedAuditSink {
	fn record(&self, _ctx: &AuthzContext, decision: &AuthzDecision) {
		let entry = AuditEntry::from_decision(decision.clone());
		let id = entry.id;
		if !self.log(entry) {
			warn!(entry_id = %id, action = %decision.action, "audit queue full, decision dropped");
		}
	}
}
