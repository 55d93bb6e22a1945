//! End-to-end request flow.
//!
//! `Received → Gated → Normalizing → Deduping → Fetching → Summarizing →
//! Delivering → Done`, leaving early through `Rejected`, `Skipped`, or
//! `Failed`. The gate permit is held for exactly the lifetime of
//! [`Orchestrator::handle`] and the ledger mutex is never held across an await.

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use crate::core::gate::Gate;
use crate::core::ledger::DedupLedger;
use crate::core::models::{
    DedupPolicy, DeliveryMode, IncomingMessage, Outcome, SkipReason, Stage, SummaryReport,
    UNTITLED,
};
use crate::errors::PipelineError;
use crate::utils::links;
use crate::worker::deliver::{Delivery, format_reply};
use crate::worker::summarize::Summarizer;
use crate::worker::transcript::TranscriptSource;

/// The most recent message handed to the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastDelivery {
    pub room: String,
    pub text: String,
    pub delivered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestratorStatus {
    pub processed: usize,
    pub in_flight: usize,
    pub available_permits: usize,
    pub capacity: usize,
}

pub struct Orchestrator {
    gate: Gate,
    ledger: Mutex<DedupLedger>,
    policy: DedupPolicy,
    fetcher: Arc<dyn TranscriptSource>,
    summarizer: Arc<dyn Summarizer>,
    delivery: Arc<dyn Delivery>,
    last_delivery: Mutex<Option<LastDelivery>>,
}

/// Holds a video id in the in-flight set until dropped.
struct Reservation<'a> {
    ledger: &'a Mutex<DedupLedger>,
    video_id: String,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release(&self.video_id);
    }
}

impl Orchestrator {
    pub fn new(
        gate: Gate,
        policy: DedupPolicy,
        fetcher: Arc<dyn TranscriptSource>,
        summarizer: Arc<dyn Summarizer>,
        delivery: Arc<dyn Delivery>,
    ) -> Self {
        Self {
            gate,
            ledger: Mutex::new(DedupLedger::new()),
            policy,
            fetcher,
            summarizer,
            delivery,
            last_delivery: Mutex::new(None),
        }
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery.mode()
    }

    /// Run one message through the pipeline. Never panics; every path ends in
    /// exactly one terminal [`Outcome`].
    #[tracing::instrument(level = "info", skip(self, message), fields(room = %message.room, sender = %message.sender))]
    pub async fn handle(&self, message: &IncomingMessage) -> Outcome {
        let Some(permit) = self.gate.try_acquire() else {
            warn!(stage = ?Stage::Rejected, "all permits in use, shedding request");
            return Outcome::Rejected;
        };
        debug!(stage = ?Stage::Gated, available = self.gate.available(), "permit acquired");

        let outcome = match AssertUnwindSafe(self.run(message)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(reason = %reason, "pipeline panicked");
                Outcome::Failed(PipelineError::Internal(reason))
            }
        };
        drop(permit);

        match &outcome {
            Outcome::Done(report) => info!(
                stage = ?Stage::Done,
                language = %report.language,
                transcript_length = report.transcript_length,
                "request complete"
            ),
            Outcome::Skipped(reason) => {
                info!(stage = ?Stage::Skipped, status = reason.status(), "request skipped");
            }
            Outcome::Failed(e) => error!(stage = ?e.stage(), error = %e, "request failed"),
            Outcome::Rejected => {}
        }
        outcome
    }

    async fn run(&self, message: &IncomingMessage) -> Outcome {
        let text = message.text.as_str();
        if text.is_empty() {
            return Outcome::Skipped(SkipReason::NoMessage);
        }

        debug!(stage = ?Stage::Normalizing);
        let Some(canonical_url) = links::normalize(text) else {
            return Outcome::Skipped(SkipReason::NotAYoutubeUrl);
        };
        let Some(video_id) = links::extract_id(&canonical_url).map(str::to_string) else {
            return Outcome::Failed(PipelineError::InvalidVideoId(canonical_url));
        };

        debug!(stage = ?Stage::Deduping, video_id = %video_id);
        let Some(_reservation) = self.claim(&video_id) else {
            return Outcome::Skipped(SkipReason::AlreadyProcessed);
        };

        match self.process(message, &canonical_url, &video_id).await {
            Ok(report) => Outcome::Done(report),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Check-and-reserve under one lock. `None` when the id is done or being worked on.
    fn claim(&self, video_id: &str) -> Option<Reservation<'_>> {
        let mut ledger = self.lock_ledger();
        if ledger.seen(video_id) || !ledger.reserve(video_id) {
            return None;
        }
        if self.policy == DedupPolicy::OnAttempt {
            ledger.mark_seen(video_id);
        }
        Some(Reservation {
            ledger: &self.ledger,
            video_id: video_id.to_string(),
        })
    }

    async fn process(
        &self,
        message: &IncomingMessage,
        canonical_url: &str,
        video_id: &str,
    ) -> Result<SummaryReport, PipelineError> {
        debug!(stage = ?Stage::Fetching, url = %canonical_url);
        let transcript = self
            .fetcher
            .fetch(canonical_url)
            .await?
            .ok_or_else(|| PipelineError::TranscriptUnavailable(canonical_url.to_string()))?;

        let carried_title = transcript
            .video_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let video_title = match carried_title {
            Some(title) => title,
            None => self
                .fetcher
                .fetch_title(canonical_url)
                .await
                .unwrap_or_else(|| UNTITLED.to_string()),
        };

        debug!(stage = ?Stage::Summarizing, title = %video_title);
        let summary = self
            .summarizer
            .summarize(&transcript.text, &video_title)
            .await?;

        if self.policy == DedupPolicy::AfterSuccess {
            self.lock_ledger().mark_seen(video_id);
        }

        debug!(stage = ?Stage::Delivering);
        let mode = self.delivery.mode();
        let outbound = match mode {
            DeliveryMode::Response => summary.clone(),
            DeliveryMode::Keystroke | DeliveryMode::Clipboard => format_reply(&video_title, &summary),
        };
        let delivered = self.delivery.deliver(&message.room, &outbound).await;
        if !delivered {
            warn!(room = %message.room, "delivery failed");
        }
        *self
            .last_delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(LastDelivery {
            room: message.room.clone(),
            text: outbound,
            delivered,
        });

        Ok(SummaryReport {
            summary,
            video_title,
            language: transcript.language,
            transcript_length: transcript.text.chars().count(),
            delivered: (mode != DeliveryMode::Response).then_some(delivered),
        })
    }

    fn lock_ledger(&self) -> MutexGuard<'_, DedupLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> OrchestratorStatus {
        let ledger = self.lock_ledger();
        OrchestratorStatus {
            processed: ledger.len(),
            in_flight: ledger.in_flight_len(),
            available_permits: self.gate.available(),
            capacity: self.gate.capacity(),
        }
    }

    pub fn last_delivery(&self) -> Option<LastDelivery> {
        self.last_delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
