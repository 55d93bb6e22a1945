use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use crate::core::models::DeliveryMode;
use crate::errors::DeliveryError;

const FRAME_WIDTH: usize = 80;

/// Hands a finished summary to whoever should see it.
///
/// Implementations never panic or return errors; a failed hand-off is `false`.
#[async_trait]
pub trait Delivery: Send + Sync {
    fn mode(&self) -> DeliveryMode;

    async fn deliver(&self, room: &str, text: &str) -> bool;
}

/// Text posted into a chat room by the desktop delivery modes.
#[must_use]
pub fn format_reply(title: &str, summary: &str) -> String {
    format!("📝 YouTube 영상 요약:\n\n🎥 {title}\n\n{summary}")
}

/// The summary travels back in the HTTP reply; nothing else to do.
#[derive(Debug, Default)]
pub struct ResponseDelivery;

#[async_trait]
impl Delivery for ResponseDelivery {
    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Response
    }

    async fn deliver(&self, _room: &str, _text: &str) -> bool {
        true
    }
}

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), DeliveryError>;
}

/// The desktop clipboard (X11/Wayland, macOS pasteboard, Windows).
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), DeliveryError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| DeliveryError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| DeliveryError::Clipboard(e.to_string()))
    }
}

/// Copy `text` off the async runtime; clipboard backends block.
pub async fn copy_text(clipboard: Arc<dyn Clipboard>, text: &str) -> Result<(), DeliveryError> {
    let owned = text.to_string();
    tokio::task::spawn_blocking(move || clipboard.copy(&owned))
        .await
        .map_err(|e| DeliveryError::Clipboard(e.to_string()))
        .and_then(|result| result)
}

/// Prints the message for the operator, puts it on the clipboard, and pauses.
///
/// Counts as delivered once the operator has the text, whether or not they paste it.
pub struct ClipboardDelivery {
    clipboard: Arc<dyn Clipboard>,
    pause: Duration,
    handled: AtomicU64,
}

impl ClipboardDelivery {
    pub fn new(clipboard: Arc<dyn Clipboard>, pause: Duration) -> Self {
        Self {
            clipboard,
            pause,
            handled: AtomicU64::new(0),
        }
    }

    /// Number of messages handed to the operator so far.
    pub fn handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Delivery for ClipboardDelivery {
    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Clipboard
    }

    async fn deliver(&self, room: &str, text: &str) -> bool {
        let rule = "=".repeat(FRAME_WIDTH);
        println!("\n{rule}\n🎯 [{room}] 채팅방에 전송할 메시지:\n{rule}\n{text}\n{rule}");

        match copy_text(Arc::clone(&self.clipboard), text).await {
            Ok(()) => println!("📋 메시지가 클립보드에 복사되었습니다! Ctrl+V로 붙여넣기하세요."),
            Err(error) => warn!(room, error = %error, "clipboard copy failed"),
        }

        self.handled.fetch_add(1, Ordering::Relaxed);
        info!(room, "summary handed to operator");

        if !self.pause.is_zero() {
            println!("⏰ {}초 후 다음 메시지 모니터링을 계속합니다...", self.pause.as_secs());
            tokio::time::sleep(self.pause).await;
        }
        true
    }
}
