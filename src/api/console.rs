//! Stdin transport for desktop deployments.
//!
//! Each input line is either an operator command or a chat message. A message
//! may name its room as `@room text`; otherwise the default room is used.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::helpers;
use crate::core::models::IncomingMessage;
use crate::errors::DeliveryError;
use crate::worker::Orchestrator;
use crate::worker::deliver::{self, Clipboard};

const CONSOLE_SENDER: &str = "console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Status,
    Last,
    Help,
    Quit,
    Blank,
    Message(IncomingMessage),
}

pub fn parse_command(line: &str, default_room: &str) -> ConsoleCommand {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => return ConsoleCommand::Blank,
        "status" => return ConsoleCommand::Status,
        "last" => return ConsoleCommand::Last,
        "help" | "?" => return ConsoleCommand::Help,
        "quit" | "exit" => return ConsoleCommand::Quit,
        _ => {}
    }

    let (room, text) = match trimmed.strip_prefix('@') {
        Some(rest) => match rest.split_once(char::is_whitespace) {
            Some((room, text)) => (room, text.trim()),
            None => (rest, ""),
        },
        None => (default_room, trimmed),
    };
    ConsoleCommand::Message(IncomingMessage::new(room, CONSOLE_SENDER, text))
}

fn print_help() {
    println!("📋 명령어:");
    println!("   - 'status': 봇 상태 확인");
    println!("   - 'last': 마지막 요약 다시 보기");
    println!("   - 'quit': 봇 종료");
    println!("   - '@방이름 메시지' 또는 메시지: YouTube 링크 처리");
}

/// Put the most recent summary back on the clipboard.
///
/// `None` when nothing has been delivered yet.
pub async fn recopy_last(
    orchestrator: &Orchestrator,
    clipboard: Arc<dyn Clipboard>,
) -> Option<Result<(), DeliveryError>> {
    let last = orchestrator.last_delivery()?;
    Some(deliver::copy_text(clipboard, &last.text).await)
}

/// Read stdin until EOF or `quit`, spawning a task per message.
pub async fn run_console(
    orchestrator: Arc<Orchestrator>,
    clipboard: Arc<dyn Clipboard>,
    default_room: String,
) -> std::io::Result<()> {
    println!("🚀 YouTube 요약 봇 (콘솔 모드), 기본 채팅방: {default_room}");
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line, &default_room) {
            ConsoleCommand::Blank => {}
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => print_help(),
            ConsoleCommand::Status => {
                let status = orchestrator.status();
                println!("📊 봇 상태:");
                println!("   - 전달 방식: {:?}", orchestrator.delivery_mode());
                println!("   - 처리된 영상: {}", status.processed);
                println!("   - 처리 중: {}", status.in_flight);
                println!(
                    "   - 남은 동시 처리 슬롯: {}/{}",
                    status.available_permits, status.capacity
                );
            }
            ConsoleCommand::Last => match orchestrator.last_delivery() {
                Some(last) => {
                    let rule = "=".repeat(80);
                    println!("{rule}\n📄 마지막 생성된 요약 [{}]:\n{rule}\n{}\n{rule}", last.room, last.text);
                    match recopy_last(&orchestrator, Arc::clone(&clipboard)).await {
                        Some(Ok(())) => println!("📋 클립보드에 다시 복사되었습니다!"),
                        Some(Err(error)) => warn!(error = %error, "clipboard copy failed"),
                        None => {}
                    }
                }
                None => println!("❌ 아직 생성된 요약이 없습니다."),
            },
            ConsoleCommand::Message(message) => {
                let orchestrator = Arc::clone(&orchestrator);
                tokio::spawn(async move {
                    let outcome = orchestrator.handle(&message).await;
                    let reply = helpers::reply_for(&outcome);
                    info!(status = reply.status, "console message handled");
                    println!("[{}] {}", reply.status, reply.body);
                });
            }
        }
    }

    println!("👋 봇이 종료되었습니다.");
    Ok(())
}
