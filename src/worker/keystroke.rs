//! Desktop chat delivery by driving keyboard and mouse input.
//!
//! Window state outside this process is not observable, so everything that
//! touches it sits behind [`HostProbe`] and [`KeyboardDriver`]. The key
//! sequence itself is plain data built by [`build_script`].

use async_trait::async_trait;
use std::process::Command;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::core::config::AppConfig;
use crate::core::models::DeliveryMode;
use crate::errors::DeliveryError;
use crate::worker::deliver::Delivery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chord {
    /// Ctrl+F (Cmd+F on macOS): open room search.
    Find,
    /// Ctrl+A (Cmd+A on macOS).
    SelectAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Enter,
    Escape,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Chord(Chord),
    Press(Keystroke),
    Type(String),
    ClickInput,
    Pause(Duration),
}

pub trait KeyboardDriver {
    fn chord(&mut self, chord: Chord) -> Result<(), DeliveryError>;
    fn press(&mut self, key: Keystroke) -> Result<(), DeliveryError>;
    fn type_text(&mut self, text: &str) -> Result<(), DeliveryError>;
    /// Click where the chat input box sits in the active window.
    fn click_input_area(&mut self) -> Result<(), DeliveryError>;
}

/// Checks on, and raises, the chat application.
pub trait HostProbe: Send + Sync {
    fn is_running(&self, process: &str) -> bool;
    fn activate(&self, window_title: &str) -> Result<(), DeliveryError>;
}

pub type DriverFactory =
    Arc<dyn Fn() -> Result<Box<dyn KeyboardDriver>, DeliveryError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct KeystrokeSettings {
    pub process: String,
    pub window_title: String,
    pub max_chars: usize,
    pub chunk_chars: usize,
    pub activation_pause: Duration,
}

impl KeystrokeSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            process: config.chat_app_process.clone(),
            window_title: config.chat_window_title.clone(),
            max_chars: config.max_message_chars,
            chunk_chars: config.typing_chunk_chars.max(1),
            activation_pause: Duration::from_millis(1500),
        }
    }
}

/// Cut to `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Key sequence that opens `room`, clears the input box, types `text`, and sends it.
#[must_use]
pub fn build_script(room: &str, text: &str, settings: &KeystrokeSettings) -> Vec<Step> {
    let ms = Duration::from_millis;
    let mut steps = vec![
        Step::Chord(Chord::Find),
        Step::Pause(ms(500)),
        Step::Type(room.to_string()),
        Step::Pause(ms(500)),
        Step::Press(Keystroke::Enter),
        Step::Pause(ms(1000)),
        Step::Press(Keystroke::Escape),
        Step::Pause(ms(500)),
        Step::ClickInput,
        Step::Pause(ms(1000)),
        Step::Chord(Chord::SelectAll),
        Step::Pause(ms(300)),
        Step::Press(Keystroke::Delete),
        Step::Pause(ms(300)),
    ];

    let message = truncate_message(text, settings.max_chars);
    for chunk in chunk_chars(&message, settings.chunk_chars) {
        steps.push(Step::Type(chunk));
        steps.push(Step::Pause(ms(100)));
    }

    steps.push(Step::Pause(ms(500)));
    steps.push(Step::Press(Keystroke::Enter));
    steps
}

pub fn run_script(driver: &mut dyn KeyboardDriver, steps: &[Step]) -> Result<(), DeliveryError> {
    for step in steps {
        match step {
            Step::Chord(chord) => driver.chord(*chord)?,
            Step::Press(key) => driver.press(*key)?,
            Step::Type(text) => driver.type_text(text)?,
            Step::ClickInput => driver.click_input_area()?,
            Step::Pause(duration) => thread::sleep(*duration),
        }
    }
    Ok(())
}

/// Uses the operating system's process list and window tools.
#[derive(Debug, Default)]
pub struct ProcessProbe;

#[cfg(target_os = "windows")]
impl HostProbe for ProcessProbe {
    fn is_running(&self, process: &str) -> bool {
        let image = if process.to_ascii_lowercase().ends_with(".exe") {
            process.to_string()
        } else {
            format!("{process}.exe")
        };
        let filter = format!("IMAGENAME eq {image}");
        Command::new("tasklist")
            .args(["/FI", filter.as_str(), "/NH"])
            .output()
            .map(|output| {
                String::from_utf8_lossy(&output.stdout)
                    .to_ascii_lowercase()
                    .contains(&image.to_ascii_lowercase())
            })
            .unwrap_or(false)
    }

    fn activate(&self, window_title: &str) -> Result<(), DeliveryError> {
        let script = format!("(New-Object -ComObject WScript.Shell).AppActivate(\"{window_title}\")");
        Command::new("powershell")
            .args(["-NoProfile", "-Command", script.as_str()])
            .output()
            .map(|_| ())
            .map_err(|e| DeliveryError::Input(format!("Failed to activate window: {e}")))
    }
}

#[cfg(not(target_os = "windows"))]
impl HostProbe for ProcessProbe {
    fn is_running(&self, process: &str) -> bool {
        Command::new("pgrep")
            .args(["-f", process])
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn activate(&self, window_title: &str) -> Result<(), DeliveryError> {
        #[cfg(target_os = "macos")]
        let output = {
            let script = format!("tell application \"{window_title}\" to activate");
            Command::new("osascript").args(["-e", script.as_str()]).output()
        };
        #[cfg(not(target_os = "macos"))]
        let output = Command::new("wmctrl").args(["-a", window_title]).output();

        output
            .map(|_| ())
            .map_err(|e| DeliveryError::Input(format!("Failed to activate window: {e}")))
    }
}

#[cfg(feature = "desktop")]
pub use self::enigo_driver::EnigoDriver;

#[cfg(feature = "desktop")]
mod enigo_driver {
    use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

    use super::{Chord, KeyboardDriver, Keystroke};
    use crate::errors::DeliveryError;

    fn input_error(e: impl std::fmt::Display) -> DeliveryError {
        DeliveryError::Input(e.to_string())
    }

    #[cfg(target_os = "macos")]
    const MODIFIER: Key = Key::Meta;
    #[cfg(not(target_os = "macos"))]
    const MODIFIER: Key = Key::Control;

    pub struct EnigoDriver {
        enigo: Enigo,
    }

    impl EnigoDriver {
        pub fn new() -> Result<Self, DeliveryError> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| DeliveryError::Input(format!("Failed to initialize Enigo: {e}")))?;
            Ok(Self { enigo })
        }
    }

    impl KeyboardDriver for EnigoDriver {
        fn chord(&mut self, chord: Chord) -> Result<(), DeliveryError> {
            let letter = match chord {
                Chord::Find => 'f',
                Chord::SelectAll => 'a',
            };
            self.enigo
                .key(MODIFIER, Direction::Press)
                .map_err(input_error)?;
            let clicked = self.enigo.key(Key::Unicode(letter), Direction::Click);
            // Release even if the letter failed so the modifier is not left held.
            self.enigo
                .key(MODIFIER, Direction::Release)
                .map_err(input_error)?;
            clicked.map_err(input_error)
        }

        fn press(&mut self, key: Keystroke) -> Result<(), DeliveryError> {
            let key = match key {
                Keystroke::Enter => Key::Return,
                Keystroke::Escape => Key::Escape,
                Keystroke::Delete => Key::Delete,
            };
            self.enigo.key(key, Direction::Click).map_err(input_error)
        }

        fn type_text(&mut self, text: &str) -> Result<(), DeliveryError> {
            self.enigo.text(text).map_err(input_error)
        }

        fn click_input_area(&mut self) -> Result<(), DeliveryError> {
            let (width, height) = self.enigo.main_display().map_err(input_error)?;
            self.enigo
                .move_mouse(width / 2, height - 100, Coordinate::Abs)
                .map_err(input_error)?;
            self.enigo
                .button(Button::Left, Direction::Click)
                .map_err(input_error)
        }
    }
}

/// The driver used when none is injected.
#[must_use]
pub fn default_driver_factory() -> DriverFactory {
    #[cfg(feature = "desktop")]
    {
        Arc::new(|| -> Result<Box<dyn KeyboardDriver>, DeliveryError> {
            Ok(Box::new(EnigoDriver::new()?))
        })
    }
    #[cfg(not(feature = "desktop"))]
    {
        Arc::new(|| -> Result<Box<dyn KeyboardDriver>, DeliveryError> {
            Err(DeliveryError::Unsupported)
        })
    }
}

pub struct KeystrokeDelivery {
    settings: KeystrokeSettings,
    probe: Arc<dyn HostProbe>,
    driver_factory: DriverFactory,
}

impl KeystrokeDelivery {
    pub fn new(
        settings: KeystrokeSettings,
        probe: Arc<dyn HostProbe>,
        driver_factory: DriverFactory,
    ) -> Self {
        Self {
            settings,
            probe,
            driver_factory,
        }
    }

    fn send_blocking(
        settings: &KeystrokeSettings,
        probe: &dyn HostProbe,
        driver_factory: &DriverFactory,
        room: &str,
        text: &str,
    ) -> Result<(), DeliveryError> {
        if !probe.is_running(&settings.process) {
            return Err(DeliveryError::HostAbsent(settings.process.clone()));
        }

        if let Err(e) = probe.activate(&settings.window_title) {
            warn!(error = %e, "window activation failed, continuing");
        }
        thread::sleep(settings.activation_pause);

        let mut driver = (**driver_factory)()?;
        let steps = build_script(room, text, settings);
        run_script(driver.as_mut(), &steps)
    }
}

#[async_trait]
impl Delivery for KeystrokeDelivery {
    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Keystroke
    }

    async fn deliver(&self, room: &str, text: &str) -> bool {
        let settings = self.settings.clone();
        let probe = Arc::clone(&self.probe);
        let factory = Arc::clone(&self.driver_factory);
        let owned_room = room.to_string();
        let owned_text = text.to_string();

        let result = tokio::task::spawn_blocking(move || {
            Self::send_blocking(&settings, probe.as_ref(), &factory, &owned_room, &owned_text)
        })
        .await
        .map_err(|e| DeliveryError::Input(e.to_string()))
        .and_then(|result| result);

        match result {
            Ok(()) => {
                info!(room, "message typed into chat window");
                true
            }
            Err(e) => {
                error!(room, error = %e, "keystroke delivery failed");
                println!("❌ 자동 전송 실패: {e}");
                println!("💡 아래 메시지를 [{room}] 채팅방에 직접 복사해서 붙여넣어 주세요:\n{text}");
                false
            }
        }
    }
}
