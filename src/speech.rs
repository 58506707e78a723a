//! Text-to-speech collaborator.
//!
//! Speaking is fire-and-forget: callers go through [`speak_best_effort`],
//! which logs failures and never reports them upward.

use std::process::Command;
use std::sync::Arc;

use crate::db::LogOnError;

/// Voice settings for Vietnamese synthesis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub language_code: &'static str,
    pub voice_name: &'static str,
    pub ssml_gender: &'static str,
    pub audio_encoding: &'static str,
    pub pitch: f32,
    /// Slightly slower than normal for learners
    pub speaking_rate: f32,
}

pub const VOICE: VoiceConfig = VoiceConfig {
    language_code: "vi-VN",
    voice_name: "vi-VN-Wavenet-A",
    ssml_gender: "FEMALE",
    audio_encoding: "MP3",
    pitch: 0.0,
    speaking_rate: 0.9,
};

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech service unavailable: {0}")]
    Unavailable(String),
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Speaker that only records the utterance in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        tracing::info!(
            "Speaking [{} / {} @ {}x]: {}",
            VOICE.language_code,
            VOICE.voice_name,
            VOICE.speaking_rate,
            text
        );
        Ok(())
    }
}

/// Runs an external synthesizer such as `espeak-ng -v vi`, passing the text
/// as the final argument
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// Split a command line on whitespace. None if it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .output()
            .map_err(|e| SpeechError::Unavailable(format!("{}: {}", self.program, e)))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = match stderr.trim() {
            "" => output.status.to_string(),
            message => message.to_string(),
        };
        Err(SpeechError::Synthesis(format!("{}: {}", self.program, detail)))
    }
}

/// Tries `primary`, then `fallback` if it fails
pub struct FallbackSpeaker {
    primary: Box<dyn Speaker>,
    fallback: Box<dyn Speaker>,
}

impl FallbackSpeaker {
    pub fn new(primary: Box<dyn Speaker>, fallback: Box<dyn Speaker>) -> Self {
        Self { primary, fallback }
    }
}

impl Speaker for FallbackSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        match self.primary.speak(text) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!("Primary speaker failed, using fallback: {}", e);
                self.fallback.speak(text)
            }
        }
    }
}

/// The configured synthesizer backed by [`LogSpeaker`], or the log alone
pub fn speaker_from_command(command_line: Option<&str>) -> Arc<dyn Speaker> {
    match command_line.and_then(CommandSpeaker::parse) {
        Some(primary) => {
            tracing::info!("Speech via `{}`", primary.program);
            Arc::new(FallbackSpeaker::new(Box::new(primary), Box::new(LogSpeaker)))
        }
        None => Arc::new(LogSpeaker),
    }
}

/// Speak `text`, logging any failure. Blank text is ignored.
pub fn speak_best_effort(speaker: &dyn Speaker, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    speaker.speak(text).log_warn("Speech failed");
}
