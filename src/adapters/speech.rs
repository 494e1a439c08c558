//! Speech synthesis adapters.
//!
//! - [`RemoteSpeech`]: URL-based synthesis, audio piped to a local player
//! - [`SystemSpeech`]: on-device `espeak-ng`
//!
//! Both spawn child processes with `kill_on_drop`, so dropping a `speak`
//! future stops playback and discards anything still queued.

use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{SpeechProvider, Utterance};

/// Default remote synthesis endpoint
pub const DEFAULT_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Words per minute at rate 1.0 for espeak
const ESPEAK_BASE_WPM: f32 = 175.0;

// ─── Player ──────────────────────────────────────────────────────────

/// External audio player fed through stdin.
///
/// `{rate}` in any argument is replaced by the playback rate.
#[derive(Debug, Clone)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        Self {
            program: "mpv".to_string(),
            args: vec![
                "--no-video".to_string(),
                "--really-quiet".to_string(),
                "--speed={rate}".to_string(),
                "-".to_string(),
            ],
        }
    }
}

impl PlayerCommand {
    /// Parse a whitespace-separated command line
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Arguments with placeholders filled in
    pub fn args_for(&self, rate: f32) -> Vec<String> {
        let rate = format!("{:.2}", rate);
        self.args.iter().map(|a| a.replace("{rate}", &rate)).collect()
    }

    /// Play encoded audio bytes and wait for the player to exit
    pub async fn play(&self, audio: &[u8], rate: f32) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(self.args_for(rate))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn audio player '{}'", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(audio)
                .await
                .context("Failed to write audio to player stdin")?;
            // Drop stdin to signal EOF
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for audio player '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Audio player '{}' failed with exit code {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(())
    }
}

// ─── Remote synthesis ────────────────────────────────────────────────

/// URL-based speech synthesis
pub struct RemoteSpeech {
    client: reqwest::Client,
    endpoint: String,
    player: PlayerCommand,
}

impl RemoteSpeech {
    pub fn new(endpoint: impl Into<String>, player: PlayerCommand) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            player,
        }
    }

    /// Synthesis URL for an utterance
    pub fn request_url(&self, utterance: &Utterance) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &self.endpoint,
            &[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", utterance.voice_hint.as_str()),
                ("q", utterance.text.as_str()),
            ],
        )
        .with_context(|| format!("Invalid speech endpoint: {}", self.endpoint))
    }
}

#[async_trait]
impl SpeechProvider for RemoteSpeech {
    fn name(&self) -> &str {
        "remote"
    }

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        let url = self.request_url(utterance)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch synthesized speech")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Speech endpoint returned HTTP {}", status.as_u16());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("audio/") {
            anyhow::bail!("Speech endpoint returned non-audio content '{}'", content_type);
        }

        let audio = response
            .bytes()
            .await
            .context("Failed to read synthesized speech")?;
        debug!(bytes = audio.len(), "Fetched remote speech");

        self.player.play(&audio, utterance.rate).await
    }
}

// ─── On-device synthesis ─────────────────────────────────────────────

/// An installed synthesizer voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// Locale tag ("da", "en-gb", ...)
    pub language: String,
}

/// Parse `espeak-ng --voices` output.
///
/// Columns: `Pty Language Age/Gender VoiceName File Other Languages`.
pub fn parse_espeak_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            Some(Voice {
                name: fields[3].to_string(),
                language: fields[1].to_string(),
            })
        })
        .collect()
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace('_', "-")
}

/// Pick the voice for a language hint: exact locale match first, then
/// the first voice sharing the primary language subtag.
pub fn select_voice<'a>(voices: &'a [Voice], hint: &str) -> Option<&'a Voice> {
    let hint = normalize_tag(hint);
    if hint.is_empty() || hint == "auto" {
        return None;
    }
    let primary = hint.split('-').next().unwrap_or_default();

    voices
        .iter()
        .find(|v| normalize_tag(&v.language) == hint)
        .or_else(|| {
            voices
                .iter()
                .find(|v| normalize_tag(&v.language).split('-').next() == Some(primary))
        })
}

/// On-device speech through espeak-ng
pub struct SystemSpeech {
    binary: String,
}

impl Default for SystemSpeech {
    fn default() -> Self {
        Self::new("espeak-ng")
    }
}

impl SystemSpeech {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Installed voices
    pub async fn voices(&self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.binary)
            .arg("--voices")
            .output()
            .await
            .with_context(|| format!("Failed to run '{} --voices'", self.binary))?;

        if !output.status.success() {
            anyhow::bail!("'{} --voices' failed", self.binary);
        }

        Ok(parse_espeak_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Words per minute for a rate multiplier
    pub fn words_per_minute(rate: f32) -> u32 {
        (ESPEAK_BASE_WPM * rate.clamp(0.25, 4.0)).round() as u32
    }
}

#[async_trait]
impl SpeechProvider for SystemSpeech {
    fn name(&self) -> &str {
        "system"
    }

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        let voices = self.voices().await.unwrap_or_default();
        let voice = select_voice(&voices, &utterance.voice_hint);

        let mut cmd = Command::new(&self.binary);
        if let Some(voice) = voice {
            cmd.args(["-v", voice.language.as_str()]);
        }
        let status = cmd
            .arg("-s")
            .arg(Self::words_per_minute(utterance.rate).to_string())
            .arg("--")
            .arg(&utterance.text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| format!("Failed to run '{}'", self.binary))?;

        if !status.success() {
            anyhow::bail!("'{}' exited with {}", self.binary, status.code().unwrap_or(-1));
        }

        Ok(())
    }
}
