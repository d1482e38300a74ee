use crate::error::{MobvoiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Audio payloads shorter than this are treated as a failed synthesis.
pub const MIN_AUDIO_BYTES: usize = 100;

pub(crate) const OCTET_STREAM: &str = "application/octet-stream";

/// Which subset of the speaker catalog to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceType {
    #[default]
    All,
    System,
    VoiceCloning,
}

impl VoiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::System => "system",
            Self::VoiceCloning => "voice_cloning",
        }
    }
}

impl FromStr for VoiceType {
    type Err = MobvoiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "system" => Ok(Self::System),
            "voice_cloning" => Ok(Self::VoiceCloning),
            other => Err(MobvoiError::Config(format!("unknown voice type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerListResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl SpeakerListResponse {
    /// Pick the requested subset out of `data`.
    pub fn select(self, voice_type: VoiceType) -> Result<Value> {
        if self.success != Some(true) {
            return Err(MobvoiError::Vendor(
                self.message.unwrap_or_else(|| "speaker list request failed".to_string()),
            ));
        }

        let data = self
            .data
            .ok_or_else(|| MobvoiError::MissingField("data".to_string()))?;

        let field = match voice_type {
            VoiceType::All => return Ok(data),
            VoiceType::System => "systemVoice",
            VoiceType::VoiceCloning => "voiceCloning",
        };

        data.get(field)
            .cloned()
            .ok_or_else(|| MobvoiError::MissingField(format!("data.{field}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToSpeechRequest {
    pub text: String,
    pub speaker: String,
    pub audio_type: String,
    pub speed: String,
    pub rate: String,
    pub volume: String,
    pub pitch: String,
    pub streaming: bool,
}

impl TextToSpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = speaker.into();
        self
    }
}

impl Default for TextToSpeechRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            speaker: "xiaoyi_meet".to_string(),
            audio_type: "mp3".to_string(),
            speed: "1.0".to_string(),
            rate: "24000".to_string(),
            volume: "1".to_string(),
            pitch: "0.0".to_string(),
            streaming: false,
        }
    }
}

/// Synthesized speech, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_extension: String,
    pub file_name: String,
}

impl SynthesizedAudio {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// `tts_<speaker>_<index>.mp3`, with the first whitespace run in the speaker
/// name replaced by an underscore.
pub fn tts_file_name(speaker: &str, index: usize) -> String {
    let speaker = match speaker.find(char::is_whitespace) {
        Some(start) => {
            let rest = speaker[start..].trim_start();
            format!("{}_{}", &speaker[..start], rest)
        }
        None => speaker.to_string(),
    };
    format!("tts_{speaker}_{index}.mp3")
}

/// Where the reference recording for a voice clone comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCloneSource {
    /// Remote recording the vendor fetches itself.
    Url(String),
    /// Local recording uploaded as a multipart file.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCloneRequest {
    pub source: VoiceCloneSource,
}

impl VoiceCloneRequest {
    pub fn url(uri: impl Into<String>) -> Self {
        Self {
            source: VoiceCloneSource::Url(uri.into()),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: VoiceCloneSource::File(path.into()),
        }
    }

    /// Build from an `is_url` flag plus a single value, the way workflow
    /// forms collect it.
    pub fn from_flag(is_url: bool, audio: impl Into<String>) -> Self {
        let audio = audio.into();
        if is_url {
            Self::url(audio)
        } else {
            Self::file(audio)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClonedVoice {
    pub speaker: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoDriveAvatarRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDubbingRequest {
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    #[serde(rename = "wavUrl")]
    pub audio_url: String,
}

/// Opaque handle of an asynchronous vendor job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(MobvoiError::Config("task id must not be empty".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = MobvoiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAvatarJob {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    pub image_url: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DubbingJob {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
}

/// Finished job output.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPayload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaPayload {
    /// File extension matching `content_type`, `bin` when unknown.
    pub fn file_extension(&self) -> &'static str {
        let mime = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "video/mp4" => "mp4",
            "video/quicktime" => "mov",
            "video/webm" => "webm",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

/// Status object returned while a job is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPending {
    pub raw: Value,
}

impl JobPending {
    pub fn message(&self) -> Option<&str> {
        self.raw.get("message").and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&Value> {
        self.raw
            .get("status")
            .or_else(|| self.raw.get("data").and_then(|d| d.get("status")))
    }
}

/// Outcome of one poll. Exactly one of the two, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPoll {
    Pending(JobPending),
    Completed(MediaPayload),
}

impl JobPoll {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Vendor failure built from a `{success, message}` envelope.
pub(crate) fn envelope_failure(value: &Value, fallback: &str) -> MobvoiError {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback);
    MobvoiError::Vendor(message.to_string())
}

/// True when the envelope explicitly reports `success: false`.
pub(crate) fn reports_failure(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) == Some(false)
}

pub(crate) fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime == "text/json" || mime.ends_with("+json")
}
