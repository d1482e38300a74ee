//! The operation table: one tag per vendor call and one dispatch point.

use crate::api::MobvoiApi;
use crate::error::{MobvoiError, Result};
use crate::types::*;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKey {
    GetSpeakerList,
    TextToSpeech,
    VoiceClone,
    PhotoDriveAvatar,
    QueryPhotoDriveAvatar,
    VideoDubbing,
    QueryVideoDubbing,
}

impl OperationKey {
    pub const ALL: [OperationKey; 7] = [
        Self::GetSpeakerList,
        Self::TextToSpeech,
        Self::VoiceClone,
        Self::PhotoDriveAvatar,
        Self::QueryPhotoDriveAvatar,
        Self::VideoDubbing,
        Self::QueryVideoDubbing,
    ];

    /// Catalog key, e.g. `tts.text_to_speech`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetSpeakerList => "tts.get_speaker_list",
            Self::TextToSpeech => "tts.text_to_speech",
            Self::VoiceClone => "tts.voice_clone",
            Self::PhotoDriveAvatar => "avatar.photo_drive_avatar",
            Self::QueryPhotoDriveAvatar => "avatar.query_photo_drive_avatar",
            Self::VideoDubbing => "avatar.video_dubbing",
            Self::QueryVideoDubbing => "avatar.query_video_dubbing",
        }
    }

    /// Bare operation name, e.g. `text_to_speech`.
    pub fn name(self) -> &'static str {
        let key = self.as_str();
        key.split_once('.').map_or(key, |(_, name)| name)
    }

    pub fn is_tts(self) -> bool {
        matches!(
            self,
            Self::GetSpeakerList | Self::TextToSpeech | Self::VoiceClone
        )
    }

    /// Path below the service host.
    pub(crate) fn path(self) -> &'static str {
        match self {
            Self::GetSpeakerList => "/api/tts/getSpeakerList",
            Self::TextToSpeech => "/api/tts/v1",
            Self::VoiceClone => "/clone",
            Self::PhotoDriveAvatar => "/image/toman/cmp",
            Self::QueryPhotoDriveAvatar => "/image/toman/cmp/result",
            Self::VideoDubbing => "/video/voiceover/createTask",
            Self::QueryVideoDubbing => "/video/voiceover/detail",
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKey {
    type Err = MobvoiError;

    /// Accepts either the catalog key or the bare operation name.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s || key.name() == s)
            .ok_or_else(|| MobvoiError::Config(format!("unknown operation '{s}'")))
    }
}

/// A fully specified call.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    GetSpeakerList { voice_type: VoiceType },
    TextToSpeech(TextToSpeechRequest),
    VoiceClone(VoiceCloneRequest),
    PhotoDriveAvatar(PhotoDriveAvatarRequest),
    QueryPhotoDriveAvatar { task_id: TaskId },
    VideoDubbing(VideoDubbingRequest),
    QueryVideoDubbing { task_id: TaskId },
}

impl Operation {
    pub fn key(&self) -> OperationKey {
        match self {
            Self::GetSpeakerList { .. } => OperationKey::GetSpeakerList,
            Self::TextToSpeech(_) => OperationKey::TextToSpeech,
            Self::VoiceClone(_) => OperationKey::VoiceClone,
            Self::PhotoDriveAvatar(_) => OperationKey::PhotoDriveAvatar,
            Self::QueryPhotoDriveAvatar { .. } => OperationKey::QueryPhotoDriveAvatar,
            Self::VideoDubbing(_) => OperationKey::VideoDubbing,
            Self::QueryVideoDubbing { .. } => OperationKey::QueryVideoDubbing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
    Speakers(Value),
    Audio(SynthesizedAudio),
    ClonedVoice(ClonedVoice),
    PhotoAvatarJob(PhotoAvatarJob),
    DubbingJob(DubbingJob),
    Poll(JobPoll),
}

impl OperationOutput {
    /// JSON summary of the result; binary payloads are described, not inlined.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Speakers(data) => data.clone(),
            Self::Audio(audio) => json!({
                "mimeType": audio.mime_type,
                "fileName": audio.file_name,
                "fileExtension": audio.file_extension,
                "fileSize": audio.len(),
            }),
            Self::ClonedVoice(voice) => json!({ "speaker": voice.speaker }),
            Self::PhotoAvatarJob(job) => json!({
                "taskId": job.task_id,
                "audio_url": job.audio_url,
                "image_url": job.image_url,
            }),
            Self::DubbingJob(job) => json!({ "taskId": job.task_id }),
            Self::Poll(JobPoll::Pending(pending)) => json!({
                "status": "pending",
                "response": pending.raw,
            }),
            Self::Poll(JobPoll::Completed(media)) => json!({
                "status": "completed",
                "mimeType": media.content_type,
                "fileExtension": media.file_extension(),
                "fileSize": media.bytes.len(),
            }),
        }
    }
}

impl MobvoiApi {
    /// Run a single operation.
    pub async fn execute(&self, operation: Operation) -> Result<OperationOutput> {
        self.execute_item(operation, 0).await
    }

    /// Run a batch one item at a time, stopping at the first failure.
    pub async fn execute_all(&self, operations: Vec<Operation>) -> Result<Vec<OperationOutput>> {
        info!("Executing batch of {} operations", operations.len());

        let mut outputs = Vec::with_capacity(operations.len());
        for (index, operation) in operations.into_iter().enumerate() {
            outputs.push(self.execute_item(operation, index).await?);
        }
        Ok(outputs)
    }

    async fn execute_item(&self, operation: Operation, index: usize) -> Result<OperationOutput> {
        let output = match operation {
            Operation::GetSpeakerList { voice_type } => {
                OperationOutput::Speakers(self.get_speaker_list(voice_type).await?)
            }
            Operation::TextToSpeech(request) => {
                let mut audio = self.text_to_speech(&request).await?;
                audio.file_name = tts_file_name(&request.speaker, index);
                OperationOutput::Audio(audio)
            }
            Operation::VoiceClone(request) => {
                OperationOutput::ClonedVoice(self.voice_clone(&request).await?)
            }
            Operation::PhotoDriveAvatar(request) => {
                OperationOutput::PhotoAvatarJob(self.photo_drive_avatar(&request).await?)
            }
            Operation::QueryPhotoDriveAvatar { task_id } => {
                OperationOutput::Poll(self.query_photo_drive_avatar(&task_id).await?)
            }
            Operation::VideoDubbing(request) => {
                OperationOutput::DubbingJob(self.video_dubbing(&request).await?)
            }
            Operation::QueryVideoDubbing { task_id } => {
                OperationOutput::Poll(self.query_video_dubbing(&task_id).await?)
            }
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for key in OperationKey::ALL {
            assert_eq!(key.as_str().parse::<OperationKey>().unwrap(), key);
            assert_eq!(key.name().parse::<OperationKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_key() {
        assert!(matches!(
            "avatar.sing".parse::<OperationKey>(),
            Err(MobvoiError::Config(_))
        ));
    }

    #[test]
    fn names_and_families() {
        assert_eq!(OperationKey::QueryVideoDubbing.name(), "query_video_dubbing");
        assert!(OperationKey::VoiceClone.is_tts());
        assert!(!OperationKey::PhotoDriveAvatar.is_tts());
    }

    #[test]
    fn operation_keys() {
        let op = Operation::QueryVideoDubbing {
            task_id: TaskId::new("t").unwrap(),
        };
        assert_eq!(op.key(), OperationKey::QueryVideoDubbing);
        assert_eq!(
            Operation::TextToSpeech(TextToSpeechRequest::new("x")).key(),
            OperationKey::TextToSpeech
        );
    }

    #[test]
    fn summaries() {
        let audio = OperationOutput::Audio(SynthesizedAudio {
            bytes: vec![0; 128],
            mime_type: "audio/mpeg".into(),
            file_extension: "mp3".into(),
            file_name: "tts_a_0.mp3".into(),
        });
        assert_eq!(audio.to_json()["fileSize"], 128);

        let job = OperationOutput::DubbingJob(DubbingJob {
            task_id: TaskId::new("t-9").unwrap(),
        });
        assert_eq!(job.to_json(), json!({"taskId": "t-9"}));

        let done = OperationOutput::Poll(JobPoll::Completed(MediaPayload {
            content_type: "video/mp4".into(),
            bytes: vec![1, 2, 3],
        }));
        assert_eq!(done.to_json()["fileExtension"], "mp4");
    }
}
