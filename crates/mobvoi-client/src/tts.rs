//! Speaker catalog, synthesis and voice cloning.

use crate::api::{FormPart, Method, MobvoiApi, RequestBody, RequestOptions, VendorResponse};
use crate::error::{MobvoiError, Result};
use crate::operation::OperationKey;
use crate::types::*;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

impl MobvoiApi {
    /// Fetch the speaker catalog and return the requested subset.
    pub async fn get_speaker_list(&self, voice_type: VoiceType) -> Result<Value> {
        info!("Fetching {} speakers", voice_type.as_str());

        let response = self
            .invoke(
                OperationKey::GetSpeakerList,
                Method::POST,
                RequestBody::empty(),
                &[],
                RequestOptions::default(),
            )
            .await?
            .into_json()?;

        let list: SpeakerListResponse = serde_json::from_value(response)?;
        list.select(voice_type)
    }

    /// Synthesize `request.text` into MP3 audio.
    pub async fn text_to_speech(&self, request: &TextToSpeechRequest) -> Result<SynthesizedAudio> {
        if request.text.trim().is_empty() {
            return Err(MobvoiError::Config("text must not be empty".to_string()));
        }
        info!(
            "Synthesizing {} chars with speaker {}",
            request.text.chars().count(),
            request.speaker
        );

        let response = self
            .invoke(
                OperationKey::TextToSpeech,
                Method::POST,
                RequestBody::json(request)?,
                &[],
                RequestOptions::binary(),
            )
            .await?;

        let bytes = match response {
            VendorResponse::Binary {
                content_type: Some(ct),
                bytes,
            } if is_json_content_type(&ct) => {
                let value: Value = serde_json::from_slice(&bytes)?;
                return Err(envelope_failure(
                    &value,
                    "text to speech returned JSON instead of audio",
                ));
            }
            VendorResponse::Binary {
                content_type: None,
                bytes,
            } if bytes.first() == Some(&b'{') => {
                let value: Value = serde_json::from_slice(&bytes)?;
                return Err(envelope_failure(
                    &value,
                    "text to speech returned JSON instead of audio",
                ));
            }
            VendorResponse::Binary { bytes, .. } => bytes,
            VendorResponse::Json(value) => {
                return Err(envelope_failure(
                    &value,
                    "text to speech returned JSON instead of audio",
                ));
            }
        };

        check_audio(&bytes)?;
        debug!("Received {} bytes of audio", bytes.len());

        Ok(SynthesizedAudio {
            bytes,
            mime_type: "audio/mpeg".to_string(),
            file_extension: "mp3".to_string(),
            file_name: tts_file_name(&request.speaker, 0),
        })
    }

    /// Clone a voice from a reference recording and return the new speaker id.
    pub async fn voice_clone(&self, request: &VoiceCloneRequest) -> Result<ClonedVoice> {
        let part = match &request.source {
            VoiceCloneSource::Url(uri) => {
                if uri.trim().is_empty() {
                    return Err(MobvoiError::Config("wavUri must not be empty".to_string()));
                }
                info!("Cloning voice from {}", uri);
                FormPart::text("wavUri", uri.as_str())
            }
            VoiceCloneSource::File(path) => {
                info!("Cloning voice from {:?}", path);
                FormPart::file("file", path.as_path(), audio_content_type(path))
            }
        };

        let value = self
            .invoke(
                OperationKey::VoiceClone,
                Method::POST,
                RequestBody::Multipart(vec![part]),
                &[],
                RequestOptions::default(),
            )
            .await?
            .into_json()?;

        if reports_failure(&value) {
            return Err(envelope_failure(&value, "voice clone failed"));
        }

        match value.get("speaker").and_then(Value::as_str) {
            Some(speaker) if !speaker.is_empty() => {
                info!("Voice cloned as speaker {}", speaker);
                Ok(ClonedVoice {
                    speaker: speaker.to_string(),
                })
            }
            _ => Err(MobvoiError::MissingField("speaker".to_string())),
        }
    }
}

fn check_audio(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(MobvoiError::Vendor("no content in response".to_string()));
    }
    if bytes.len() < MIN_AUDIO_BYTES {
        warn!("Audio payload of {} bytes is too short", bytes.len());
        return Err(MobvoiError::AudioTooShort { len: bytes.len() });
    }
    Ok(())
}

/// Detect an audio content type from the file extension
fn audio_content_type(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "aac" => "audio/aac",
        _ => OCTET_STREAM,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(audio_content_type(Path::new("voice.wav")), "audio/wav");
        assert_eq!(audio_content_type(Path::new("voice.WAV")), "audio/wav");
        assert_eq!(audio_content_type(Path::new("voice.mp3")), "audio/mpeg");
        assert_eq!(audio_content_type(Path::new("voice.m4a")), "audio/mp4");
        assert_eq!(
            audio_content_type(Path::new("voice")),
            "application/octet-stream"
        );
    }

    #[test]
    fn audio_length_threshold() {
        assert!(matches!(check_audio(&[]), Err(MobvoiError::Vendor(_))));
        assert!(matches!(
            check_audio(&[0; 99]),
            Err(MobvoiError::AudioTooShort { len: 99 })
        ));
        assert!(check_audio(&[0; 100]).is_ok());
    }
}
