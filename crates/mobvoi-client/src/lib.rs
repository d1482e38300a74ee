//! Client for the Mobvoi text-to-speech and avatar-generation API
//!
//! Every request is signed with a fresh MD5 signature, routed through a
//! per-region endpoint catalog, and its response reshaped into typed values.
//! Avatar video and dubbing jobs run asynchronously on the vendor side: submit
//! returns a [`TaskId`], and polling with that id yields either a pending
//! status or the finished media.
//!
//! # Examples
//!
//! ## Text to speech
//!
//! ```no_run
//! use mobvoi_client::{MobvoiApi, TextToSpeechRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads MOBVOI_APP_KEY / MOBVOI_APP_SECRET / MOBVOI_APP_REGION
//!     let api = MobvoiApi::from_env()?;
//!
//!     let request = TextToSpeechRequest::new("你好，欢迎使用").with_speaker("xiaoyi_meet");
//!     let audio = api.text_to_speech(&request).await?;
//!
//!     tokio::fs::write(&audio.file_name, &audio.bytes).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Submitting and polling an avatar job
//!
//! ```no_run
//! use mobvoi_client::{JobPoll, MobvoiApi, PhotoDriveAvatarRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = MobvoiApi::from_env()?;
//!
//!     let job = api
//!         .photo_drive_avatar(&PhotoDriveAvatarRequest {
//!             image_url: "https://example.com/face.png".to_string(),
//!             audio_url: "https://example.com/speech.mp3".to_string(),
//!         })
//!         .await?;
//!
//!     // Later, possibly from another process:
//!     match api.query_photo_drive_avatar(&job.task_id).await? {
//!         JobPoll::Completed(media) => println!("{} bytes of {}", media.bytes.len(), media.content_type),
//!         JobPoll::Pending(status) => println!("still running: {:?}", status.message()),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod jobs;
pub mod operation;
pub mod signer;
pub mod tts;
pub mod types;

// Re-export main types
pub use api::{
    FormPart, Method, MobvoiApi, RequestBody, RequestOptions, ResponseMode, VendorResponse,
    attach_signature,
};
pub use config::{Credentials, MobvoiConfig, Region};
pub use endpoints::EndpointCatalog;
pub use error::{ErrorKind, MobvoiError, Result};
pub use operation::{Operation, OperationKey, OperationOutput};
pub use signer::{Signature, sign, sign_at};
pub use types::{
    ClonedVoice, DubbingJob, JobPending, JobPoll, MediaPayload, PhotoAvatarJob,
    PhotoDriveAvatarRequest, SynthesizedAudio, TaskId, TextToSpeechRequest, VideoDubbingRequest,
    VoiceCloneRequest, VoiceCloneSource, VoiceType, tts_file_name,
};
