//! Subcommand arguments and handlers.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use mobvoi_client::{
    JobPoll, MobvoiApi, MobvoiError, Operation, OperationOutput, PhotoDriveAvatarRequest, TaskId,
    TextToSpeechRequest, VideoDubbingRequest, VoiceCloneRequest, VoiceType,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::info;

/// Speaker subset selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VoiceTypeArg {
    #[default]
    All,
    System,
    #[value(name = "voice_cloning")]
    VoiceCloning,
}

impl From<VoiceTypeArg> for VoiceType {
    fn from(arg: VoiceTypeArg) -> Self {
        match arg {
            VoiceTypeArg::All => VoiceType::All,
            VoiceTypeArg::System => VoiceType::System,
            VoiceTypeArg::VoiceCloning => VoiceType::VoiceCloning,
        }
    }
}

#[derive(Args, Debug)]
pub struct SpeakersArgs {
    /// Which speakers to list
    #[arg(long, value_enum, default_value_t = VoiceTypeArg::All)]
    pub voice_type: VoiceTypeArg,
}

#[derive(Args, Debug)]
pub struct TtsArgs {
    /// Text to synthesize
    #[arg(short, long)]
    pub text: String,

    #[arg(long, default_value = "xiaoyi_meet")]
    pub speaker: String,

    #[arg(long, default_value = "mp3")]
    pub audio_type: String,

    #[arg(long, default_value = "1.0")]
    pub speed: String,

    /// Sample rate in Hz
    #[arg(long, default_value = "24000")]
    pub rate: String,

    #[arg(long, default_value = "1")]
    pub volume: String,

    #[arg(long, default_value = "0.0")]
    pub pitch: String,

    #[arg(long)]
    pub streaming: bool,

    /// Output file (default: tts_<speaker>_0.mp3)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl TtsArgs {
    fn request(&self) -> TextToSpeechRequest {
        TextToSpeechRequest {
            text: self.text.clone(),
            speaker: self.speaker.clone(),
            audio_type: self.audio_type.clone(),
            speed: self.speed.clone(),
            rate: self.rate.clone(),
            volume: self.volume.clone(),
            pitch: self.pitch.clone(),
            streaming: self.streaming,
        }
    }
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct CloneArgs {
    /// Remote recording the vendor downloads
    #[arg(long)]
    pub url: Option<String>,

    /// Local recording to upload
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl CloneArgs {
    fn request(&self) -> Result<VoiceCloneRequest> {
        match (&self.url, &self.file) {
            (Some(url), None) => Ok(VoiceCloneRequest::url(url)),
            (None, Some(file)) => Ok(VoiceCloneRequest::file(file)),
            _ => anyhow::bail!("exactly one of --url or --file is required"),
        }
    }
}

#[derive(Args, Debug)]
pub struct PhotoAvatarArgs {
    /// Image showing the face to animate
    #[arg(long)]
    pub image_url: String,

    /// Audio driving the animation
    #[arg(long)]
    pub audio_url: String,
}

#[derive(Args, Debug)]
pub struct DubArgs {
    /// Video to re-voice
    #[arg(long)]
    pub video_url: String,

    /// Replacement audio track
    #[arg(long)]
    pub audio_url: String,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Task id returned at submission
    #[arg(long)]
    pub task_id: String,

    /// Where to save the finished video (default: <task_id>.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn describe(err: MobvoiError) -> anyhow::Error {
    anyhow::anyhow!(err.describe())
}

async fn run(api: &MobvoiApi, operation: Operation) -> Result<OperationOutput> {
    let key = operation.key();
    api.execute(operation)
        .await
        .map_err(describe)
        .with_context(|| format!("{} failed", key.name()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub(crate) async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

pub async fn speakers(api: &MobvoiApi, args: SpeakersArgs) -> Result<()> {
    let output = run(
        api,
        Operation::GetSpeakerList {
            voice_type: args.voice_type.into(),
        },
    )
    .await?;
    print_json(&output.to_json())
}

pub async fn tts(api: &MobvoiApi, args: TtsArgs) -> Result<()> {
    let output = run(api, Operation::TextToSpeech(args.request())).await?;

    if let OperationOutput::Audio(audio) = &output {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&audio.file_name));
        write_output(&path, &audio.bytes).await?;

        let mut summary = output.to_json();
        summary["path"] = json!(path.display().to_string());
        return print_json(&summary);
    }
    print_json(&output.to_json())
}

pub async fn clone(api: &MobvoiApi, args: CloneArgs) -> Result<()> {
    let output = run(api, Operation::VoiceClone(args.request()?)).await?;
    print_json(&output.to_json())
}

pub async fn photo_avatar(api: &MobvoiApi, args: PhotoAvatarArgs) -> Result<()> {
    let request = PhotoDriveAvatarRequest {
        image_url: args.image_url,
        audio_url: args.audio_url,
    };
    let output = run(api, Operation::PhotoDriveAvatar(request)).await?;
    print_json(&output.to_json())
}

pub async fn dub(api: &MobvoiApi, args: DubArgs) -> Result<()> {
    let request = VideoDubbingRequest {
        video_url: args.video_url,
        audio_url: args.audio_url,
    };
    let output = run(api, Operation::VideoDubbing(request)).await?;
    print_json(&output.to_json())
}

pub async fn query_photo_avatar(api: &MobvoiApi, args: QueryArgs) -> Result<()> {
    let task_id = parse_task_id(&args.task_id)?;
    let output = run(
        api,
        Operation::QueryPhotoDriveAvatar {
            task_id: task_id.clone(),
        },
    )
    .await?;
    save_poll(&task_id, args.output, output).await
}

pub async fn query_dub(api: &MobvoiApi, args: QueryArgs) -> Result<()> {
    let task_id = parse_task_id(&args.task_id)?;
    let output = run(
        api,
        Operation::QueryVideoDubbing {
            task_id: task_id.clone(),
        },
    )
    .await?;
    save_poll(&task_id, args.output, output).await
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::new(raw).map_err(describe)
}

/// Save a finished job's media; a pending job just reports its status.
async fn save_poll(
    task_id: &TaskId,
    output_path: Option<PathBuf>,
    output: OperationOutput,
) -> Result<()> {
    let mut summary = output.to_json();

    if let OperationOutput::Poll(JobPoll::Completed(media)) = &output {
        let path = output_path
            .unwrap_or_else(|| default_media_path(task_id, media.file_extension()));
        write_output(&path, &media.bytes).await?;
        summary["path"] = json!(path.display().to_string());
    } else {
        info!("Task {} is still running; poll again later", task_id);
    }

    summary["taskId"] = json!(task_id.as_str());
    print_json(&summary)
}

fn default_media_path(task_id: &TaskId, extension: &str) -> PathBuf {
    let stem: String = task_id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    PathBuf::from(format!("{stem}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        clone: CloneArgs,
    }

    #[test]
    fn clone_requires_exactly_one_source() {
        assert!(Harness::try_parse_from(["t", "--url", "https://x/a.wav"]).is_ok());
        assert!(Harness::try_parse_from(["t", "--file", "a.wav"]).is_ok());
        assert!(Harness::try_parse_from(["t", "--url", "u", "--file", "f"]).is_err());
        assert!(Harness::try_parse_from(["t"]).is_err());
    }

    #[test]
    fn clone_request_from_args() {
        let args = CloneArgs {
            url: None,
            file: Some(PathBuf::from("ref.wav")),
        };
        assert_eq!(args.request().unwrap(), VoiceCloneRequest::file("ref.wav"));
    }

    #[test]
    fn tts_args_map_to_request() {
        #[derive(Parser, Debug)]
        struct TtsHarness {
            #[command(flatten)]
            tts: TtsArgs,
        }

        let parsed =
            TtsHarness::try_parse_from(["t", "--text", "hello", "--speed", "1.2", "--streaming"])
                .unwrap();
        let request = parsed.tts.request();

        assert_eq!(request.text, "hello");
        assert_eq!(request.speed, "1.2");
        assert!(request.streaming);
        assert_eq!(request.speaker, "xiaoyi_meet");
        assert_eq!(request.rate, "24000");
    }

    #[test]
    fn voice_type_names() {
        assert_eq!(
            VoiceType::from(VoiceTypeArg::from_str("voice_cloning", false).unwrap()),
            VoiceType::VoiceCloning
        );
    }

    #[test]
    fn media_path_is_filesystem_safe() {
        let id = TaskId::new("abc/123 x").unwrap();
        assert_eq!(default_media_path(&id, "mp4"), PathBuf::from("abc_123_x.mp4"));
    }

    #[test]
    fn empty_task_id_rejected() {
        assert!(parse_task_id("").is_err());
    }

    #[tokio::test]
    async fn write_output_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/video.mp4");

        write_output(&path, b"data").await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"data");
    }
}
