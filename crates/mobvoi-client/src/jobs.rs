//! Submit and poll the vendor's asynchronous avatar jobs.
//!
//! A job is submitted once and yields a [`TaskId`]. Polling re-queries the job
//! by id and returns either a pending status object or the finished media.
//! Nothing is stored locally; the caller keeps the id and decides when to poll
//! again.

use crate::api::{Method, MobvoiApi, RequestBody, RequestOptions, VendorResponse};
use crate::error::{MobvoiError, Result};
use crate::operation::OperationKey;
use crate::types::*;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

impl MobvoiApi {
    /// Start a talking-head video driven by `audio_url` over `image_url`.
    pub async fn photo_drive_avatar(
        &self,
        request: &PhotoDriveAvatarRequest,
    ) -> Result<PhotoAvatarJob> {
        require_url("imageUrl", &request.image_url)?;
        require_url("audioUrl", &request.audio_url)?;

        let task_id = self
            .submit_job(OperationKey::PhotoDriveAvatar, RequestBody::json(request)?)
            .await?;

        Ok(PhotoAvatarJob {
            task_id,
            image_url: request.image_url.clone(),
            audio_url: request.audio_url.clone(),
        })
    }

    /// Start re-voicing `video_url` with the track at `audio_url`.
    pub async fn video_dubbing(&self, request: &VideoDubbingRequest) -> Result<DubbingJob> {
        require_url("videoUrl", &request.video_url)?;
        require_url("wavUrl", &request.audio_url)?;

        let task_id = self
            .submit_job(OperationKey::VideoDubbing, RequestBody::json(request)?)
            .await?;

        Ok(DubbingJob { task_id })
    }

    /// Poll a photo-driven avatar job; the task id is a path segment.
    pub async fn query_photo_drive_avatar(&self, task_id: &TaskId) -> Result<JobPoll> {
        let operation = OperationKey::QueryPhotoDriveAvatar;
        let url = task_url(self.endpoint(operation)?, task_id)?;

        let response = self
            .send(
                operation,
                url.as_str(),
                Method::GET,
                RequestBody::empty(),
                &[],
                RequestOptions::binary(),
            )
            .await?;

        poll_result(task_id, response)
    }

    /// Poll a dubbing job. The id goes out under both `taskId` and `taskUuid`
    /// since the vendor's endpoints disagree on the key.
    pub async fn query_video_dubbing(&self, task_id: &TaskId) -> Result<JobPoll> {
        let response = self
            .invoke(
                OperationKey::QueryVideoDubbing,
                Method::GET,
                RequestBody::empty(),
                &[("taskId", task_id.as_str()), ("taskUuid", task_id.as_str())],
                RequestOptions::binary(),
            )
            .await?;

        poll_result(task_id, response)
    }

    async fn submit_job(&self, operation: OperationKey, body: RequestBody) -> Result<TaskId> {
        info!("Submitting {} job", operation.name());

        let value = self
            .invoke(
                operation,
                Method::POST,
                body,
                &[],
                RequestOptions::default(),
            )
            .await?
            .into_json()?;

        let task_id = parse_task_id(operation, &value)?;
        info!("{} job submitted with task id {}", operation.name(), task_id);
        Ok(task_id)
    }
}

fn require_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MobvoiError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn task_url(base: &str, task_id: &TaskId) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| MobvoiError::Config(format!("invalid endpoint url '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| MobvoiError::Config(format!("endpoint url '{base}' cannot take a path")))?
        .pop_if_empty()
        .push(task_id.as_str());
    Ok(url)
}

/// Pull the task id out of a submit response.
pub(crate) fn parse_task_id(operation: OperationKey, value: &Value) -> Result<TaskId> {
    let empty = match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return Err(MobvoiError::Vendor(format!(
            "failed to call {} service",
            operation.name()
        )));
    }

    if reports_failure(value) {
        return Err(envelope_failure(value, "job submission failed"));
    }

    match value.get("taskId") {
        Some(Value::String(id)) if !id.trim().is_empty() => TaskId::new(id.as_str()),
        Some(Value::Number(id)) => TaskId::new(id.to_string()),
        _ => Err(MobvoiError::MissingTaskId),
    }
}

/// Classify a poll response as pending or completed.
pub(crate) fn poll_result(task_id: &TaskId, response: VendorResponse) -> Result<JobPoll> {
    let (content_type, bytes) = match response {
        VendorResponse::Json(raw) => return pending(task_id, raw),
        VendorResponse::Binary {
            content_type,
            bytes,
        } => (content_type, bytes),
    };

    let looks_like_json = match content_type.as_deref() {
        Some(ct) => is_json_content_type(ct),
        None => bytes.first() == Some(&b'{'),
    };

    if looks_like_json {
        let raw = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        return pending(task_id, raw);
    }

    if bytes.is_empty() {
        return Err(MobvoiError::Vendor(format!(
            "empty media payload for task {task_id}"
        )));
    }

    info!("Task {} completed ({} bytes)", task_id, bytes.len());
    Ok(JobPoll::Completed(MediaPayload {
        content_type: content_type.unwrap_or_else(|| OCTET_STREAM.to_string()),
        bytes,
    }))
}

/// A JSON poll reply is a status object unless it reports `success: false`.
fn pending(task_id: &TaskId, raw: Value) -> Result<JobPoll> {
    if reports_failure(&raw) {
        return Err(envelope_failure(&raw, "job query failed"));
    }
    debug!("Task {} still pending", task_id);
    Ok(JobPoll::Pending(JobPending { raw }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> TaskId {
        TaskId::new(s).unwrap()
    }

    #[test]
    fn task_id_extracted() {
        let task = parse_task_id(OperationKey::PhotoDriveAvatar, &json!({"taskId": "abc"}));
        assert_eq!(task.unwrap(), id("abc"));

        let numeric = parse_task_id(OperationKey::VideoDubbing, &json!({"taskId": 42}));
        assert_eq!(numeric.unwrap(), id("42"));
    }

    #[test]
    fn missing_task_id() {
        for body in [json!({"code": 0}), json!({"taskId": ""}), json!({"taskId": null})] {
            let err = parse_task_id(OperationKey::PhotoDriveAvatar, &body).unwrap_err();
            assert!(matches!(err, MobvoiError::MissingTaskId), "{body}");
            assert_eq!(err.to_string(), "failed to get task id");
        }
    }

    #[test]
    fn empty_submit_response() {
        let err = parse_task_id(OperationKey::VideoDubbing, &Value::Null).unwrap_err();
        match err {
            MobvoiError::Vendor(msg) => assert_eq!(msg, "failed to call video_dubbing service"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn vendor_reported_submit_failure() {
        let err = parse_task_id(
            OperationKey::PhotoDriveAvatar,
            &json!({"success": false, "message": "quota exceeded"}),
        )
        .unwrap_err();
        assert!(matches!(err, MobvoiError::Vendor(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn task_url_appends_segment() {
        let url = task_url("https://h/metaman/open/image/toman/cmp/result", &id("t 1")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://h/metaman/open/image/toman/cmp/result/t%201"
        );

        let trailing = task_url("https://h/result/", &id("x")).unwrap();
        assert_eq!(trailing.as_str(), "https://h/result/x");
    }

    #[test]
    fn json_poll_is_pending() {
        let poll = poll_result(
            &id("t"),
            VendorResponse::Binary {
                content_type: Some("application/json;charset=UTF-8".into()),
                bytes: br#"{"code":0,"message":"processing"}"#.to_vec(),
            },
        )
        .unwrap();
        match poll {
            JobPoll::Pending(p) => assert_eq!(p.message(), Some("processing")),
            JobPoll::Completed(_) => panic!("expected pending"),
        }
    }

    #[test]
    fn media_poll_is_completed() {
        let poll = poll_result(
            &id("t"),
            VendorResponse::Binary {
                content_type: Some("video/mp4".into()),
                bytes: vec![0, 0, 0, 24, b'f', b't', b'y', b'p'],
            },
        )
        .unwrap();
        match poll {
            JobPoll::Completed(media) => {
                assert_eq!(media.content_type, "video/mp4");
                assert_eq!(media.bytes.len(), 8);
            }
            JobPoll::Pending(_) => panic!("expected completed"),
        }
    }

    #[test]
    fn missing_content_type_sniffed() {
        let pending = poll_result(
            &id("t"),
            VendorResponse::Binary {
                content_type: None,
                bytes: br#"{"status":"running"}"#.to_vec(),
            },
        )
        .unwrap();
        assert!(!pending.is_completed());

        let done = poll_result(
            &id("t"),
            VendorResponse::Binary {
                content_type: None,
                bytes: vec![1, 2, 3],
            },
        )
        .unwrap();
        match done {
            JobPoll::Completed(media) => {
                assert_eq!(media.content_type, "application/octet-stream");
            }
            JobPoll::Pending(_) => panic!("expected completed"),
        }
    }

    #[test]
    fn failed_query_is_an_error() {
        let err = poll_result(
            &id("t"),
            VendorResponse::Json(json!({"success": false, "message": "task not found"})),
        )
        .unwrap_err();
        assert!(matches!(err, MobvoiError::Vendor(ref m) if m == "task not found"));

        let err = poll_result(
            &id("t"),
            VendorResponse::Binary {
                content_type: None,
                bytes: br#"{"success":false}"#.to_vec(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, MobvoiError::Vendor(ref m) if m == "job query failed"));
    }

    #[test]
    fn empty_media_is_an_error() {
        let err = poll_result(
            &id("t"),
            VendorResponse::Binary {
                content_type: Some("video/mp4".into()),
                bytes: vec![],
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Vendor);
    }
}
