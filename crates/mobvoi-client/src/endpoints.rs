//! Static `(region, operation) -> URL` catalog.

use crate::config::{MobvoiConfig, Region};
use crate::error::{MobvoiError, Result};
use crate::operation::OperationKey;
use std::collections::HashMap;

pub const MAINLAND_TTS_HOST: &str = "https://open.mobvoi.com";
pub const MAINLAND_AVATAR_HOST: &str = "https://openman.weta365.com/metaman/open";

/// Host pair for one region. `None` means the region has no such service.
#[derive(Debug, Clone, Default)]
struct Hosts {
    tts: Option<String>,
    avatar: Option<String>,
}

impl Hosts {
    fn builtin(region: Region) -> Self {
        match region {
            Region::Mainland => Self {
                tts: Some(MAINLAND_TTS_HOST.to_string()),
                avatar: Some(MAINLAND_AVATAR_HOST.to_string()),
            },
            // Reserved; the vendor has not published global hosts.
            Region::Global => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    region: Region,
    urls: HashMap<OperationKey, String>,
}

impl EndpointCatalog {
    /// The vendor's published endpoints for `region`.
    pub fn builtin(region: Region) -> Self {
        Self::from_hosts(region, Hosts::builtin(region))
    }

    /// Built-in endpoints with any host overrides from `config` applied.
    pub fn for_config(config: &MobvoiConfig) -> Self {
        let region = config.credentials.region;
        let mut hosts = Hosts::builtin(region);
        if let Some(tts) = &config.tts_host {
            hosts.tts = Some(tts.clone());
        }
        if let Some(avatar) = &config.avatar_host {
            hosts.avatar = Some(avatar.clone());
        }
        Self::from_hosts(region, hosts)
    }

    fn from_hosts(region: Region, hosts: Hosts) -> Self {
        let mut urls = HashMap::new();
        for key in OperationKey::ALL {
            let host = if key.is_tts() { &hosts.tts } else { &hosts.avatar };
            if let Some(host) = host {
                urls.insert(key, format!("{}{}", host.trim_end_matches('/'), key.path()));
            }
        }
        Self { region, urls }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Resolve an operation to its absolute URL.
    pub fn resolve(&self, operation: OperationKey) -> Result<&str> {
        self.urls
            .get(&operation)
            .map(String::as_str)
            .ok_or_else(|| MobvoiError::UnknownOperation {
                region: self.region,
                operation: operation.as_str().to_string(),
            })
    }

    /// Resolve an operation given by its catalog key, e.g. `"tts.voice_clone"`.
    pub fn resolve_key(&self, key: &str) -> Result<&str> {
        let operation = key.parse::<OperationKey>()?;
        self.resolve(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    #[test]
    fn mainland_covers_every_operation() {
        let catalog = EndpointCatalog::builtin(Region::Mainland);
        for key in OperationKey::ALL {
            let url = catalog.resolve(key).unwrap();
            assert!(url.starts_with("https://"), "{key:?} -> {url}");
        }
    }

    #[test]
    fn mainland_urls() {
        let catalog = EndpointCatalog::builtin(Region::Mainland);
        assert_eq!(
            catalog.resolve(OperationKey::TextToSpeech).unwrap(),
            "https://open.mobvoi.com/api/tts/v1"
        );
        assert_eq!(
            catalog.resolve(OperationKey::GetSpeakerList).unwrap(),
            "https://open.mobvoi.com/api/tts/getSpeakerList"
        );
        assert_eq!(
            catalog.resolve(OperationKey::VoiceClone).unwrap(),
            "https://open.mobvoi.com/clone"
        );
        assert_eq!(
            catalog.resolve(OperationKey::PhotoDriveAvatar).unwrap(),
            "https://openman.weta365.com/metaman/open/image/toman/cmp"
        );
        assert_eq!(
            catalog.resolve(OperationKey::QueryPhotoDriveAvatar).unwrap(),
            "https://openman.weta365.com/metaman/open/image/toman/cmp/result"
        );
        assert_eq!(
            catalog.resolve(OperationKey::VideoDubbing).unwrap(),
            "https://openman.weta365.com/metaman/open/video/voiceover/createTask"
        );
        assert_eq!(
            catalog.resolve(OperationKey::QueryVideoDubbing).unwrap(),
            "https://openman.weta365.com/metaman/open/video/voiceover/detail"
        );
    }

    #[test]
    fn global_region_fails_clearly() {
        let catalog = EndpointCatalog::builtin(Region::Global);
        for key in OperationKey::ALL {
            let err = catalog.resolve(key).unwrap_err();
            assert!(matches!(
                err,
                MobvoiError::UnknownOperation {
                    region: Region::Global,
                    ..
                }
            ));
        }
    }

    #[test]
    fn unknown_key_is_config_error() {
        let catalog = EndpointCatalog::builtin(Region::Mainland);
        let err = catalog.resolve_key("tts.sing").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
        assert!(catalog.resolve_key("avatar.video_dubbing").is_ok());
    }

    #[test]
    fn host_overrides() {
        let config = MobvoiConfig::new(Credentials::new("k", "s", Region::Mainland))
            .with_tts_host("http://127.0.0.1:9000/");
        let catalog = EndpointCatalog::for_config(&config);

        assert_eq!(
            catalog.resolve(OperationKey::TextToSpeech).unwrap(),
            "http://127.0.0.1:9000/api/tts/v1"
        );
        assert!(
            catalog
                .resolve(OperationKey::VideoDubbing)
                .unwrap()
                .starts_with(MAINLAND_AVATAR_HOST)
        );
    }

    #[test]
    fn global_override_populates_only_that_family() {
        let config = MobvoiConfig::new(Credentials::new("k", "s", Region::Global))
            .with_avatar_host("http://127.0.0.1:9001");
        let catalog = EndpointCatalog::for_config(&config);

        assert!(catalog.resolve(OperationKey::PhotoDriveAvatar).is_ok());
        assert!(catalog.resolve(OperationKey::TextToSpeech).is_err());
    }
}
