use mobvoi_client::{Credentials, MobvoiApi, MobvoiConfig, Region};
use mockito::{Matcher, ServerGuard};
use serde_json::json;

pub const KEY: &str = "test-app-key";
pub const SECRET: &str = "test-app-secret";

/// Client whose both host families point at the mock server.
pub fn api_for(server: &ServerGuard) -> MobvoiApi {
    let config = MobvoiConfig::new(Credentials::new(KEY, SECRET, Region::Mainland))
        .with_tts_host(server.url())
        .with_avatar_host(server.url());
    MobvoiApi::new(config).unwrap()
}

/// Matches a JSON body carrying a well-formed signature for [`KEY`].
pub fn signed_json() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::PartialJson(json!({ "appKey": KEY })),
        Matcher::Regex(r#""signature":"[0-9a-f]{32}""#.to_string()),
        Matcher::Regex(r#""timestamp":"[0-9]{10}""#.to_string()),
    ])
}

pub fn audio_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
