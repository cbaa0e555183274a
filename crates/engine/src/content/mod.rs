mod level;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use level::{
    load_level, parse_level, LevelDef, LevelLoadError, StaticBoxDef, TriggerActionDef,
    TriggerDef, TriggerModeDef, DEFAULT_SPAWN_YAW,
};

/// JSON failure with the path of the offending field, e.g. `triggers[1].corner_a`.
#[derive(Debug, Error)]
#[error("{}", render_json_error(.json_path, .source))]
pub struct JsonParseError {
    pub json_path: String,
    #[source]
    pub source: serde_json::Error,
}

fn render_json_error(json_path: &str, source: &serde_json::Error) -> String {
    if json_path.is_empty() || json_path == "." {
        source.to_string()
    } else {
        format!("at {json_path}: {source}")
    }
}

pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, JsonParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        JsonParseError {
            json_path,
            source: error.into_inner(),
        }
    })
}
