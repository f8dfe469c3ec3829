use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One line of a song metadata file.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    pub artist_id: String,
    pub artist_name: String,
    #[serde(deserialize_with = "nullable")]
    pub artist_location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub artist_latitude: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub artist_longitude: Option<f64>,
    pub song_id: String,
    pub title: String,
    pub year: i64,
    pub duration: f64,
}

/// User fields of one activity log event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(deserialize_with = "user_id")]
    pub user_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub gender: Option<String>,
    pub level: String,
}

/// Play fields of one activity log event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub ts: i64,
    #[serde(deserialize_with = "user_id")]
    pub user_id: i64,
    pub level: String,
    #[serde(deserialize_with = "nullable")]
    pub song: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub artist: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub length: Option<f64>,
    pub session_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub user_agent: Option<String>,
}

// Field must be present, but may be null.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

fn user_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid userId '{}'", s))),
    }
}

/// Reads a line-delimited JSON file. Blank lines are skipped, every other
/// line must hold one JSON object.
pub fn read_objects(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let reader = BufReader::new(File::open(path)?);

    let mut result = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&line)? {
            Value::Object(map) => result.push(map),
            _ => return Err(Error::NotAnObject(i + 1)),
        }
    }

    Ok(result)
}

pub fn read_song_record(path: &Path) -> Result<SongRecord> {
    let first = match read_objects(path)?.into_iter().next() {
        Some(o) => o,
        None => return Err(Error::EmptyFile),
    };

    Ok(serde_json::from_value(Value::Object(first))?)
}

pub fn from_object<T: DeserializeOwned>(object: &Map<String, Value>) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(object.clone()))?)
}

pub fn event_ts(object: &Map<String, Value>) -> Result<i64> {
    match object.get("ts") {
        Some(ts) => Ok(serde_json::from_value(ts.clone())?),
        None => Err(Error::MissingField("ts")),
    }
}

pub fn is_next_song(object: &Map<String, Value>) -> Result<bool> {
    match object.get("page") {
        Some(page) => Ok(page.as_str() == Some("NextSong")),
        None => Err(Error::MissingField("page")),
    }
}
