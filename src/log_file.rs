use std::path::Path;

use chrono::prelude::*;
use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::records::{self, LogEvent, UserRecord};
use crate::scan::LoadStat;
use crate::store::{SongPlay, Store, Time, User};

/// Decomposes an epoch millisecond timestamp (UTC). Day of week and week
/// follow ISO 8601: Monday is 1, week 1 contains the first Thursday.
pub fn time_from_millis(ts: i64) -> Result<Time> {
    let dt = match Utc.timestamp_millis_opt(ts).single() {
        Some(dt) => dt,
        None => return Err(Error::InvalidTimestamp(ts)),
    };

    Ok(Time {
        hour: dt.hour(),
        day_of_week: dt.weekday().number_from_monday(),
        week: dt.iso_week().week(),
        month: dt.month(),
        year: dt.year(),
    })
}

fn read_events(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let mut events = Vec::new();

    for object in records::read_objects(path)? {
        if records::is_next_song(&object)? {
            events.push(object);
        }
    }

    Ok(events)
}

/// Loads one activity log file. Reading, filtering and timestamp conversion
/// fail the whole file; an event whose other fields don't convert, or a
/// failing statement, only skips its row.
pub fn process_log_file(conn: &Connection, path: &Path) -> Result<LoadStat> {
    let name = path.to_string_lossy();

    let events = read_events(path)?;

    debug!("log file '{}': {} NextSong events", name, events.len());

    let times = events
        .iter()
        .map(|e| records::event_ts(e).and_then(time_from_millis))
        .collect::<Result<Vec<Time>>>()?;

    let store = Store::new(conn);
    let mut stat = LoadStat::default();

    for (i, time) in times.iter().enumerate() {
        match store.create_time(time) {
            Ok(_) => stat.times += 1,
            Err(e) => {
                error!("can't insert time row {} of '{}': {}", i, name, e);
                stat.skipped_rows += 1;
            }
        }
    }

    for (i, object) in events.iter().enumerate() {
        let record: UserRecord = match records::from_object(object) {
            Ok(r) => r,
            Err(e) => {
                error!("can't read user row {} of '{}': {}", i, name, e);
                stat.skipped_rows += 1;
                continue;
            }
        };

        let user = User {
            user_id: record.user_id,
            first_name: record.first_name,
            last_name: record.last_name,
            gender: record.gender,
            level: record.level,
        };

        match store.upsert_user(&user) {
            Ok(()) => stat.users += 1,
            Err(e) => {
                error!("can't upsert user row {} of '{}': {}", i, name, e);
                stat.skipped_rows += 1;
            }
        }
    }

    for (i, object) in events.iter().enumerate() {
        let event: LogEvent = match records::from_object(object) {
            Ok(e) => e,
            Err(e) => {
                error!("can't read songplay row {} of '{}': {}", i, name, e);
                stat.skipped_rows += 1;
                continue;
            }
        };

        let found = match store.find_song(
            event.song.as_deref(),
            event.artist.as_deref(),
            event.length,
        ) {
            Ok(f) => f,
            Err(e) => {
                error!("can't look up song for row {} of '{}': {}", i, name, e);
                stat.skipped_rows += 1;
                continue;
            }
        };

        let (song_id, artist_id) = match found {
            Some((song_id, artist_id)) => (Some(song_id), Some(artist_id)),
            None => {
                stat.unmatched += 1;
                (None, None)
            }
        };

        let songplay = SongPlay {
            timestamp: event.ts,
            user_id: event.user_id,
            level: event.level,
            song_id,
            artist_id,
            session_id: event.session_id,
            location: event.location,
            user_agent: event.user_agent,
        };

        match store.create_songplay(&songplay) {
            Ok(_) => stat.songplays += 1,
            Err(e) => {
                error!("can't insert songplay row {} of '{}': {}", i, name, e);
                stat.skipped_rows += 1;
            }
        }
    }

    Ok(stat)
}
