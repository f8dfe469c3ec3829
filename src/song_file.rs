use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::records::{self, SongRecord};
use crate::scan::LoadStat;
use crate::store::{Artist, Song, Store};

fn split_record(record: SongRecord) -> (Artist, Song) {
    let artist = Artist {
        artist_id: record.artist_id.clone(),
        name: record.artist_name,
        location: record.artist_location,
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    };

    let song = Song {
        song_id: record.song_id,
        title: record.title,
        artist_id: record.artist_id,
        year: record.year,
        duration: record.duration,
    };

    (artist, song)
}

/// Loads one song metadata file: upserts the artist, then inserts the song.
/// The record is parsed completely before anything is written.
pub fn process_song_file(conn: &Connection, path: &Path) -> Result<LoadStat> {
    debug!("song file '{}'", path.to_string_lossy());

    let (artist, song) = split_record(records::read_song_record(path)?);

    let store = Store::new(conn);
    let mut stat = LoadStat::default();

    store.upsert_artist(&artist)?;
    stat.artists += 1;

    store.create_song(&song)?;
    stat.songs += 1;

    Ok(stat)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use rusqlite::NO_PARAMS;
    use tempfile::TempDir;

    use crate::error::Error;
    use crate::store::tests::open_loader_db;

    const SONG: &str = r#"{"num_songs": 1, "artist_id": "ARMJAGH1187FB546F3", "artist_latitude": 35.14968, "artist_longitude": -90.04892, "artist_location": "Memphis, TN", "artist_name": "The Box Tops", "song_id": "SOCIWDW12A8C13D406", "title": "Soul Deep", "duration": 148.03546, "year": 1969}"#;

    #[test]
    fn song_file_copies_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("TRAAAAW128F429D538.json");
        fs::write(&path, SONG).unwrap();

        let conn = open_loader_db();
        let stat = process_song_file(&conn, &path).unwrap();
        assert_eq!(stat.artists, 1);
        assert_eq!(stat.songs, 1);

        let artist: (String, String, String, f64, f64) = conn
            .query_row(
                "SELECT artist_id, name, location, latitude, longitude FROM artist",
                NO_PARAMS,
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .unwrap();
        assert_eq!(
            artist,
            (
                "ARMJAGH1187FB546F3".to_string(),
                "The Box Tops".to_string(),
                "Memphis, TN".to_string(),
                35.14968,
                -90.04892
            )
        );

        let song: (String, String, String, f64, i64) = conn
            .query_row(
                "SELECT song_id, title, artist_id, duration, year FROM song",
                NO_PARAMS,
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .unwrap();
        assert_eq!(
            song,
            (
                "SOCIWDW12A8C13D406".to_string(),
                "Soul Deep".to_string(),
                "ARMJAGH1187FB546F3".to_string(),
                148.03546,
                1969
            )
        );
    }

    #[test]
    fn missing_field_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, SONG.replace(r#""title": "Soul Deep", "#, "")).unwrap();

        let conn = open_loader_db();
        match process_song_file(&conn, &path) {
            Err(Error::JsonError(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        let store = Store::new(&conn);
        assert_eq!(store.count("artist").unwrap(), 0);
        assert_eq!(store.count("song").unwrap(), 0);
    }
}
