use rusqlite::{params, Connection, OptionalExtension, Result, NO_PARAMS};

use crate::schema;

pub const TABLES: [&str; 5] = ["artist", "song", "users", "time", "songplay"];

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
}

/// Calendar breakdown of one event timestamp.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Time {
    pub hour: u32,
    pub day_of_week: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongPlay {
    pub timestamp: i64,
    pub user_id: i64,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Statement execution against the loader tables. Borrows the connection, so
/// it works the same on a plain connection and inside a transaction.
pub struct Store<'a> {
    conn: &'a Connection,
}

impl<'a> Store<'a> {
    pub fn new(conn: &'a Connection) -> Store<'a> {
        Store { conn }
    }

    pub fn upsert_artist(&self, artist: &Artist) -> Result<()> {
        trace!("upsert {:?}", artist);

        let mut st = self.conn.prepare_cached(schema::ARTIST_UPSERT)?;
        st.execute(params![
            artist.artist_id,
            artist.name,
            artist.location,
            artist.latitude,
            artist.longitude,
        ])?;

        Ok(())
    }

    pub fn create_song(&self, song: &Song) -> Result<()> {
        trace!("create {:?}", song);

        let mut st = self.conn.prepare_cached(schema::SONG_INSERT)?;
        st.execute(params![
            song.song_id,
            song.title,
            song.artist_id,
            song.year,
            song.duration,
        ])?;

        Ok(())
    }

    pub fn upsert_user(&self, user: &User) -> Result<()> {
        trace!("upsert {:?}", user);

        let mut st = self.conn.prepare_cached(schema::USER_UPSERT)?;
        st.execute(params![
            user.user_id,
            user.first_name,
            user.last_name,
            user.gender,
            user.level,
        ])?;

        Ok(())
    }

    pub fn create_time(&self, time: &Time) -> Result<i64> {
        let mut st = self.conn.prepare_cached(schema::TIME_INSERT)?;
        st.execute(params![
            time.hour,
            time.day_of_week,
            time.week,
            time.month,
            time.year,
        ])?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_songplay(&self, songplay: &SongPlay) -> Result<i64> {
        trace!("create {:?}", songplay);

        let mut st = self.conn.prepare_cached(schema::SONGPLAY_INSERT)?;
        st.execute(params![
            songplay.timestamp,
            songplay.user_id,
            songplay.level,
            songplay.song_id,
            songplay.artist_id,
            songplay.session_id,
            songplay.location,
            songplay.user_agent,
        ])?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Resolves a played song to `(song_id, artist_id)` by exact title,
    /// artist name and duration.
    pub fn find_song(
        &self,
        title: Option<&str>,
        artist_name: Option<&str>,
        duration: Option<f64>,
    ) -> Result<Option<(String, String)>> {
        trace!(
            "find song title={:?} artist={:?} duration={:?}",
            title,
            artist_name,
            duration
        );

        let mut st = self.conn.prepare_cached(schema::SONG_SELECT)?;
        st.query_row(params![title, artist_name, duration], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()
    }

    pub fn count(&self, table: &str) -> Result<i64> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table),
            NO_PARAMS,
            |row| row.get(0),
        )
    }
}
