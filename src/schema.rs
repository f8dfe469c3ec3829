pub const SCHEMA_VERSION: u32 = 1;

pub const META_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS loader_meta (
    key TEXT PRIMARY KEY,
    value);
";

pub const DROP_SCHEMA: &str = "
DROP TABLE IF EXISTS songplay;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS song;
DROP TABLE IF EXISTS artist;
DROP TABLE IF EXISTS time;
DELETE FROM loader_meta WHERE key = 'schema';
";

pub const LOADER_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS artist (
    artist_id TEXT PRIMARY KEY,
    name TEXT,
    location TEXT,
    latitude REAL,
    longitude REAL);

CREATE TABLE IF NOT EXISTS song (
    song_id TEXT NOT NULL,
    title TEXT,
    artist_id TEXT REFERENCES artist(artist_id),
    duration REAL,
    year INTEGER);

CREATE INDEX IF NOT EXISTS song_song_id ON song (song_id);
CREATE INDEX IF NOT EXISTS song_lookup ON song (title, duration);

CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    gender TEXT CHECK (gender IN ('F', 'M')),
    level TEXT);

CREATE TABLE IF NOT EXISTS time (
    time_id INTEGER PRIMARY KEY AUTOINCREMENT,
    hour INTEGER,
    day_of_week INTEGER,
    week INTEGER,
    month INTEGER,
    year INTEGER);

CREATE TABLE IF NOT EXISTS songplay (
    songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER,
    user_id INTEGER,
    level TEXT,
    song_id TEXT,
    artist_id TEXT REFERENCES artist(artist_id),
    session_id INTEGER,
    location TEXT,
    user_agent TEXT);
";

pub const ARTIST_UPSERT: &str = "
INSERT INTO artist (artist_id, name, location, latitude, longitude)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT (artist_id) DO UPDATE SET
    name = excluded.name,
    location = excluded.location,
    latitude = excluded.latitude,
    longitude = excluded.longitude";

pub const SONG_INSERT: &str = "
INSERT INTO song (song_id, title, artist_id, year, duration)
VALUES (?, ?, ?, ?, ?)";

pub const USER_UPSERT: &str = "
INSERT INTO users (user_id, first_name, last_name, gender, level)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT (user_id) DO UPDATE SET
    first_name = excluded.first_name,
    last_name = excluded.last_name,
    gender = excluded.gender,
    level = excluded.level";

pub const TIME_INSERT: &str = "
INSERT INTO time (hour, day_of_week, week, month, year)
VALUES (?, ?, ?, ?, ?)";

pub const SONGPLAY_INSERT: &str = "
INSERT INTO songplay (timestamp, user_id, level, song_id, artist_id, session_id, location, user_agent)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

pub const SONG_SELECT: &str = "
SELECT song.song_id, song.artist_id
FROM song
INNER JOIN artist ON artist.artist_id = song.artist_id
WHERE song.title = ? AND artist.name = ? AND song.duration = ?
LIMIT 1";
