use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::Connection;

use crate::error::Result;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadStat {
    pub files: i32,
    pub failed_files: i32,
    pub artists: i32,
    pub songs: i32,
    pub users: i32,
    pub times: i32,
    pub songplays: i32,
    pub unmatched: i32,
    pub skipped_rows: i32,
}

impl LoadStat {
    pub fn add(&mut self, other: &LoadStat) {
        self.files += other.files;
        self.failed_files += other.failed_files;
        self.artists += other.artists;
        self.songs += other.songs;
        self.users += other.users;
        self.times += other.times;
        self.songplays += other.songplays;
        self.unmatched += other.unmatched;
        self.skipped_rows += other.skipped_rows;
    }
}

/// Recursively lists every file under `root` with the given extension,
/// sorted by path. Unreadable subdirectories are logged and skipped.
pub fn collect_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let root = fs::canonicalize(root)?;

    let mut result = Vec::new();
    let mut pending = vec![root.clone()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if dir == root => return Err(e.into()),
            Err(e) => {
                error!("can't read directory '{}': {}", dir.to_string_lossy(), e);
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    error!("can't read entry in '{}': {}", dir.to_string_lossy(), e);
                    continue;
                }
            };

            let path = entry.path();

            match entry.file_type() {
                Ok(t) if t.is_dir() => pending.push(path),
                Ok(_) => {
                    if path.extension() == Some(OsStr::new(extension)) && path.is_file() {
                        result.push(path);
                    }
                }
                Err(e) => {
                    error!("can't stat '{}': {}", path.to_string_lossy(), e);
                }
            }
        }
    }

    result.sort();

    Ok(result)
}

/// Runs `extractor` over every `.json` file under `root`, committing after
/// each file. A failing file is logged; whatever it wrote before failing is
/// still committed. Failing to begin or commit a transaction is fatal.
pub fn process_data<F>(conn: &mut Connection, root: &Path, extractor: F) -> Result<LoadStat>
where
    F: Fn(&Connection, &Path) -> Result<LoadStat>,
{
    let start_instant = Instant::now();

    let files = collect_files(root, "json")?;
    let total = files.len();

    println!("{} files found in {}", total, root.to_string_lossy());
    info!("{} files found in '{}'", total, root.to_string_lossy());

    let mut stat = LoadStat::default();

    for (i, path) in files.iter().enumerate() {
        let tx = conn.transaction()?;

        match extractor(&tx, path) {
            Ok(s) => stat.add(&s),
            Err(e) => {
                error!("can't process '{}': {}", path.to_string_lossy(), e);
                stat.failed_files += 1;
            }
        }

        tx.commit()?;
        stat.files += 1;

        println!("{}/{} files processed.", i + 1, total);
    }

    info!(
        "'{}' done in {}s: {:?}",
        root.to_string_lossy(),
        start_instant.elapsed().as_secs(),
        stat
    );

    Ok(stat)
}
