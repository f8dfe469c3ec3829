#[macro_use]
extern crate log;

mod db_meta;
mod error;
mod log_file;
mod logger;
mod records;
mod scan;
mod schema;
mod song_file;
mod store;

use std::path::{Path, PathBuf};

use clap::{App, Arg, ArgMatches, SubCommand};
use log::LevelFilter;
use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::store::Store;

struct Config {
    db_path: PathBuf,
    song_data: PathBuf,
    log_data: PathBuf,
    log_file: PathBuf,
    log_level: LevelFilter,
}

fn path_arg(matches: &ArgMatches, name: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(matches.value_of(name).unwrap_or("")).into_owned())
}

impl Config {
    fn from_matches(matches: &ArgMatches) -> Config {
        Config {
            db_path: path_arg(matches, "db"),
            song_data: path_arg(matches, "song-data"),
            log_data: path_arg(matches, "log-data"),
            log_file: path_arg(matches, "log-file"),
            log_level: matches
                .value_of("log-level")
                .and_then(|l| l.parse().ok())
                .unwrap_or(LevelFilter::Error),
        }
    }
}

fn load(conn: &mut Connection, config: &Config) -> Result<()> {
    if !db_meta::ensure_schema(conn)? {
        return Err(Error::SchemaMismatch);
    }

    let mut stat = scan::process_data(conn, &config.song_data, song_file::process_song_file)?;
    stat.add(&scan::process_data(
        conn,
        &config.log_data,
        log_file::process_log_file,
    )?);

    let store = Store::new(conn);
    for table in store::TABLES.iter() {
        info!("{}: {} rows", table, store.count(table)?);
    }

    info!("load finished: {:?}", stat);

    Ok(())
}

fn create_tables(conn: &mut Connection, db_path: &Path) -> Result<()> {
    db_meta::reset_schema(conn)?;
    println!("tables created in {}", db_path.to_string_lossy());
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let (command, sub_matches) = matches.subcommand();
    let config = Config::from_matches(sub_matches.unwrap_or(matches));

    logger::init(&config.log_file, config.log_level)?;

    info!("using '{}'", config.db_path.to_string_lossy());

    let mut conn = db_meta::open(&config.db_path)?;

    match command {
        "create-tables" => create_tables(&mut conn, &config.db_path)?,
        _ => load(&mut conn, &config)?,
    }

    conn.close().map_err(|(_, e)| e)?;

    Ok(())
}

fn main() {
    let matches = App::new("sparkify-etl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Loads song metadata and activity logs into the sparkify database")
        .arg(
            Arg::with_name("db")
                .long("db")
                .value_name("PATH")
                .help("SQLite database file")
                .env("SPARKIFY_DB")
                .default_value("sparkify.db")
                .global(true),
        )
        .arg(
            Arg::with_name("song-data")
                .long("song-data")
                .value_name("DIR")
                .help("Root of the song metadata tree")
                .env("SPARKIFY_SONG_DATA")
                .default_value("data/song_data")
                .global(true),
        )
        .arg(
            Arg::with_name("log-data")
                .long("log-data")
                .value_name("DIR")
                .help("Root of the activity log tree")
                .env("SPARKIFY_LOG_DATA")
                .default_value("data/log_data")
                .global(true),
        )
        .arg(
            Arg::with_name("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("File that errors are appended to")
                .env("SPARKIFY_LOG_FILE")
                .default_value("etl.log")
                .global(true),
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Lowest level written to the log file")
                .env("SPARKIFY_LOG_LEVEL")
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .default_value("error")
                .global(true),
        )
        .subcommand(SubCommand::with_name("load").about("Loads both data trees (default)"))
        .subcommand(
            SubCommand::with_name("create-tables").about("Drops and recreates every table"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        error!("{}", e);
        log::logger().flush();

        eprintln!("sparkify-etl: {}", e);
        std::process::exit(1);
    }

    log::logger().flush();
}
