mod config;

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use config::{apply_overrides, config_path_from_env, load_config, resolve_path};
use database::Database;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (mut config, loaded) = load_config(&config_path)?;
    if loaded {
        info!("Loaded config from {:?}", config_path);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    apply_overrides(
        &mut config,
        env::var("MPD_DB_PATH").ok(),
        env::var("MUSIC_DIR").ok(),
        &args,
    );
    if config.db_path.trim().is_empty() {
        return Err("MPD_DB_PATH not set and no path argument".into());
    }

    let db_path = PathBuf::from(&config.db_path);
    let music_dir = config.music_dir.as_deref().map(PathBuf::from);
    let db = Database::read_file(&db_path, music_dir)?;

    info!(
        "Format {}, MPD {}, {} tags",
        db.format_version(),
        db.mpd_version(),
        db.supported_tags().len()
    );
    println!("Songs: {}", db.song_count());

    let total_secs: f64 = db.songs().iter().filter_map(|song| song.duration()).sum();
    println!("Total duration: {:.0}s", total_secs);

    if let Some(first) = db.songs().first() {
        if let Some(id) = first.stable_id() {
            info!("First song id {}", id);
        }
        match first.fs_path() {
            Ok(path) => info!("First song at {:?}", path),
            Err(err) => warn!("First song at {:?} ({})", first.path(), err),
        }
    }

    if let Some(output) = config.table_output.as_deref() {
        let output = resolve_path(&config_path, output);
        let table = db.to_table();
        let writer = BufWriter::new(File::create(&output)?);
        serde_json::to_writer_pretty(writer, &table)?;
        info!("Wrote {} rows to {:?}", table.len(), output);
    }

    Ok(())
}
