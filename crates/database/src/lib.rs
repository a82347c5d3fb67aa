mod parser;
mod song;
mod source;
#[cfg(feature = "table")]
mod table;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use schema::Schema;
use tracing::info;

pub use schema::{DURATION_TAG, MTIME_TAG, PATH_TAG};
pub use song::{PathError, Song, SongBuilder, Value};
pub use source::open_lines;
#[cfg(feature = "table")]
pub use table::{Cell, Table};

pub const SUPPORTED_FORMAT_VERSION: i64 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Database {
    format_version: i64,
    mpd_version: String,
    schema: Arc<Schema>,
    songs: Vec<Song>,
}

impl Database {
    pub fn new<I, S>(
        format_version: i64,
        mpd_version: Option<String>,
        supported_tags: I,
    ) -> Result<Self, DatabaseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_schema(format_version, mpd_version, Schema::from_names(supported_tags))
    }

    pub(crate) fn with_schema(
        format_version: i64,
        mpd_version: Option<String>,
        schema: Arc<Schema>,
    ) -> Result<Self, DatabaseError> {
        if format_version != SUPPORTED_FORMAT_VERSION {
            return Err(DatabaseError::UnsupportedFormat(format_version));
        }
        let mpd_version = match mpd_version {
            Some(version) if !version.trim().is_empty() => version,
            _ => return Err(DatabaseError::MissingMpdVersion),
        };
        Ok(Self {
            format_version,
            mpd_version,
            schema,
            songs: Vec::new(),
        })
    }

    pub fn read_file(path: &Path, music_dir: Option<PathBuf>) -> Result<Self, DatabaseError> {
        let reader = open_lines(path)?;
        let db = Self::read_from(reader, music_dir)?;
        info!(
            "Read {} songs with {} tags from {:?}",
            db.song_count(),
            db.supported_tags().len(),
            path
        );
        Ok(db)
    }

    pub fn read_from<R: BufRead>(
        reader: R,
        music_dir: Option<PathBuf>,
    ) -> Result<Self, DatabaseError> {
        let music_dir: Option<Arc<Path>> = music_dir.map(Arc::from);
        parser::parse(reader, music_dir)
    }

    pub fn add_song(&mut self, song: Song) {
        self.songs.push(song);
    }

    pub fn format_version(&self) -> i64 {
        self.format_version
    }

    pub fn mpd_version(&self) -> &str {
        &self.mpd_version
    }

    pub fn supported_tags(&self) -> &[String] {
        self.schema.names()
    }

    pub fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }
}

#[derive(Debug)]
pub enum DatabaseError {
    Io(std::io::Error),
    UnsupportedFormat(i64),
    InvalidFormat(String),
    MissingMpdVersion,
    MissingInfoEnd,
    UnexpectedLine { line: usize, key: String },
    UnbalancedDirectory { line: usize },
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::Io(err) => write!(f, "io error: {}", err),
            DatabaseError::UnsupportedFormat(version) => {
                write!(f, "format {} is not supported", version)
            }
            DatabaseError::InvalidFormat(value) => {
                write!(f, "invalid format version: {:?}", value)
            }
            DatabaseError::MissingMpdVersion => write!(f, "mpd_version is missing"),
            DatabaseError::MissingInfoEnd => write!(f, "header has no info_end"),
            DatabaseError::UnexpectedLine { line, key } => {
                write!(f, "line {}: unexpected {}", line, key)
            }
            DatabaseError::UnbalancedDirectory { line } => {
                write!(f, "line {}: end without open directory", line)
            }
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatabaseError {
    fn from(err: std::io::Error) -> Self {
        DatabaseError::Io(err)
    }
}
