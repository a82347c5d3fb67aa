use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use common::join_dir;
use schema::{TagRegistry, DURATION_TAG, MTIME_TAG, PATH_TAG};
use tracing::{debug, warn};

use crate::song::{SongBuilder, Value};
use crate::{Database, DatabaseError};

const KEY_FORMAT: &str = "format";
const KEY_MPD_VERSION: &str = "mpd_version";
const KEY_TAG: &str = "tag";
const KEY_INFO_END: &str = "info_end";
const KEY_BEGIN: &str = "begin";
const KEY_END: &str = "end";
const KEY_SONG_BEGIN: &str = "song_begin";
const KEY_SONG_END: &str = "song_end";

pub(crate) fn parse<R: BufRead>(
    reader: R,
    music_dir: Option<Arc<Path>>,
) -> Result<Database, DatabaseError> {
    let mut parser = Parser::new(music_dir);
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let (key, value) = split_line(&line);
        parser.feed(index + 1, key, value)?;
    }
    parser.finish()
}

fn split_line(line: &str) -> (&str, Option<&str>) {
    let line = line.trim();
    match line.split_once(':') {
        Some((key, value)) => (key, Some(value.trim())),
        None => (line, None),
    }
}

struct Header {
    format: i64,
    mpd_version: Option<String>,
    registry: TagRegistry,
}

struct Parser {
    music_dir: Option<Arc<Path>>,
    header: Option<Header>,
    database: Option<Database>,
    dirs: Vec<String>,
    current: Option<SongBuilder>,
}

impl Parser {
    fn new(music_dir: Option<Arc<Path>>) -> Self {
        Self {
            music_dir,
            header: Some(Header {
                format: 0,
                mpd_version: None,
                registry: TagRegistry::new(true),
            }),
            database: None,
            dirs: Vec::new(),
            current: None,
        }
    }

    fn feed(&mut self, line: usize, key: &str, value: Option<&str>) -> Result<(), DatabaseError> {
        if self.database.is_none() {
            self.feed_header(line, key, value)
        } else {
            self.feed_body(line, key, value)
        }
    }

    fn feed_header(
        &mut self,
        line: usize,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let header = match self.header.as_mut() {
            Some(header) => header,
            None => return Ok(()),
        };

        match (key, value) {
            (KEY_FORMAT, Some(value)) => {
                header.format = value
                    .parse()
                    .map_err(|_| DatabaseError::InvalidFormat(value.to_string()))?;
            }
            (KEY_MPD_VERSION, Some(value)) => {
                header.mpd_version = Some(value.to_string());
            }
            (KEY_TAG, Some(value)) => header.registry.register(value),
            (KEY_INFO_END, _) => {
                if let Some(header) = self.header.take() {
                    let schema = header.registry.freeze();
                    let database =
                        Database::with_schema(header.format, header.mpd_version, schema)?;
                    debug!(
                        "Header complete: format {}, mpd {}, {} fields",
                        database.format_version(),
                        database.mpd_version(),
                        database.supported_tags().len()
                    );
                    self.database = Some(database);
                }
            }
            (KEY_BEGIN | KEY_END | KEY_SONG_BEGIN | KEY_SONG_END, _) => {
                return Err(DatabaseError::UnexpectedLine {
                    line,
                    key: key.to_string(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn feed_body(
        &mut self,
        line: usize,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let database = match self.database.as_mut() {
            Some(database) => database,
            None => return Ok(()),
        };

        match (key, value) {
            (KEY_BEGIN, Some(name)) => {
                let dir = join_dir(self.dirs.last().map(String::as_str), name);
                self.dirs.push(dir);
            }
            (KEY_END, _) => {
                if self.dirs.pop().is_none() {
                    return Err(DatabaseError::UnbalancedDirectory { line });
                }
            }
            (KEY_SONG_BEGIN, Some(file)) if self.current.is_none() => {
                let relpath = song_relpath(self.dirs.last().map(String::as_str), file);
                let builder = SongBuilder::new(database.schema())
                    .path(relpath)
                    .music_dir(self.music_dir.clone());
                self.current = Some(builder);
            }
            (KEY_SONG_END, None) if self.current.is_some() => {
                if let Some(builder) = self.current.take() {
                    database.add_song(builder.build());
                }
            }
            (KEY_BEGIN | KEY_SONG_BEGIN | KEY_SONG_END, _) => {
                return Err(DatabaseError::UnexpectedLine {
                    line,
                    key: key.to_string(),
                });
            }
            (_, Some(raw)) => {
                if let Some(builder) = self.current.as_mut() {
                    store_field(builder, line, key, raw);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Database, DatabaseError> {
        let database = self.database.ok_or(DatabaseError::MissingInfoEnd)?;
        if let Some(builder) = self.current {
            warn!(
                "Dropping unterminated song {:?} at end of input",
                builder.build().path()
            );
        }
        if !self.dirs.is_empty() {
            warn!("{} directories left open at end of input", self.dirs.len());
        }
        Ok(database)
    }
}

fn song_relpath(dir: Option<&str>, file: &str) -> String {
    match dir {
        Some(dir) => format!("{}/{}", dir, file),
        None => file.to_string(),
    }
}

fn store_field(builder: &mut SongBuilder, line: usize, key: &str, raw: &str) {
    let value = match key {
        PATH_TAG => return,
        DURATION_TAG => match raw.parse::<f64>() {
            Ok(value) => Value::Float(value),
            Err(_) => {
                warn!("Line {}: ignoring invalid duration {:?}", line, raw);
                return;
            }
        },
        MTIME_TAG => match raw.parse::<i64>() {
            Ok(value) => Value::Integer(value),
            Err(_) => {
                warn!("Line {}: ignoring invalid mtime {:?}", line, raw);
                return;
            }
        },
        _ => Value::Text(raw.to_string()),
    };
    builder.set(key, value);
}
