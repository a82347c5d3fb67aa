use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{join_relpath, stable_id};
use schema::{Schema, DURATION_TAG, MTIME_TAG, PATH_TAG};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Float(f64),
    Integer(i64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Integer(value) => Some(*value as f64),
            Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Float(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    NotImplemented,
    NoPath,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::NotImplemented => {
                write!(f, "path resolution needs a music directory")
            }
            PathError::NoPath => write!(f, "song has no path"),
        }
    }
}

impl std::error::Error for PathError {}

#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    schema: Arc<Schema>,
    values: Vec<Option<Value>>,
    path: Option<String>,
    music_dir: Option<Arc<Path>>,
}

impl Song {
    pub fn builder(schema: Arc<Schema>) -> SongBuilder {
        SongBuilder::new(schema)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.schema.index_of(name)?;
        self.values.get(index)?.as_ref()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.schema
            .iter()
            .zip(self.values.iter().map(Option::as_ref))
    }

    pub fn duration(&self) -> Option<f64> {
        self.get(DURATION_TAG).and_then(Value::as_f64)
    }

    pub fn mtime(&self) -> Option<i64> {
        self.get(MTIME_TAG).and_then(Value::as_i64)
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn music_dir(&self) -> Option<&Path> {
        self.music_dir.as_deref()
    }

    pub fn stable_id(&self) -> Option<String> {
        self.path.as_deref().map(stable_id)
    }

    pub fn fs_path(&self) -> Result<PathBuf, PathError> {
        let root = self.music_dir.as_deref().ok_or(PathError::NotImplemented)?;
        let relpath = self.path.as_deref().ok_or(PathError::NoPath)?;
        Ok(join_relpath(root, relpath))
    }
}

pub struct SongBuilder {
    schema: Arc<Schema>,
    values: Vec<Option<Value>>,
    path: Option<String>,
    music_dir: Option<Arc<Path>>,
}

impl SongBuilder {
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = vec![None; schema.len()];
        Self {
            schema,
            values,
            path: None,
            music_dir: None,
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        let index = match self.schema.index_of(name) {
            Some(index) => index,
            None => return false,
        };
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn path(mut self, relpath: impl Into<String>) -> Self {
        let relpath = relpath.into();
        self.set(PATH_TAG, relpath.as_str());
        self.path = Some(relpath);
        self
    }

    pub fn music_dir(mut self, music_dir: Option<Arc<Path>>) -> Self {
        self.music_dir = music_dir;
        self
    }

    pub fn build(self) -> Song {
        Song {
            schema: self.schema,
            values: self.values,
            path: self.path,
            music_dir: self.music_dir,
        }
    }
}
