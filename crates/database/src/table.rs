use schema::{total_column, CompositeValue, COMPOSITE_TAGS};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

use crate::song::Value;
use crate::Database;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Text(String),
    Float(f64),
    Integer(i64),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<Option<&Value>> for Cell {
    fn from(value: Option<&Value>) -> Self {
        match value {
            None => Cell::Null,
            Some(Value::Text(text)) => Cell::Text(text.clone()),
            Some(Value::Float(value)) => Cell::Float(*value),
            Some(Value::Integer(value)) => Cell::Integer(*value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        self.rows.iter().map(|row| row.get(index)).collect()
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        let index = self.column_index(name)?;
        self.rows.get(row)?.get(index)
    }
}

// One JSON object per row, keyed by column name.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    columns: &'a [String],
    row: &'a [Cell],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.row) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

impl Database {
    pub fn to_table(&self) -> Table {
        let schema = self.schema();
        let composite_columns: Vec<(usize, &str)> = schema
            .iter()
            .enumerate()
            .filter(|(_, name)| total_column(name).is_some())
            .collect();
        let totals: Vec<&str> = COMPOSITE_TAGS
            .iter()
            .filter(|(tag, _)| schema.contains(tag))
            .map(|(tag, _)| *tag)
            .collect();

        let mut columns = schema.names().to_vec();
        for tag in &totals {
            if let Some(total) = total_column(tag) {
                columns.push(total.to_string());
            }
        }

        let rows = self
            .songs()
            .iter()
            .map(|song| {
                let mut row: Vec<Cell> = schema
                    .iter()
                    .map(|name| Cell::from(song.get(name)))
                    .collect();
                for (index, tag) in &composite_columns {
                    let (primary, _) = split_composite(song.get(tag));
                    if let Some(cell) = row.get_mut(*index) {
                        *cell = primary;
                    }
                }
                for tag in &totals {
                    let (_, total) = split_composite(song.get(tag));
                    row.push(total);
                }
                row
            })
            .collect();

        Table { columns, rows }
    }
}

fn split_composite(value: Option<&Value>) -> (Cell, Cell) {
    let raw = match value {
        Some(Value::Text(raw)) => raw,
        other => return (Cell::from(other), Cell::Null),
    };
    let composite = CompositeValue::parse(raw);
    let primary = match composite.primary_number() {
        Some(number) => Cell::Integer(number),
        None if composite.primary.is_empty() => Cell::Null,
        None => Cell::Text(composite.primary.to_string()),
    };
    let total = composite
        .total_number()
        .map(Cell::Integer)
        .unwrap_or(Cell::Null);
    (primary, total)
}

#[cfg(test)]
mod tests {
    use super::{split_composite, Cell};
    use crate::song::{Song, Value};
    use crate::{Database, SUPPORTED_FORMAT_VERSION};

    fn database() -> Database {
        Database::new(SUPPORTED_FORMAT_VERSION, Some("0.20".to_string()), ["Track", "Disc"]).unwrap()
    }

    fn add(db: &mut Database, track: &str, disc: &str) {
        let song = Song::builder(db.schema())
            .with("Track", track)
            .with("Disc", disc)
            .build();
        db.add_song(song);
    }

    #[test]
    fn total_disc_conversion() {
        let mut db = database();
        add(&mut db, "1", "13/55");
        let table = db.to_table();
        assert_eq!(table.cell(0, "Disc"), Some(&Cell::Integer(13)));
        assert_eq!(table.cell(0, "TotalDiscs"), Some(&Cell::Integer(55)));
    }

    #[test]
    fn total_track_conversion() {
        let mut db = database();
        add(&mut db, "1/2", "1");
        let table = db.to_table();
        assert_eq!(table.cell(0, "Track"), Some(&Cell::Integer(1)));
        assert_eq!(table.cell(0, "TotalTracks"), Some(&Cell::Integer(2)));
        assert_eq!(table.cell(0, "TotalDiscs"), Some(&Cell::Null));
    }

    #[test]
    fn columns_follow_tags_then_totals() {
        let table = database().to_table();
        assert_eq!(table.columns(), &["Track", "Disc", "TotalDiscs", "TotalTracks"]);
        assert!(table.is_empty());
    }

    #[test]
    fn no_totals_without_composite_tags() {
        let db = Database::new(SUPPORTED_FORMAT_VERSION, Some("0.20".to_string()), ["Artist"]).unwrap();
        assert_eq!(db.to_table().columns(), &["Artist"]);
    }

    #[test]
    fn absent_values_stay_null() {
        let mut db = database();
        db.add_song(Song::builder(db.schema()).build());
        let table = db.to_table();
        assert_eq!(
            table.rows()[0],
            vec![Cell::Null, Cell::Null, Cell::Null, Cell::Null]
        );
    }

    #[test]
    fn projection_does_not_touch_songs_and_is_idempotent() {
        let mut db = database();
        add(&mut db, "3/10", "1/1");
        let first = db.to_table();
        let second = db.to_table();
        assert_eq!(first, second);
        assert_eq!(db.songs()[0].text("Track"), Some("3/10"));
        assert_eq!(
            first.column("Track"),
            Some(vec![&Cell::Integer(3)])
        );
    }

    #[test]
    fn splits_composite_values() {
        assert_eq!(
            split_composite(Some(&Value::from("A1"))),
            (Cell::Text("A1".to_string()), Cell::Null)
        );
        assert_eq!(split_composite(None), (Cell::Null, Cell::Null));
        assert_eq!(
            split_composite(Some(&Value::Integer(4))),
            (Cell::Integer(4), Cell::Null)
        );
        assert_eq!(
            split_composite(Some(&Value::from("/12"))),
            (Cell::Null, Cell::Integer(12))
        );
    }

    #[test]
    fn serializes_rows_as_records() {
        let mut db = database();
        add(&mut db, "2/9", "x");
        add(&mut db, "3", "1/2");
        let json = serde_json::to_value(db.to_table()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"Track": 2, "Disc": "x", "TotalDiscs": null, "TotalTracks": 9},
                {"Track": 3, "Disc": 1, "TotalDiscs": 2, "TotalTracks": null}
            ])
        );
    }

    #[test]
    fn empty_table_serializes_to_empty_array() {
        let json = serde_json::to_string(&database().to_table()).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn duplicate_composite_columns_are_all_split() {
        let mut db = Database::new(
            SUPPORTED_FORMAT_VERSION,
            Some("0.20".to_string()),
            ["path", "Disc", "Disc"],
        )
        .unwrap();
        let song = Song::builder(db.schema())
            .path("x.flac")
            .with("Disc", "1/2")
            .build();
        db.add_song(song);

        let table = db.to_table();
        assert_eq!(table.columns(), &["path", "Disc", "Disc", "TotalDiscs"]);
        assert_eq!(
            table.rows()[0],
            vec![
                Cell::Text("x.flac".to_string()),
                Cell::Integer(1),
                Cell::Integer(1),
                Cell::Integer(2),
            ]
        );
    }
}
