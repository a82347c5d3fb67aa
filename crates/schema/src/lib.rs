use std::sync::Arc;

pub const DURATION_TAG: &str = "Time";
pub const MTIME_TAG: &str = "mtime";
pub const PATH_TAG: &str = "path";

pub const COMPOSITE_TAGS: &[(&str, &str)] = &[("Disc", "TotalDiscs"), ("Track", "TotalTracks")];

#[derive(Debug, Clone)]
pub struct TagRegistry {
    names: Vec<String>,
}

impl TagRegistry {
    pub fn new(track_paths: bool) -> Self {
        let mut names = vec![DURATION_TAG.to_string(), MTIME_TAG.to_string()];
        if track_paths {
            names.push(PATH_TAG.to_string());
        }
        Self { names }
    }

    pub fn register(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn freeze(self) -> Arc<Schema> {
        Arc::new(Schema { names: self.names })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
}

impl Schema {
    pub fn from_names<I, S>(names: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            names: names.into_iter().map(Into::into).collect(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|known| known == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeValue<'a> {
    pub primary: &'a str,
    pub total: Option<&'a str>,
}

impl<'a> CompositeValue<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('/') {
            Some((primary, total)) => Self {
                primary: primary.trim(),
                total: Some(total.trim()),
            },
            None => Self {
                primary: raw.trim(),
                total: None,
            },
        }
    }

    pub fn primary_number(&self) -> Option<i64> {
        parse_number(self.primary)
    }

    pub fn total_number(&self) -> Option<i64> {
        self.total.and_then(parse_number)
    }
}

fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse().ok()
}

pub fn total_column(tag: &str) -> Option<&'static str> {
    COMPOSITE_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, total)| *total)
}

#[cfg(test)]
mod tests {
    use super::{total_column, CompositeValue, Schema, TagRegistry};

    #[test]
    fn registry_starts_with_fixed_tags() {
        let schema = TagRegistry::new(false).freeze();
        assert_eq!(schema.names(), &["Time", "mtime"]);

        let schema = TagRegistry::new(true).freeze();
        assert_eq!(schema.names(), &["Time", "mtime", "path"]);
    }

    #[test]
    fn registry_keeps_declaration_order_and_duplicates() {
        let mut registry = TagRegistry::new(true);
        registry.register("Artist");
        registry.register("Album");
        registry.register("Artist");
        assert_eq!(registry.len(), 6);

        let schema = registry.freeze();
        assert_eq!(
            schema.names(),
            &["Time", "mtime", "path", "Artist", "Album", "Artist"]
        );
        assert_eq!(schema.index_of("Artist"), Some(3));
        assert!(schema.contains("Album"));
        assert!(!schema.contains("Genre"));
    }

    #[test]
    fn schema_from_names() {
        let schema = Schema::from_names(["Track", "Disc"]);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.iter().collect::<Vec<_>>(), vec!["Track", "Disc"]);
    }

    #[test]
    fn composite_with_total() {
        let value = CompositeValue::parse("13/55");
        assert_eq!(value.primary, "13");
        assert_eq!(value.total, Some("55"));
        assert_eq!(value.primary_number(), Some(13));
        assert_eq!(value.total_number(), Some(55));
    }

    #[test]
    fn composite_without_total() {
        let value = CompositeValue::parse("1");
        assert_eq!(value.primary_number(), Some(1));
        assert_eq!(value.total, None);
        assert_eq!(value.total_number(), None);
    }

    #[test]
    fn composite_non_numeric_primary() {
        let value = CompositeValue::parse("A1/");
        assert_eq!(value.primary, "A1");
        assert_eq!(value.primary_number(), None);
        assert_eq!(value.total_number(), None);
    }

    #[test]
    fn total_columns() {
        assert_eq!(total_column("Disc"), Some("TotalDiscs"));
        assert_eq!(total_column("Track"), Some("TotalTracks"));
        assert_eq!(total_column("Artist"), None);
    }
}
