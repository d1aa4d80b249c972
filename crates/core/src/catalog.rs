//! Emergency type catalog.
//!
//! Labels are normalised to upper case, deduplicated and kept alphabetically
//! sorted. The catalog is rebuilt from the loaded cases at startup and grows as
//! officers enter new types; it is never written out on its own.

/// Result of interpreting a 1-based type menu choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeChoice<'a> {
    Existing(&'a str),
    /// The extra last entry, meaning "enter a new type".
    New,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    labels: Vec<String>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut catalog = Self::new();
        for label in labels {
            catalog.add(label);
        }
        catalog
    }

    pub fn normalise(label: &str) -> String {
        label.trim().to_uppercase()
    }

    pub fn exists(&self, label: &str) -> bool {
        let wanted = Self::normalise(label);
        self.labels.iter().any(|l| *l == wanted)
    }

    /// Add `label` in sorted position. Returns `false` for duplicates and for
    /// labels that are blank once trimmed.
    pub fn add(&mut self, label: &str) -> bool {
        let label = Self::normalise(label);
        if label.is_empty() {
            return false;
        }
        match self.labels.binary_search(&label) {
            Ok(_) => false,
            Err(at) => {
                self.labels.insert(at, label);
                true
            }
        }
    }

    /// Label at 1-based menu position `index`.
    pub fn by_index(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Interpret a menu choice in `[1, len + 1]`.
    pub fn choice(&self, index: usize) -> Option<TypeChoice<'_>> {
        if index == self.labels.len() + 1 {
            return Some(TypeChoice::New);
        }
        self.by_index(index).map(TypeChoice::Existing)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
