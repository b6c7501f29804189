use crate::model::record::RecordColumn;
use serde::de::Error as SerdeError;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The header row of the worksheet: the header strings in the order they appear, and the column
/// index of each of the known record columns.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<String>,
    header_map: HashMap<String, usize>,
}

impl Default for Mapping {
    /// The canonical header row, used when the worksheet is empty.
    fn default() -> Self {
        let headers: Vec<String> = RecordColumn::ALL.iter().map(|c| c.to_string()).collect();
        let header_map = headers
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.to_owned(), idx))
            .collect();
        Self {
            headers,
            header_map,
        }
    }
}

impl Mapping {
    /// Create a new `Mapping` from the header row. Every known record column must be present
    /// exactly once. Additional headers are allowed and are carried along unchanged.
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();

        let header_map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.to_owned(), idx))
            .collect();

        if header_map.len() != headers.len() {
            return Err(MappingError(String::from("Encountered a duplicate header")));
        }

        let missing: Vec<String> = RecordColumn::ALL
            .iter()
            .map(|c| c.to_string())
            .filter(|h| !header_map.contains_key(h))
            .collect();
        if !missing.is_empty() {
            return Err(MappingError(format!(
                "The header row is missing the column(s) {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            headers,
            header_map,
        })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.header_map.get(header).copied()
    }
}

impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.headers.len()))?;
        for header in &self.headers {
            seq.serialize_element(header)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = Vec::deserialize(deserializer)?;
        let mapping = Mapping::new(items).map_err(D::Error::custom)?;
        Ok(mapping)
    }
}
