//! Symbolic names for routine identifiers
//!
//! The catalog's contents belong to the host; this layer only reads it.
//! Identifiers are 64-bit hashes, which overflow TOML integers, so the TOML
//! form writes them as strings:
//!
//! ```toml
//! GET_PLAYER_PED = "0x8D32347D6D4C40A2"
//! WAIT = 4660
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{HostcallError, Result};
use crate::value::RoutineId;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl RawId {
    fn resolve(self) -> Result<RoutineId> {
        match self {
            RawId::Text(text) => RoutineId::parse(&text),
            RawId::Int(i) if i >= 0 => Ok(RoutineId::new(i as u64)),
            RawId::Int(i) => Err(HostcallError::InvalidRoutineId(i.to_string())),
        }
    }
}

/// Read-only map from routine names to identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineCatalog {
    routines: BTreeMap<String, RoutineId>,
}

impl RoutineCatalog {
    /// Build from name/identifier pairs, rejecting duplicate names
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, RoutineId)>,
        S: Into<String>,
    {
        let mut routines = BTreeMap::new();
        for (name, id) in entries {
            let name = name.into();
            if routines.contains_key(&name) {
                return Err(HostcallError::DuplicateRoutine(name));
            }
            routines.insert(name, id);
        }
        Ok(Self { routines })
    }

    /// Parse a flat TOML table of `NAME = id` entries
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawId> = toml::from_str(text)?;
        Self::from_raw(raw)
    }

    /// Build from an already parsed TOML table of `NAME = id` entries
    pub fn from_toml_table(table: toml::Table) -> Result<Self> {
        let raw: BTreeMap<String, RawId> = toml::Value::Table(table).try_into()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeMap<String, RawId>) -> Result<Self> {
        let routines = raw
            .into_iter()
            .map(|(name, id)| Ok((name, id.resolve()?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { routines })
    }

    /// Look up a routine by name
    pub fn get(&self, name: &str) -> Option<RoutineId> {
        self.routines.get(name).copied()
    }

    /// Number of routines
    pub fn len(&self) -> usize {
        self.routines.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, RoutineId)> {
        self.routines.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries() {
        let catalog = RoutineCatalog::from_entries([
            ("WAIT", RoutineId::new(0x4EDE34FBADD967A6)),
            ("GET_GAME_TIMER", RoutineId::new(0x9CD27B0045628463)),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("WAIT"), Some(RoutineId::new(0x4EDE34FBADD967A6)));
        assert_eq!(catalog.get("MISSING"), None);
        let names: Vec<_> = catalog.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["GET_GAME_TIMER", "WAIT"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = RoutineCatalog::from_entries([
            ("WAIT", RoutineId::new(1)),
            ("WAIT", RoutineId::new(2)),
        ]);
        assert!(matches!(result, Err(HostcallError::DuplicateRoutine(name)) if name == "WAIT"));
    }

    #[test]
    fn test_from_toml() {
        let catalog = RoutineCatalog::from_toml_str(
            "GET_PLAYER_PED = \"0x8D32347D6D4C40A2\"\nSMALL = 4660\n",
        )
        .unwrap();
        assert_eq!(catalog.get("GET_PLAYER_PED"), Some(RoutineId::new(0x8D32347D6D4C40A2)));
        assert_eq!(catalog.get("SMALL"), Some(RoutineId::new(0x1234)));
    }

    #[test]
    fn test_from_toml_rejects_bad_ids() {
        assert!(matches!(
            RoutineCatalog::from_toml_str("BAD = \"0xnope\""),
            Err(HostcallError::InvalidRoutineId(_))
        ));
        assert!(RoutineCatalog::from_toml_str("NEG = -1").is_err());
        assert!(RoutineCatalog::from_toml_str("[nested]\nA = 1").is_err());
    }

    #[test]
    fn test_from_toml_table() {
        let table: toml::Table = toml::from_str("WAIT = \"0x4EDE34FBADD967A6\"").unwrap();
        let catalog = RoutineCatalog::from_toml_table(table).unwrap();
        assert_eq!(catalog.get("WAIT"), Some(RoutineId::new(0x4EDE34FBADD967A6)));
    }

    #[test]
    fn test_empty() {
        let catalog = RoutineCatalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.iter().count(), 0);
    }
}
