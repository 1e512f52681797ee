use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

pub const DATA_HOUSEHOLDS: &str = "DATA_HOUSEHOLDS";
pub const DATA_PERSONS: &str = "DATA_PERSONS";
pub const SPATIAL_CODES: &str = "SPATIAL_CODES";
pub const METADATA_HOUSEHOLDS: &str = "METADATA_HOUSEHOLDS";
pub const METADATA_PERSONS: &str = "METADATA_PERSONS";

/// Which stacked data sheet a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Household,
    Person,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Household, TableKind::Person];

    pub fn data_table(self) -> &'static str {
        match self {
            TableKind::Household => DATA_HOUSEHOLDS,
            TableKind::Person => DATA_PERSONS,
        }
    }

    pub fn metadata_table(self) -> &'static str {
        match self {
            TableKind::Household => METADATA_HOUSEHOLDS,
            TableKind::Person => METADATA_PERSONS,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Household => write!(f, "household"),
            TableKind::Person => write!(f, "person"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid table kind '{0}': expected household or person")]
pub struct InvalidTableKind(pub String);

impl FromStr for TableKind {
    type Err = InvalidTableKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "household" | "households" | "gospodinjstva" => Ok(TableKind::Household),
            "person" | "persons" | "osebe" => Ok(TableKind::Person),
            _ => Err(InvalidTableKind(s.to_string())),
        }
    }
}

/// A region given either by its registry code or by its name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionRef {
    Code(i64),
    Name(String),
}

impl RegionRef {
    /// Interpret free-form input: all-digit strings are codes, anything else a name
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(code) if trimmed.chars().all(|c| c.is_ascii_digit()) => RegionRef::Code(code),
            _ => RegionRef::Name(trimmed.to_string()),
        }
    }
}

impl From<i64> for RegionRef {
    fn from(code: i64) -> Self {
        RegionRef::Code(code)
    }
}

impl From<&str> for RegionRef {
    fn from(name: &str) -> Self {
        RegionRef::Name(name.trim().to_string())
    }
}

impl From<String> for RegionRef {
    fn from(name: String) -> Self {
        RegionRef::from(name.as_str())
    }
}

impl fmt::Display for RegionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionRef::Code(code) => write!(f, "{code}"),
            RegionRef::Name(name) => write!(f, "{name}"),
        }
    }
}

// Database entity models
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Region {
    pub code: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_kind_from_str() {
        assert_eq!("person".parse::<TableKind>(), Ok(TableKind::Person));
        assert_eq!("Osebe".parse::<TableKind>(), Ok(TableKind::Person));
        assert_eq!(
            "gospodinjstva".parse::<TableKind>(),
            Ok(TableKind::Household)
        );
        assert_eq!(
            "firms".parse::<TableKind>(),
            Err(InvalidTableKind("firms".to_string()))
        );
    }

    #[test]
    fn test_table_names() {
        assert_eq!(TableKind::Household.data_table(), "DATA_HOUSEHOLDS");
        assert_eq!(TableKind::Person.metadata_table(), "METADATA_PERSONS");
    }

    #[test]
    fn test_region_ref_parse() {
        assert_eq!(RegionRef::parse("3"), RegionRef::Code(3));
        assert_eq!(RegionRef::parse(" 12 "), RegionRef::Code(12));
        assert_eq!(
            RegionRef::parse("Gorenjska"),
            RegionRef::Name("Gorenjska".to_string())
        );
        assert_eq!(RegionRef::parse("-3"), RegionRef::Name("-3".to_string()));
    }

    #[test]
    fn test_region_ref_from_name_is_trimmed() {
        let expected = RegionRef::Name("Gorenjska".to_string());
        assert_eq!(RegionRef::from(" Gorenjska "), expected);
        assert_eq!(RegionRef::from("Gorenjska\t".to_string()), expected);
    }
}
