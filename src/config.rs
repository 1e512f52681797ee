use std::env;

/// Where things live in the statistical workbook
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookLayout {
    pub household_sheet: String,
    pub person_sheet: String,
    pub code_sheet: String,
    pub household_metadata_sheet: String,
    pub person_metadata_sheet: String,
    /// Token marking the start of each year block ("Leto 2018")
    pub year_marker: String,
    pub year_marker_column: usize,
    /// Token marking the code sheet header ("Šifra statistične regije")
    pub code_marker: String,
    pub code_marker_column: usize,
    pub region_name_column: usize,
    /// Header of the region identifier column in the stacked sheets
    pub region_column: String,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            household_sheet: "PODATKI_GOSPODINJSTVA".to_string(),
            person_sheet: "PODATKI_OSEBE".to_string(),
            code_sheet: "PROSTORSKI ŠIFRANT".to_string(),
            household_metadata_sheet: "METAPODATKI_GOSPODINJSTVA".to_string(),
            person_metadata_sheet: "METAPODATKI_OSEBE".to_string(),
            year_marker: "Leto".to_string(),
            year_marker_column: 1,
            code_marker: "Šifra".to_string(),
            code_marker_column: 0,
            region_name_column: 1,
            region_column: "SR_12".to_string(),
        }
    }
}

impl WorkbookLayout {
    /// Defaults, overridden by any `STAT_*` variables present
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            household_sheet: env_or("STAT_HOUSEHOLD_SHEET", defaults.household_sheet),
            person_sheet: env_or("STAT_PERSON_SHEET", defaults.person_sheet),
            code_sheet: env_or("STAT_CODE_SHEET", defaults.code_sheet),
            household_metadata_sheet: env_or(
                "STAT_HOUSEHOLD_METADATA_SHEET",
                defaults.household_metadata_sheet,
            ),
            person_metadata_sheet: env_or(
                "STAT_PERSON_METADATA_SHEET",
                defaults.person_metadata_sheet,
            ),
            year_marker: env_or("STAT_YEAR_MARKER", defaults.year_marker),
            year_marker_column: env::var("STAT_YEAR_MARKER_COLUMN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.year_marker_column),
            code_marker: env_or("STAT_CODE_MARKER", defaults.code_marker),
            code_marker_column: env::var("STAT_CODE_MARKER_COLUMN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.code_marker_column),
            region_name_column: env::var("STAT_REGION_NAME_COLUMN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.region_name_column),
            region_column: env_or("STAT_REGION_COLUMN", defaults.region_column),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub workbook_path: Option<String>,
    /// Check caller-supplied region codes against the registry
    pub verify_region_codes: bool,
    pub layout: WorkbookLayout,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            workbook_path: env::var("WORKBOOK_PATH").ok(),
            verify_region_codes: env::var("VERIFY_REGION_CODES")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            layout: WorkbookLayout::from_env(),
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_matches_workbook() {
        let layout = WorkbookLayout::default();
        assert_eq!(layout.year_marker, "Leto");
        assert_eq!(layout.year_marker_column, 1);
        assert_eq!(layout.code_marker, "Šifra");
        assert_eq!(layout.code_sheet, "PROSTORSKI ŠIFRANT");
        assert_eq!(layout.region_column, "SR_12");
    }
}
