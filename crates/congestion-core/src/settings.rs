use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{FilterField, FilterSelection};

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".congestion-dashboard";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Lane congestion dashboard: filter per-lane observations and chart them
#[derive(Parser, Debug, Clone)]
#[command(
    name = "congestion-dashboard",
    about = "Filter per-lane congestion observations and chart monthly, hourly and distribution views",
    version
)]
pub struct Settings {
    /// Directory holding the CSV datasets (defaults to the current directory)
    #[arg(long, env = "CONGESTION_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Primary dataset file name
    #[arg(long, default_value = "congestion.csv")]
    pub primary: String,

    /// Fallback sample dataset file name, tried once when the primary fails
    #[arg(long, default_value = "sample_data.csv")]
    pub fallback: String,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "report"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Only records from this calendar year
    #[arg(long)]
    pub year: Option<String>,

    /// Inclusive lower date bound (YYYY-MM-DD)
    #[arg(long)]
    pub date_from: Option<String>,

    /// Inclusive upper date bound (YYYY-MM-DD)
    #[arg(long)]
    pub date_to: Option<String>,

    /// Day name, exactly as written in the dataset
    #[arg(long)]
    pub day_name: Option<String>,

    /// Day type (Workday, Holiday, Saturday)
    #[arg(long)]
    pub day_type: Option<String>,

    /// Lane identifier
    #[arg(long)]
    pub lane: Option<String>,

    /// Segment start point
    #[arg(long)]
    pub from_point: Option<String>,

    /// Segment end point
    #[arg(long)]
    pub to_point: Option<String>,

    /// Travel direction
    #[arg(long)]
    pub direction: Option<String>,

    /// Two-digit hour (00-23)
    #[arg(long)]
    pub hour: Option<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

/// clap argument ids of the filter flags, paired with the field they set.
const FILTER_ARGS: [(&str, FilterField); 10] = [
    ("year", FilterField::Year),
    ("date_from", FilterField::DateFrom),
    ("date_to", FilterField::DateTo),
    ("day_name", FilterField::DayName),
    ("day_type", FilterField::DayType),
    ("lane", FilterField::LaneId),
    ("from_point", FilterField::FromPoint),
    ("to_point", FilterField::ToPoint),
    ("direction", FilterField::Direction),
    ("hour", FilterField::HourPrefix),
];

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.congestion-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSelection>,
}

impl LastUsedParams {
    /// Default path of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable last-used file");
            Self::default()
        })
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear last-used settings");
            }
            return settings.apply_debug_flag();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if settings.data_dir.is_none() {
            settings.data_dir = last.data_dir;
        }
        // Filters are restored as a unit: any filter flag on the command line
        // replaces the whole persisted selection.
        let any_filter_flag = FILTER_ARGS
            .iter()
            .any(|(id, _)| is_arg_explicitly_set(&matches, id));
        if !any_filter_flag {
            if let Some(filters) = last.filters {
                settings.set_filter_selection(&filters);
            }
        }

        settings = settings.apply_debug_flag();

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used settings");
        }

        settings
    }

    /// The filter flags as a [`FilterSelection`].
    pub fn filter_selection(&self) -> FilterSelection {
        let mut selection = FilterSelection::default();
        for (_, field) in FILTER_ARGS {
            selection.set(field, self.filter_flag(field).clone());
        }
        selection
    }

    fn set_filter_selection(&mut self, selection: &FilterSelection) {
        for (_, field) in FILTER_ARGS {
            *self.filter_flag_mut(field) = selection.get(field).map(str::to_string);
        }
    }

    fn filter_flag(&self, field: FilterField) -> &Option<String> {
        match field {
            FilterField::Year => &self.year,
            FilterField::DateFrom => &self.date_from,
            FilterField::DateTo => &self.date_to,
            FilterField::DayName => &self.day_name,
            FilterField::DayType => &self.day_type,
            FilterField::LaneId => &self.lane,
            FilterField::FromPoint => &self.from_point,
            FilterField::ToPoint => &self.to_point,
            FilterField::Direction => &self.direction,
            FilterField::HourPrefix => &self.hour,
        }
    }

    fn filter_flag_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::Year => &mut self.year,
            FilterField::DateFrom => &mut self.date_from,
            FilterField::DateTo => &mut self.date_to,
            FilterField::DayName => &mut self.day_name,
            FilterField::DayType => &mut self.day_type,
            FilterField::LaneId => &mut self.lane,
            FilterField::FromPoint => &mut self.from_point,
            FilterField::ToPoint => &mut self.to_point,
            FilterField::Direction => &mut self.direction,
            FilterField::HourPrefix => &mut self.hour,
        }
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        let filters = s.filter_selection();
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            data_dir: s.data_dir.clone(),
            filters: (!filters.is_empty()).then_some(filters),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        std::iter::once("congestion-dashboard")
            .chain(list.iter().copied())
            .map(Into::into)
            .collect()
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["congestion-dashboard"]);

        assert_eq!(settings.primary, "congestion.csv");
        assert_eq!(settings.fallback, "sample_data.csv");
        assert_eq!(settings.view, "dashboard");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert!(settings.filter_selection().is_empty());
    }

    #[test]
    fn test_settings_filter_flags_map_to_selection() {
        let settings = Settings::parse_from([
            "congestion-dashboard",
            "--lane",
            "L2",
            "--hour",
            "08",
            "--day-type",
            "Hábil",
        ]);
        let sel = settings.filter_selection();
        assert_eq!(sel.get(FilterField::LaneId), Some("L2"));
        assert_eq!(sel.get(FilterField::HourPrefix), Some("08"));
        assert_eq!(sel.get(FilterField::DayType), Some("Hábil"));
        assert!(sel.get(FilterField::Year).is_none());
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let mut filters = FilterSelection::default();
        filters.set(FilterField::Year, Some("2025".to_string()));
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            view: Some("report".to_string()),
            data_dir: Some(PathBuf::from("/data")),
            filters: Some(filters.clone()),
        };

        params.save_to(&path).expect("save");
        let loaded = LastUsedParams::load_from(&path);

        assert_eq!(loaded.theme.as_deref(), Some("dark"));
        assert_eq!(loaded.view.as_deref(), Some("report"));
        assert_eq!(loaded.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(loaded.filters, Some(filters));
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).theme.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).filters.is_none());
    }

    #[test]
    fn test_load_with_last_used_restores_filters() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let mut filters = FilterSelection::default();
        filters.set(FilterField::LaneId, Some("L7".to_string()));
        LastUsedParams {
            filters: Some(filters),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &path);
        assert_eq!(settings.lane.as_deref(), Some("L7"));
    }

    #[test]
    fn test_load_with_last_used_cli_filter_replaces_persisted_selection() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let mut filters = FilterSelection::default();
        filters.set(FilterField::LaneId, Some("L7".to_string()));
        filters.set(FilterField::Year, Some("2024".to_string()));
        LastUsedParams {
            filters: Some(filters),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["--hour", "07"]), &path);
        assert_eq!(settings.hour.as_deref(), Some("07"));
        assert!(settings.lane.is_none());
        assert!(settings.year.is_none());
    }

    #[test]
    fn test_load_with_last_used_cli_theme_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let persisted = Settings::load_with_last_used_impl(args(&[]), &path);
        assert_eq!(persisted.theme, "dark");

        let explicit = Settings::load_with_last_used_impl(args(&["--theme", "light"]), &path);
        assert_eq!(explicit.theme, "light");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        Settings::load_with_last_used_impl(args(&["--clear"]), &path);
        assert!(!path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings =
            Settings::load_with_last_used_impl(args(&["--debug"]), &tmp_config_path(&tmp));
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(args(&["--theme", "classic", "--year", "2025"]), &path);

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme.as_deref(), Some("classic"));
        assert_eq!(
            loaded.filters.unwrap().get(FilterField::Year),
            Some("2025")
        );
    }
}
