use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_COUNTRY_CODE, DEFAULT_FETCH_CONCURRENCY, DEFAULT_LOG_DIR,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE,
    DEFAULT_SHEET_NAME, DEFAULT_TARGETS_FILE, DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
    METADATA_SHEET_NAME,
};
use crate::domain::TargetDescriptor;
use crate::error::{Result, ScraperError};
use crate::pipeline::processing::normalize::PhonePolicy;

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Worksheet names are capped at 31 characters by the xlsx format
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel refuses in a worksheet name
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output: OutputSettings,
    pub fetch: FetchSettings,
    pub logging: LoggingSettings,
    pub normalize: NormalizeSettings,
    pub targets_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub file: String,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub max_retries: u32,
    pub timeout_seconds: u64,
    pub backoff_base_ms: u64,
    pub user_agent: String,
    pub concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: PathBuf,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeSettings {
    pub default_country_code: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: OutputSettings::default(),
            fetch: FetchSettings::default(),
            logging: LoggingSettings::default(),
            normalize: NormalizeSettings::default(),
            targets_file: PathBuf::from(DEFAULT_TARGETS_FILE),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file: DEFAULT_OUTPUT_FILE.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an explicit TOML file, or `config.toml` when present,
    /// then apply environment overrides. Missing values fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.output.sheet_name = settings.output.sheet_name.trim().to_string();
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Apply overrides using the deployment's environment variable names
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("EXCEL_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(v);
        }
        if let Some(v) = get("EXCEL_OUTPUT_FILE") {
            self.output.file = v;
        }
        if let Some(v) = get("EXCEL_SHEET_NAME") {
            self.output.sheet_name = v;
        }
        if let Some(v) = get("MAX_RETRIES") {
            self.fetch.max_retries = parse_number("MAX_RETRIES", &v)?;
        }
        if let Some(v) = get("REQUEST_TIMEOUT") {
            self.fetch.timeout_seconds = parse_number("REQUEST_TIMEOUT", &v)?;
        }
        if let Some(v) = get("USER_AGENT") {
            self.fetch.user_agent = v;
        }
        if let Some(v) = get("FETCH_CONCURRENCY") {
            self.fetch.concurrency = parse_number("FETCH_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("LOG_FILE_DIR") {
            self.logging.dir = PathBuf::from(v);
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = v.to_lowercase();
        }
        if let Some(v) = get("DEFAULT_COUNTRY_CODE") {
            self.normalize.default_country_code = v;
        }
        if let Some(v) = get("TARGETS_FILE") {
            self.targets_file = PathBuf::from(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.concurrency == 0 {
            return Err(ScraperError::Config("fetch concurrency must be at least 1".to_string()));
        }
        if self.fetch.max_retries == 0 {
            return Err(ScraperError::Config("max_retries must be at least 1".to_string()));
        }
        let sheet = self.output.sheet_name.trim();
        if sheet.is_empty() || sheet.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(ScraperError::Config(format!(
                "sheet name must be 1-{MAX_SHEET_NAME_LEN} characters, got '{}'",
                self.output.sheet_name
            )));
        }
        if sheet.contains(&FORBIDDEN_SHEET_CHARS[..]) || sheet.starts_with('\'') || sheet.ends_with('\'') {
            return Err(ScraperError::Config(format!(
                "sheet name '{sheet}' may not contain [ ] : * ? / \\ or start or end with an apostrophe"
            )));
        }
        if sheet.eq_ignore_ascii_case(METADATA_SHEET_NAME) {
            return Err(ScraperError::Config(format!(
                "sheet name '{METADATA_SHEET_NAME}' is reserved for the run summary"
            )));
        }
        let code = self.normalize.default_country_code.trim_start_matches('+');
        if code.is_empty() || code.len() > 3 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ScraperError::Config(format!(
                "default country code must be 1-3 digits, got '{}'",
                self.normalize.default_country_code
            )));
        }
        Ok(())
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.file)
    }

    pub fn phone_policy(&self) -> PhonePolicy {
        PhonePolicy::with_country_code(self.normalize.default_country_code.trim_start_matches('+'))
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ScraperError::Config(format!("{key} must be a number, got '{value}': {e}")))
}

#[derive(Debug, Deserialize)]
struct TargetsFile {
    websites: Vec<TargetDescriptor>,
}

/// Load the target list from a `websites.json` file
pub fn load_targets(path: &Path) -> Result<Vec<TargetDescriptor>> {
    let content = fs::read_to_string(path).map_err(|e| {
        ScraperError::Config(format!("Failed to read targets file '{}': {}", path.display(), e))
    })?;
    let file: TargetsFile = serde_json::from_str(&content).map_err(|e| {
        ScraperError::Config(format!("Malformed targets file '{}': {}", path.display(), e))
    })?;

    if file.websites.is_empty() {
        return Err(ScraperError::Config(format!(
            "Targets file '{}' lists no websites",
            path.display()
        )));
    }
    if let Some(bad) = file
        .websites
        .iter()
        .find(|t| t.name.trim().is_empty() || t.url.trim().is_empty())
    {
        return Err(ScraperError::Config(format!(
            "Every target needs a name and a url (got name '{}', url '{}')",
            bad.name, bad.url
        )));
    }
    Ok(file.websites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.artifact_path(), PathBuf::from("data/scraped_data.xlsx"));
        assert_eq!(settings.output.sheet_name, "Projects");
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let settings: Settings = toml::from_str(include_str!("../config.example.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_bundled_targets_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_TARGETS_FILE);
        assert_eq!(load_targets(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            targets_file = "targets.json"

            [output]
            sheet_name = "Leads"

            [fetch]
            concurrency = 8
            "#,
        )
        .unwrap();
        assert_eq!(settings.output.sheet_name, "Leads");
        assert_eq!(settings.output.file, DEFAULT_OUTPUT_FILE);
        assert_eq!(settings.fetch.concurrency, 8);
        assert_eq!(settings.fetch.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(settings.targets_file, PathBuf::from("targets.json"));
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [
            ("EXCEL_OUTPUT_DIR", "/tmp/out"),
            ("EXCEL_OUTPUT_FILE", "leads.xlsx"),
            ("MAX_RETRIES", "5"),
            ("LOG_LEVEL", "DEBUG"),
            ("DEFAULT_COUNTRY_CODE", "+249"),
            ("USER_AGENT", "  "),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.artifact_path(), PathBuf::from("/tmp/out/leads.xlsx"));
        assert_eq!(settings.fetch.max_retries, 5);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.fetch.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(settings.phone_policy().default_country_code, "249");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_bad_numeric_override_is_a_config_error() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides(|key| (key == "REQUEST_TIMEOUT").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ScraperError::Config(_)));
    }

    #[test]
    fn test_reserved_sheet_name_is_rejected() {
        let mut settings = Settings::default();
        settings.output.sheet_name = "metadata".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_sheet_name_with_forbidden_characters_is_rejected() {
        for name in ["Q1/Q2", "Leads: 2024", "[draft]", "why?", r"a\b", "'quoted'"] {
            let mut settings = Settings::default();
            settings.output.sheet_name = name.to_string();
            let err = settings.validate().unwrap_err();
            assert!(matches!(err, ScraperError::Config(_)), "{name} accepted");
        }
    }

    #[test]
    fn test_loaded_sheet_name_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[output]\nsheet_name = \"  Leads  \"\n").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.output.sheet_name, "Leads");
    }

    #[test]
    fn test_load_targets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"websites": [
                {{"name": "Sudancar", "url": "https://www.sudancar.com/1",
                  "metadata": {{"type": "Automotive", "mobile_number": "+249912345678"}}}},
                {{"name": "Portfolio", "url": "https://me.vercel.app"}}
            ]}}"#
        )
        .unwrap();

        let targets = load_targets(file.path()).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].fallback.mobile_number.as_deref(), Some("+249912345678"));
        assert_eq!(targets[1].fallback, Default::default());
    }

    #[test]
    fn test_empty_or_malformed_targets_are_rejected() {
        let mut empty = tempfile::NamedTempFile::new().unwrap();
        write!(empty, r#"{{"websites": []}}"#).unwrap();
        assert!(matches!(load_targets(empty.path()), Err(ScraperError::Config(_))));

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "not json").unwrap();
        assert!(matches!(load_targets(broken.path()), Err(ScraperError::Config(_))));

        assert!(matches!(
            load_targets(Path::new("/definitely/missing/websites.json")),
            Err(ScraperError::Config(_))
        ));
    }
}
