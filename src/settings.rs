use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

/// Panel-wide settings. Saved documents may be partial; missing fields fall
/// back to the defaults on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelSettings {
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub encryption: String,
    pub allowed_countries: String,
    pub enable_logging: bool,
    pub enable_dark_mode: bool,
    pub enable_animations: bool,
    pub language: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            server_host: "localhost".to_string(),
            server_port: 443,
            max_connections: 1000,
            encryption: "none".to_string(),
            allowed_countries: "ID,SG,US,JP,KR".to_string(),
            enable_logging: true,
            enable_dark_mode: true,
            enable_animations: true,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct PersistedSettings {
    schema_version: u32,
    #[serde(flatten)]
    settings: PanelSettings,
}

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    SerdeJson(serde_json::Error),
    SchemaVersionMismatch { expected: u32, got: u32 },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::SerdeJson(e) => write!(f, "json error: {e}"),
            Self::SchemaVersionMismatch { expected, got } => {
                write!(f, "schema_version mismatch: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::SerdeJson(e) => Some(e),
            Self::SchemaVersionMismatch { .. } => None,
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::SerdeJson(value)
    }
}

/// The panel's only persistence: `settings.json` under the data dir,
/// rewritten atomically (tmp file + rename) on every change.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    settings: PanelSettings,
}

impl JsonSettingsStore {
    pub fn load_or_init(data_dir: &Path) -> Result<Self, SettingsError> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join("settings.json");
        let settings = if path.exists() {
            let bytes = fs::read(&path)?;
            let persisted: PersistedSettings = serde_json::from_slice(&bytes)?;
            if persisted.schema_version != SETTINGS_SCHEMA_VERSION {
                return Err(SettingsError::SchemaVersionMismatch {
                    expected: SETTINGS_SCHEMA_VERSION,
                    got: persisted.schema_version,
                });
            }
            persisted.settings
        } else {
            let settings = PanelSettings::default();
            write_atomic(&path, &settings)?;
            settings
        };
        Ok(Self { path, settings })
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn update(&mut self, settings: PanelSettings) -> Result<(), SettingsError> {
        write_atomic(&self.path, &settings)?;
        self.settings = settings;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), SettingsError> {
        self.update(PanelSettings::default())
    }
}

fn write_atomic(path: &Path, settings: &PanelSettings) -> Result<(), SettingsError> {
    let persisted = PersistedSettings {
        schema_version: SETTINGS_SCHEMA_VERSION,
        settings: settings.clone(),
    };
    let bytes = serde_json::to_vec_pretty(&persisted)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn init_writes_defaults_and_reload_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::load_or_init(tmp.path()).unwrap();
        assert_eq!(store.settings(), &PanelSettings::default());
        assert!(tmp.path().join("settings.json").exists());

        let again = JsonSettingsStore::load_or_init(tmp.path()).unwrap();
        assert_eq!(again.settings(), &PanelSettings::default());
    }

    #[test]
    fn update_persists_and_reset_restores_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = JsonSettingsStore::load_or_init(tmp.path()).unwrap();

        let changed = PanelSettings {
            server_host: "proxy.example.com".to_string(),
            server_port: 8443,
            enable_animations: false,
            ..PanelSettings::default()
        };
        store.update(changed.clone()).unwrap();

        let reloaded = JsonSettingsStore::load_or_init(tmp.path()).unwrap();
        assert_eq!(reloaded.settings(), &changed);

        let mut store = reloaded;
        store.reset().unwrap();
        let reloaded = JsonSettingsStore::load_or_init(tmp.path()).unwrap();
        assert_eq!(reloaded.settings(), &PanelSettings::default());
    }

    #[test]
    fn partial_saved_document_merges_over_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("settings.json"),
            br#"{"schema_version":1,"serverHost":"10.0.0.1","enableDarkMode":false}"#,
        )
        .unwrap();

        let store = JsonSettingsStore::load_or_init(tmp.path()).unwrap();
        assert_eq!(store.settings().server_host, "10.0.0.1");
        assert!(!store.settings().enable_dark_mode);
        assert_eq!(store.settings().server_port, 443);
        assert_eq!(store.settings().language, "en");
    }

    #[test]
    fn schema_version_mismatch_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("settings.json"),
            br#"{"schema_version":99}"#,
        )
        .unwrap();

        let err = JsonSettingsStore::load_or_init(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::SchemaVersionMismatch {
                expected: SETTINGS_SCHEMA_VERSION,
                got: 99
            }
        ));
    }

    #[test]
    fn stored_document_uses_panel_field_names() {
        let tmp = tempfile::tempdir().unwrap();
        let _store = JsonSettingsStore::load_or_init(tmp.path()).unwrap();
        let raw = fs::read_to_string(tmp.path().join("settings.json")).unwrap();
        assert!(raw.contains("\"serverHost\""));
        assert!(raw.contains("\"allowedCountries\""));
        assert!(raw.contains("\"schema_version\""));
    }
}
