pub mod config;
pub mod localization;

pub use config::{
    ConfigError, ConfigStore, PortalConfig, StorageSettings, SupportSettings, UiSettings,
};
pub use localization::{
    validate_locale_code, LocaleSummary, LocalizationError, LocalizationManager,
    LocalizationParams, DEFAULT_LOCALE_CODE,
};
