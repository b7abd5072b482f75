use std::fs;

use civicdesk_settings::{
    validate_locale_code, LocalizationError, LocalizationManager, LocalizationParams,
};
use tempfile::tempdir;

#[test]
fn builtin_defaults_to_portuguese_and_falls_back_to_key() {
    let manager = LocalizationManager::builtin();
    assert_eq!(manager.active_code(), "pt-CV");
    assert_eq!(manager.text("overlay.faq.title"), "Perguntas Frequentes");
    assert_eq!(manager.text("missing.key"), "missing.key");
}

#[test]
fn switching_locale_changes_lookups() {
    let mut manager = LocalizationManager::builtin();
    assert!(manager.set_active_by_code("en-US"));
    assert_eq!(manager.text("overlay.faq.title"), "FAQ");
    assert!(!manager.set_active_by_code("xx-YY"));
    assert_eq!(manager.active_code(), "en-US");
}

#[test]
fn positional_and_plural_parameters_are_applied() {
    let mut manager = LocalizationManager::builtin();
    manager.set_active_by_code("en-US");

    let values = ["report.pdf"];
    assert_eq!(
        manager
            .text_with_params("support.error.too_large", &LocalizationParams::new(&values))
            .as_ref(),
        "File report.pdf exceeds 10 MB."
    );
    assert_eq!(
        manager
            .text_with_params("support.attachments.count", &LocalizationParams::count_only(1))
            .as_ref(),
        "1 file attached"
    );
    assert_eq!(
        manager
            .text_with_params("support.attachments.count", &LocalizationParams::count_only(4))
            .as_ref(),
        "4 files attached"
    );
}

#[test]
fn directory_catalog_adds_locale_and_falls_back_for_missing_keys() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("fr-FR.json"),
        r#"{
            "locale": "fr-FR",
            "display_name": "Français",
            "strings": {
                "overlay.faq.title": "Questions fréquentes",
                "support.attachments.count": {
                    "type": "plural",
                    "one": "{count} fichier joint",
                    "other": "{count} fichiers joints"
                }
            }
        }"#,
    )
    .expect("write locale");

    let mut manager = LocalizationManager::load_from_dir(temp.path()).expect("load");
    assert!(manager
        .locale_summaries()
        .iter()
        .any(|summary| summary.code == "fr-FR" && summary.display_name == "Français"));
    assert!(manager.set_active_by_code("fr-FR"));
    assert_eq!(manager.text("overlay.faq.title"), "Questions fréquentes");
    assert_eq!(manager.text("overlay.map.title"), "Mapa");
    assert_eq!(
        manager
            .text_with_params("support.attachments.count", &LocalizationParams::count_only(3))
            .as_ref(),
        "3 fichiers joints"
    );
}

#[test]
fn plural_without_other_form_is_rejected() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("de-DE.json"),
        r#"{ "locale": "de-DE", "strings": { "k": { "type": "plural", "one": "x" } } }"#,
    )
    .expect("write locale");

    let err = LocalizationManager::load_from_dir(temp.path()).unwrap_err();
    assert!(matches!(err, LocalizationError::PluralMissingOther { .. }));
}

#[test]
fn missing_directory_keeps_builtins() {
    let temp = tempdir().expect("tempdir");
    let manager = LocalizationManager::load_from_dir(temp.path().join("absent")).expect("load");
    assert_eq!(manager.locale_summaries().len(), 2);
}

#[test]
fn locale_codes_are_validated() {
    assert!(validate_locale_code("pt-CV").is_ok());
    assert!(matches!(
        validate_locale_code("not a locale"),
        Err(LocalizationError::InvalidLocaleIdentifier { .. })
    ));
}
