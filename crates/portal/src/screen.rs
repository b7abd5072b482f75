use std::collections::BTreeMap;

use civicdesk_overlay::{OverlayKey, RefreshContext, TextRefresher};
use civicdesk_settings::{LocalizationManager, LocalizationParams};
use civicdesk_support::{FormError, FormStatus, SupportForm};

const SUPPORT_LABELS: &[&str] = &[
    "support.form.subject",
    "support.form.email",
    "support.form.message",
    "support.form.attach",
    "support.form.submit",
];

/// 目前畫面上已解析的文字。 / Text currently resolved for what is on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenText {
    pub locale: String,
    pub overlay: Option<OverlayKey>,
    pub title: Option<String>,
    pub lines: BTreeMap<String, String>,
}

impl ScreenText {
    pub fn line(&self, key: &str) -> Option<&str> {
        self.lines.get(key).map(String::as_str)
    }
}

/// Re-resolves [`ScreenText`] for the mounted overlay.
pub struct ScreenRefresher<'a> {
    pub localization: &'a LocalizationManager,
    pub form: &'a SupportForm,
    pub screen: &'a mut ScreenText,
}

impl TextRefresher for ScreenRefresher<'_> {
    fn refresh(&mut self, context: RefreshContext<'_>) {
        let overlay = context.selection.active_key();
        let mut lines = BTreeMap::new();

        if overlay == Some(OverlayKey::Support) {
            for key in SUPPORT_LABELS {
                lines.insert((*key).to_string(), self.localization.text(key).into_owned());
            }
            let count = self.form.attachments().len() as u64;
            lines.insert(
                "support.attachments.count".to_string(),
                self.localization
                    .text_with_params(
                        "support.attachments.count",
                        &LocalizationParams::count_only(count),
                    )
                    .into_owned(),
            );
            if let Some(status) = status_text(self.localization, self.form.status()) {
                lines.insert("support.status".to_string(), status);
            }
        }

        *self.screen = ScreenText {
            locale: context.locale.to_string(),
            overlay,
            title: overlay.map(|key| self.localization.text(&key.title_key()).into_owned()),
            lines,
        };
    }
}

fn status_text(localization: &LocalizationManager, status: &FormStatus) -> Option<String> {
    match status {
        FormStatus::Idle => None,
        FormStatus::Error(FormError::AttachmentTooLarge(name)) => {
            let values = [name.as_str()];
            Some(
                localization
                    .text_with_params(
                        "support.error.too_large",
                        &LocalizationParams::new(&values),
                    )
                    .into_owned(),
            )
        }
        FormStatus::Error(err) => Some(localization.text(err.message_key()).into_owned()),
        FormStatus::Success { ticket_id } => {
            let values = [ticket_id.as_str()];
            Some(
                localization
                    .text_with_params("support.form.sent", &LocalizationParams::new(&values))
                    .into_owned(),
            )
        }
    }
}
