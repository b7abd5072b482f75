use std::time::{Duration, Instant};

use civicdesk_overlay::ModalCoordinator;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    AttachmentList, AttachmentMeta, AttachmentValidator, DeliveryComposer, DeliveryTransport,
    KeyValueStorage, SupportTicket, TicketFields, TicketStore, ValidationReport,
};

/// 成功送出後自動關閉前的等待時間。 / Wait between a successful submit and the automatic close.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(2000);

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// 表單上顯示的單一錯誤。 / The single error shown on the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("subject is required")]
    MissingSubject,
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("message is required")]
    MissingMessage,
    #[error("file '{0}' is too large (max 10 MB)")]
    AttachmentTooLarge(String),
    #[error("ticket could not be saved")]
    SaveFailed,
}

impl FormError {
    /// 對應的在地化鍵。 / Localization key for the user-facing message.
    pub fn message_key(&self) -> &'static str {
        match self {
            FormError::MissingSubject => "support.error.subject",
            FormError::InvalidEmail => "support.error.email",
            FormError::MissingMessage => "support.error.message",
            FormError::AttachmentTooLarge(_) => "support.error.too_large",
            FormError::SaveFailed => "support.error.save_failed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Error(FormError),
    Success { ticket_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Field validation failed; nothing was persisted.
    Rejected(FormError),
    /// Persisting failed; delivery was not attempted.
    SaveFailed,
    Submitted {
        ticket: SupportTicket,
        close_at: Instant,
    },
}

/// 支援請求表單與送出流程。 / Support request form and its submission flow.
///
/// On failure the fields stay populated and [`FormStatus`] carries the latest
/// message. A successful submit arms an auto-close deadline that [`tick`]
/// fires later; the deadline is not cancelled by closing the overlay another
/// way, in which case the close it triggers is a no-op.
///
/// [`tick`]: SupportForm::tick
#[derive(Debug)]
pub struct SupportForm {
    pub subject: String,
    pub contact_email: String,
    pub message: String,
    attachments: AttachmentList,
    validator: AttachmentValidator,
    status: FormStatus,
    close_delay: Duration,
    pending_close: Option<Instant>,
}

impl Default for SupportForm {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_DELAY)
    }
}

impl SupportForm {
    pub fn new(close_delay: Duration) -> Self {
        Self {
            subject: String::new(),
            contact_email: String::new(),
            message: String::new(),
            attachments: AttachmentList::new(),
            validator: AttachmentValidator::default(),
            status: FormStatus::Idle,
            close_delay,
            pending_close: None,
        }
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn attachments(&self) -> &[AttachmentMeta] {
        self.attachments.as_slice()
    }

    pub fn pending_close(&self) -> Option<Instant> {
        self.pending_close
    }

    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// 附加檔案；被拒的檔案會取代目前的錯誤訊息。 / Attaches files; a rejected file replaces the current message.
    pub fn attach<I>(&mut self, candidates: I) -> ValidationReport
    where
        I: IntoIterator<Item = AttachmentMeta>,
    {
        let report = self.attachments.attach(&self.validator, candidates);
        if let Some(rejection) = report.rejected.last() {
            self.status = FormStatus::Error(FormError::AttachmentTooLarge(rejection.name.clone()));
        }
        if report.truncated > 0 {
            debug!(dropped = report.truncated, "attachment limit reached");
        }
        report
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<AttachmentMeta> {
        self.attachments.remove(index)
    }

    pub fn validate_fields(&self) -> Result<(), FormError> {
        if self.subject.trim().is_empty() {
            return Err(FormError::MissingSubject);
        }
        if !EMAIL_PATTERN.is_match(self.contact_email.trim()) {
            return Err(FormError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            return Err(FormError::MissingMessage);
        }
        Ok(())
    }

    /// 驗證、保存、組成並交付；交付失敗不影響已保存的工單。
    /// / Validates, persists, composes and hands off. A failed hand-off does not
    /// undo the saved ticket.
    pub fn submit<S, T>(
        &mut self,
        store: &mut TicketStore<S>,
        composer: &DeliveryComposer,
        transport: &mut T,
        now: Instant,
    ) -> SubmitOutcome
    where
        S: KeyValueStorage,
        T: DeliveryTransport + ?Sized,
    {
        if let Err(err) = self.validate_fields() {
            self.status = FormStatus::Error(err.clone());
            return SubmitOutcome::Rejected(err);
        }

        let fields = TicketFields {
            subject: self.subject.trim().to_string(),
            contact_email: self.contact_email.trim().to_string(),
            message: self.message.trim().to_string(),
            attachments: self.attachments.to_vec(),
        };
        let ticket = match store.create(fields) {
            Ok(ticket) => ticket,
            Err(err) => {
                error!(error = %err, cause = ?std::error::Error::source(&err), "support submission halted");
                self.status = FormStatus::Error(FormError::SaveFailed);
                return SubmitOutcome::SaveFailed;
            }
        };

        let message = composer.compose(&ticket);
        if let Err(err) = transport.hand_off(&message) {
            warn!(id = %ticket.id, %err, "delivery hand-off failed; ticket remains saved");
        }

        let close_at = now + self.close_delay;
        self.status = FormStatus::Success {
            ticket_id: ticket.id.clone(),
        };
        self.pending_close = Some(close_at);
        SubmitOutcome::Submitted { ticket, close_at }
    }

    /// 到期時重設表單並關閉面板。 / When the deadline has passed, resets the form and closes the overlay.
    pub fn tick(&mut self, now: Instant, coordinator: &mut ModalCoordinator) -> bool {
        match self.pending_close {
            Some(deadline) if now >= deadline => {
                self.pending_close = None;
                self.reset();
                coordinator.close();
                true
            }
            _ => false,
        }
    }

    /// Clears fields, attachments and status. An armed auto-close stays armed.
    pub fn reset(&mut self) {
        self.subject.clear();
        self.contact_email.clear();
        self.message.clear();
        self.attachments.clear();
        self.status = FormStatus::Idle;
    }
}
