use std::time::Instant;

use civicdesk_overlay::{ModalCoordinator, OverlayKey, OverlayPayload, TranslationSynchronizer};
use civicdesk_settings::{LocalizationManager, PortalConfig};
use civicdesk_support::{
    AttachmentMeta, DeliveryComposer, DeliveryTransport, KeyValueStorage, SubmitOutcome,
    SupportForm, TicketStore, ValidationReport,
};
use tracing::warn;

use crate::{LocaleSignal, ScreenRefresher, ScreenText};

/// What happened during one call to [`PortalShell::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub auto_closed: bool,
    pub refreshed: bool,
}

/// 單執行緒事件迴圈的宿主，串接面板、語系、表單與工單。
/// / Single-threaded host wiring the overlay coordinator, locale, support form and ticket store.
///
/// Each [`frame`](Self::frame) first fires a due auto-close, then mounts the
/// active overlay, then runs the coalesced translation refresh against the
/// state current at that point.
pub struct PortalShell<S, T> {
    coordinator: ModalCoordinator,
    synchronizer: TranslationSynchronizer,
    locale: LocaleSignal,
    localization: LocalizationManager,
    screen: ScreenText,
    mounted: Option<OverlayKey>,
    form: SupportForm,
    store: TicketStore<S>,
    composer: DeliveryComposer,
    transport: T,
}

impl<S, T> PortalShell<S, T>
where
    S: KeyValueStorage,
    T: DeliveryTransport,
{
    pub fn new(
        config: &PortalConfig,
        mut localization: LocalizationManager,
        store: TicketStore<S>,
        transport: T,
    ) -> Self {
        if !localization.set_active_by_code(&config.ui.locale) {
            warn!(locale = %config.ui.locale, "configured locale not available, using default");
        }
        let synchronizer = TranslationSynchronizer::new();
        let locale = LocaleSignal::new(localization.active_code(), synchronizer.requester());
        // Resolve the initial screen on the first frame.
        synchronizer.notify();

        Self {
            coordinator: ModalCoordinator::new(synchronizer.requester()),
            locale,
            synchronizer,
            localization,
            screen: ScreenText::default(),
            mounted: None,
            form: SupportForm::new(config.support.close_delay()),
            store,
            composer: DeliveryComposer::new(
                config.support.product_name.clone(),
                config.support.recipient.clone(),
            ),
            transport,
        }
    }

    pub fn open(&mut self, key: OverlayKey, payload: Option<OverlayPayload>) {
        self.coordinator.open(key, payload);
    }

    pub fn open_named(&mut self, name: &str, payload: Option<OverlayPayload>) {
        self.coordinator.open_named(name, payload);
    }

    pub fn close(&mut self) {
        self.coordinator.close();
    }

    /// 切換語系；未提供的語系會被忽略。 / Switches locale; unavailable locales are ignored.
    pub fn set_locale(&mut self, code: &str) -> bool {
        if !self.localization.set_active_by_code(code) {
            warn!(locale = code, "locale not available");
            return false;
        }
        self.locale.set(code)
    }

    pub fn attach_files<I>(&mut self, candidates: I) -> ValidationReport
    where
        I: IntoIterator<Item = AttachmentMeta>,
    {
        let report = self.form.attach(candidates);
        self.synchronizer.notify();
        report
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<AttachmentMeta> {
        let removed = self.form.remove_attachment(index);
        if removed.is_some() {
            self.synchronizer.notify();
        }
        removed
    }

    pub fn submit_support(&mut self, now: Instant) -> SubmitOutcome {
        let outcome = self
            .form
            .submit(&mut self.store, &self.composer, &mut self.transport, now);
        self.synchronizer.notify();
        outcome
    }

    pub fn frame(&mut self, now: Instant) -> FrameReport {
        let auto_closed = self.form.tick(now, &mut self.coordinator);
        self.mounted = self.coordinator.active_key();

        let mut refresher = ScreenRefresher {
            localization: &self.localization,
            form: &self.form,
            screen: &mut self.screen,
        };
        let refreshed = self.synchronizer.run_frame(
            self.coordinator.selection(),
            self.locale.code(),
            &mut refresher,
        );
        FrameReport {
            auto_closed,
            refreshed,
        }
    }

    pub fn coordinator(&self) -> &ModalCoordinator {
        &self.coordinator
    }

    pub fn synchronizer(&self) -> &TranslationSynchronizer {
        &self.synchronizer
    }

    pub fn locale(&self) -> &str {
        self.locale.code()
    }

    pub fn localization(&self) -> &LocalizationManager {
        &self.localization
    }

    /// Overlay mounted by the last frame.
    pub fn mounted(&self) -> Option<OverlayKey> {
        self.mounted
    }

    pub fn screen(&self) -> &ScreenText {
        &self.screen
    }

    pub fn form(&self) -> &SupportForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SupportForm {
        &mut self.form
    }

    pub fn store(&self) -> &TicketStore<S> {
        &self.store
    }

    pub fn composer(&self) -> &DeliveryComposer {
        &self.composer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
