use std::time::{Duration, Instant};

use civicdesk_overlay::{OverlayKey, OverlayPayload};
use civicdesk_portal::PortalShell;
use civicdesk_settings::{LocalizationManager, PortalConfig};
use civicdesk_support::{
    AttachmentMeta, FileStorage, MailtoTransport, MemoryStorage, SubmitOutcome, TicketStore,
    MAX_ATTACHMENT_BYTES,
};
use tempfile::tempdir;

fn shell() -> PortalShell<MemoryStorage, MailtoTransport<Vec<u8>>> {
    let mut config = PortalConfig::default();
    config.support.close_delay_ms = 500;
    PortalShell::new(
        &config,
        LocalizationManager::builtin(),
        TicketStore::new(MemoryStorage::new()),
        MailtoTransport::new(Vec::new()),
    )
}

#[test]
fn first_frame_resolves_initial_screen() {
    let mut shell = shell();
    let report = shell.frame(Instant::now());
    assert!(report.refreshed);
    assert_eq!(shell.screen().locale, "pt-CV");
    assert_eq!(shell.screen().overlay, None);
    assert!(!shell.frame(Instant::now()).refreshed);
}

#[test]
fn rapid_overlay_and_locale_changes_refresh_once_with_final_state() {
    let mut shell = shell();
    shell.frame(Instant::now());

    shell.open(OverlayKey::About, None);
    shell.set_locale("en-US");
    shell.open(
        OverlayKey::Legislation,
        Some(OverlayPayload::Document {
            id: "bo-12".into(),
            title: "Boletim 12".into(),
        }),
    );
    shell.open(OverlayKey::Faq, None);

    let before = shell.synchronizer().executed();
    let report = shell.frame(Instant::now());
    assert!(report.refreshed);
    assert_eq!(shell.synchronizer().executed(), before + 1);
    assert_eq!(shell.mounted(), Some(OverlayKey::Faq));
    assert_eq!(shell.screen().locale, "en-US");
    assert_eq!(shell.screen().title.as_deref(), Some("FAQ"));
    assert!(shell.coordinator().payload().is_none());
}

#[test]
fn unknown_locale_is_ignored() {
    let mut shell = shell();
    shell.frame(Instant::now());
    assert!(!shell.set_locale("xx-YY"));
    assert_eq!(shell.locale(), "pt-CV");
    assert!(!shell.frame(Instant::now()).refreshed);
}

#[test]
fn support_flow_shows_messages_and_auto_closes() {
    let mut shell = shell();
    let start = Instant::now();
    shell.open(OverlayKey::Support, None);
    shell.frame(start);
    assert_eq!(shell.screen().title.as_deref(), Some("Suporte"));
    assert_eq!(shell.screen().line("support.form.submit"), Some("Enviar pedido"));

    let report = shell.attach_files(vec![
        AttachmentMeta::new("foto.jpg", 2048, "image/jpeg"),
        AttachmentMeta::new("video.mp4", MAX_ATTACHMENT_BYTES + 1, "video/mp4"),
    ]);
    assert_eq!(report.rejected.len(), 1);
    shell.frame(start);
    assert_eq!(
        shell.screen().line("support.status"),
        Some("O ficheiro video.mp4 excede 10 MB.")
    );
    assert_eq!(
        shell.screen().line("support.attachments.count"),
        Some("1 ficheiro anexado")
    );

    {
        let form = shell.form_mut();
        form.subject = "Login issue".into();
        form.contact_email = "user@example.cv".into();
        form.message = "Cannot log in since yesterday".into();
    }
    let SubmitOutcome::Submitted { ticket, close_at } = shell.submit_support(start) else {
        panic!("expected submission to succeed");
    };
    assert_eq!(close_at, start + Duration::from_millis(500));
    shell.frame(start);
    let status = shell.screen().line("support.status").unwrap_or_default();
    assert!(status.contains(&ticket.id));

    let handed_off = String::from_utf8(shell.transport().get_ref().clone()).unwrap();
    assert!(handed_off.starts_with("mailto:suporte@civicdesk.cv?subject=%5BCivicDesk%5D"));

    assert!(!shell.frame(start + Duration::from_millis(499)).auto_closed);
    assert!(shell.coordinator().is_open(OverlayKey::Support));
    let report = shell.frame(close_at);
    assert!(report.auto_closed);
    assert!(report.refreshed);
    assert!(shell.coordinator().selection().is_none());
    assert_eq!(shell.mounted(), None);
    assert!(shell.form().attachments().is_empty());
    assert_eq!(shell.store().load(), vec![ticket]);
}

#[test]
fn file_backed_shell_persists_between_sessions() {
    let dir = tempdir().unwrap();
    let config = PortalConfig::default();
    for subject in ["A", "B"] {
        let mut shell = PortalShell::new(
            &config,
            LocalizationManager::builtin(),
            TicketStore::new(FileStorage::new(dir.path())),
            MailtoTransport::new(Vec::new()),
        );
        shell.open(OverlayKey::Support, None);
        let form = shell.form_mut();
        form.subject = subject.into();
        form.contact_email = "user@example.cv".into();
        form.message = "body".into();
        assert!(matches!(
            shell.submit_support(Instant::now()),
            SubmitOutcome::Submitted { .. }
        ));
    }

    let store = TicketStore::new(FileStorage::new(dir.path()));
    let subjects: Vec<_> = store.load().into_iter().map(|t| t.subject).collect();
    assert_eq!(subjects, vec!["B", "A"]);
}
