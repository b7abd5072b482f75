use tracing::{debug, warn};

use crate::{OverlayKey, RefreshRequester};

/// 隨面板一起傳入的附加資料。 / Auxiliary data handed to the overlay being opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayPayload {
    /// A reference document to preselect inside the overlay.
    Document { id: String, title: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveOverlay {
    Known(OverlayKey),
    /// Identifier outside the closed set; no overlay ever matches it.
    Unrecognized(String),
}

/// 全域唯一的「目前面板」狀態。 / The single application-wide overlay selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverlaySelection {
    #[default]
    None,
    Open {
        overlay: ActiveOverlay,
        payload: Option<OverlayPayload>,
    },
}

impl OverlaySelection {
    pub fn is_none(&self) -> bool {
        matches!(self, OverlaySelection::None)
    }

    pub fn active(&self) -> Option<&ActiveOverlay> {
        match self {
            OverlaySelection::None => None,
            OverlaySelection::Open { overlay, .. } => Some(overlay),
        }
    }

    /// The active overlay when it belongs to the closed enumeration.
    pub fn active_key(&self) -> Option<OverlayKey> {
        match self.active() {
            Some(ActiveOverlay::Known(key)) => Some(*key),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&OverlayPayload> {
        match self {
            OverlaySelection::None => None,
            OverlaySelection::Open { payload, .. } => payload.as_ref(),
        }
    }

    /// 供日誌使用的簡短描述。 / Short label for log output.
    pub fn describe(&self) -> &str {
        match self.active() {
            None => "none",
            Some(ActiveOverlay::Known(key)) => key.as_str(),
            Some(ActiveOverlay::Unrecognized(name)) => name.as_str(),
        }
    }
}

/// Owns the overlay selection; every open/close in the portal goes through here.
///
/// Opening always replaces the previous selection and its payload, overlays
/// never stack. Each change of the active overlay requests a deferred
/// translation refresh.
#[derive(Debug)]
pub struct ModalCoordinator {
    selection: OverlaySelection,
    refresh: RefreshRequester,
}

impl ModalCoordinator {
    pub fn new(refresh: RefreshRequester) -> Self {
        Self {
            selection: OverlaySelection::None,
            refresh,
        }
    }

    /// 開啟指定面板並取代目前的選擇。 / Opens the overlay, replacing whatever was active.
    pub fn open(&mut self, key: OverlayKey, payload: Option<OverlayPayload>) {
        debug!(overlay = key.as_str(), has_payload = payload.is_some(), "opening overlay");
        self.replace(ActiveOverlay::Known(key), payload);
    }

    /// 以字串識別開啟面板；未知識別不會對應任何面板。 / Opens by identifier; unknown identifiers match no overlay.
    pub fn open_named(&mut self, name: &str, payload: Option<OverlayPayload>) {
        match name.parse::<OverlayKey>() {
            Ok(key) => self.open(key, payload),
            Err(err) => {
                warn!(%err, "opening unrecognized overlay; nothing will be shown");
                self.replace(ActiveOverlay::Unrecognized(err.0), payload);
            }
        }
    }

    /// 關閉目前面板並清除附加資料；重複呼叫無副作用。 / Closes the active overlay and clears its payload. Idempotent.
    pub fn close(&mut self) {
        if self.selection.is_none() {
            return;
        }
        debug!(overlay = self.selection.describe(), "closing overlay");
        self.selection = OverlaySelection::None;
        self.refresh.request();
    }

    pub fn selection(&self) -> &OverlaySelection {
        &self.selection
    }

    pub fn active_key(&self) -> Option<OverlayKey> {
        self.selection.active_key()
    }

    pub fn payload(&self) -> Option<&OverlayPayload> {
        self.selection.payload()
    }

    /// Visibility predicate consulted by each overlay.
    pub fn is_open(&self, key: OverlayKey) -> bool {
        self.active_key() == Some(key)
    }

    /// The payload, but only while `key` is the active overlay.
    pub fn payload_for(&self, key: OverlayKey) -> Option<&OverlayPayload> {
        if self.is_open(key) {
            self.payload()
        } else {
            None
        }
    }

    fn replace(&mut self, overlay: ActiveOverlay, payload: Option<OverlayPayload>) {
        self.selection = OverlaySelection::Open { overlay, payload };
        self.refresh.request();
    }
}
