use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::OverlaySelection;

/// State observed by a refresh when it finally runs.
#[derive(Debug, Clone, Copy)]
pub struct RefreshContext<'a> {
    pub selection: &'a OverlaySelection,
    pub locale: &'a str,
}

/// 重新解析畫面文字的接收端。 / Receiver that re-resolves on-screen text.
pub trait TextRefresher {
    fn refresh(&mut self, context: RefreshContext<'_>);
}

impl<F> TextRefresher for F
where
    F: FnMut(RefreshContext<'_>),
{
    fn refresh(&mut self, context: RefreshContext<'_>) {
        self(context)
    }
}

/// 可複製的刷新請求把手。 / Cloneable handle used by state owners to request a refresh.
#[derive(Debug, Clone)]
pub struct RefreshRequester {
    pending: Rc<Cell<bool>>,
}

impl RefreshRequester {
    /// 排定下一個畫格的刷新。 / Schedules a refresh for the next frame boundary.
    pub fn request(&self) {
        self.pending.set(true);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Handle that is not attached to any synchronizer.
    pub fn detached() -> Self {
        Self {
            pending: Rc::new(Cell::new(false)),
        }
    }
}

/// Coalesces refresh requests into at most one run per frame.
///
/// Requests only raise a pending flag; [`TranslationSynchronizer::run_frame`]
/// is called by the host once the frame has been rendered and reads the state
/// that is current at that moment, so rapid toggling always resolves to the
/// last overlay/locale pair.
/// （合併刷新請求，每個畫格最多執行一次，並以執行當下的狀態為準。）
#[derive(Debug)]
pub struct TranslationSynchronizer {
    pending: Rc<Cell<bool>>,
    executed: u64,
}

impl Default for TranslationSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationSynchronizer {
    pub fn new() -> Self {
        Self {
            pending: Rc::new(Cell::new(false)),
            executed: 0,
        }
    }

    /// 取得共用旗標的請求把手。 / Returns a requester sharing this synchronizer's pending flag.
    pub fn requester(&self) -> RefreshRequester {
        RefreshRequester {
            pending: Rc::clone(&self.pending),
        }
    }

    pub fn notify(&self) {
        self.pending.set(true);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Number of refreshes actually executed so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 畫格邊界：若有待處理請求則執行一次刷新。 / Frame boundary: runs one refresh if any request is pending.
    ///
    /// The flag is cleared before the refresher runs, so a request raised
    /// during the refresh is carried to the next frame instead of being lost.
    pub fn run_frame(
        &mut self,
        selection: &OverlaySelection,
        locale: &str,
        refresher: &mut dyn TextRefresher,
    ) -> bool {
        if !self.pending.replace(false) {
            return false;
        }
        self.executed += 1;
        debug!(
            overlay = selection.describe(),
            locale,
            run = self.executed,
            "refreshing on-screen translations"
        );
        refresher.refresh(RefreshContext { selection, locale });
        true
    }
}
