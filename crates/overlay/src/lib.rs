pub mod coordinator;
pub mod key;
pub mod sync;

pub use coordinator::{ActiveOverlay, ModalCoordinator, OverlayPayload, OverlaySelection};
pub use key::{OverlayKey, UnknownOverlayKey};
pub use sync::{RefreshContext, RefreshRequester, TextRefresher, TranslationSynchronizer};
