pub mod locale;
pub mod screen;
pub mod shell;

pub use locale::LocaleSignal;
pub use screen::{ScreenRefresher, ScreenText};
pub use shell::{FrameReport, PortalShell};
