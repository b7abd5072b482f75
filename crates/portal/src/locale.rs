use civicdesk_overlay::RefreshRequester;
use tracing::debug;

/// 外部擁有的目前語系；變更時要求刷新。 / Current locale value; any change requests a text refresh.
#[derive(Debug)]
pub struct LocaleSignal {
    code: String,
    refresh: RefreshRequester,
}

impl LocaleSignal {
    pub fn new(code: impl Into<String>, refresh: RefreshRequester) -> Self {
        Self {
            code: code.into(),
            refresh,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns `false` when the code is unchanged.
    pub fn set(&mut self, code: impl Into<String>) -> bool {
        let code = code.into();
        if code == self.code {
            return false;
        }
        debug!(from = %self.code, to = %code, "locale changed");
        self.code = code;
        self.refresh.request();
        true
    }
}
