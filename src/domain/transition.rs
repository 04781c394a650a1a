/// Terminal page action taken once the payment stops being pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTransition {
    /// Navigate to the given URL, replacing the current history entry.
    Replace(String),
    /// Reload the current server-rendered view, which knows the real state.
    Reload,
}
