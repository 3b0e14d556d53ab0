/// How a failed remote-library availability check is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GhostPolicy {
    /// An unverifiable library counts as reachable, so its collections stay
    /// read-only.
    #[default]
    FailOpen,
    /// An unverifiable library counts as gone, so its collections open up
    /// for local edits.
    FailClosed,
}

/// Per-run scan configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub ghost_policy: GhostPolicy,
    /// Longest text excerpt carried into an unbound-element flag, in chars.
    pub text_excerpt_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ghost_policy: GhostPolicy::FailOpen,
            text_excerpt_len: 24,
        }
    }
}
