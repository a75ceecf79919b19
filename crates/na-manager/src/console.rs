//! User-facing progress output

/// Sink for progress the lifecycle commands report to the user.
pub trait Console: Send + Sync {
    /// A new step is starting
    fn step(&self, message: &str);

    /// Informational output
    fn message(&self, message: &str);

    /// A non-fatal problem
    fn warning(&self, message: &str);
}
