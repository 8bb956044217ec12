/// Closed status enumeration with a fixed transition table.
pub trait LifecycleStatus: Copy + Eq + 'static {
    /// Returns the statuses reachable in one step, excluding `self`.
    fn allowed_transitions(self) -> &'static [Self];

    /// Returns a stable storage value for the status.
    fn as_str(self) -> &'static str;

    /// Returns whether the status has no outgoing transitions.
    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Returns whether `next` may follow `current`.
///
/// Re-applying the current status is always permitted, terminal or not.
#[must_use]
pub fn validate_transition<S: LifecycleStatus>(current: S, next: S) -> bool {
    current == next || current.allowed_transitions().contains(&next)
}
