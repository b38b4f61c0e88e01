/// Classification for retry policy.
///
/// Used to determine how an outbound call and the surrounding provider
/// cascade should respond to an error.
///
/// # Behavior Summary
///
/// | Class | Retried in place? | Provider advances to next tier? |
/// |-------|-------------------|---------------------------------|
/// | `Never` | No | No, the error propagates |
/// | `WithBackoff` | Yes, with exponential backoff | Yes, once attempts are exhausted |
/// | `NextTier` | No | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - configuration error or terminal exhaustion.
    /// The request is fundamentally invalid or every option is used up.
    Never,

    /// Transient transport failure (connection error, HTTP status).
    ///
    /// The retry policy repeats the call with jittered exponential backoff.
    /// After the last attempt the original error is handed back unchanged
    /// and the provider treats it as cause to move to its next tier.
    WithBackoff,

    /// Malformed or unexpected data.
    ///
    /// Retrying the same endpoint won't help, but another endpoint shape
    /// or the public rate chain might succeed.
    NextTier,
}
