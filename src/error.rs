//! Error taxonomy shared by the core.
//!
//! Publishers are generic over their failure type; `RxError` is the
//! ready-made choice for sources that fail with a description (a decode
//! failure, a transport error reported by a collaborator) and the type used
//! to report demand violations.

/// Failure type of streams that cannot fail.
pub type Never = std::convert::Infallible;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RxError {
  /// The upstream source could not produce its data.
  #[error("producer failure: {0}")]
  ProducerFailure(String),

  /// A value was pushed beyond the demand the subscriber granted.
  #[error("protocol violation: {0}")]
  ProtocolViolation(&'static str),
}

impl RxError {
  pub fn producer(cause: impl Into<String>) -> Self { RxError::ProducerFailure(cause.into()) }
}

/// Report a protocol violation: fatal in debug builds, logged and dropped in
/// release builds.
#[track_caller]
pub(crate) fn protocol_violation(err: RxError) {
  tracing::error!(error = %err, "reactive stream protocol violated");
  debug_assert!(false, "{err}");
}
