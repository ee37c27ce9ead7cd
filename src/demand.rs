//! Demand: how many more values a publisher may push to a subscriber.

use std::{
  fmt,
  ops::{Add, AddAssign},
};

use crate::error::RxError;

/// Subscriber-granted permission to receive values.
///
/// Demand is additive: every grant is added to what is already outstanding,
/// saturating at [`Demand::Unbounded`]. It can never become negative; a
/// publisher that emits without outstanding demand breaks the protocol.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Demand {
  Unbounded,
  Max(usize),
}

impl Demand {
  /// No further values, the subscriber keeps what it already asked for.
  pub const NONE: Demand = Demand::Max(0);

  #[inline]
  pub const fn max(n: usize) -> Self { Demand::Max(n) }

  #[inline]
  pub const fn unbounded() -> Self { Demand::Unbounded }

  #[inline]
  pub fn is_none(&self) -> bool { *self == Demand::NONE }

  #[inline]
  pub fn is_unbounded(&self) -> bool { matches!(self, Demand::Unbounded) }

  /// The bounded count, `None` when unbounded.
  #[inline]
  pub fn count(&self) -> Option<usize> {
    match self {
      Demand::Unbounded => None,
      Demand::Max(n) => Some(*n),
    }
  }

  /// True when at least `n` values may be delivered.
  #[inline]
  pub fn covers(&self, n: usize) -> bool { self.count().is_none_or(|c| c >= n) }

  /// Consume one unit of demand for a delivered value.
  ///
  /// Unbounded demand is never consumed. Decrementing an exhausted demand is
  /// a protocol violation reported to the caller.
  pub fn checked_decrement(&mut self) -> Result<(), RxError> {
    match self {
      Demand::Unbounded => Ok(()),
      Demand::Max(0) => Err(RxError::ProtocolViolation("value delivered without outstanding demand")),
      Demand::Max(n) => {
        *n -= 1;
        Ok(())
      }
    }
  }

  /// Multiply a per-item demand, saturating at unbounded.
  pub fn saturating_mul(self, factor: usize) -> Self {
    match self {
      Demand::Unbounded => Demand::Unbounded,
      Demand::Max(n) => n.checked_mul(factor).map_or(Demand::Unbounded, Demand::Max),
    }
  }

  /// Remove `n` units, flooring at zero. Unbounded stays unbounded.
  pub fn saturating_sub(self, n: usize) -> Self {
    match self {
      Demand::Unbounded => Demand::Unbounded,
      Demand::Max(m) => Demand::Max(m.saturating_sub(n)),
    }
  }
}

impl Default for Demand {
  fn default() -> Self { Demand::NONE }
}

impl Add for Demand {
  type Output = Demand;

  fn add(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Max(a), Demand::Max(b)) => a.checked_add(b).map_or(Demand::Unbounded, Demand::Max),
      _ => Demand::Unbounded,
    }
  }
}

impl Add<usize> for Demand {
  type Output = Demand;

  fn add(self, rhs: usize) -> Demand { self + Demand::Max(rhs) }
}

impl AddAssign for Demand {
  fn add_assign(&mut self, rhs: Demand) { *self = *self + rhs; }
}

impl AddAssign<usize> for Demand {
  fn add_assign(&mut self, rhs: usize) { *self = *self + rhs; }
}

impl fmt::Debug for Demand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Demand::Unbounded => f.write_str("unbounded"),
      Demand::Max(n) => write!(f, "max({n})"),
    }
  }
}
