//! Operators.
//!
//! Every operator is a publisher wrapping its upstream. Most of them forward
//! the upstream subscription unchanged and only touch the values passing by;
//! operators that drop values ask the upstream for a replacement so bounded
//! demand never stalls. Operators that emit on their own schedule (on
//! completion, from a timer, from several sources) deliver through an outlet
//! that enforces downstream demand.
//!
//! All operators are reachable as methods of [`PublisherExt`], implemented
//! for every publisher.

use std::{fmt::Debug, time::Duration};

use crate::{
  demand::Demand,
  error::Never,
  publisher::{AnyPublisher, Publisher},
  scheduler::Scheduler,
  sink::Sink,
  subject::Subject,
  subscriber::Completion,
  subscription::AnyCancellable,
};

pub mod catch;
pub mod collect;
pub mod combine_latest;
pub mod compact_map;
pub mod debounce;
pub mod drop_first;
pub mod drop_until_output_from;
pub mod drop_while;
pub mod filter;
pub mod first;
pub mod flat_map;
pub mod ignore_output;
pub mod inspect;
pub mod last;
pub mod map;
pub mod map_error;
pub mod merge;
pub mod multicast;
pub mod prefix;
pub mod receive_on;
pub mod reduce;
mod relay;
pub mod remove_duplicates;
pub mod replace_empty;
pub mod replace_nil;
pub mod scan;
pub mod share;
pub mod switch_to_latest;
pub mod trace;
pub mod try_map;
pub mod zip;

use catch::{CatchOp, ReplaceErrorOp};
use collect::CollectOp;
use combine_latest::CombineLatestOp;
use compact_map::CompactMapOp;
use debounce::DebounceOp;
use drop_first::DropFirstOp;
use drop_until_output_from::DropUntilOutputFromOp;
use drop_while::DropWhileOp;
use filter::FilterOp;
use first::{FirstOp, FirstWhereOp};
use flat_map::FlatMapOp;
use ignore_output::IgnoreOutputOp;
use inspect::InspectOp;
use last::{LastOp, LastWhereOp};
use map::MapOp;
use map_error::{absurd, MapErrorOp, SetFailureTypeOp};
pub use merge::{merge_all, MergeAll, MergeOp};
pub use multicast::Multicast;
use prefix::{PrefixOp, PrefixWhileOp};
use receive_on::ReceiveOnOp;
use reduce::{count_one, push_one, CollectAllOp, CountOp, ReduceOp};
use remove_duplicates::RemoveDuplicatesOp;
use replace_empty::ReplaceEmptyOp;
use replace_nil::ReplaceNilOp;
use scan::ScanOp;
pub use share::Share;
use switch_to_latest::SwitchToLatestOp;
use trace::TraceOp;
use try_map::TryMapOp;
use zip::ZipOp;

fn always<T>(_: &T) -> bool { true }

pub trait PublisherExt: Publisher + Sized {
  /// Transform every value with `f`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B + 'static,
  {
    MapOp { source: self, func: f }
  }

  /// Emit only the values `filter` accepts.
  ///
  /// ```
  /// use rxdemand::prelude::*;
  ///
  /// let _sub = from_iter(1..=10).filter(|v| v % 2 == 0).sink(|v| println!("{v}"));
  /// ```
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool + 'static,
  {
    FilterOp { source: self, filter }
  }

  /// Map and drop the `None`s.
  fn compact_map<B, F>(self, f: F) -> CompactMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Option<B> + 'static,
  {
    CompactMapOp { source: self, func: f }
  }

  /// Map with a fallible function; the first `Err` cancels the upstream and
  /// fails the stream.
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Result<B, Self::Err> + 'static,
  {
    TryMapOp { source: self, func: f }
  }

  /// Emit every intermediate accumulator. The seed itself is never emitted.
  fn scan<B, F>(self, seed: B, f: F) -> ScanOp<Self, B, F>
  where
    B: Clone + 'static,
    F: FnMut(B, Self::Item) -> B + 'static,
  {
    ScanOp { source: self, seed, func: f }
  }

  /// Skip values equal to the one emitted right before.
  fn remove_duplicates(self) -> RemoveDuplicatesOp<Self>
  where
    Self::Item: PartialEq + Clone,
  {
    RemoveDuplicatesOp { source: self }
  }

  fn drop_first(self, count: usize) -> DropFirstOp<Self> { DropFirstOp { source: self, count } }

  /// Skip values while `predicate` holds. It is not consulted again after
  /// the first value it rejects.
  fn drop_while<F>(self, predicate: F) -> DropWhileOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool + 'static,
  {
    DropWhileOp { source: self, predicate }
  }

  /// Ignore values until `trigger` emits once.
  fn drop_until_output_from<T>(self, trigger: T) -> DropUntilOutputFromOp<Self, T>
  where
    T: Publisher<Err = Self::Err>,
  {
    DropUntilOutputFromOp { source: self, trigger }
  }

  /// Emit at most `count` values, then cancel the upstream and finish.
  fn prefix(self, count: usize) -> PrefixOp<Self> { PrefixOp { source: self, count } }

  fn prefix_while<F>(self, predicate: F) -> PrefixWhileOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool + 'static,
  {
    PrefixWhileOp { source: self, predicate }
  }

  fn first(self) -> FirstOp<Self, Self::Item> { FirstWhereOp { source: self, predicate: always } }

  fn first_where<F>(self, predicate: F) -> FirstWhereOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool + 'static,
  {
    FirstWhereOp { source: self, predicate }
  }

  fn last(self) -> LastOp<Self, Self::Item> { LastWhereOp { source: self, predicate: always } }

  fn last_where<F>(self, predicate: F) -> LastWhereOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool + 'static,
  {
    LastWhereOp { source: self, predicate }
  }

  /// Fold the stream into one value emitted on finish.
  fn reduce<B, F>(self, seed: B, f: F) -> ReduceOp<Self, B, F>
  where
    B: 'static,
    F: FnMut(B, Self::Item) -> B + 'static,
  {
    ReduceOp { source: self, seed, func: f }
  }

  fn count(self) -> CountOp<Self, Self::Item> { ReduceOp { source: self, seed: 0, func: count_one } }

  /// Group values into `Vec`s of `count`. A count of zero is treated as one.
  fn collect(self, count: usize) -> CollectOp<Self> { CollectOp { source: self, count } }

  /// Emit every value as one `Vec` once the upstream finishes.
  fn collect_all(self) -> CollectAllOp<Self, Self::Item> {
    ReduceOp { source: self, seed: vec![], func: push_one }
  }

  fn ignore_output(self) -> IgnoreOutputOp<Self> { IgnoreOutputOp { source: self } }

  /// Unwrap `Option` values, emitting `value` in place of every `None`.
  fn replace_nil<T>(self, value: T) -> ReplaceNilOp<Self, T>
  where
    Self: Publisher<Item = Option<T>>,
    T: Clone + 'static,
  {
    ReplaceNilOp { source: self, value }
  }

  fn replace_empty(self, value: Self::Item) -> ReplaceEmptyOp<Self, Self::Item> {
    ReplaceEmptyOp { source: self, value }
  }

  /// Turn a failure into `value` followed by a normal finish.
  fn replace_error(self, value: Self::Item) -> ReplaceErrorOp<Self, Self::Item> {
    ReplaceErrorOp { source: self, value }
  }

  /// On failure, continue with the publisher built by `handler`.
  fn catch<P, F>(self, handler: F) -> CatchOp<Self, F>
  where
    F: FnOnce(Self::Err) -> P + 'static,
    P: Publisher<Item = Self::Item>,
  {
    CatchOp { source: self, handler }
  }

  fn map_error<E, F>(self, f: F) -> MapErrorOp<Self, F>
  where
    F: FnMut(Self::Err) -> E + 'static,
  {
    MapErrorOp { source: self, func: f }
  }

  /// Give an infallible publisher any error type, so it composes with
  /// publishers that can fail.
  fn set_failure_type<E>(self) -> SetFailureTypeOp<Self, E>
  where
    Self: Publisher<Err = Never>,
  {
    MapErrorOp { source: self, func: absurd }
  }

  fn inspect<F>(self, f: F) -> InspectOp<Self, F>
  where
    F: FnMut(&Self::Item) + 'static,
  {
    InspectOp { source: self, func: f }
  }

  /// Log every signal passing by, and demand going up, under `label`.
  fn trace(self, label: &'static str) -> TraceOp<Self>
  where
    Self::Item: Debug,
    Self::Err: Debug,
  {
    TraceOp { source: self, label }
  }

  /// Emit a value once `duration` passed on `scheduler` without a newer one.
  fn debounce<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> DebounceOp<Self, SD> {
    DebounceOp { source: self, scheduler, duration }
  }

  /// Deliver values and completion through `scheduler`.
  fn receive_on<SD: Scheduler>(self, scheduler: SD) -> ReceiveOnOp<Self, SD> {
    ReceiveOnOp { source: self, scheduler }
  }

  fn combine_latest<B>(self, other: B) -> CombineLatestOp<Self, B>
  where
    B: Publisher<Err = Self::Err>,
    Self::Item: Clone,
    B::Item: Clone,
  {
    CombineLatestOp { source_a: self, source_b: other }
  }

  fn zip<B>(self, other: B) -> ZipOp<Self, B>
  where
    B: Publisher<Err = Self::Err>,
  {
    ZipOp { source_a: self, source_b: other }
  }

  fn merge<B>(self, other: B) -> MergeOp<Self, B>
  where
    B: Publisher<Item = Self::Item, Err = Self::Err>,
  {
    MergeOp { source1: self, source2: other }
  }

  /// Map every value to a publisher and merge their values, with at most
  /// `max_publishers` inner publishers requested from the upstream at once.
  fn flat_map<P, F>(self, max_publishers: Demand, f: F) -> FlatMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> P + 'static,
    P: Publisher<Err = Self::Err>,
  {
    FlatMapOp { source: self, max_publishers, func: f }
  }

  /// Flatten a publisher of publishers, following only the newest one.
  fn switch_to_latest(self) -> SwitchToLatestOp<Self>
  where
    Self::Item: Publisher<Err = Self::Err>,
  {
    SwitchToLatestOp { source: self }
  }

  /// Share one upstream subscription through `subject`, started by
  /// [`Multicast::connect`].
  fn multicast<Sub>(self, subject: Sub) -> Multicast<Self, Sub>
  where
    Sub: Subject<Item = Self::Item, Err = Self::Err>,
  {
    Multicast::new(self, subject)
  }

  /// Share one upstream subscription, connected by the first subscriber.
  fn share(self) -> Share<Self>
  where
    Self: Clone,
    Self::Item: Clone,
    Self::Err: Clone,
  {
    Share::new(self)
  }

  /// Erase the concrete type of the chain.
  fn erase(self) -> AnyPublisher<Self::Item, Self::Err>
  where
    Self: Clone + 'static,
  {
    AnyPublisher::new(self)
  }

  /// Subscribe with a closure for values, requesting unbounded demand. Only
  /// for publishers that cannot fail; use [`sink_all`](Self::sink_all)
  /// otherwise.
  fn sink<N>(self, on_value: N) -> AnyCancellable
  where
    Self: Publisher<Err = Never>,
    N: FnMut(Self::Item) + 'static,
  {
    self.sink_all(on_value, |_| {})
  }

  /// Subscribe with closures for values and completion.
  fn sink_all<N, C>(self, on_value: N, on_completion: C) -> AnyCancellable
  where
    N: FnMut(Self::Item) + 'static,
    C: FnOnce(Completion<Self::Err>) + 'static,
  {
    let sink = Sink::new(on_value, on_completion);
    let handle = sink.cancellable();
    self.subscribe(sink);
    handle
  }
}

impl<P: Publisher> PublisherExt for P {}
