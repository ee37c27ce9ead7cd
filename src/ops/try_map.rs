use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::{Metered, SubscriptionRef},
};

/// Maps with a fallible function. The first `Err` cancels the upstream and
/// fails the stream with that error.
#[derive(Clone)]
pub struct TryMapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

pub struct TryMapSubscriber<O, F> {
  observer: O,
  func: F,
  upstream: Option<SubscriptionRef>,
  done: bool,
}

impl<S, F, B> Publisher for TryMapOp<S, F>
where
  S: Publisher,
  F: FnMut(S::Item) -> Result<B, S::Err> + 'static,
  B: 'static,
{
  type Item = B;
  type Err = S::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<B, S::Err> + 'static,
  {
    self.source.subscribe(Metered::new(TryMapSubscriber {
      observer: subscriber,
      func: self.func,
      upstream: None,
      done: false,
    }))
  }
}

impl<Item, Err, O, F, B> Subscriber<Item, Err> for TryMapSubscriber<O, F>
where
  O: Subscriber<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn on_subscribe(&mut self, subscription: SubscriptionRef) {
    self.upstream = Some(subscription.clone());
    self.observer.on_subscribe(subscription)
  }

  fn on_next(&mut self, value: Item) -> Demand {
    if self.done {
      return Demand::NONE;
    }
    match (self.func)(value) {
      Ok(mapped) => self.observer.on_next(mapped),
      Err(err) => {
        self.done = true;
        if let Some(upstream) = self.upstream.take() {
          upstream.cancel();
        }
        self.observer.on_complete(Completion::Failed(err));
        Demand::NONE
      }
    }
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    if !self.done {
      self.done = true;
      self.upstream = None;
      self.observer.on_complete(completion)
    }
  }
}
