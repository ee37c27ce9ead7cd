use crate::{
  publisher::Publisher,
  subject::{PassthroughSubject, Subject},
  subscriber::Subscriber,
};

/// Shares one upstream subscription among all subscribers.
///
/// The first subscriber connects the upstream; later ones join the running
/// stream and miss what was already emitted. When the last subscriber leaves
/// the upstream is cancelled, and the next subscriber starts it afresh. Once
/// the upstream completed, new subscribers only receive the completion.
pub struct Share<P: Publisher> {
  source: P,
  subject: PassthroughSubject<P::Item, P::Err>,
}

impl<P> Clone for Share<P>
where
  P: Publisher + Clone,
{
  fn clone(&self) -> Self { Share { source: self.source.clone(), subject: self.subject.clone() } }
}

impl<P> Share<P>
where
  P: Publisher + Clone,
  P::Item: Clone,
  P::Err: Clone,
{
  pub(crate) fn new(source: P) -> Self {
    let subject = PassthroughSubject::new();
    subject.core().set_ref_counted();
    Share { source, subject }
  }
}

impl<P> Publisher for Share<P>
where
  P: Publisher + Clone,
  P::Item: Clone,
  P::Err: Clone,
{
  type Item = P::Item;
  type Err = P::Err;

  fn subscribe<O>(self, subscriber: O)
  where
    O: Subscriber<P::Item, P::Err> + 'static,
  {
    let Share { source, subject } = self;
    subject.clone().subscribe(subscriber);
    let core = subject.core();
    if !core.is_connected() && !core.is_completed() && core.subscriber_count() > 0 {
      tracing::debug!("first subscriber arrived, connecting shared upstream");
      source.subscribe(subject);
    }
  }
}
