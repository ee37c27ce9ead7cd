#[macro_use]
extern crate bencher;

use std::{cell::Cell, rc::Rc};

use bencher::Bencher;
use rxdemand::prelude::*;

fn pass_through_chain(b: &mut Bencher) {
  b.iter(|| {
    let total = Rc::new(Cell::new(0u64));
    let t = total.clone();
    let _sub = from_iter(0..1_000u64)
      .map(|v| v * 3)
      .filter(|v| v % 2 == 0)
      .scan(0, |acc, v| acc + v)
      .sink(move |v| t.set(v));
    total.get()
  });
}

fn subject_fan_out(b: &mut Bencher) {
  b.iter(|| {
    let subject = PassthroughSubject::<u64, Never>::new();
    let hits = Rc::new(Cell::new(0u64));
    let handles: Vec<_> = (0..8)
      .map(|_| {
        let h = hits.clone();
        subject.clone().sink(move |_| h.set(h.get() + 1))
      })
      .collect();
    (0..100).for_each(|v| subject.send(v));
    drop(handles);
    hits.get()
  });
}

fn combinators(b: &mut Bencher) {
  b.iter(|| {
    let count = Rc::new(Cell::new(0usize));
    let c = count.clone();
    let _sub = from_iter(0..500)
      .zip(from_iter(0..500))
      .merge(from_iter(0..500).map(|v| (v, v)))
      .count()
      .sink(move |n| c.set(n));
    count.get()
  });
}

fn virtual_time_debounce(b: &mut Bencher) {
  b.iter(|| {
    let scheduler = TestScheduler::new();
    let subject = PassthroughSubject::<u32, Never>::new();
    let last = Rc::new(Cell::new(0));
    let l = last.clone();
    let _sub = subject
      .clone()
      .debounce(Duration::from_millis(5), scheduler.clone())
      .sink(move |v| l.set(v));
    for v in 0..200 {
      subject.send(v);
      scheduler.advance_by(Duration::from_millis(v as u64 % 7));
    }
    scheduler.flush();
    last.get()
  });
}

benchmark_group!(benches, pass_through_chain, subject_fan_out, combinators, virtual_time_debounce);
benchmark_main!(benches);
