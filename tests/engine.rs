// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;
use itertools::Itertools;
use paste::paste;
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use vifo::{Element, Options, Vifo};

/// Pushes 1..=9 in bound-size chunks, then pops in variable chunks, checking
/// strict ordering end to end.
#[test]
fn ordering_sweep() {
	let opts = Options::new(12).with_batch_bounds(3, 4);
	let mut fifo = Vifo::<u16>::new(opts).unwrap();

	let values = (1..=9u16).collect_vec();
	let mut idx = 0;
	while idx < values.len() {
		let chunk = (values.len() - idx).min(opts.max_push_batch);
		assert!(fifo.step(Some(&values[idx..idx + chunk]), 0, false).accepted);
		idx += chunk;
	}
	assert_eq!(fifo.occupancy(), values.len());

	let mut drained = Vec::new();
	while !fifo.is_empty() {
		let req = fifo.occupancy().min(opts.max_pop_batch);
		fifo.step(None, req, false);
		assert_eq!(fifo.offered().map(<[u16]>::len), Some(req));
		drained.extend_from_slice(fifo.step(None, req, true).delivered.unwrap());
	}
	assert_eq!(drained, values);

	// Once empty, requests must never raise an offer.
	for _ in 0..5 {
		assert!(fifo.step(None, opts.max_pop_batch, true).delivered.is_none());
		assert!(fifo.offered().is_none());
	}
}

/// Fills to capacity exactly, checks overflow rejection leaves state intact,
/// then drains and checks underflow rejection.
#[test]
fn backpressure_and_edge_cases() {
	let opts = Options::new(16).with_batch_bounds(4, 4);
	let mut fifo = Vifo::<u16>::new(opts).unwrap();

	let mut val = 1u16;
	while fifo.limit() > 0 {
		let chunk = fifo.limit().min(opts.max_push_batch);
		let batch = (0..chunk as u16).map(|i| val + i).collect_vec();
		assert!(fifo.step(Some(&batch), 0, false).accepted);
		val += chunk as u16;
	}
	assert!(fifo.is_full());

	// Overflow push: the buffer must refuse and hold its contents.
	assert!(!fifo.step(Some(&[0xAA; 4]), 0, false).accepted);
	assert_eq!(fifo.occupancy(), 16);
	assert_eq!(fifo.iter().copied().collect_vec(), (1..=16).collect_vec());

	let mut expect = 1u16;
	while !fifo.is_empty() {
		let req = fifo.occupancy().min(opts.max_pop_batch);
		fifo.step(None, req, false);
		let taken = fifo.step(None, req, true);
		for &v in taken.delivered.unwrap() {
			assert_eq!(v, expect);
			expect += 1;
		}
	}

	// Underflow: an empty buffer never raises an offer.
	for _ in 0..5 {
		assert!(fifo.step(None, 1, true).delivered.is_none());
		assert!(fifo.offered().is_none());
	}
}

/// Random stimulus against a model queue. Each op is a push length, a
/// requested pop size, and the consumer's accept line; lengths run slightly
/// past the configured bounds so out-of-range stimulus is exercised too.
#[quickcheck]
fn scoreboard(ops: Vec<(u8, u8, bool)>) {
	let opts = Options::new(24).with_batch_bounds(5, 3);
	let mut fifo = Vifo::<u16>::new(opts).unwrap();
	let mut model: VecDeque<u16> = VecDeque::new();
	let mut pending: Option<usize> = None;
	let mut next = 0u16;

	for (push_len, request, accept) in ops {
		let push_len = usize::from(push_len) % (opts.max_push_batch + 2);
		let request = usize::from(request) % (opts.max_pop_batch + 2);
		let batch = (next..next + push_len as u16).collect_vec();
		let before = model.len();

		let result = fifo.step((push_len > 0).then_some(batch.as_slice()), request, accept);

		// Offer register transition, mirrored: one transition per step, and
		// admissibility judged against pre-step occupancy.
		let expected = match pending.take() {
			Some(size) if accept => Some(size),
			_ => {
				pending = (1..=opts.max_pop_batch)
					.contains(&request)
					.then_some(request)
					.filter(|&r| r <= before);
				None
			}
		};
		match (result.delivered, expected) {
			(Some(delivered), Some(size)) => {
				assert_eq!(delivered.len(), size);
				for &v in delivered {
					assert_eq!(model.pop_front(), Some(v));
				}
			}
			(None, None) => {}
			(delivered, expected) => {
				panic!("delivery mismatch: got {delivered:?}, expected size {expected:?}")
			}
		}

		// All-or-nothing admission against pre-step free space.
		let fits = (1..=opts.max_push_batch).contains(&push_len)
			&& push_len <= opts.element_capacity - before;
		assert_eq!(result.accepted, fits);
		if result.accepted {
			model.extend(&batch);
			next += push_len as u16;
		}

		assert_eq!(fifo.occupancy(), model.len());
		assert_eq!(fifo.offered().map(<[u16]>::len), pending);
	}

	// Whatever the stimulus left behind must still drain in order.
	while !model.is_empty() {
		let req = model.len().min(opts.max_pop_batch);
		fifo.step(None, req, false);
		for &v in fifo.step(None, req, true).delivered.unwrap() {
			assert_eq!(model.pop_front(), Some(v));
		}
	}
	assert!(fifo.is_empty());
}

#[quickcheck]
fn reset_restores_full_capacity(fill: Vec<u8>) {
	let opts = Options::new(12).with_batch_bounds(4, 4);
	let mut fifo = Vifo::<u16>::new(opts).unwrap();
	for chunk in fill.chunks(3) {
		let batch = chunk.iter().map(|&b| u16::from(b)).collect_vec();
		fifo.step(Some(&batch), 1, false);
	}

	fifo.reset();
	assert!(fifo.is_empty());
	assert!(fifo.offered().is_none());

	for batch in (0..12u16).collect_vec().chunks(4) {
		assert!(fifo.step(Some(batch), 0, false).accepted);
	}
	assert!(fifo.is_full());
}

macro_rules! sweep {
	($($ty:ident),+) => {
		$(
		paste! {
			/// Full fill-and-drain at this element width; wide raw chunks
			/// truncate to the width on the way in.
			#[test]
			fn [<sweep_ $ty>]() {
				let opts = Options::new(8).with_batch_bounds(2, 2);
				let mut fifo = Vifo::<$ty>::new(opts).unwrap();
				let values: Vec<$ty> = (0..8u64)
					.map(|i| <$ty as Element>::from_bits(0xDEAD_BEEF_DEAD_BEEFu64 ^ i))
					.collect();
				for batch in values.chunks(2) {
					assert!(fifo.step(Some(batch), 0, false).accepted);
				}

				let mut drained: Vec<$ty> = Vec::new();
				while !fifo.is_empty() {
					fifo.step(None, 2, false);
					drained.extend_from_slice(fifo.step(None, 2, true).delivered.unwrap());
				}
				assert_eq!(drained, values);
			}
		}
		)+
	};
}

sweep! { u8, u16, u32, u64 }
