// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use solus_core::governor::{
    Governed, GovernorError, Instance, Lifecycle, PolicyRegistry, SingletonPolicy, TypeKey,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, OnceLock};
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;

struct Counters {
    allocations: Arc<AtomicUsize>,
    inits: Arc<AtomicUsize>,
}

/// A governed type whose allocator is slow enough to widen any race window.
fn slow_governed(policy: SingletonPolicy) -> (Governed<usize, ()>, Counters) {
    slow_governed_with(policy, 5)
}

fn slow_governed_with(policy: SingletonPolicy, delay_ms: u64) -> (Governed<usize, ()>, Counters) {
    let allocations = Arc::new(AtomicUsize::new(0));
    let inits = Arc::new(AtomicUsize::new(0));
    let (alloc_counter, init_counter) = (Arc::clone(&allocations), Arc::clone(&inits));

    let governed = PolicyRegistry::new()
        .attach_with(
            policy,
            Lifecycle::adapt(move |_: &()| {
                thread::sleep(Duration::from_millis(delay_ms));
                Ok(alloc_counter.fetch_add(1, Ordering::SeqCst))
            })
            .with_initializer(move |_: &usize, _: &()| {
                init_counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .unwrap();
    (governed, Counters { allocations, inits })
}

fn construct_from_threads(
    governed: &Governed<usize, ()>,
) -> Vec<Result<Instance<usize>, GovernorError>> {
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let governed = governed.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                governed.construct(&())
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("constructing thread panicked"))
        .collect()
}

#[test]
fn test_concurrent_hard_requests_allocate_once() {
    let (governed, counters) = slow_governed(SingletonPolicy::Hard);

    let results = construct_from_threads(&governed);
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(GovernorError::DuplicateInstance { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(duplicates, THREADS - 1);
    assert_eq!(counters.allocations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_soft_requests_share_one_instance() {
    for policy in [SingletonPolicy::SoftReuseInit, SingletonPolicy::SoftSkipInit] {
        let (governed, counters) = slow_governed(policy);

        let instances: Vec<_> = construct_from_threads(&governed)
            .into_iter()
            .map(|r| r.expect("soft policies never refuse"))
            .collect();

        assert!(instances.windows(2).all(|w| Instance::ptr_eq(&w[0], &w[1])));
        assert_eq!(counters.allocations.load(Ordering::SeqCst), 1);

        let expected_inits = match policy {
            SingletonPolicy::SoftSkipInit => 1,
            _ => THREADS,
        };
        assert_eq!(counters.inits.load(Ordering::SeqCst), expected_inits);
    }
}

#[test]
fn test_reentrant_request_from_initializer_does_not_deadlock() {
    let handle: Arc<OnceLock<Governed<(), ()>>> = Arc::new(OnceLock::new());
    let nested = Arc::new(OnceLock::new());

    let lifecycle = {
        let handle = Arc::clone(&handle);
        let nested = Arc::clone(&nested);
        Lifecycle::adapt(|_: &()| Ok(())).with_initializer(move |_: &(), _: &()| {
            if let Some(governed) = handle.get() {
                let outcome = governed.construct(&());
                let _ = nested.set(matches!(
                    outcome,
                    Err(GovernorError::DuplicateInstance { .. })
                ));
            }
            Ok(())
        })
    };

    let governed = PolicyRegistry::new()
        .attach_with(SingletonPolicy::Hard, lifecycle)
        .unwrap();
    handle.set(governed.clone()).unwrap();

    let _outer = governed.construct(&()).unwrap();
    assert_eq!(
        nested.get(),
        Some(&true),
        "The nested request sees the claimed instance and is refused"
    );
}

#[test]
fn test_two_phases_driven_by_hand_share_one_instance() {
    // ARRANGE
    let (governed, counters) = slow_governed_with(SingletonPolicy::SoftSkipInit, 50);
    let barrier = Arc::new(Barrier::new(2));

    // ACT
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let governed = governed.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let interceptor = governed.interceptor();
                let instance = interceptor
                    .allocate(TypeKey::of::<usize>(), &())
                    .expect("soft policies never refuse");
                interceptor.initialize(&instance, &()).unwrap();
                instance
            })
        })
        .collect();
    let instances: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("constructing thread panicked"))
        .collect();

    // ASSERT
    assert!(Instance::ptr_eq(&instances[0], &instances[1]));
    assert_eq!(counters.allocations.load(Ordering::SeqCst), 1);
    assert_eq!(counters.inits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_skip_init_never_hands_out_uninitialized_object_while_last_handle_drops() {
    // ARRANGE
    let governed = PolicyRegistry::new()
        .attach_with(
            SingletonPolicy::SoftSkipInit,
            Lifecycle::adapt(|_: &()| Ok(AtomicBool::new(false))).with_initializer(
                |ready: &AtomicBool, _: &()| {
                    ready.store(true, Ordering::SeqCst);
                    Ok(())
                },
            ),
        )
        .unwrap();
    let mut uninitialized = 0;

    // ACT
    for _ in 0..2_000 {
        let last = governed.construct(&()).unwrap();
        let barrier = Arc::new(Barrier::new(2));
        let dropper = {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                drop(last);
            })
        };

        barrier.wait();
        for _ in 0..4 {
            let instance = governed.construct(&()).unwrap();
            if !instance.load(Ordering::SeqCst) {
                uninitialized += 1;
            }
        }
        dropper.join().expect("dropping thread panicked");
    }

    // ASSERT
    assert_eq!(uninitialized, 0, "every handed-out object ran its initializer");
}
