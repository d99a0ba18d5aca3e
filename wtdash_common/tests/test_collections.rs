/*
 * Copyright © 2024, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

/// unit tests for ringbuffer helpers and the monotonic clock
/// run with "cargo test --test test_collections -- --nocapture"

use std::collections::VecDeque;
use wtdash_common::collections::{push_to_ringbuffer, drop_front_while, replace_back};
use wtdash_common::datetime::{EpochMillis, MonotonicClock};

#[test]
fn test_push_bounded () {
    println!("--- testing bounded ringbuffer push");
    let mut ring: VecDeque<usize> = VecDeque::new();
    let mut evicted = Vec::new();
    for d in 0..8 {
        if let Some(e) = push_to_ringbuffer( &mut ring, 5, d) { evicted.push(e) }
    }
    println!("{ring:?} evicted: {evicted:?}");

    assert_eq!( vec![3,4,5,6,7], ring.iter().copied().collect::<Vec<_>>());
    assert_eq!( vec![0,1,2], evicted);
}

#[test]
fn test_drop_front () {
    let mut ring: VecDeque<i64> = VecDeque::from( vec![1,2,3,10,11]);
    let n = drop_front_while( &mut ring, |t| *t < 5);
    assert_eq!( 3, n);
    assert_eq!( vec![10,11], ring.iter().copied().collect::<Vec<_>>());

    assert_eq!( Some(11), replace_back( &mut ring, 12));
    assert_eq!( Some(&12), ring.back());
}

#[test]
fn test_monotonic_clock () {
    let mut clock = MonotonicClock::new();
    let t0 = EpochMillis::new(1000);

    let a = clock.next_after(t0);
    let b = clock.next_after(t0);                     // same wall clock millisecond
    let c = clock.next_after( EpochMillis::new(900)); // wall clock went backwards
    let d = clock.next_after( EpochMillis::new(2000));
    println!("{a:?} {b:?} {c:?} {d:?}");

    assert_eq!( 1000, a.millis());
    assert_eq!( 1001, b.millis());
    assert_eq!( 1002, c.millis());
    assert_eq!( 2000, d.millis());
}
