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

use std::collections::VecDeque;

/// push a new element to the end of a VecDeque used as a ringbuffer with at most `max_len` elements.
/// Returns the evicted front element if the buffer was full
#[inline]
pub fn push_to_ringbuffer<T> (v: &mut VecDeque<T>, max_len: usize, t: T)->Option<T> {
    let evicted = if max_len > 0 && v.len() >= max_len { v.pop_front() } else { None };
    if max_len > 0 {
        v.push_back(t);
    }
    evicted
}

/// drop front elements while they satisfy the predicate. Returns the number of dropped elements
pub fn drop_front_while<T,F> (v: &mut VecDeque<T>, pred: F)->usize where F: Fn(&T)->bool {
    let mut n = 0;
    while let Some(front) = v.front() {
        if pred(front) {
            v.pop_front();
            n += 1;
        } else {
            break
        }
    }
    n
}

/// replace the last element of a VecDeque, returning the old value (None if empty)
#[inline]
pub fn replace_back<T> (v: &mut VecDeque<T>, t: T)->Option<T> {
    match v.back_mut() {
        Some(last) => Some( std::mem::replace(last, t)),
        None => None
    }
}
