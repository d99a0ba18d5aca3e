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
use std::time::Duration;
use serde::{Serialize,Deserialize};
use wtdash_common::collections::{push_to_ringbuffer,drop_front_while,replace_back};
use wtdash_common::datetime::{EpochMillis,deserialize_duration,serialize_duration};

/// how much history a channel keeps
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub enum Retention {
    /// keep the last n samples
    Capacity(usize),
    /// keep samples not older than this relative to the newest one
    Window( #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")] Duration),
}

impl Retention {
    pub fn is_valid (&self)->bool {
        match self {
            Retention::Capacity(n) => *n > 0,
            Retention::Window(dt) => !dt.is_zero()
        }
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub struct Sample {
    pub t: EpochMillis,
    pub v: f64
}

/// outcome of adding a sample
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Append {
    Appended,
    /// same timestamp as the last sample, value replaced
    Coalesced,
    /// older than the last sample (or not a finite number)
    Rejected
}

/// a bounded, time ordered sequence of scalar samples.
/// Timestamps are monotonic non-decreasing, no two samples share a timestamp
#[derive(Debug,Clone)]
pub struct TimeSeries {
    retention: Retention,
    samples: VecDeque<Sample>,
}

impl TimeSeries {
    pub fn new (retention: Retention)->Self {
        let samples = match retention {
            Retention::Capacity(n) => VecDeque::with_capacity(n),
            Retention::Window(_) => VecDeque::new()
        };
        TimeSeries { retention, samples }
    }

    pub fn retention (&self)->Retention { self.retention }

    pub fn push (&mut self, t: EpochMillis, v: f64)->Append {
        if !v.is_finite() {
            return Append::Rejected
        }

        if let Some(last) = self.samples.back() {
            if t < last.t {
                return Append::Rejected
            } else if t == last.t {
                replace_back( &mut self.samples, Sample{t,v});
                return Append::Coalesced
            }
        }

        match self.retention {
            Retention::Capacity(n) => {
                push_to_ringbuffer( &mut self.samples, n, Sample{t,v});
            }
            Retention::Window(dt) => {
                self.samples.push_back( Sample{t,v});
                let cutoff = t.offset_millis( -(dt.as_millis() as i64));
                drop_front_while( &mut self.samples, |s| s.t < cutoff);
            }
        }
        Append::Appended
    }

    pub fn len (&self)->usize { self.samples.len() }

    pub fn is_empty (&self)->bool { self.samples.is_empty() }

    pub fn latest (&self)->Option<Sample> { self.samples.back().copied() }

    pub fn iter (&self)->impl Iterator<Item=&Sample> { self.samples.iter() }

    pub fn values (&self)->Vec<f64> { self.samples.iter().map(|s| s.v).collect() }

    pub fn to_vec (&self)->Vec<Sample> { self.samples.iter().copied().collect() }
}
