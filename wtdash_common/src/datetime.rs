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

use chrono::{DateTime, Utc};
use serde::{Serialize,Deserialize,Serializer,Deserializer};
use std::time::Duration;
use std::fmt;
use parse_duration::parse;

/// wall clock time in milliseconds since the unix epoch. This is what we store in time series
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub fn new (millis:i64)->Self { EpochMillis(millis) }

    pub fn millis (&self)->i64 { self.0 }

    pub fn offset_millis (&self, delta: i64)->Self { EpochMillis(self.0 + delta) }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(date) => write!(f, "{}", date),
            None => write!(f, "{}ms", self.0)
        }
    }
}

impl From<DateTime<Utc>> for EpochMillis {
    fn from (date: DateTime<Utc>)->Self { EpochMillis(date.timestamp_millis()) }
}

#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }

/// a clock that hands out strictly increasing EpochMillis values, even if it is queried several
/// times within the same wall clock millisecond. Used to stamp samples in arrival order
#[derive(Debug,Default)]
pub struct MonotonicClock {
    last: Option<EpochMillis>
}

impl MonotonicClock {
    pub fn new ()->Self { MonotonicClock { last: None } }

    pub fn next (&mut self)->EpochMillis {
        self.next_after( EpochMillis::now())
    }

    /// the next timestamp given a wall clock reading. Never returns a value <= the previous one
    pub fn next_after (&mut self, now: EpochMillis)->EpochMillis {
        let t = match self.last {
            Some(last) if now <= last => last.offset_millis(1),
            _ => now
        };
        self.last = Some(t);
        t
    }

    pub fn last (&self)->Option<EpochMillis> { self.last }
}

//--- serde support for config durations ("30ms", "1.5s", "2min")

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

pub fn deserialize_optional_duration <'a,D>(deserializer: D) -> Result<Option<Duration>,D::Error>
    where D: Deserializer<'a>
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) => {
            let d = parse(s.as_str()).map_err( |e| serde::de::Error::custom(format!("{:?}",e)))?;
            Ok( Some(d) )
        }
        None => Ok(None)
    }
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_str( &format!("{:?}", dur))
}

pub fn serialize_optional_duration<S: Serializer> (dur: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match dur {
        Some(d) => s.serialize_str( &format!("{:?}", d)),
        None => s.serialize_none()
    }
}
