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

//! the acquisition side: a set of independently timed telemetry sources whose fetch results
//! are forwarded as `UpdateMsg`s over the bridge, in the order the fetches complete

use std::time::Duration;
use serde::{Serialize,Deserialize};
use wtdash_common::{TELEMETRY_HOST, datetime::{millis, deserialize_duration, deserialize_optional_duration, serialize_duration, serialize_optional_duration}};

pub mod errors;
pub use errors::*;

pub mod fetcher;
pub use fetcher::*;

pub mod scheduler;
pub use scheduler::*;

pub mod worker;
pub use worker::*;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

fn default_max_in_flight ()->usize { DEFAULT_MAX_IN_FLIGHT }

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct SourceConfig {
    /// also the kind of the updates this source produces
    pub name: String,

    pub url: String,

    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub interval: Duration,

    /// delay of the first tick. If not set the scheduler staggers sources by registration order
    #[serde(default, deserialize_with="deserialize_optional_duration", serialize_with="serialize_optional_duration")]
    pub phase: Option<Duration>,

    /// max number of concurrently outstanding fetches for this source
    #[serde(default="default_max_in_flight")]
    pub max_in_flight: usize,
}

impl SourceConfig {
    pub fn new (name: impl ToString, url: impl ToString, interval: Duration)->Self {
        SourceConfig { name: name.to_string(), url: url.to_string(), interval, phase: None, max_in_flight: DEFAULT_MAX_IN_FLIGHT }
    }
}

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct AcquisitionConfig {
    /// per request timeout of http fetchers
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub request_timeout: Duration,

    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub stagger_step: Duration,

    /// if set, log per-source counters in this interval
    #[serde(default, deserialize_with="deserialize_optional_duration", serialize_with="serialize_optional_duration")]
    pub stats_interval: Option<Duration>,

    pub sources: Vec<SourceConfig>,
}

impl Default for AcquisitionConfig {
    fn default()->Self {
        AcquisitionConfig {
            request_timeout: millis(200),
            stagger_step: millis(10),
            stats_interval: None,
            sources: vec![
                SourceConfig::new( "state", format!("{TELEMETRY_HOST}/state"), millis(30)),
                SourceConfig::new( "indicators", format!("{TELEMETRY_HOST}/indicators"), millis(30)),
                SourceConfig::new( "map_obj.json", format!("{TELEMETRY_HOST}/map_obj.json"), millis(300)),
            ]
        }
    }
}
