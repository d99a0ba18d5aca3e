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

//! the aggregation side: folds update messages into time series and the spatial snapshot, and answers
//! named artifact queries from that state

use serde::{Serialize,Deserialize};

pub mod errors;
pub use errors::*;

pub mod timeseries;
pub use timeseries::*;

pub mod spatial;
pub use spatial::*;

pub mod update;
pub use update::*;

pub mod artifacts;
pub use artifacts::*;

pub mod engine;
pub use engine::*;

pub mod worker;
pub use worker::*;

pub const SPEED_CHANNEL: &str = "speed";
pub const ALTITUDE_CHANNEL: &str = "altitude";
pub const COMPASS_CHANNEL: &str = "compass";
pub const ROLL_CHANNEL: &str = "roll";
pub const PITCH_CHANNEL: &str = "pitch";

pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

fn default_retention ()->Retention { Retention::Capacity(DEFAULT_CHANNEL_CAPACITY) }

/// a scalar time series fed from a field of a state or indicators record
#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct ChannelConfig {
    pub name: String,

    /// update kind the channel is fed from
    pub source: String,

    /// candidate field names, the first one present in a record is used
    pub fields: Vec<String>,

    #[serde(default)]
    pub unit: String,

    #[serde(default="default_retention")]
    pub retention: Retention,

    /// record field holding an explicit epoch millis timestamp. Samples are stamped in arrival order otherwise
    #[serde(default)]
    pub timestamp_field: Option<String>,
}

impl ChannelConfig {
    pub fn new (name: &str, source: &str, fields: &[&str], unit: &str)->Self {
        ChannelConfig {
            name: name.to_string(),
            source: source.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            unit: unit.to_string(),
            retention: default_retention(),
            timestamp_field: None
        }
    }
}

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct AggregationConfig {
    pub channels: Vec<ChannelConfig>,

    #[serde(default)]
    pub spatial: SpatialConfig,
}

impl Default for AggregationConfig {
    fn default()->Self {
        AggregationConfig {
            channels: vec![
                ChannelConfig::new( SPEED_CHANNEL, STATE_KIND, &["TAS, km/h"], "km/h"),
                ChannelConfig::new( ALTITUDE_CHANNEL, STATE_KIND, &["H, m"], "m"),
                ChannelConfig::new( COMPASS_CHANNEL, INDICATORS_KIND, &["compass", "compass1"], "deg"),
                ChannelConfig::new( ROLL_CHANNEL, INDICATORS_KIND, &["aviahorizon_roll"], "deg"),
                ChannelConfig::new( PITCH_CHANNEL, INDICATORS_KIND, &["aviahorizon_pitch"], "deg"),
            ],
            spatial: SpatialConfig::default()
        }
    }
}
