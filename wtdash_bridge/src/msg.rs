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

use serde::{Serialize,Deserialize};
use serde_json::Value;
use wtdash_common::datetime::EpochMillis;

/// the unit of transport from acquisition to aggregation. The payload is opaque to the bridge,
/// it is whatever the source returned (already decoded from JSON)
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct UpdateMsg {
    /// identifies the source this payload came from (e.g. "state", "map_obj.json")
    pub kind: String,

    /// per-source completion sequence number
    pub seq: u64,

    /// when the fetch completed
    pub completed: EpochMillis,

    pub payload: Value,
}

impl UpdateMsg {
    pub fn new (kind: impl ToString, payload: Value)->Self {
        UpdateMsg { kind: kind.to_string(), seq: 0, completed: EpochMillis::now(), payload }
    }

    pub fn with_seq (kind: impl ToString, seq: u64, payload: Value)->Self {
        UpdateMsg { kind: kind.to_string(), seq, completed: EpochMillis::now(), payload }
    }

    /// the event name this update is announced under
    pub fn topic (&self)->String {
        format!("update-{}", self.kind)
    }
}
