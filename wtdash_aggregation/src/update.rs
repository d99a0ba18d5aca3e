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

use serde_json::{Map,Value};
use wtdash_bridge::UpdateMsg;
use crate::spatial::SpatialConfig;
use crate::errors::{AggregationError,Result,malformed};

pub const STATE_KIND: &str = "state";
pub const INDICATORS_KIND: &str = "indicators";

/// a flat JSON object of named scalar readings
pub type ScalarRecord = Map<String,Value>;

/// the decoded form of an update message. Each known kind has its own variant, anything else ends up as
/// `Unrecognized` (which is logged and counted but otherwise ignored)
#[derive(Debug,Clone,PartialEq)]
pub enum TelemetryUpdate {
    State(ScalarRecord),
    Indicators(ScalarRecord),
    /// full replacement of the spatial picture
    SpatialObjects(Vec<Value>),
    Unrecognized(String),
}

impl TelemetryUpdate {
    pub fn decode (msg: UpdateMsg, spatial: &SpatialConfig)->Result<Self> {
        let UpdateMsg { kind, payload, .. } = msg;

        if spatial.is_spatial_kind( &kind) {
            match payload {
                Value::Array(objects) => Ok( TelemetryUpdate::SpatialObjects(objects)),
                other => Err( malformed!("{kind}: expected object list, got {}", json_type(&other)))
            }
        } else if kind == STATE_KIND || kind == INDICATORS_KIND {
            match payload {
                Value::Object(record) => {
                    if kind == STATE_KIND { Ok( TelemetryUpdate::State(record)) } else { Ok( TelemetryUpdate::Indicators(record)) }
                }
                other => Err( malformed!("{kind}: expected object, got {}", json_type(&other)))
            }
        } else {
            Ok( TelemetryUpdate::Unrecognized(kind))
        }
    }

    pub fn kind (&self)->&str {
        match self {
            TelemetryUpdate::State(_) => STATE_KIND,
            TelemetryUpdate::Indicators(_) => INDICATORS_KIND,
            TelemetryUpdate::SpatialObjects(_) => "spatial-objects",
            TelemetryUpdate::Unrecognized(kind) => kind.as_str()
        }
    }
}

/// is this kind carrying scalar records
pub fn is_scalar_kind (kind: &str)->bool {
    kind == STATE_KIND || kind == INDICATORS_KIND
}

fn json_type (v: &Value)->&'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
