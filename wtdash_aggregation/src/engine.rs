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

use std::collections::{HashMap,HashSet,BTreeMap};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug,warn,trace};

use wtdash_common::datetime::{EpochMillis,MonotonicClock};
use wtdash_bridge::UpdateMsg;
use crate::{AggregationConfig,ChannelConfig};
use crate::timeseries::{TimeSeries,Append};
use crate::spatial::SpatialSnapshot;
use crate::update::{TelemetryUpdate,ScalarRecord,is_scalar_kind};
use crate::artifacts::{Artifact,DerivedArtifact,default_artifacts};
use crate::errors::{AggregationError,Result,config_error};

/// everything the engine has accumulated so far. Artifacts are computed from this
#[derive(Debug,Clone,Default)]
pub struct TelemetryState {
    pub channels: HashMap<String,TimeSeries>,
    pub spatial: SpatialSnapshot,
}

impl TelemetryState {
    pub fn channel (&self, name: &str)->Option<&TimeSeries> {
        self.channels.get(name)
    }

    pub fn latest (&self, name: &str)->Option<f64> {
        self.channels.get(name).and_then(|ts| ts.latest()).map(|s| s.v)
    }
}

#[derive(Serialize,Debug,Clone,Default,PartialEq)]
pub struct EngineStats {
    pub updates: u64,
    pub unrecognized: u64,
    pub malformed: u64,
    pub unmapped_entities: u64,
    pub rejected_samples: u64,
    pub coalesced_samples: u64,
}

/// what a single `apply_update` did
#[derive(Debug,Clone,Default,PartialEq)]
pub struct ApplyReport {
    pub appended: usize,
    pub coalesced: usize,
    pub rejected: usize,
    /// entities in the new spatial snapshot
    pub entities: usize,
    pub unmapped: usize,
    pub unrecognized: bool,
    pub malformed: bool,
}

pub struct AggregationEngine {
    config: AggregationConfig,
    state: TelemetryState,
    artifacts: BTreeMap<String,Box<dyn DerivedArtifact>>,
    clock: MonotonicClock,
    seen_unrecognized: HashSet<String>,
    stats: EngineStats,
}

impl AggregationEngine {
    /// create an engine without artifacts
    pub fn new (config: AggregationConfig)->Result<Self> {
        let mut channels = HashMap::new();
        for ch in &config.channels {
            if !is_scalar_kind( &ch.source) {
                return Err( config_error!("channel {} has no scalar source: {}", ch.name, ch.source))
            }
            if ch.fields.is_empty() {
                return Err( config_error!("channel {} has no fields", ch.name))
            }
            if !ch.retention.is_valid() {
                return Err( config_error!("channel {} has invalid retention {:?}", ch.name, ch.retention))
            }
            if channels.insert( ch.name.clone(), TimeSeries::new( ch.retention)).is_some() {
                return Err( config_error!("duplicate channel {}", ch.name))
            }
        }

        Ok( AggregationEngine {
            config,
            state: TelemetryState { channels, spatial: SpatialSnapshot::default() },
            artifacts: BTreeMap::new(),
            clock: MonotonicClock::new(),
            seen_unrecognized: HashSet::new(),
            stats: EngineStats::default(),
        })
    }

    pub fn with_default_artifacts (config: AggregationConfig)->Result<Self> {
        let mut engine = Self::new(config)?;
        for artifact in default_artifacts() {
            engine.register_boxed_artifact(artifact)?;
        }
        Ok(engine)
    }

    pub fn register_artifact (&mut self, artifact: impl DerivedArtifact + 'static)->Result<()> {
        self.register_boxed_artifact( Box::new(artifact))
    }

    pub fn register_boxed_artifact (&mut self, artifact: Box<dyn DerivedArtifact>)->Result<()> {
        let name = artifact.name().to_string();
        if self.artifacts.contains_key( &name) {
            return Err( config_error!("duplicate artifact {name}"))
        }
        self.artifacts.insert( name, artifact);
        Ok(())
    }

    /// sorted names of all registered artifacts
    pub fn artifact_names (&self)->Vec<String> {
        self.artifacts.keys().cloned().collect()
    }

    pub fn has_artifact (&self, name: &str)->bool {
        self.artifacts.contains_key(name)
    }

    pub fn state (&self)->&TelemetryState { &self.state }

    pub fn stats (&self)->&EngineStats { &self.stats }

    pub fn config (&self)->&AggregationConfig { &self.config }

    /// fold one update into the state. This never fails, problems with the payload are logged and counted
    pub fn apply_update (&mut self, msg: UpdateMsg)->ApplyReport {
        self.stats.updates += 1;
        let completed = msg.completed;
        let kind = msg.kind.clone();
        trace!("applying {}", msg.topic());

        match TelemetryUpdate::decode( msg, &self.config.spatial) {
            Ok(TelemetryUpdate::State(record)) | Ok(TelemetryUpdate::Indicators(record)) => {
                self.apply_scalars( &kind, &record)
            }
            Ok(TelemetryUpdate::SpatialObjects(objects)) => {
                self.apply_spatial( objects, completed)
            }
            Ok(TelemetryUpdate::Unrecognized(kind)) => {
                self.stats.unrecognized += 1;
                if self.seen_unrecognized.insert( kind.clone()) {
                    warn!("ignoring unrecognized update kind {kind:?}");
                } else {
                    debug!("ignoring unrecognized update kind {kind:?}");
                }
                ApplyReport { unrecognized: true, ..Default::default() }
            }
            Err(e) => {
                self.stats.malformed += 1;
                warn!("{e}");
                ApplyReport { malformed: true, ..Default::default() }
            }
        }
    }

    fn apply_scalars (&mut self, kind: &str, record: &ScalarRecord)->ApplyReport {
        let mut report = ApplyReport::default();
        let arrival = self.clock.next(); // shared by all samples of this update

        for ch in self.config.channels.iter().filter(|ch| ch.source == kind) {
            let Some(v) = ch.fields.iter().find_map(|f| record.get(f).and_then(Value::as_f64)) else {
                continue
            };
            // explicitly stamped channels never fall back to the arrival clock
            let t = match &ch.timestamp_field {
                Some(field) => match record.get(field).and_then(explicit_stamp) {
                    Some(t) => t,
                    None => {
                        report.rejected += 1;
                        self.stats.rejected_samples += 1;
                        debug!("rejected {} sample {v}: no usable {field:?} stamp", ch.name);
                        continue
                    }
                }
                None => arrival
            };

            if let Some(ts) = self.state.channels.get_mut( &ch.name) {
                match ts.push( t, v) {
                    Append::Appended => report.appended += 1,
                    Append::Coalesced => {
                        report.coalesced += 1;
                        self.stats.coalesced_samples += 1;
                    }
                    Append::Rejected => {
                        report.rejected += 1;
                        self.stats.rejected_samples += 1;
                        debug!("rejected {} sample {v} at {t:?}", ch.name);
                    }
                }
            }
        }
        report
    }

    fn apply_spatial (&mut self, objects: Vec<Value>, updated: EpochMillis)->ApplyReport {
        let (snapshot, unmapped) = SpatialSnapshot::from_objects( objects, &self.config.spatial, updated);
        if unmapped > 0 {
            self.stats.unmapped_entities += unmapped as u64;
            debug!("{unmapped} unmapped map objects");
        }
        let entities = snapshot.len();
        self.state.spatial = snapshot;

        ApplyReport { entities, unmapped, ..Default::default() }
    }

    /// compute the named artifact from the current state. Does not modify any state
    pub fn query (&self, name: &str)->Result<Artifact> {
        match self.artifacts.get(name) {
            Some(artifact) => Ok( artifact.compute( &self.state)),
            None => Err( AggregationError::UnknownArtifact( name.to_string()))
        }
    }
}

/// epoch millis from a numeric record field. Fractional values are rounded
fn explicit_stamp (v: &Value)->Option<EpochMillis> {
    match v.as_i64() {
        Some(t) => Some( EpochMillis::new(t)),
        None => v.as_f64().filter(|t| t.is_finite()).map(|t| EpochMillis::new( t.round() as i64))
    }
}
