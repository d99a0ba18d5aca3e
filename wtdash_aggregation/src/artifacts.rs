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

//! derived artifacts are named, read-only views computed from the accumulated telemetry state.
//! They are plain serializable documents, rendering them is the business of the presentation layer

use serde::Serialize;
use wtdash_common::datetime::EpochMillis;
use crate::engine::TelemetryState;
use crate::timeseries::Sample;
use crate::spatial::{Vec2,Airfield,Aircraft,GroundUnit};
use crate::{SPEED_CHANNEL,ALTITUDE_CHANNEL,COMPASS_CHANNEL,ROLL_CHANNEL,PITCH_CHANNEL};

pub const SPEED_OVER_TIME: &str = "speed-over-time";
pub const ALTITUDE_OVER_TIME: &str = "altitude-over-time";
pub const ENERGY_OVER_TIME: &str = "energy-over-time";
pub const RADAR_MAP: &str = "radar-map";
pub const ORIENTATION: &str = "orientation";

/// standard gravity in m/s²
pub const G: f64 = 9.81;

#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct SeriesDoc {
    pub name: String,
    pub title: String,
    pub unit: String,
    pub points: Vec<Sample>,
    pub latest: Option<f64>,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct RadarMapDoc {
    pub name: String,
    pub updated: Option<EpochMillis>,
    /// latest compass reading in degrees
    pub heading: Option<f64>,
    pub player: Option<Vec2>,
    pub airfields: Vec<Airfield>,
    pub aircraft: Vec<Aircraft>,
    pub ground_units: Vec<GroundUnit>,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct OrientationDoc {
    pub name: String,
    pub updated: Option<EpochMillis>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
    pub heading: Option<f64>,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(tag="type", rename_all="snake_case")]
pub enum Artifact {
    Series(SeriesDoc),
    RadarMap(RadarMapDoc),
    Orientation(OrientationDoc),
}

impl Artifact {
    pub fn name (&self)->&str {
        match self {
            Artifact::Series(doc) => &doc.name,
            Artifact::RadarMap(doc) => &doc.name,
            Artifact::Orientation(doc) => &doc.name,
        }
    }

    pub fn to_json (&self)->serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// a named query over the telemetry state. Implementations must not have side effects
pub trait DerivedArtifact: Send + Sync {
    fn name (&self)->&str;

    fn compute (&self, state: &TelemetryState)->Artifact;
}

fn title (label: &str, latest: Option<f64>, unit: &str, precision: usize)->String {
    match latest {
        Some(v) => format!("{label}: {v:.precision$} {unit}"),
        None => label.to_string()
    }
}

/* #region series *************************************************************************************/

/// the history of a single channel
pub struct SeriesArtifact {
    pub name: String,
    pub channel: String,
    pub label: String,
    pub unit: String,
    pub precision: usize,
}

impl SeriesArtifact {
    pub fn new (name: impl ToString, channel: impl ToString, label: impl ToString, unit: impl ToString)->Self {
        SeriesArtifact { name: name.to_string(), channel: channel.to_string(), label: label.to_string(), unit: unit.to_string(), precision: 1 }
    }
}

impl DerivedArtifact for SeriesArtifact {
    fn name (&self)->&str { &self.name }

    fn compute (&self, state: &TelemetryState)->Artifact {
        let points = state.channel( &self.channel).map( |ts| ts.to_vec()).unwrap_or_default();
        let latest = points.last().map(|s| s.v);

        Artifact::Series( SeriesDoc {
            name: self.name.clone(),
            title: title( &self.label, latest, &self.unit, self.precision),
            unit: self.unit.clone(),
            points,
            latest
        })
    }
}

/// specific mechanical energy (kinetic + potential per unit mass) for each sample time at which both
/// speed (km/h) and altitude (m) were reported
pub struct EnergyArtifact {
    pub name: String,
    pub speed_channel: String,
    pub altitude_channel: String,
}

impl EnergyArtifact {
    pub fn new (name: impl ToString)->Self {
        EnergyArtifact { name: name.to_string(), speed_channel: SPEED_CHANNEL.to_string(), altitude_channel: ALTITUDE_CHANNEL.to_string() }
    }
}

pub fn specific_energy (speed_kmh: f64, altitude_m: f64)->f64 {
    let v = speed_kmh / 3.6;
    v*v/2.0 + G*altitude_m
}

impl DerivedArtifact for EnergyArtifact {
    fn name (&self)->&str { &self.name }

    fn compute (&self, state: &TelemetryState)->Artifact {
        let mut points = Vec::new();

        if let (Some(speed), Some(alt)) = (state.channel( &self.speed_channel), state.channel( &self.altitude_channel)) {
            // both series are time ordered without duplicates, merge join on t
            let mut alts = alt.iter().peekable();
            for s in speed.iter() {
                while alts.next_if(|a| a.t < s.t).is_some() {}
                if let Some(a) = alts.peek() {
                    if a.t == s.t {
                        points.push( Sample { t: s.t, v: specific_energy( s.v, a.v) });
                    }
                }
            }
        }
        let latest = points.last().map(|s| s.v);

        Artifact::Series( SeriesDoc {
            name: self.name.clone(),
            title: title( "Specific Energy", latest, "J/kg", 0),
            unit: "J/kg".to_string(),
            points,
            latest
        })
    }
}

/* #endregion series */

/* #region snapshots **********************************************************************************/

pub struct RadarMapArtifact {
    pub name: String,
    pub heading_channel: String,
}

impl RadarMapArtifact {
    pub fn new (name: impl ToString)->Self {
        RadarMapArtifact { name: name.to_string(), heading_channel: COMPASS_CHANNEL.to_string() }
    }
}

impl DerivedArtifact for RadarMapArtifact {
    fn name (&self)->&str { &self.name }

    fn compute (&self, state: &TelemetryState)->Artifact {
        let spatial = &state.spatial;

        Artifact::RadarMap( RadarMapDoc {
            name: self.name.clone(),
            updated: spatial.updated,
            heading: state.latest( &self.heading_channel),
            player: spatial.player,
            airfields: spatial.airfields.clone(),
            aircraft: spatial.aircraft.clone(),
            ground_units: spatial.ground_units.clone(),
        })
    }
}

/// latest attitude (roll, pitch) and heading
pub struct OrientationArtifact {
    pub name: String,
    pub roll_channel: String,
    pub pitch_channel: String,
    pub heading_channel: String,
}

impl OrientationArtifact {
    pub fn new (name: impl ToString)->Self {
        OrientationArtifact {
            name: name.to_string(),
            roll_channel: ROLL_CHANNEL.to_string(),
            pitch_channel: PITCH_CHANNEL.to_string(),
            heading_channel: COMPASS_CHANNEL.to_string()
        }
    }
}

impl DerivedArtifact for OrientationArtifact {
    fn name (&self)->&str { &self.name }

    fn compute (&self, state: &TelemetryState)->Artifact {
        let latest = |ch: &str| state.channel(ch).and_then(|ts| ts.latest());
        let roll = latest( &self.roll_channel);
        let pitch = latest( &self.pitch_channel);
        let heading = latest( &self.heading_channel);
        let updated = [roll,pitch,heading].iter().flatten().map(|s| s.t).max();

        Artifact::Orientation( OrientationDoc {
            name: self.name.clone(),
            updated,
            roll: roll.map(|s| s.v),
            pitch: pitch.map(|s| s.v),
            heading: heading.map(|s| s.v),
        })
    }
}

/* #endregion snapshots */

/// the artifacts served by the dashboard
pub fn default_artifacts ()->Vec<Box<dyn DerivedArtifact>> {
    vec![
        Box::new( SeriesArtifact::new( SPEED_OVER_TIME, SPEED_CHANNEL, "Speed", "km/h")),
        Box::new( SeriesArtifact::new( ALTITUDE_OVER_TIME, ALTITUDE_CHANNEL, "Altitude", "m")),
        Box::new( EnergyArtifact::new( ENERGY_OVER_TIME)),
        Box::new( RadarMapArtifact::new( RADAR_MAP)),
        Box::new( OrientationArtifact::new( ORIENTATION)),
    ]
}
