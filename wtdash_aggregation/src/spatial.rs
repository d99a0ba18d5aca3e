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

//! the spatial picture: the latest snapshot of map entities as reported by the game's map object list

use serde::{Serialize,Deserialize};
use serde_json::Value;
use tracing::debug;
use wtdash_common::datetime::EpochMillis;

/// icon of the map object that represents the player's own aircraft
pub const PLAYER_ICON: &str = "Player";

/// map color of hostile objects
pub const HOSTILE_COLOR: &str = "#f00C00";

pub const MAP_OBJECTS_KIND: &str = "map_obj.json";
pub const SPATIAL_OBJECTS_KIND: &str = "spatial-objects";

#[derive(Serialize,Deserialize,Debug,Clone)]
#[serde(default)]
pub struct SpatialConfig {
    pub player_icon: String,
    /// colors (case insensitive) that mark an entity as hostile, everything else is friendly
    pub hostile_colors: Vec<String>,
    /// update kinds that carry a full map object list
    pub spatial_kinds: Vec<String>,
}

impl Default for SpatialConfig {
    fn default()->Self {
        SpatialConfig {
            player_icon: PLAYER_ICON.to_string(),
            hostile_colors: vec![ HOSTILE_COLOR.to_string() ],
            spatial_kinds: vec![ MAP_OBJECTS_KIND.to_string(), SPATIAL_OBJECTS_KIND.to_string() ],
        }
    }
}

impl SpatialConfig {
    pub fn affiliation (&self, color: Option<&str>)->Affiliation {
        match color {
            Some(c) if self.hostile_colors.iter().any(|h| h.eq_ignore_ascii_case(c)) => Affiliation::Hostile,
            _ => Affiliation::Friendly
        }
    }

    pub fn is_spatial_kind (&self, kind: &str)->bool {
        self.spatial_kinds.iter().any(|k| k == kind)
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64
}

impl Vec2 {
    pub fn new (x: f64, y: f64)->Self { Vec2{x,y} }
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
#[serde(rename_all="lowercase")]
pub enum Affiliation {
    Friendly,
    Hostile
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Airfield {
    pub position: Vec2,
    pub extent: Vec2,
    pub affiliation: Affiliation,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Aircraft {
    pub position: Vec2,
    pub velocity: Vec2,
    pub affiliation: Affiliation,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct GroundUnit {
    pub class_name: String,
    pub position: Vec2,
    pub affiliation: Affiliation,
}

/// a map object as delivered by the game. Which coordinates are set depends on the type
#[derive(Deserialize,Debug)]
struct MapObject {
    #[serde(rename="type")]
    kind: String,
    icon: Option<String>,
    color: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    sx: Option<f64>,
    sy: Option<f64>,
    ex: Option<f64>,
    ey: Option<f64>,
}

fn vec2 (x: Option<f64>, y: Option<f64>)->Option<Vec2> {
    Some( Vec2 { x: x?, y: y? })
}

enum Entity {
    Player(Vec2),
    Airfield(Airfield),
    Aircraft(Aircraft),
    GroundUnit(GroundUnit),
}

impl MapObject {
    fn into_entity (self, config: &SpatialConfig)->Option<Entity> {
        let affiliation = config.affiliation( self.color.as_deref());

        match self.kind.as_str() {
            "airfield" => {
                let position = vec2( self.sx, self.sy)?;
                let extent = vec2( self.ex, self.ey)?;
                Some( Entity::Airfield( Airfield{ position, extent, affiliation }))
            }
            "aircraft" => {
                let position = vec2( self.x, self.y)?;
                if self.icon.as_deref() == Some( config.player_icon.as_str()) {
                    Some( Entity::Player(position))
                } else {
                    let velocity = vec2( self.dx, self.dy).unwrap_or_default();
                    Some( Entity::Aircraft( Aircraft{ position, velocity, affiliation }))
                }
            }
            "ground_model" => {
                let position = vec2( self.x, self.y)?;
                let class_name = self.icon.unwrap_or_else(|| self.kind.clone());
                Some( Entity::GroundUnit( GroundUnit{ class_name, position, affiliation }))
            }
            _ => None
        }
    }
}

/// the full set of entities from one map object update. Snapshots are never merged, each update replaces
/// the previous snapshot as a whole
#[derive(Serialize,Debug,Clone,PartialEq,Default)]
pub struct SpatialSnapshot {
    pub updated: Option<EpochMillis>,
    pub player: Option<Vec2>,
    pub airfields: Vec<Airfield>,
    pub aircraft: Vec<Aircraft>,
    pub ground_units: Vec<GroundUnit>,
}

impl SpatialSnapshot {
    /// build a snapshot from a map object list. Returns the snapshot and the number of objects that
    /// could not be mapped (unknown type or missing coordinates)
    pub fn from_objects (objects: Vec<Value>, config: &SpatialConfig, updated: EpochMillis)->(SpatialSnapshot,usize) {
        let mut snapshot = SpatialSnapshot { updated: Some(updated), ..Default::default() };
        let mut unmapped = 0;

        for value in objects {
            let entity = serde_json::from_value::<MapObject>(value).ok().and_then(|o| {
                let kind = o.kind.clone();
                let entity = o.into_entity(config);
                if entity.is_none() { debug!("unmapped map object of type {kind:?}") }
                entity
            });

            match entity {
                Some(Entity::Player(pos)) => snapshot.player = Some(pos),
                Some(Entity::Airfield(e)) => snapshot.airfields.push(e),
                Some(Entity::Aircraft(e)) => snapshot.aircraft.push(e),
                Some(Entity::GroundUnit(e)) => snapshot.ground_units.push(e),
                None => unmapped += 1
            }
        }

        (snapshot, unmapped)
    }

    pub fn len (&self)->usize {
        self.airfields.len() + self.aircraft.len() + self.ground_units.len() + if self.player.is_some() {1} else {0}
    }

    pub fn is_empty (&self)->bool { self.len() == 0 }
}
