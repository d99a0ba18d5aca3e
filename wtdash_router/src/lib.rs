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

//! intercepts requests for a configured virtual host and answers mapped paths with artifacts
//! computed by the aggregation engine. Everything else falls through to the wrapped service

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use serde::{Serialize,Deserialize};

pub mod errors;
pub use errors::*;

pub mod router;
pub use router::*;

pub mod service;
pub use service::*;

pub mod server;
pub use server::*;

pub const VIRTUAL_HOST: &str = "localhost:8000";

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct RouterConfig {
    /// authority (host:port) of intercepted requests
    pub virtual_host: String,

    /// where the dashboard server listens
    pub sock_addr: SocketAddr,

    /// request path -> artifact name
    pub routes: BTreeMap<String,String>,

    /// presentation assets served for all other paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default()->Self {
        let routes = [
            ("/speed", wtdash_aggregation::SPEED_OVER_TIME),
            ("/altitude", wtdash_aggregation::ALTITUDE_OVER_TIME),
            ("/energy", wtdash_aggregation::ENERGY_OVER_TIME),
            ("/radar-map", wtdash_aggregation::RADAR_MAP),
            ("/artificial-horizon", wtdash_aggregation::ORIENTATION),
        ].into_iter().map(|(p,a)| (p.to_string(), a.to_string())).collect();

        RouterConfig {
            virtual_host: VIRTUAL_HOST.to_string(),
            sock_addr: SocketAddr::from(([127,0,0,1], 8000)),
            routes,
            static_dir: None,
        }
    }
}
