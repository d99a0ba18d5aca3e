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

pub mod errors;
pub use errors::*;

pub mod datetime;
pub mod collections;
pub mod config;

use tracing_subscriber::EnvFilter;

/// host of the local game telemetry service polled by the default source configs
pub const TELEMETRY_HOST: &str = "http://localhost:8111";

/// initialize the global tracing subscriber. The filter is taken from RUST_LOG and defaults to "info".
/// Calling this more than once is a no-op (tests can call it unconditionally)
pub fn init_tracing () {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
