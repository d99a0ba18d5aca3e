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

use std::path::Path;
use std::fs;
use serde::de::DeserializeOwned;
use tracing::{info,debug};

use crate::errors::{Result,config_error};

/// load a RON config file
pub fn load_config<C> (path: impl AsRef<Path>)->Result<C> where C: DeserializeOwned {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| config_error( format!("cannot read {path:?}: {e}")))?;
    let config = ron::de::from_bytes(&bytes)?;
    debug!("loaded config {path:?}");
    Ok(config)
}

/// load a RON config file if it exists, otherwise fall back to the default config.
/// Parse errors of existing files are still reported
pub fn load_config_or_default<C> (path: impl AsRef<Path>)->Result<C> where C: DeserializeOwned + Default {
    let path = path.as_ref();
    if path.is_file() {
        load_config(path)
    } else {
        info!("no config {path:?}, using defaults");
        Ok( C::default())
    }
}

/// parse a config from a RON string (mostly for tests and embedded defaults)
pub fn config_from_str<C> (src: &str)->Result<C> where C: DeserializeOwned {
    Ok( ron::de::from_str(src)?)
}
