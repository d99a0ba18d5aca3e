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

use thiserror::Error;
use wtdash_bridge::BridgeError;

pub type Result<T> = std::result::Result<T,AcquisitionError>;

#[derive(Error,Debug)]
pub enum AcquisitionError {

    #[error("transient fetch error {0}")]
    FetchError(String),

    #[error("http error {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("bridge error {0}")]
    BridgeError( #[from] BridgeError),

    #[error("invalid scheduler state {0}")]
    InvalidState(String),

    #[error("invalid source {0}")]
    InvalidSource(String),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl AcquisitionError {
    /// transient errors are contained within the tick that produced them
    pub fn is_transient (&self)->bool {
        matches!( self, AcquisitionError::FetchError(_) | AcquisitionError::HttpError(_) | AcquisitionError::JsonError(_))
    }
}

pub fn fetch_error (msg: impl ToString)->AcquisitionError {
    AcquisitionError::FetchError(msg.to_string())
}

pub fn op_failed (msg: impl ToString)->AcquisitionError {
    AcquisitionError::OpFailedError(msg.to_string())
}

macro_rules! invalid_state {
    ($fmt:literal $(, $arg:expr )* ) => {
        AcquisitionError::InvalidState( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use invalid_state;
