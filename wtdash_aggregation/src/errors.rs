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

pub type Result<T> = std::result::Result<T,AggregationError>;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum AggregationError {

    #[error("unknown artifact {0}")]
    UnknownArtifact(String),

    #[error("malformed payload {0}")]
    MalformedPayload(String),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("aggregation worker not available {0}")]
    WorkerClosed(String),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

pub fn op_failed (msg: impl ToString)->AggregationError {
    AggregationError::OpFailedError(msg.to_string())
}

macro_rules! malformed {
    ($fmt:literal $(, $arg:expr )* ) => {
        AggregationError::MalformedPayload( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use malformed;

macro_rules! config_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        AggregationError::ConfigError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use config_error;
