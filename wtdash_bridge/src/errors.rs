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

pub type Result<T> = std::result::Result<T,BridgeError>;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum BridgeError {

    #[error("no bridge endpoint registered for {0}")]
    NotRegistered(String),

    #[error("bridge endpoint already registered for {0}")]
    AlreadyRegistered(String),

    #[error("invalid bridge config {0}")]
    InvalidConfig(String),

    #[error("bridge endpoint {0} closed")]
    Closed(String),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

pub fn op_failed (msg: impl ToString)->BridgeError {
    BridgeError::OpFailedError(msg.to_string())
}
