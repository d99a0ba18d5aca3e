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

use tokio::task::JoinHandle;
use tracing::{info,warn,error};

use wtdash_bridge::{create_control_channel,BridgeEndpoint,ControlMsg,ControlSender,UpdateMsg};
use crate::scheduler::{AcquisitionScheduler,SchedulerState};
use crate::errors::{AcquisitionError,Result,op_failed,invalid_state};

/// the acquisition context. It owns the scheduler and waits for its one-time register message
/// before any source is started
pub struct AcquisitionWorker {
    control: ControlSender<UpdateMsg>,
    task: JoinHandle<()>,
}

impl AcquisitionWorker {
    pub fn spawn (scheduler: AcquisitionScheduler)->Result<Self> {
        let rt = tokio::runtime::Handle::try_current().map_err(|_| invalid_state!("no async runtime for acquisition worker"))?;
        let (control, control_rx) = create_control_channel::<UpdateMsg>();

        let task = rt.spawn( async move {
            let mut scheduler = scheduler;

            while let Ok(msg) = control_rx.recv().await {
                match msg {
                    ControlMsg::Register(endpoint) => {
                        match scheduler.register_port(endpoint).and_then(|_| scheduler.start()) {
                            Ok(()) => info!("acquisition registered, sources: {:?}", scheduler.source_names()),
                            Err(e) => error!("acquisition register failed: {e}")
                        }
                    }
                }
            }

            // control channel is gone but sources keep running until process teardown
            if scheduler.state() == SchedulerState::Running {
                std::future::pending::<()>().await;
            } else {
                warn!("acquisition control channel closed before registration");
            }
        });

        Ok( AcquisitionWorker { control, task })
    }

    /// send the one-time register message with the endpoint this context posts updates to
    pub async fn register (&self, endpoint: BridgeEndpoint<UpdateMsg>)->Result<()> {
        self.control.send( ControlMsg::Register(endpoint)).await
            .map_err(|e| op_failed( format!("acquisition control channel closed: {e}")))
    }

    pub fn abort (&self) {
        self.task.abort();
    }
}
