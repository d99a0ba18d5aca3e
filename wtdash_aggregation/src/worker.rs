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

use std::sync::Arc;
use tokio::sync::{mpsc,oneshot,watch};
use tokio::task::JoinHandle;
use tracing::{debug,info,error};

use wtdash_bridge::{BridgeEndpoint,BridgePort,ControlMsg,UpdateMsg};
use crate::engine::{AggregationEngine,EngineStats};
use crate::artifacts::Artifact;
use crate::errors::{AggregationError,Result};

pub const MAILBOX_BOUNDS: usize = 64;

/// everything the aggregation context reacts to. Processed strictly one at a time
enum AggregationMsg {
    Control(ControlMsg<UpdateMsg>),
    Update(UpdateMsg),
    Query { name: String, reply: oneshot::Sender<Result<Artifact>> },
    Stats { reply: oneshot::Sender<EngineStats> },
}

/// cloneable access to a running aggregation worker, used by the request router
#[derive(Clone)]
pub struct AggregationHandle {
    tx: mpsc::Sender<AggregationMsg>,
    ready: watch::Receiver<bool>,
    artifact_names: Arc<Vec<String>>,
}

impl AggregationHandle {
    /// true while the worker loop is running
    pub fn is_ready (&self)->bool {
        *self.ready.borrow() && !self.tx.is_closed()
    }

    pub async fn wait_ready (&mut self)->Result<()> {
        self.ready.wait_for(|ready| *ready).await
            .map(|_| ())
            .map_err(|_| AggregationError::WorkerClosed("aggregation worker terminated".to_string()))
    }

    /// artifacts registered with the engine when the worker was spawned
    pub fn artifact_names (&self)->&[String] { &self.artifact_names }

    pub fn has_artifact (&self, name: &str)->bool {
        self.artifact_names.iter().any(|n| n == name)
    }

    pub async fn query (&self, name: &str)->Result<Artifact> {
        let (reply, rx) = oneshot::channel();
        self.send( AggregationMsg::Query { name: name.to_string(), reply }).await?;
        rx.await.map_err(|_| closed())?
    }

    pub async fn stats (&self)->Result<EngineStats> {
        let (reply, rx) = oneshot::channel();
        self.send( AggregationMsg::Stats { reply }).await?;
        rx.await.map_err(|_| closed())
    }

    async fn send (&self, msg: AggregationMsg)->Result<()> {
        self.tx.send(msg).await.map_err(|_| closed())
    }
}

fn closed ()->AggregationError {
    AggregationError::WorkerClosed("aggregation mailbox closed".to_string())
}

/// the aggregation context. It exclusively owns the engine
pub struct AggregationWorker {
    handle: AggregationHandle,
    task: JoinHandle<()>,
}

impl AggregationWorker {
    pub fn spawn (engine: AggregationEngine)->Result<Self> {
        let rt = tokio::runtime::Handle::try_current()
            .map_err(|_| AggregationError::WorkerClosed("no async runtime for aggregation worker".to_string()))?;

        let (tx, rx) = mpsc::channel( MAILBOX_BOUNDS);
        let (ready_tx, ready) = watch::channel(false);
        let artifact_names = Arc::new( engine.artifact_names());

        let task = rt.spawn( run_worker( engine, tx.downgrade(), rx, ready_tx));
        let handle = AggregationHandle { tx, ready, artifact_names };

        Ok( AggregationWorker { handle, task })
    }

    pub fn handle (&self)->AggregationHandle { self.handle.clone() }

    /// send the one-time register message with the endpoint this context receives updates from
    pub async fn register (&self, endpoint: BridgeEndpoint<UpdateMsg>)->Result<()> {
        self.handle.send( AggregationMsg::Control( ControlMsg::Register(endpoint))).await
    }

    pub fn abort (&self) {
        self.task.abort();
    }
}

async fn run_worker (mut engine: AggregationEngine, tx: mpsc::WeakSender<AggregationMsg>,
                     mut rx: mpsc::Receiver<AggregationMsg>, ready: watch::Sender<bool>) {
    let port: Arc<BridgePort<UpdateMsg>> = Arc::new( BridgePort::new("aggregation"));
    ready.send_replace(true);
    debug!("aggregation worker ready, artifacts: {:?}", engine.artifact_names());

    while let Some(msg) = rx.recv().await {
        match msg {
            AggregationMsg::Control( ControlMsg::Register(endpoint)) => {
                match port.register(endpoint) {
                    Ok(()) => {
                        if let Some(tx) = tx.upgrade() {
                            spawn_bridge_pump( port.clone(), tx);
                            info!("aggregation registered bridge endpoint");
                        }
                    }
                    Err(e) => error!("{e}")
                }
            }
            AggregationMsg::Update(update) => {
                engine.apply_update(update);
            }
            AggregationMsg::Query { name, reply } => {
                let _ = reply.send( engine.query(&name));
            }
            AggregationMsg::Stats { reply } => {
                let _ = reply.send( engine.stats().clone());
            }
        }
    }

    ready.send_replace(false);
    debug!("aggregation worker terminated");
}

/// move updates from the bridge into the mailbox, preserving their order
fn spawn_bridge_pump (port: Arc<BridgePort<UpdateMsg>>, tx: mpsc::Sender<AggregationMsg>) {
    tokio::spawn( async move {
        let Ok(endpoint) = port.endpoint() else { return };
        loop {
            match endpoint.recv().await {
                Ok(update) => {
                    if tx.send( AggregationMsg::Update(update)).await.is_err() { break }
                }
                Err(e) => {
                    info!("{e}, no more updates");
                    break
                }
            }
        }
    });
}
