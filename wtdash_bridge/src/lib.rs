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

//! paired message endpoints between the acquisition and aggregation contexts.
//!
//! A bridge is created once, as a pair of endpoints. Each endpoint can post to and receive from
//! its peer. Delivery is FIFO and at-most-once, there is no acknowledgement. The queue towards
//! each peer is bounded - if the peer does not consume fast enough (or is not listening yet) the
//! configured `DropPolicy` decides which message is lost.
//!
//! Endpoints are handed to their context with a one-time `ControlMsg::Register`. Contexts keep
//! them in a `BridgePort`, which fails fast if anything is posted before registration.

use std::sync::{Arc,OnceLock};
use std::fmt;
use kanal::{bounded_async,AsyncSender,AsyncReceiver};
use serde::{Serialize,Deserialize};
use tracing::{debug,trace,warn};

pub mod errors;
pub use errors::*;

pub mod msg;
pub use msg::*;

pub const DEFAULT_BRIDGE_CAPACITY: usize = 64;
pub const CONTROL_CHANNEL_BOUNDS: usize = 4;

/// what to lose if the queue towards the peer is full
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
pub enum DropPolicy {
    DropOldest,
    DropNewest
}

#[derive(Serialize,Deserialize,Debug,Clone)]
#[serde(default)]
pub struct BridgeConfig {
    pub capacity: usize,
    pub drop_policy: DropPolicy,
}

impl Default for BridgeConfig {
    fn default()->Self {
        BridgeConfig { capacity: DEFAULT_BRIDGE_CAPACITY, drop_policy: DropPolicy::DropOldest }
    }
}

/// outcome of a successful post
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Delivery {
    /// queued for the peer
    Queued,
    /// queued after evicting the oldest pending message
    Displaced,
    /// queue was full, the posted message was discarded
    Dropped
}

/* #region endpoint ************************************************************************************/

pub struct BridgeEndpoint<T> {
    label: Arc<str>,
    policy: DropPolicy,
    tx: AsyncSender<T>,
    outbox: AsyncReceiver<T>, // only used to evict from our own outbound queue
    rx: AsyncReceiver<T>,
}

impl<T> BridgeEndpoint<T> where T: Send {

    pub fn label (&self)->&str { &self.label }

    /// post a message to the peer without waiting. Only fails if the peer queue is closed
    pub fn post (&self, msg: T)->Result<Delivery> {
        let mut delivery = Delivery::Queued;

        if self.policy == DropPolicy::DropOldest && self.tx.is_full() {
            if let Ok(Some(_)) = self.outbox.try_recv() {
                delivery = Delivery::Displaced;
            }
        }

        match self.tx.try_send(msg) {
            Ok(true) => Ok(delivery),
            Ok(false) => {
                trace!("bridge {} full, message dropped", self.label);
                Ok(Delivery::Dropped)
            }
            Err(_) => Err( BridgeError::Closed(self.label.to_string()))
        }
    }

    /// wait for the next message from the peer
    pub async fn recv (&self)->Result<T> {
        self.rx.recv().await.map_err(|_| BridgeError::Closed(self.label.to_string()))
    }

    pub fn try_recv (&self)->Result<Option<T>> {
        self.rx.try_recv().map_err(|_| BridgeError::Closed(self.label.to_string()))
    }

    /// number of messages waiting to be consumed by the peer
    pub fn pending_outbound (&self)->usize { self.tx.len() }

    /// number of messages from the peer waiting to be consumed by us
    pub fn pending_inbound (&self)->usize { self.rx.len() }
}

impl<T> fmt::Debug for BridgeEndpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BridgeEndpoint({}, {:?})", self.label, self.policy)
    }
}

/// create a connected pair of endpoints. This happens once at bootstrap.
/// Fails for a zero capacity, which would turn the queues into rendezvous channels
pub fn create_bridge<T> (config: &BridgeConfig)->Result<(BridgeEndpoint<T>,BridgeEndpoint<T>)> where T: Send {
    if config.capacity == 0 {
        return Err( BridgeError::InvalidConfig("bridge capacity must be > 0".to_string()))
    }

    let (tx_ab, rx_ab) = bounded_async::<T>(config.capacity);
    let (tx_ba, rx_ba) = bounded_async::<T>(config.capacity);

    let a = BridgeEndpoint {
        label: Arc::from("port1"),
        policy: config.drop_policy,
        tx: tx_ab,
        outbox: rx_ab.clone(),
        rx: rx_ba.clone(),
    };
    let b = BridgeEndpoint {
        label: Arc::from("port2"),
        policy: config.drop_policy,
        tx: tx_ba,
        outbox: rx_ba,
        rx: rx_ab,
    };
    debug!("created bridge with capacity {} and {:?}", config.capacity, config.drop_policy);

    Ok((a,b))
}

/* #endregion endpoint */

/* #region control ************************************************************************************/

/// control messages are sent on their own channel, they are never mixed with telemetry
#[derive(Debug)]
pub enum ControlMsg<T> {
    /// hand a bridge endpoint to a context. Sent exactly once per context
    Register(BridgeEndpoint<T>)
}

impl<T> ControlMsg<T> {
    pub fn kind (&self)->&'static str {
        match self {
            ControlMsg::Register(_) => "register"
        }
    }
}

pub type ControlSender<T> = AsyncSender<ControlMsg<T>>;
pub type ControlReceiver<T> = AsyncReceiver<ControlMsg<T>>;

pub fn create_control_channel<T> ()->(ControlSender<T>,ControlReceiver<T>) where T: Send {
    bounded_async::<ControlMsg<T>>(CONTROL_CHANNEL_BOUNDS)
}

/// the slot a context keeps its registered endpoint in. Can be shared between tasks,
/// registration happens at most once
pub struct BridgePort<T> {
    owner: String,
    endpoint: OnceLock<BridgeEndpoint<T>>,
}

impl<T> BridgePort<T> where T: Send {
    pub fn new (owner: impl ToString)->Self {
        BridgePort { owner: owner.to_string(), endpoint: OnceLock::new() }
    }

    pub fn owner (&self)->&str { &self.owner }

    pub fn register (&self, endpoint: BridgeEndpoint<T>)->Result<()> {
        let label = endpoint.label.clone();
        self.endpoint.set(endpoint)
            .map_err(|_| BridgeError::AlreadyRegistered(self.owner.clone()))?;
        debug!("{} registered bridge endpoint {}", self.owner, label);
        Ok(())
    }

    pub fn is_registered (&self)->bool { self.endpoint.get().is_some() }

    pub fn endpoint (&self)->Result<&BridgeEndpoint<T>> {
        self.endpoint.get().ok_or_else(|| BridgeError::NotRegistered(self.owner.clone()))
    }

    /// post to the peer. Fails with `NotRegistered` (and sends nothing) before registration
    pub fn post (&self, msg: T)->Result<Delivery> {
        self.endpoint()?.post(msg)
    }
}

impl<T> fmt::Debug for BridgePort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BridgePort({}, registered: {})", self.owner, self.endpoint.get().is_some())
    }
}

/* #endregion control */
