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

use std::sync::{Arc,Mutex,atomic::{AtomicU64,Ordering}};
use std::time::Duration;
use serde::Serialize;
use serde_json::Value;
use tokio::{sync::Semaphore, task::AbortHandle, time::{self,Instant,MissedTickBehavior}};
use tracing::{debug,info,warn,error,trace};

use wtdash_bridge::{BridgeEndpoint,BridgePort,Delivery,UpdateMsg};
use crate::{AcquisitionConfig, SourceConfig, DEFAULT_MAX_IN_FLIGHT};
use crate::fetcher::SourceFetcher;
use crate::errors::{AcquisitionError,Result,op_failed,invalid_state};

/// lifecycle of a scheduler. There is no stopped state, sources run until the process ends
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SchedulerState {
    /// sources can be registered but nothing can be emitted
    Uninitialized,
    /// bridge endpoint registered, timers not started yet
    Armed,
    /// all source timers are ticking
    Running
}

#[derive(Debug,Default)]
struct SourceStats {
    ticks: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Serialize,Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct SourceStatsSnapshot {
    pub ticks: u64,
    /// fetches that completed and were forwarded
    pub completed: u64,
    pub failed: u64,
    /// ticks that found max_in_flight fetches outstanding
    pub skipped: u64,
    /// updates lost to a full bridge queue
    pub dropped: u64,
}

impl SourceStats {
    fn snapshot (&self)->SourceStatsSnapshot {
        SourceStatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

struct Source {
    name: String,
    interval: Duration,
    phase: Duration,
    fetcher: Box<dyn SourceFetcher>,
    in_flight: Arc<Semaphore>,
    seq: Mutex<u64>,
    stats: SourceStats,
}

impl Source {
    /// stamp with the next completion sequence number and post. Both happen under the seq lock so that
    /// concurrently completing fetches of the same source reach the bridge in sequence order
    fn forward (&self, port: &BridgePort<UpdateMsg>, payload: Value)->Result<Delivery> {
        let mut seq = self.seq.lock().map_err(|_| op_failed("poisoned sequence lock"))?;
        let msg = UpdateMsg::with_seq( &self.name, *seq + 1, payload);
        let delivery = port.post(msg)?;
        *seq += 1;

        self.stats.completed.fetch_add(1, Ordering::Relaxed);
        if delivery != Delivery::Queued {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
        }
        Ok(delivery)
    }
}

/// polls a set of registered telemetry sources, each on its own timer, and forwards each
/// successful fetch result over the bridge
pub struct AcquisitionScheduler {
    stagger_step: Duration,
    stats_interval: Option<Duration>,
    port: Arc<BridgePort<UpdateMsg>>,
    sources: Vec<Arc<Source>>,
    state: SchedulerState,
    tasks: Vec<AbortHandle>,
}

impl AcquisitionScheduler {
    pub fn new (config: &AcquisitionConfig)->Self {
        AcquisitionScheduler {
            stagger_step: config.stagger_step,
            stats_interval: config.stats_interval,
            port: Arc::new( BridgePort::new("acquisition")),
            sources: Vec::new(),
            state: SchedulerState::Uninitialized,
            tasks: Vec::new(),
        }
    }

    pub fn state (&self)->SchedulerState { self.state }

    pub fn source_names (&self)->Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }

    /// register a source that is fetched every `interval`. The name is also the kind of the updates it produces
    pub fn register_source (&mut self, name: impl ToString, interval: Duration, fetcher: impl SourceFetcher)->Result<()> {
        self.register_source_with( name, interval, None, DEFAULT_MAX_IN_FLIGHT, Box::new(fetcher))
    }

    pub fn register_configured_source (&mut self, config: &SourceConfig, fetcher: impl SourceFetcher)->Result<()> {
        self.register_source_with( &config.name, config.interval, config.phase, config.max_in_flight, Box::new(fetcher))
    }

    pub fn register_source_with (&mut self, name: impl ToString, interval: Duration, phase: Option<Duration>,
                                 max_in_flight: usize, fetcher: Box<dyn SourceFetcher>)->Result<()> {
        let name = name.to_string();
        if interval.is_zero() {
            return Err( AcquisitionError::InvalidSource( format!("{name}: interval must be > 0")))
        }
        if max_in_flight == 0 {
            return Err( AcquisitionError::InvalidSource( format!("{name}: max_in_flight must be > 0")))
        }
        if self.sources.iter().any(|s| s.name == name) {
            return Err( AcquisitionError::InvalidSource( format!("{name}: already registered")))
        }

        let phase = phase.unwrap_or( self.stagger_step * self.sources.len() as u32);
        debug!("registered source {name} ({}) every {interval:?} at phase {phase:?}", fetcher.describe());

        let source = Arc::new( Source {
            name,
            interval,
            phase,
            fetcher,
            in_flight: Arc::new( Semaphore::new(max_in_flight)),
            seq: Mutex::new(0),
            stats: SourceStats::default(),
        });

        if self.state == SchedulerState::Running {
            let task = spawn_source( source.clone(), self.port.clone())?;
            self.tasks.push(task);
        }
        self.sources.push( source);
        Ok(())
    }

    /// hand over the bridge endpoint updates are posted to. This is a one-time operation
    pub fn register_port (&mut self, endpoint: BridgeEndpoint<UpdateMsg>)->Result<()> {
        self.port.register(endpoint)?;
        if self.state == SchedulerState::Uninitialized {
            self.state = SchedulerState::Armed;
        }
        Ok(())
    }

    /// start the timers of all registered sources. Requires a registered bridge endpoint
    pub fn start (&mut self)->Result<()> {
        match self.state {
            SchedulerState::Uninitialized => Err( invalid_state!("cannot start before a bridge endpoint is registered")),
            SchedulerState::Running => {
                debug!("acquisition already running");
                Ok(())
            }
            SchedulerState::Armed => {
                for source in &self.sources {
                    let task = spawn_source( source.clone(), self.port.clone())?;
                    self.tasks.push(task);
                }
                if let Some(dt) = self.stats_interval {
                    let task = spawn_stats_logger( self.sources.clone(), dt)?;
                    self.tasks.push(task);
                }
                self.state = SchedulerState::Running;
                info!("acquisition running {} sources", self.sources.len());
                Ok(())
            }
        }
    }

    /// post a payload as an update of the given kind. Fails (and sends nothing) if no bridge
    /// endpoint has been registered yet
    pub fn emit (&self, kind: &str, payload: Value)->Result<Delivery> {
        match self.sources.iter().find(|s| s.name == kind) {
            Some(source) => source.forward( &self.port, payload),
            None => Ok( self.port.post( UpdateMsg::new( kind, payload))?)
        }
    }

    pub fn stats (&self)->Vec<(String,SourceStatsSnapshot)> {
        self.sources.iter().map(|s| (s.name.clone(), s.stats.snapshot())).collect()
    }

    pub fn source_stats (&self, name: &str)->Option<SourceStatsSnapshot> {
        self.sources.iter().find(|s| s.name == name).map(|s| s.stats.snapshot())
    }
}

impl Drop for AcquisitionScheduler {
    fn drop (&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn spawn_source (source: Arc<Source>, port: Arc<BridgePort<UpdateMsg>>)->Result<AbortHandle> {
    let rt = tokio::runtime::Handle::try_current().map_err(|_| invalid_state!("no async runtime to run sources"))?;
    let jh = rt.spawn( run_source( source, port));
    Ok( jh.abort_handle())
}

/// the timer loop of a single source. Each tick runs its fetch as a separate task so that a slow
/// fetch neither delays the next tick nor any other source
async fn run_source (source: Arc<Source>, port: Arc<BridgePort<UpdateMsg>>) {
    let mut ticker = time::interval_at( Instant::now() + source.phase, source.interval);
    ticker.set_missed_tick_behavior( MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        source.stats.ticks.fetch_add(1, Ordering::Relaxed);

        match source.in_flight.clone().try_acquire_owned() {
            Ok(permit) => {
                let source = source.clone();
                let port = port.clone();
                tokio::spawn( async move {
                    execute_tick( &source, &port).await;
                    drop(permit);
                });
            }
            Err(_) => {
                source.stats.skipped.fetch_add(1, Ordering::Relaxed);
                trace!("{}: max fetches in flight, tick skipped", source.name);
            }
        }
    }
}

async fn execute_tick (source: &Source, port: &BridgePort<UpdateMsg>) {
    match source.fetcher.fetch().await {
        Ok(payload) => {
            match source.forward( port, payload) {
                Ok(Delivery::Queued) => {}
                Ok(delivery) => debug!("{}: bridge full, update {delivery:?}", source.name),
                Err(e) => error!("{}: cannot forward update: {e}", source.name)
            }
        }
        Err(e) => {
            source.stats.failed.fetch_add(1, Ordering::Relaxed);
            if e.is_transient() {
                warn!("{}: {e}", source.name);
            } else {
                error!("{}: fetch failed: {e}", source.name);
            }
        }
    }
}

fn spawn_stats_logger (sources: Vec<Arc<Source>>, interval: Duration)->Result<AbortHandle> {
    let rt = tokio::runtime::Handle::try_current().map_err(|_| invalid_state!("no async runtime for stats logger"))?;
    let jh = rt.spawn( async move {
        let mut ticker = time::interval_at( Instant::now() + interval, interval);
        loop {
            ticker.tick().await;
            for source in &sources {
                let s = source.stats.snapshot();
                info!(source=%source.name, ticks=s.ticks, completed=s.completed, failed=s.failed, skipped=s.skipped, dropped=s.dropped, "source stats");
            }
        }
    });
    Ok( jh.abort_handle())
}
