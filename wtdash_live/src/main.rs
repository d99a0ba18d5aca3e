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

use std::{net::SocketAddr, path::{Path,PathBuf}};
use anyhow::Result;
use clap::Parser;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::info;

use wtdash_common::{init_tracing, config::load_config_or_default};
use wtdash_bridge::{create_bridge, BridgeConfig, UpdateMsg};
use wtdash_acquisition::{AcquisitionConfig, AcquisitionScheduler, AcquisitionWorker, HttpFetcher};
use wtdash_aggregation::{AggregationConfig, AggregationEngine, AggregationWorker};
use wtdash_router::{RouterConfig, RequestRouter, spawn_server_task};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "live flight telemetry dashboard backend")]
pub struct Args {
    /// directory with acquisition.ron, aggregation.ron, bridge.ron and router.ron (missing files use defaults)
    #[arg(short,long, default_value = "configs")]
    pub config_dir: PathBuf,

    /// override the configured listen address
    #[arg(long)]
    pub sock_addr: Option<SocketAddr>,
}

struct DashboardConfig {
    acquisition: AcquisitionConfig,
    aggregation: AggregationConfig,
    bridge: BridgeConfig,
    router: RouterConfig,
}

impl DashboardConfig {
    fn load (dir: &Path)->Result<Self> {
        Ok( DashboardConfig {
            acquisition: load_config_or_default( dir.join("acquisition.ron"))?,
            aggregation: load_config_or_default( dir.join("aggregation.ron"))?,
            bridge: load_config_or_default( dir.join("bridge.ron"))?,
            router: load_config_or_default( dir.join("router.ron"))?,
        })
    }
}

/// the running parts. Built once at startup, nothing in here is global
struct Dashboard {
    acquisition: AcquisitionWorker,
    aggregation: AggregationWorker,
    server: JoinHandle<()>,
}

impl Dashboard {
    async fn start (config: DashboardConfig)->Result<Self> {
        //--- the aggregation context (owns the engine)
        let engine = AggregationEngine::with_default_artifacts( config.aggregation)?;
        let aggregation = AggregationWorker::spawn( engine)?;

        //--- the acquisition context (owns the sources)
        let client = Client::builder().timeout( config.acquisition.request_timeout).build()?;
        let mut scheduler = AcquisitionScheduler::new( &config.acquisition);
        for source in &config.acquisition.sources {
            scheduler.register_configured_source( source, HttpFetcher::with_client( client.clone(), &source.url))?;
        }
        let acquisition = AcquisitionWorker::spawn( scheduler)?;

        //--- connect both through the bridge. Sources start polling once acquisition gets its endpoint
        let (acq_endpoint, agg_endpoint) = create_bridge::<UpdateMsg>( &config.bridge)?;
        aggregation.register( agg_endpoint).await?;
        acquisition.register( acq_endpoint).await?;

        //--- serve artifacts on the virtual host
        let router = RequestRouter::new( &config.router, aggregation.handle())?;
        let server = spawn_server_task( &config.router, router);

        Ok( Dashboard { acquisition, aggregation, server })
    }

    fn terminate (self) {
        self.server.abort();
        self.acquisition.abort();
        self.aggregation.abort();
    }
}

#[tokio::main]
async fn main()->Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = DashboardConfig::load( &args.config_dir)?;
    if let Some(sock_addr) = args.sock_addr {
        config.router.sock_addr = sock_addr;
    }

    let dashboard = Dashboard::start( config).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    dashboard.terminate();

    Ok(())
}
