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

use axum::{Router, http::StatusCode};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{info,error};

use crate::RouterConfig;
use crate::router::{ArtifactSource,RequestRouter};
use crate::service::InterceptLayer;
use crate::errors::Result;

/// the axum app for the virtual host: static presentation assets (if configured) behind the
/// artifact interceptor. Paths that are neither routed nor static assets get the host's 404
pub fn build_app<A> (config: &RouterConfig, router: RequestRouter<A>)->Router where A: ArtifactSource {
    let app = match &config.static_dir {
        Some(dir) => Router::new().fallback_service( ServeDir::new(dir)),
        None => Router::new().fallback( || async { StatusCode::NOT_FOUND })
    };

    app.layer( InterceptLayer::new(router))
       .layer( CorsLayer::permissive())
}

pub async fn serve<A> (config: &RouterConfig, router: RequestRouter<A>)->Result<()> where A: ArtifactSource {
    let app = build_app( config, router);
    let listener = TcpListener::bind( config.sock_addr).await?;
    info!("serving http://{} as {}", config.sock_addr, config.virtual_host);
    axum::serve( listener, app).await?;
    Ok(())
}

pub fn spawn_server_task<A> (config: &RouterConfig, router: RequestRouter<A>)->JoinHandle<()> where A: ArtifactSource {
    let config = config.clone();
    tokio::spawn( async move {
        if let Err(e) = serve( &config, router).await {
            error!("dashboard server terminated: {e}");
        }
    })
}
