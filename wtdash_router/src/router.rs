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

use std::collections::HashMap;
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, HeaderValue, Request, Response, StatusCode};
use tracing::{debug,trace,warn};

use wtdash_aggregation::AggregationHandle;
use crate::RouterConfig;
use crate::errors::{RouterError,Result};

/// where the router gets its artifacts from
#[async_trait]
pub trait ArtifactSource: Send + Sync + 'static {
    /// can queries be answered right now
    fn is_ready (&self)->bool;

    /// is there an artifact with this name
    fn provides (&self, name: &str)->bool;

    /// the serialized artifact document
    async fn artifact_json (&self, name: &str)->Result<Bytes>;
}

#[async_trait]
impl ArtifactSource for AggregationHandle {
    fn is_ready (&self)->bool {
        AggregationHandle::is_ready(self)
    }

    fn provides (&self, name: &str)->bool {
        self.has_artifact(name)
    }

    async fn artifact_json (&self, name: &str)->Result<Bytes> {
        let artifact = self.query(name).await?;
        Ok( Bytes::from( serde_json::to_vec(&artifact)?))
    }
}

/// why a request was not intercepted. All of these are handled the same way
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FallThrough {
    ForeignHost,
    UnmappedPath,
    NotReady,
}

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum RouteDecision {
    /// answer with this artifact
    Serve(String),
    FallThrough(FallThrough),
}

pub struct RequestRouter<A> {
    virtual_host: String,
    routes: HashMap<String,String>,
    source: A,
}

impl<A> RequestRouter<A> where A: ArtifactSource {

    /// fails if a route refers to an artifact the source does not provide
    pub fn new (config: &RouterConfig, source: A)->Result<Self> {
        let mut routes = HashMap::new();
        for (path, artifact) in &config.routes {
            if !path.starts_with('/') {
                return Err( RouterError::InvalidRoute( path.clone()))
            }
            if !source.provides( artifact) {
                return Err( RouterError::UnknownArtifact( path.clone(), artifact.clone()))
            }
            routes.insert( path.clone(), artifact.clone());
        }
        debug!("routing {} paths on {}", routes.len(), config.virtual_host);

        Ok( RequestRouter { virtual_host: config.virtual_host.to_ascii_lowercase(), routes, source })
    }

    pub fn virtual_host (&self)->&str { &self.virtual_host }

    pub fn source (&self)->&A { &self.source }

    /// does the request target our virtual host. The authority is taken from the uri (absolute form)
    /// or the Host header
    pub fn is_virtual_host<B> (&self, req: &Request<B>)->bool {
        let authority = match req.uri().authority() {
            Some(auth) => Some( auth.as_str()),
            None => req.headers().get( header::HOST).and_then(|h| h.to_str().ok())
        };
        authority.map( |a| a.eq_ignore_ascii_case( &self.virtual_host)).unwrap_or(false)
    }

    pub fn route<B> (&self, req: &Request<B>)->RouteDecision {
        if !self.is_virtual_host(req) {
            return RouteDecision::FallThrough( FallThrough::ForeignHost)
        }
        let Some(artifact) = self.routes.get( req.uri().path()) else {
            return RouteDecision::FallThrough( FallThrough::UnmappedPath)
        };
        if !self.source.is_ready() {
            return RouteDecision::FallThrough( FallThrough::NotReady)
        }
        RouteDecision::Serve( artifact.clone())
    }

    /// the serialized artifact, or None if the source could not answer (in which case the request falls through)
    pub async fn answer (&self, artifact: &str)->Option<Bytes> {
        match self.source.artifact_json( artifact).await {
            Ok(bytes) => {
                trace!("serving {artifact} ({} bytes)", bytes.len());
                Some(bytes)
            }
            Err(e) => {
                warn!("cannot serve {artifact}: {e}");
                None
            }
        }
    }
}

/// a 200 JSON response for an artifact document
pub fn json_response<B> (bytes: Bytes)->Response<B> where B: From<Bytes> {
    let mut response = Response::new( B::from(bytes));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert( header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert( header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
