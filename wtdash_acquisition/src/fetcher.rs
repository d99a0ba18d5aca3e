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

use std::{future::Future, time::Duration};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::errors::{Result,fetch_error};

/// the fetch capability of a telemetry source. A fetch either resolves to a decoded JSON
/// payload or fails with a transient error. Timeouts are the business of the fetcher
#[async_trait]
pub trait SourceFetcher: Send + Sync + 'static {
    async fn fetch (&self)->Result<Value>;

    fn describe (&self)->String { "<fetcher>".to_string() }
}

/// GET a JSON document from a fixed url
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new (url: impl ToString, timeout: Duration)->Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok( HttpFetcher { client, url: url.to_string() })
    }

    /// share one client (and its connection pool) between sources
    pub fn with_client (client: Client, url: impl ToString)->Self {
        HttpFetcher { client, url: url.to_string() }
    }

    pub fn url (&self)->&str { &self.url }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch (&self)->Result<Value> {
        let response = self.client.get( &self.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err( fetch_error( format!("empty response from {}", self.url)))
        }
        Ok( serde_json::from_slice(&bytes)?)
    }

    fn describe (&self)->String { self.url.clone() }
}

/// adapter to use async closures as fetchers
pub struct FnFetcher<F>(F);

pub fn fetch_fn<F,Fut> (f: F)->FnFetcher<F>
    where F: Fn()->Fut + Send + Sync + 'static, Fut: Future<Output=Result<Value>> + Send + 'static
{
    FnFetcher(f)
}

#[async_trait]
impl<F,Fut> SourceFetcher for FnFetcher<F>
    where F: Fn()->Fut + Send + Sync + 'static, Fut: Future<Output=Result<Value>> + Send + 'static
{
    async fn fetch (&self)->Result<Value> {
        (self.0)().await
    }

    fn describe (&self)->String { "<fn>".to_string() }
}
