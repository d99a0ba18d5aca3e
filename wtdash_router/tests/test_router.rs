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

/// tests for request interception and fall through
/// run with "cargo test --test test_router -- --nocapture"

use std::convert::Infallible;
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::{json,Value};
use tower::{Layer, ServiceExt, service_fn};

use wtdash_bridge::{create_bridge,BridgeConfig,UpdateMsg};
use wtdash_aggregation::{AggregationConfig,AggregationEngine,AggregationWorker};
use wtdash_router::*;

const ARTIFACTS: [&str;5] = ["speed-over-time", "altitude-over-time", "energy-over-time", "radar-map", "orientation"];

struct FakeSource {
    ready: bool
}

#[async_trait]
impl ArtifactSource for FakeSource {
    fn is_ready (&self)->bool { self.ready }

    fn provides (&self, name: &str)->bool { ARTIFACTS.contains(&name) }

    async fn artifact_json (&self, name: &str)->Result<Bytes> {
        Ok( Bytes::from( json!({"name": name}).to_string()))
    }
}

/// stands in for the regular network path. Echoes the request uri
async fn network (req: Request<Full<Bytes>>)->std::result::Result<Response<Full<Bytes>>,Infallible> {
    let mut response = Response::new( Full::new( Bytes::from( req.uri().to_string())));
    response.headers_mut().insert( "x-origin", "network".parse().unwrap());
    Ok(response)
}

fn get (uri: &str)->Request<Full<Bytes>> {
    Request::builder().uri(uri).body( Full::new( Bytes::new())).unwrap()
}

async fn call (ready: bool, req: Request<Full<Bytes>>)->(Response<Full<Bytes>>,Bytes) {
    let router = RequestRouter::new( &RouterConfig::default(), FakeSource{ready}).unwrap();
    let svc = InterceptLayer::new(router).layer( service_fn(network));
    let (parts, body) = svc.oneshot(req).await.unwrap().into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    (Response::from_parts( parts, Full::new( bytes.clone())), bytes)
}

fn origin (response: &Response<Full<Bytes>>)->Option<&str> {
    response.headers().get("x-origin").and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_intercept () {
    let (response, body) = call( true, get("http://localhost:8000/speed")).await;
    println!("{:?} {:?}", response.headers(), body);

    assert_eq!( StatusCode::OK, response.status());
    assert_eq!( None, origin(&response));
    assert_eq!( "application/json", response.headers().get( header::CONTENT_TYPE).unwrap().to_str().unwrap());
    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!( json!({"name": "speed-over-time"}), doc);
}

#[tokio::test]
async fn test_host_header () {
    let req = Request::builder()
        .uri("/artificial-horizon")
        .header( header::HOST, "LOCALHOST:8000")
        .body( Full::new( Bytes::new())).unwrap();
    let (response, body) = call( true, req).await;

    assert_eq!( None, origin(&response));
    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!( json!({"name": "orientation"}), doc);
}

#[tokio::test]
async fn test_fall_through () {
    let cases = [
        (true, "http://localhost:8000/unmapped"),   // unmapped path
        (true, "http://localhost:8111/speed"),      // other host
        (true, "http://example.com/radar-map"),     // other host
        (false, "http://localhost:8000/speed"),     // engine not ready
    ];

    for (ready, uri) in cases {
        let (response, body) = call( ready, get(uri)).await;
        println!("{uri} (ready: {ready}) -> {:?} {:?}", response.status(), origin(&response));

        assert_eq!( StatusCode::OK, response.status()); // whatever the network says, not a 404 from us
        assert_eq!( Some("network"), origin(&response));
        assert_eq!( uri.as_bytes(), &body[..]);          // request reached the network unmodified
    }
}

#[test]
fn test_route_decisions () {
    let router = RequestRouter::new( &RouterConfig::default(), FakeSource{ready:true}).unwrap();

    assert_eq!( RouteDecision::Serve("radar-map".to_string()), router.route( &get("http://localhost:8000/radar-map")));
    assert_eq!( RouteDecision::Serve("energy-over-time".to_string()), router.route( &get("http://localhost:8000/energy")));
    assert_eq!( RouteDecision::FallThrough(FallThrough::UnmappedPath), router.route( &get("http://localhost:8000/")));
    assert_eq!( RouteDecision::FallThrough(FallThrough::ForeignHost), router.route( &get("http://localhost:8001/speed")));
    assert_eq!( RouteDecision::FallThrough(FallThrough::ForeignHost), router.route( &get("/speed"))); // no authority at all

    let router = RequestRouter::new( &RouterConfig::default(), FakeSource{ready:false}).unwrap();
    assert_eq!( RouteDecision::FallThrough(FallThrough::NotReady), router.route( &get("http://localhost:8000/speed")));
}

#[test]
fn test_route_validation () {
    let mut config = RouterConfig::default();
    config.routes.insert( "/gear".to_string(), "gear-over-time".to_string());
    let res = RequestRouter::new( &config, FakeSource{ready:true});
    assert!( matches!( res, Err(RouterError::UnknownArtifact(_,_))));

    let mut config = RouterConfig::default();
    config.routes.insert( "speed".to_string(), "speed-over-time".to_string());
    let res = RequestRouter::new( &config, FakeSource{ready:true});
    assert!( matches!( res, Err(RouterError::InvalidRoute(_))));
}

#[tokio::test]
async fn test_with_engine () {
    let engine = AggregationEngine::with_default_artifacts( AggregationConfig::default()).unwrap();
    let worker = AggregationWorker::spawn(engine).unwrap();
    let mut handle = worker.handle();
    handle.wait_ready().await.unwrap();

    let (acq, agg) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    worker.register(agg).await.unwrap();
    acq.post( UpdateMsg::new( "map_obj.json", json!([
        {"type": "airfield", "color": "#f00C00", "sx": 10.0, "sy": 20.0, "ex": 30.0, "ey": 40.0},
        {"type": "aircraft", "icon": "Player", "color": "#faC81E", "x": 0.0, "y": 0.0, "dx": 0.0, "dy": 1.0},
    ]))).unwrap();

    let router = RequestRouter::new( &RouterConfig::default(), handle).unwrap();
    let svc = InterceptLayer::new(router).layer( service_fn(network));

    let mut doc = Value::Null;
    for _ in 0..50 {
        let response = svc.clone().oneshot( get("http://localhost:8000/radar-map")).await.unwrap();
        assert!( response.headers().get("x-origin").is_none());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        doc = serde_json::from_slice(&body).unwrap();
        if doc["airfields"].as_array().map(|a| !a.is_empty()).unwrap_or(false) { break }
        tokio::time::sleep( std::time::Duration::from_millis(10)).await;
    }
    println!("{doc:#}");

    assert_eq!( "radar_map", doc["type"]);
    assert_eq!( "hostile", doc["airfields"][0]["affiliation"]);
    assert_eq!( json!({"x": 0.0, "y": 0.0}), doc["player"]);
}

#[test]
fn test_config_file () {
    let config: RouterConfig = wtdash_common::config::load_config("../configs/router.ron").unwrap();
    println!("{config:#?}");

    let defaults = RouterConfig::default();
    assert_eq!( defaults.virtual_host, config.virtual_host);
    assert_eq!( defaults.sock_addr, config.sock_addr);
    assert_eq!( defaults.routes, config.routes);
    assert!( config.routes.values().all(|a| ARTIFACTS.contains(&a.as_str())));
}
