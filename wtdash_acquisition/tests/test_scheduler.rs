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

/// tests for source scheduling, registration preconditions and failure containment
/// run with "cargo test --test test_scheduler -- --nocapture"

use std::sync::{Arc, atomic::{AtomicUsize,Ordering}};
use std::time::Duration;
use serde_json::{json,Value};
use tokio::time::{sleep,timeout};

use wtdash_common::datetime::millis;
use wtdash_bridge::{create_bridge,BridgeConfig,BridgeError,BridgeEndpoint,UpdateMsg};
use wtdash_acquisition::*;

fn config ()->AcquisitionConfig {
    AcquisitionConfig { request_timeout: millis(200), stagger_step: millis(0), stats_interval: None, sources: vec![] }
}

fn counting_fetcher (calls: Arc<AtomicUsize>)->impl SourceFetcher {
    fetch_fn( move || {
        let calls = calls.clone();
        async move {
            let i = calls.fetch_add(1, Ordering::SeqCst);
            Ok( json!({"i": i}))
        }
    })
}

async fn drain (ep: &BridgeEndpoint<UpdateMsg>)->Vec<UpdateMsg> {
    let mut msgs = Vec::new();
    while let Ok(Some(msg)) = ep.try_recv() {
        msgs.push(msg);
    }
    msgs
}

#[tokio::test]
async fn test_emit_before_register () {
    let mut scheduler = AcquisitionScheduler::new( &config());
    scheduler.register_source( "state", millis(30), counting_fetcher( Arc::new( AtomicUsize::new(0)))).unwrap();
    assert_eq!( SchedulerState::Uninitialized, scheduler.state());

    let res = scheduler.emit( "state", json!({"TAS, km/h": 100}));
    println!("emit before register: {res:?}");
    assert!( matches!( res, Err(AcquisitionError::BridgeError(BridgeError::NotRegistered(_)))));

    let res = scheduler.start();
    println!("start before register: {res:?}");
    assert!( matches!( res, Err(AcquisitionError::InvalidState(_))));
    assert_eq!( SchedulerState::Uninitialized, scheduler.state());
}

#[tokio::test]
async fn test_lifecycle () {
    let (a, b) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    let calls = Arc::new( AtomicUsize::new(0));

    let mut scheduler = AcquisitionScheduler::new( &config());
    scheduler.register_source( "state", millis(20), counting_fetcher( calls.clone())).unwrap();

    scheduler.register_port(a).unwrap();
    assert_eq!( SchedulerState::Armed, scheduler.state());
    sleep( millis(60)).await;
    assert_eq!( 0, calls.load(Ordering::SeqCst)); // armed but not started

    scheduler.start().unwrap();
    assert_eq!( SchedulerState::Running, scheduler.state());

    let msg = timeout( millis(500), b.recv()).await.unwrap().unwrap();
    println!("first update: {msg:?}");
    assert_eq!( "state", msg.kind);
    assert_eq!( 1, msg.seq);
    assert_eq!( json!({"i": 0}), msg.payload);
}

#[tokio::test]
async fn test_invalid_sources () {
    let mut scheduler = AcquisitionScheduler::new( &config());
    let calls = Arc::new( AtomicUsize::new(0));

    assert!( scheduler.register_source( "state", Duration::ZERO, counting_fetcher( calls.clone())).is_err());
    scheduler.register_source( "state", millis(30), counting_fetcher( calls.clone())).unwrap();
    assert!( scheduler.register_source( "state", millis(30), counting_fetcher( calls.clone())).is_err());
    assert_eq!( vec!["state".to_string()], scheduler.source_names());
}

#[tokio::test]
async fn test_slow_source_does_not_block_others () {
    let (a, b) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    let fast_calls = Arc::new( AtomicUsize::new(0));

    let mut scheduler = AcquisitionScheduler::new( &config());
    scheduler.register_source( "slow", millis(20), fetch_fn( || async {
        sleep( millis(10_000)).await; // never completes within the test
        Ok( json!({}))
    })).unwrap();
    scheduler.register_source( "fast", millis(20), counting_fetcher( fast_calls.clone())).unwrap();
    scheduler.register_port(a).unwrap();
    scheduler.start().unwrap();

    sleep( millis(300)).await;
    let msgs = drain(&b).await;
    let n_fast = msgs.iter().filter(|m| m.kind == "fast").count();
    let n_slow = msgs.iter().filter(|m| m.kind == "slow").count();
    println!("fast: {n_fast}, slow: {n_slow}, stats: {:?}", scheduler.stats());

    assert!( n_fast >= 5);
    assert_eq!( 0, n_slow);

    let slow_stats = scheduler.source_stats("slow").unwrap();
    assert!( slow_stats.skipped > 0); // in-flight limit reached
}

#[tokio::test]
async fn test_failures_are_contained () {
    let (a, b) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    let calls = Arc::new( AtomicUsize::new(0));

    let mut scheduler = AcquisitionScheduler::new( &config());
    let c = calls.clone();
    scheduler.register_source( "indicators", millis(20), fetch_fn( move || {
        let c = c.clone();
        async move {
            let i = c.fetch_add(1, Ordering::SeqCst);
            if i % 2 == 0 { Err( fetch_error("connection refused")) } else { Ok( json!({"i": i})) }
        }
    })).unwrap();
    scheduler.register_port(a).unwrap();
    scheduler.start().unwrap();

    sleep( millis(250)).await;
    let msgs = drain(&b).await;
    let stats = scheduler.source_stats("indicators").unwrap();
    println!("received {} updates, stats: {stats:?}", msgs.len());

    assert!( stats.failed > 0);
    assert!( !msgs.is_empty());
    assert!( msgs.iter().all(|m| m.payload["i"].as_u64().unwrap() % 2 == 1));
}

#[tokio::test]
async fn test_error_classes () {
    assert!( fetch_error("connection refused").is_transient());
    assert!( !op_failed("no decoder").is_transient());

    let (a, b) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    let mut scheduler = AcquisitionScheduler::new( &config());
    scheduler.register_source( "state", millis(20), fetch_fn( || async { Err( op_failed("no decoder")) })).unwrap();
    scheduler.register_port(a).unwrap();
    scheduler.start().unwrap();

    sleep( millis(100)).await;
    let stats = scheduler.source_stats("state").unwrap();
    println!("stats: {stats:?}");
    assert!( stats.failed > 0); // non-transient errors are contained as well
    assert!( drain(&b).await.is_empty());
}

#[tokio::test]
async fn test_completion_order () {
    let (a, b) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    let calls = Arc::new( AtomicUsize::new(0));

    let mut scheduler = AcquisitionScheduler::new( &config());
    let c = calls.clone();
    scheduler.register_source( "state", millis(30), fetch_fn( move || {
        let c = c.clone();
        async move {
            let i = c.fetch_add(1, Ordering::SeqCst);
            let delay = if i == 0 { 150 } else { 5 }; // first issued fetch completes last
            sleep( millis(delay)).await;
            Ok( json!({"i": i}))
        }
    })).unwrap();
    scheduler.register_port(a).unwrap();
    scheduler.start().unwrap();

    sleep( millis(250)).await;
    let msgs = drain(&b).await;
    let issued: Vec<u64> = msgs.iter().map(|m| m.payload["i"].as_u64().unwrap()).collect();
    let seqs: Vec<u64> = msgs.iter().map(|m| m.seq).collect();
    println!("issue order in completion order: {issued:?}, seqs: {seqs:?}");

    assert!( issued.len() >= 3);
    assert_eq!( 1, issued[0]);           // forwarded in completion order
    assert!( issued.contains(&0));
    assert!( seqs.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_worker_registration () {
    let (a, b) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    let calls = Arc::new( AtomicUsize::new(0));

    let mut scheduler = AcquisitionScheduler::new( &config());
    scheduler.register_source( "map_obj.json", millis(20), counting_fetcher( calls.clone())).unwrap();

    let worker = AcquisitionWorker::spawn( scheduler).unwrap();
    sleep( millis(60)).await;
    assert_eq!( 0, calls.load(Ordering::SeqCst)); // nothing runs before register

    worker.register(a).await.unwrap();
    let msg = timeout( millis(500), b.recv()).await.unwrap().unwrap();
    assert_eq!( "map_obj.json", msg.kind);
    worker.abort();
}

#[test]
fn test_config () {
    let config: AcquisitionConfig = wtdash_common::config::config_from_str(r#"(
        request_timeout: "200ms",
        stagger_step: "10ms",
        stats_interval: Some("10s"),
        sources: [
            (name: "state", url: "http://localhost:8111/state", interval: "30ms"),
            (name: "map_obj.json", url: "http://localhost:8111/map_obj.json", interval: "300ms", phase: Some("5ms"), max_in_flight: 2),
        ]
    )"#).unwrap();
    println!("{config:#?}");

    assert_eq!( 2, config.sources.len());
    assert_eq!( millis(30), config.sources[0].interval);
    assert_eq!( None, config.sources[0].phase);
    assert_eq!( DEFAULT_MAX_IN_FLIGHT, config.sources[0].max_in_flight);
    assert_eq!( Some(millis(5)), config.sources[1].phase);
    assert_eq!( 2, config.sources[1].max_in_flight);
    assert_eq!( Some(millis(10_000)), config.stats_interval);
}
