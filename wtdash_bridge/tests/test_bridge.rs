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

/// tests for bridge endpoints, drop policies and registration
/// run with "cargo test --test test_bridge -- --nocapture"

use serde_json::json;
use wtdash_bridge::*;

fn config (capacity: usize, drop_policy: DropPolicy)->BridgeConfig {
    BridgeConfig { capacity, drop_policy }
}

#[tokio::test]
async fn test_fifo_order () {
    let (a, b) = create_bridge::<u32>( &config(8, DropPolicy::DropOldest)).unwrap();

    for i in 0..5 {
        assert_eq!( Delivery::Queued, a.post(i).unwrap());
    }
    let mut received = Vec::new();
    for _ in 0..5 {
        received.push( b.recv().await.unwrap());
    }
    println!("received: {received:?}");
    assert_eq!( vec![0,1,2,3,4], received);
    assert_eq!( None, b.try_recv().unwrap());
}

#[tokio::test]
async fn test_bidirectional () {
    let (a, b) = create_bridge::<&'static str>( &BridgeConfig::default()).unwrap();
    a.post("ping").unwrap();
    assert_eq!( "ping", b.recv().await.unwrap());
    b.post("pong").unwrap();
    assert_eq!( "pong", a.recv().await.unwrap());
}

#[test]
fn test_drop_oldest () {
    let (a, b) = create_bridge::<u32>( &config(2, DropPolicy::DropOldest)).unwrap();
    assert_eq!( Delivery::Queued, a.post(1).unwrap());
    assert_eq!( Delivery::Queued, a.post(2).unwrap());
    assert_eq!( Delivery::Displaced, a.post(3).unwrap());
    assert_eq!( 2, a.pending_outbound());
    assert_eq!( 2, b.pending_inbound());

    assert_eq!( Some(2), b.try_recv().unwrap());
    assert_eq!( Some(3), b.try_recv().unwrap());
    assert_eq!( None, b.try_recv().unwrap());
}

#[test]
fn test_drop_newest () {
    let (a, b) = create_bridge::<u32>( &config(2, DropPolicy::DropNewest)).unwrap();
    a.post(1).unwrap();
    a.post(2).unwrap();
    assert_eq!( Delivery::Dropped, a.post(3).unwrap());

    assert_eq!( Some(1), b.try_recv().unwrap());
    assert_eq!( Some(2), b.try_recv().unwrap());
    assert_eq!( None, b.try_recv().unwrap());
}

#[test]
fn test_zero_capacity () {
    let res = create_bridge::<u32>( &config(0, DropPolicy::DropNewest));
    println!("zero capacity bridge: {:?}", res.as_ref().err());
    assert!( matches!( res, Err(BridgeError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_closed_peer () {
    let (a, b) = create_bridge::<u32>( &BridgeConfig::default()).unwrap();
    drop(a);
    let res = b.recv().await;
    println!("recv from dropped peer: {res:?}");
    assert!( matches!( res, Err(BridgeError::Closed(_))));
}

#[test]
fn test_post_before_register () {
    let (a, b) = create_bridge::<UpdateMsg>( &BridgeConfig::default()).unwrap();
    let port: BridgePort<UpdateMsg> = BridgePort::new("acquisition");

    let res = port.post( UpdateMsg::new("state", json!({"TAS, km/h": 100})));
    println!("post before register: {res:?}");
    assert_eq!( Err(BridgeError::NotRegistered("acquisition".to_string())), res);
    assert_eq!( None, b.try_recv().unwrap()); // nothing partially sent

    port.register(a).unwrap();
    assert!( port.is_registered());
    assert_eq!( Delivery::Queued, port.post( UpdateMsg::new("state", json!({}))).unwrap());

    let msg = b.try_recv().unwrap().unwrap();
    assert_eq!( "state", msg.kind);
    assert_eq!( "update-state", msg.topic());
}

#[test]
fn test_register_once () {
    let (a, b) = create_bridge::<u32>( &BridgeConfig::default()).unwrap();
    let port: BridgePort<u32> = BridgePort::new("aggregation");
    port.register(a).unwrap();
    assert_eq!( Err(BridgeError::AlreadyRegistered("aggregation".to_string())), port.register(b));
}

#[tokio::test]
async fn test_control_channel () {
    let (tx, rx) = create_control_channel::<u32>();
    let (a, _b) = create_bridge::<u32>( &BridgeConfig::default()).unwrap();

    tx.send( ControlMsg::Register(a)).await.unwrap();
    let ControlMsg::Register(ep) = rx.recv().await.unwrap();
    assert_eq!( "port1", ep.label());
}
