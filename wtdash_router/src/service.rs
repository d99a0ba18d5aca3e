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

use std::{future::Future, pin::Pin, sync::Arc, task::{Context,Poll}};
use bytes::Bytes;
use http::{Request, Response};
use tower::{Layer, Service};
use tracing::trace;

use crate::router::{ArtifactSource,RequestRouter,RouteDecision};

/// tower layer that puts a [RequestRouter] in front of a service
pub struct InterceptLayer<A> {
    router: Arc<RequestRouter<A>>
}

impl<A> InterceptLayer<A> {
    pub fn new (router: RequestRouter<A>)->Self {
        InterceptLayer { router: Arc::new(router) }
    }
}

impl<A> Clone for InterceptLayer<A> {
    fn clone (&self)->Self { InterceptLayer { router: self.router.clone() } }
}

impl<S,A> Layer<S> for InterceptLayer<A> {
    type Service = InterceptService<S,A>;

    fn layer (&self, inner: S)->Self::Service {
        InterceptService { inner, router: self.router.clone() }
    }
}

/// answers routed requests from the artifact source and hands everything else unmodified to
/// the inner service. It never creates error responses of its own
pub struct InterceptService<S,A> {
    inner: S,
    router: Arc<RequestRouter<A>>,
}

impl<S,A> Clone for InterceptService<S,A> where S: Clone {
    fn clone (&self)->Self {
        InterceptService { inner: self.inner.clone(), router: self.router.clone() }
    }
}

impl<S,A,ReqBody,ResBody> Service<Request<ReqBody>> for InterceptService<S,A>
    where S: Service<Request<ReqBody>, Response=Response<ResBody>> + Clone + Send + 'static,
          S::Future: Send + 'static,
          S::Error: Send + 'static,
          A: ArtifactSource,
          ReqBody: Send + 'static,
          ResBody: From<Bytes> + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output=Result<Response<ResBody>,S::Error>> + Send>>;

    fn poll_ready (&mut self, cx: &mut Context<'_>)->Poll<Result<(),Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call (&mut self, req: Request<ReqBody>)->Self::Future {
        let router = self.router.clone();
        let decision = router.route( &req);

        // the clone has not been polled ready, keep the one that was
        let clone = self.inner.clone();
        let mut inner = std::mem::replace( &mut self.inner, clone);

        Box::pin( async move {
            match decision {
                RouteDecision::Serve(artifact) => {
                    if let Some(bytes) = router.answer( &artifact).await {
                        return Ok( crate::router::json_response(bytes))
                    }
                }
                RouteDecision::FallThrough(reason) => {
                    trace!("{} {} falls through: {reason:?}", req.method(), req.uri());
                }
            }
            inner.call(req).await
        })
    }
}
