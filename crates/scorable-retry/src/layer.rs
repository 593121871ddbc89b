use crate::RetryManager;
use futures::future::BoxFuture;
use scorable_core::ScorableError;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// A Tower [`Layer`] that routes every call through a [`RetryManager`].
///
/// The wrapped service must fail with [`ScorableError`] and accept `Clone`
/// requests, since each attempt re-sends the request.
///
/// # Examples
///
/// ```
/// use scorable_core::ScorableError;
/// use scorable_retry::{RetryLayer, RetryManager};
/// use tower::ServiceBuilder;
///
/// # async fn example() {
/// let service = ServiceBuilder::new()
///     .layer(RetryLayer::new(RetryManager::default()))
///     .service(tower::service_fn(|judge_id: String| async move {
///         Ok::<_, ScorableError>(format!("judge {}", judge_id))
///     }));
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RetryLayer {
    manager: RetryManager,
}

impl RetryLayer {
    pub fn new(manager: RetryManager) -> Self {
        Self { manager }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = Retry<S>;

    fn layer(&self, service: S) -> Self::Service {
        Retry {
            inner: service,
            manager: self.manager.clone(),
        }
    }
}

/// Service produced by [`RetryLayer`].
#[derive(Clone, Debug)]
pub struct Retry<S> {
    inner: S,
    manager: RetryManager,
}

impl<S, Req> Service<Req> for Retry<S>
where
    S: Service<Req, Error = ScorableError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = ScorableError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let service = self.inner.clone();
        let manager = self.manager.clone();

        Box::pin(async move {
            manager
                .execute(move || {
                    let service = service.clone();
                    let req = req.clone();
                    async move { service.oneshot(req).await }
                })
                .await
        })
    }
}
