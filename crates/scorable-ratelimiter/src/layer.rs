use crate::RateLimiter;
use futures::future::BoxFuture;
use scorable_core::ScorableError;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// A Tower [`Layer`] that gates a service behind a [`RateLimiter`].
///
/// Services built from one layer share the layer's limiter, and so share
/// its window with any other holder of a clone.
///
/// # Examples
///
/// ```
/// use scorable_core::ScorableError;
/// use scorable_ratelimiter::{RateLimiter, RateLimiterLayer};
/// use tower::ServiceBuilder;
///
/// # async fn example() {
/// let limiter = RateLimiter::default();
///
/// let service = ServiceBuilder::new()
///     .layer(RateLimiterLayer::new(limiter.clone()))
///     .service(tower::service_fn(|evaluator_id: String| async move {
///         Ok::<_, ScorableError>(evaluator_id)
///     }));
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RateLimiterLayer {
    limiter: RateLimiter,
}

impl RateLimiterLayer {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimit<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimit {
            inner: service,
            limiter: self.limiter.clone(),
        }
    }
}

/// Service produced by [`RateLimiterLayer`].
#[derive(Clone, Debug)]
pub struct RateLimit<S> {
    inner: S,
    limiter: RateLimiter,
}

impl<S, Req> Service<Req> for RateLimit<S>
where
    S: Service<Req, Error = ScorableError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    Req: Send + 'static,
{
    type Response = S::Response;
    type Error = ScorableError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let limiter = self.limiter.clone();
        let service = self.inner.clone();

        Box::pin(async move {
            limiter.acquire().await?;
            service.oneshot(req).await
        })
    }
}
