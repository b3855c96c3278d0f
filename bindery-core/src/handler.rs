// Bound handler dispatch
//
// `Adapter::bind` turns any supported async function into a `BindHandler`:
// the binding plan is inspected once at registration, and each call runs
// materialize and invoke inside the adapter's funnel, which commits exactly
// one response.
//
// As with the `Handler` trait, invocation stays monomorphized per target;
// `BoxedHandler` erases the type for storage in the router.

use crate::binder::{Binder, DefaultBinder};
use crate::config::AdapterConfig;
use crate::context::{Context, RequestContext};
use crate::envelope::Envelope;
use crate::funnel::{Call, EnvelopeFunnel, Funnel};
use crate::http::{HttpRequest, HttpResponse};
use crate::invoke::invoke;
use crate::materialize::{materialize, FromPlan};
use crate::param::CallScope;
use crate::plan::{inspect, BindingPlan};
use crate::target::Signature;
use crate::Error;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// A handler that answers HTTP requests.
pub trait Handler: Clone + Send + Sync + 'static {
    /// The future returned by `call`.
    type Future: Future<Output = HttpResponse> + Send + 'static;

    /// Handle a request. Always produces a response.
    fn call(&self, req: HttpRequest) -> Self::Future;
}

/// Builds bound handlers sharing one funnel, binder and configuration.
///
/// ```rust,ignore
/// let adapter = Adapter::new(AdapterConfig::from_env()?)
///     .with_binder(MyBinder);
/// let handler = adapter.bind(create_user)?;
/// ```
#[derive(Clone)]
pub struct Adapter {
    funnel: Arc<dyn Funnel>,
    binder: Arc<dyn Binder>,
    config: Arc<AdapterConfig>,
}

impl Adapter {
    /// Adapter with the default envelope funnel and binder.
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            funnel: Arc::new(EnvelopeFunnel::new(config.clone())),
            binder: Arc::new(DefaultBinder),
            config: Arc::new(config),
        }
    }

    /// Replace the failure funnel.
    pub fn with_funnel(mut self, funnel: impl Funnel) -> Self {
        self.funnel = Arc::new(funnel);
        self
    }

    /// Replace the payload binder.
    pub fn with_binder(mut self, binder: impl Binder) -> Self {
        self.binder = Arc::new(binder);
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Inspect `target` and wrap it into a handler.
    ///
    /// Fails with [`Error::InvalidTarget`] for unsupported parameter shapes.
    pub fn bind<F, Args>(&self, target: F) -> Result<BindHandler<F, Args>, Error>
    where
        F: Signature<Args>,
        Args: FromPlan,
    {
        let plan = inspect(&target)?;
        tracing::debug!(
            target: "bindery::adapter",
            handler = std::any::type_name::<F>(),
            parameters = plan.len(),
            "Bound handler"
        );
        Ok(BindHandler {
            target,
            plan: Arc::new(plan),
            funnel: self.funnel.clone(),
            binder: self.binder.clone(),
            config: self.config.clone(),
            _marker: PhantomData,
        })
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new(AdapterConfig::default())
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Bind `target` with the default adapter.
pub fn bind<F, Args>(target: F) -> Result<BindHandler<F, Args>, Error>
where
    F: Signature<Args>,
    Args: FromPlan,
{
    Adapter::default().bind(target)
}

/// A target function bound to its binding plan.
pub struct BindHandler<F, Args> {
    target: F,
    plan: Arc<BindingPlan>,
    funnel: Arc<dyn Funnel>,
    binder: Arc<dyn Binder>,
    config: Arc<AdapterConfig>,
    _marker: PhantomData<fn(Args)>,
}

impl<F: Clone, Args> Clone for BindHandler<F, Args> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            plan: self.plan.clone(),
            funnel: self.funnel.clone(),
            binder: self.binder.clone(),
            config: self.config.clone(),
            _marker: PhantomData,
        }
    }
}

impl<F, Args> BindHandler<F, Args>
where
    F: Signature<Args>,
    Args: FromPlan,
{
    pub fn plan(&self) -> &BindingPlan {
        &self.plan
    }

    /// Handle `request` with a caller-supplied ambient context.
    pub fn call_with_context(
        &self,
        context: Context,
        request: HttpRequest,
    ) -> BoxFuture<'static, HttpResponse> {
        let handle = RequestContext::new(request);
        let scope = CallScope::new(context, handle.clone(), self.binder.clone());
        let plan = self.plan.clone();
        let target = self.target.clone();

        let call: Call = Box::pin(async move {
            let args: Args = materialize(&plan, &scope)?;
            invoke(&target, args).await
        });

        let run = self.funnel.run(handle.clone(), call);
        let config = self.config.clone();
        Box::pin(async move {
            run.await;
            handle.take_committed().unwrap_or_else(|| {
                tracing::error!(
                    target: "bindery::adapter",
                    method = handle.method(),
                    path = handle.path(),
                    "Funnel committed no response"
                );
                Envelope::from(Error::Internal("no response was committed".into()))
                    .render(&config)
            })
        })
    }
}

impl<F, Args> Handler for BindHandler<F, Args>
where
    F: Signature<Args>,
    Args: FromPlan,
{
    type Future = BoxFuture<'static, HttpResponse>;

    fn call(&self, req: HttpRequest) -> Self::Future {
        self.call_with_context(Context::new(), req)
    }
}

impl<F, Args> std::fmt::Debug for BindHandler<F, Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindHandler")
            .field("target", &std::any::type_name::<F>())
            .field("plan", &self.plan)
            .finish()
    }
}

/// Type-erased handler for storing in collections.
pub struct BoxedHandler {
    inner: Arc<dyn ErasedHandler>,
}

impl BoxedHandler {
    pub fn new<H: Handler>(handler: H) -> Self {
        Self {
            inner: Arc::new(HandlerWrapper { handler }),
        }
    }

    #[inline(always)]
    pub fn call(&self, req: HttpRequest) -> BoxFuture<'static, HttpResponse> {
        self.inner.call(req)
    }
}

impl Clone for BoxedHandler {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedHandler").finish_non_exhaustive()
    }
}

trait ErasedHandler: Send + Sync {
    fn call(&self, req: HttpRequest) -> BoxFuture<'static, HttpResponse>;
}

struct HandlerWrapper<H: Handler> {
    handler: H,
}

impl<H: Handler> ErasedHandler for HandlerWrapper<H> {
    #[inline(always)]
    fn call(&self, req: HttpRequest) -> BoxFuture<'static, HttpResponse> {
        Box::pin(self.handler.call(req))
    }
}
