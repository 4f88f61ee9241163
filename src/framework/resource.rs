//! # Resources & Registrations
//!
//! This module defines what producers hand to the orchestrator: a name, the
//! names it depends on, an optional [`Initializer`] and an optional value.
//!
//! The orchestrator never looks inside a value. Values are stored as
//! [`ResourceValue`] (`Arc<dyn Any + Send + Sync>`) and downcast by consumers
//! at lookup time.

use crate::framework::error::InitError;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Type-erased, shareable resource value.
pub type ResourceValue = Arc<dyn Any + Send + Sync>;

/// What an initializer produces: a value for its own name, or nothing when it
/// only publishes values through [`ResourceManager::set`](crate::framework::ResourceManager::set).
pub type InitResult = Result<Option<ResourceValue>, InitError>;

/// Wraps any value into a [`ResourceValue`].
pub fn resource_value<T: Any + Send + Sync>(value: T) -> ResourceValue {
    Arc::new(value)
}

/// A zero-argument, possibly suspending procedure that produces a resource.
///
/// Any `Fn() -> impl Future<Output = InitResult>` closure is an initializer,
/// so producers usually write:
///
/// ```rust
/// use resource_lifecycle::framework::{resource_value, Registration};
///
/// let registration = Registration::new("config")
///     .initializer(|| async { Ok(Some(resource_value(42_u32))) });
/// assert_eq!(registration.name(), "config");
/// ```
#[async_trait]
pub trait Initializer: Send + Sync + 'static {
    async fn initialize(&self) -> InitResult;
}

#[async_trait]
impl<F, Fut> Initializer for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = InitResult> + Send + 'static,
{
    async fn initialize(&self) -> InitResult {
        (self)().await
    }
}

/// Adapter for initializers that never suspend.
pub struct SyncInitializer<F>(pub F);

#[async_trait]
impl<F> Initializer for SyncInitializer<F>
where
    F: Fn() -> InitResult + Send + Sync + 'static,
{
    async fn initialize(&self) -> InitResult {
        (self.0)()
    }
}

/// A queued declaration of a resource.
///
/// Built fluently and handed to
/// [`ResourceManager::queue_registration`](crate::framework::ResourceManager::queue_registration).
#[derive(Clone)]
pub struct Registration {
    pub(crate) name: String,
    pub(crate) dependencies: Vec<String>,
    pub(crate) initializer: Option<Arc<dyn Initializer>>,
    pub(crate) value: Option<ResourceValue>,
}

impl Registration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            initializer: None,
            value: None,
        }
    }

    /// Declares the resources that must be initialized before this one.
    /// Duplicates are ignored.
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dependency in dependencies {
            let dependency = dependency.into();
            if !self.dependencies.contains(&dependency) {
                self.dependencies.push(dependency);
            }
        }
        self
    }

    /// Sets an async closure as the initializer.
    pub fn initializer<F, Fut>(self, initializer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InitResult> + Send + 'static,
    {
        self.initializer_from(initializer)
    }

    pub fn sync_initializer<F>(self, initializer: F) -> Self
    where
        F: Fn() -> InitResult + Send + Sync + 'static,
    {
        self.initializer_from(SyncInitializer(initializer))
    }

    /// Sets any [`Initializer`] implementation, e.g. a
    /// [`MockInitializer`](crate::framework::mock::MockInitializer).
    pub fn initializer_from(mut self, initializer: impl Initializer) -> Self {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    /// Supplies a value up front. The resource is ready as soon as it is committed.
    pub fn value<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.value = Some(resource_value(value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn has_initializer(&self) -> bool {
        self.initializer.is_some()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("initializer", &self.initializer.is_some())
            .field("value", &self.value.is_some())
            .finish()
    }
}
