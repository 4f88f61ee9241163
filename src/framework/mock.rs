//! # Mock Initializers & Testing Guide
//!
//! [`MockInitializer`] is an [`Initializer`] whose outcomes are scripted in
//! advance. It lets tests drive the batch driver through successes, failures,
//! slow starts and panics without writing a closure for each case, and it
//! verifies afterwards that every scripted call happened.
//!
//! ## When to use Mocks vs Closures
//!
//! | Need | MockInitializer | Closure initializer |
//! |------|-----------------|---------------------|
//! | **Failure injection** | `return_err`, `panic` | hand-written |
//! | **Call counting** | built in (`calls`, `verify`) | needs a shared counter |
//! | **Reads other resources** | no | yes, capture a `ResourceManager` |
//!
//! ## Example
//!
//! ```rust
//! use resource_lifecycle::framework::mock::MockInitializer;
//! use resource_lifecycle::framework::{Registration, RegistryActor};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, manager) = RegistryActor::new(16);
//!     tokio::spawn(actor.run());
//!
//!     let config = MockInitializer::new();
//!     config.expect_call().return_value(42_u32);
//!     let broken = MockInitializer::new();
//!     broken.expect_call().return_err("upstream unavailable");
//!
//!     manager.queue_registration(Registration::new("config").initializer_from(config.clone()));
//!     manager.queue_registration(Registration::new("broken").initializer_from(broken.clone()));
//!
//!     let report = manager.initialize_all().await.unwrap().unwrap();
//!     assert_eq!(report.failed, vec!["broken"]);
//!     assert_eq!(*manager.get::<u32>("config", Duration::ZERO).await.unwrap(), 42);
//!
//!     config.verify();
//!     broken.verify();
//! }
//! ```

use crate::framework::error::InitError;
use crate::framework::resource::{resource_value, InitResult, Initializer, ResourceValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Outcome {
    Ok(Option<ResourceValue>),
    Err(String),
    Panic(String),
}

struct Expectation {
    delay: Option<Duration>,
    outcome: Outcome,
}

/// A scripted initializer. Clones share the same script and call counter.
#[derive(Clone, Default)]
pub struct MockInitializer {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<AtomicUsize>,
}

impl MockInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects one more call to `initialize`.
    pub fn expect_call(&self) -> CallExpectationBuilder {
        CallExpectationBuilder {
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Number of times the initializer has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl Initializer for MockInitializer {
    async fn initialize(&self) -> InitResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected initializer call");
        };

        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        match expectation.outcome {
            Outcome::Ok(value) => Ok(value),
            Outcome::Err(msg) => Err(InitError::Failed(msg)),
            Outcome::Panic(msg) => panic!("{}", msg),
        }
    }
}

/// Builder for one scripted call.
pub struct CallExpectationBuilder {
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl CallExpectationBuilder {
    /// Sleeps for `delay` before producing the outcome.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Succeeds with `value` (or with no value).
    pub fn return_ok(self, value: Option<ResourceValue>) {
        self.push(Outcome::Ok(value));
    }

    pub fn return_value<T: Any + Send + Sync>(self, value: T) {
        self.push(Outcome::Ok(Some(resource_value(value))));
    }

    pub fn return_err(self, msg: impl Into<String>) {
        self.push(Outcome::Err(msg.into()));
    }

    pub fn panic(self, msg: impl Into<String>) {
        self.push(Outcome::Panic(msg.into()));
    }

    fn push(self, outcome: Outcome) {
        self.expectations.lock().unwrap().push_back(Expectation {
            delay: self.delay,
            outcome,
        });
    }
}
