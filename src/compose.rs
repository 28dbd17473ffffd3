//! Right-to-left function composition.
//!
//! `compose(f, g)` and the variadic [`compose!`](crate::compose!) macro chain
//! functions whose types may change from stage to stage. [`Pipeline`] and
//! [`AsyncPipeline`] hold a runtime list of same-typed stages instead, so a
//! pipeline can be assembled from nested groups of stages and flattened once.
//! Every stage is a closure or function item, so a non-callable stage cannot
//! be constructed at all.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

pub fn identity<T>(value: T) -> T {
    value
}

/// Returns `x -> f(g(x))`.
pub fn compose<A, B, C>(f: impl Fn(B) -> C, g: impl Fn(A) -> B) -> impl Fn(A) -> C {
    move |value| f(g(value))
}

/// Composes any number of unary functions right-to-left.
///
/// `compose!(f, g, h)(x) == f(g(h(x)))`; `compose!()` is the identity.
#[macro_export]
macro_rules! compose {
    () => {
        $crate::compose::identity
    };
    ($f:expr $(,)?) => {
        $f
    };
    ($f:expr, $($rest:expr),+ $(,)?) => {
        $crate::compose::compose($f, $crate::compose!($($rest),+))
    };
}

/// Awaits `g(x)`, then awaits `f` on its output.
pub fn compose_async<A, B, C, F, G, FutF, FutG>(f: F, g: G) -> impl Fn(A) -> BoxFuture<'static, C>
where
    A: 'static,
    B: Send + 'static,
    C: 'static,
    F: Fn(B) -> FutF + Send + Sync + 'static,
    G: Fn(A) -> FutG + 'static,
    FutF: Future<Output = C> + Send + 'static,
    FutG: Future<Output = B> + Send + 'static,
{
    let f = Arc::new(f);
    move |value| {
        let pending = g(value);
        let f = Arc::clone(&f);
        Box::pin(async move { f(pending.await).await })
    }
}

type Step<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// A pipeline stage: a single function or a nested group of stages.
pub enum Stage<T> {
    Step(Step<T>),
    Nested(Vec<Stage<T>>),
}

impl<T> Stage<T> {
    pub fn step(f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        Stage::Step(Box::new(f))
    }

    pub fn nested(stages: impl IntoIterator<Item = Stage<T>>) -> Self {
        Stage::Nested(stages.into_iter().collect())
    }

    fn flatten_into(self, out: &mut Vec<Step<T>>) {
        match self {
            Stage::Step(step) => out.push(step),
            Stage::Nested(stages) => {
                for stage in stages {
                    stage.flatten_into(out);
                }
            }
        }
    }
}

/// Same-typed stages applied right-to-left.
pub struct Pipeline<T> {
    steps: Vec<Step<T>>,
}

impl<T> Pipeline<T> {
    /// Flattens nested groups, keeping the listed order.
    pub fn new(stages: impl IntoIterator<Item = Stage<T>>) -> Self {
        let mut steps = Vec::new();
        for stage in stages {
            stage.flatten_into(&mut steps);
        }
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply(&self, input: T) -> T {
        self.steps.iter().rev().fold(input, |current, step| step(current))
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

type AsyncStep<T> = Box<dyn Fn(T) -> BoxFuture<'static, T> + Send + Sync>;

/// Async counterpart of [`Pipeline`]; each stage is awaited before its
/// output is handed to the stage on its left.
pub struct AsyncPipeline<T> {
    steps: Vec<AsyncStep<T>>,
}

impl<T: Send + 'static> AsyncPipeline<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a stage. Stages run in reverse order of addition.
    pub fn stage<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.steps.push(Box::new(move |value| Box::pin(f(value))));
        self
    }

    /// Splices another pipeline's stages in at this position.
    pub fn nest(mut self, inner: AsyncPipeline<T>) -> Self {
        self.steps.extend(inner.steps);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn apply(&self, input: T) -> T {
        let mut current = input;
        for step in self.steps.iter().rev() {
            current = step(current).await;
        }
        current
    }
}

impl<T: Send + 'static> Default for AsyncPipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
