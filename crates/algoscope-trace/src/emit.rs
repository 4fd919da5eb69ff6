//! Suspension points and the materializer.
//!
//! A generator is ordinary Rust code that calls [`Emit::emit`] at each
//! semantic point of the algorithm. Recursive generators pass the same
//! `&mut impl Emit<K>` down to their children and receive the child's result
//! as a plain return value, so nested production stays in one globally
//! ordered stream.

use tracing::debug;

use crate::Step;

/// A fully materialized step log. Immutable once produced.
pub type StepLog<K> = Vec<Step<K>>;

/// Something a generator can yield steps into.
pub trait Emit<K> {
    /// Yield one step.
    fn emit(&mut self, step: Step<K>);
}

impl<K> Emit<K> for Vec<Step<K>> {
    fn emit(&mut self, step: Step<K>) {
        self.push(step);
    }
}

/// Streams steps into a closure instead of collecting them.
pub struct ForEach<F>(pub F);

impl<K, F: FnMut(Step<K>)> Emit<K> for ForEach<F> {
    fn emit(&mut self, step: Step<K>) {
        (self.0)(step);
    }
}

/// Collects every step of one generator invocation.
#[derive(Debug)]
pub struct Recorder<K> {
    name: &'static str,
    steps: Vec<Step<K>>,
}

impl<K> Recorder<K> {
    /// Create an empty recorder for the named algorithm.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Algorithm name this recorder was created for.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The most recent step.
    pub fn last(&self) -> Option<&Step<K>> {
        self.steps.last()
    }

    /// Hand over the finished log.
    pub fn finish(self) -> StepLog<K> {
        debug!(algorithm = self.name, steps = self.steps.len(), "materialized step log");
        self.steps
    }
}

impl<K> Emit<K> for Recorder<K> {
    fn emit(&mut self, step: Step<K>) {
        self.steps.push(step);
    }
}

/// Run a generator body to completion and return its materialized log.
pub fn record<K>(name: &'static str, produce: impl FnOnce(&mut Recorder<K>)) -> StepLog<K> {
    let mut recorder = Recorder::new(name);
    produce(&mut recorder);
    recorder.finish()
}

/// Like [`record`], but also returns the generator's result.
pub fn record_with<K, R>(
    name: &'static str,
    produce: impl FnOnce(&mut Recorder<K>) -> R,
) -> (StepLog<K>, R) {
    let mut recorder = Recorder::new(name);
    let result = produce(&mut recorder);
    (recorder.finish(), result)
}
