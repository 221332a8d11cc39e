//! Step sequences: a chain materialized into a strictly ordered list.
//!
//! Members are sorted by `order`, ties keeping insertion order, and every
//! `next` link that names a member is re-pointed at that member.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;

use crate::registry::CommandGraph;
use crate::types::{CommandAction, Step};

#[derive(Debug, Clone, Default)]
pub struct StepSequence {
    steps: Vec<Arc<Step>>,
}

impl StepSequence {
    pub fn builder() -> StepSequenceBuilder {
        StepSequenceBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<&Arc<Step>> {
        self.steps.first()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Step>> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Step>> {
        self.steps.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

#[derive(Default)]
pub struct StepSequenceBuilder {
    steps: Vec<Arc<Step>>,
}

impl StepSequenceBuilder {
    /// Add an already resolved step.
    pub fn step(mut self, step: Arc<Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Add a bare step whose order is its position in the builder (from 1).
    pub fn add(mut self, name: impl Into<String>, action: impl CommandAction + 'static) -> Self {
        let order = i32::try_from(self.steps.len() + 1).unwrap_or(i32::MAX);
        self.steps.push(Arc::new(Step {
            name: name.into(),
            action: Arc::new(action),
            auxiliary_data: None,
            next: None,
            prev: None,
            order,
        }));
        self
    }

    pub fn build(self) -> StepSequence {
        let mut seen = HashSet::new();
        let mut steps: Vec<(usize, Arc<Step>)> = Vec::with_capacity(self.steps.len());
        for (position, step) in self.steps.into_iter().enumerate() {
            if !seen.insert(step.name.clone()) {
                warn!(step = %step.name, "Step added twice; keeping the first");
                continue;
            }
            steps.push((position, step));
        }
        steps.sort_by_key(|(position, step)| (step.order, *position));

        let steps: Vec<Arc<Step>> = steps.into_iter().map(|(_, step)| step).collect();
        let index: HashMap<&str, usize> =
            steps.iter().enumerate().map(|(i, s)| (s.name.as_str(), i)).collect();

        let mut linker = Linker { steps: &steps, index: &index, linked: vec![None; steps.len()] };
        let linked = (0..steps.len())
            .map(|i| linker.link(i, &mut HashSet::new()))
            .collect();
        StepSequence { steps: linked }
    }
}

struct Linker<'a> {
    steps: &'a [Arc<Step>],
    index: &'a HashMap<&'a str, usize>,
    linked: Vec<Option<Arc<Step>>>,
}

impl Linker<'_> {
    /// Rebuild member `i` with its `next` pointing into the sequence.
    ///
    /// A link that closes a cycle keeps the step's original `next`.
    fn link(&mut self, i: usize, visiting: &mut HashSet<usize>) -> Arc<Step> {
        if let Some(done) = &self.linked[i] {
            return done.clone();
        }
        let steps = self.steps;
        let step = &steps[i];
        visiting.insert(i);
        let next = match step.next.as_ref() {
            Some(next) => match self.index.get(next.name.as_str()) {
                Some(&j) if !visiting.contains(&j) => Some(self.link(j, visiting)),
                _ => Some(next.clone()),
            },
            None => None,
        };
        visiting.remove(&i);

        let rebuilt = Arc::new(Step { next, ..Step::clone(step) });
        self.linked[i] = Some(rebuilt.clone());
        rebuilt
    }
}

impl CommandGraph {
    /// The chain starting at `name`, ordered by `order`.
    pub fn sequence(&self, name: &str) -> Option<StepSequence> {
        let mut builder = StepSequence::builder();
        let mut cursor = Some(self.step(name)?.clone());
        while let Some(step) = cursor {
            cursor = step.next.clone();
            builder = builder.step(step);
        }
        Some(builder.build())
    }
}
