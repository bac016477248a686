use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{CheckpointSet, EngineId, QueryUnit};

/// Shuffled units, consumed front to back exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkQueue {
    units: VecDeque<QueryUnit>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop_front(&mut self) -> Option<QueryUnit> {
        self.units.pop_front()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryUnit> {
        self.units.iter()
    }
}

impl From<Vec<QueryUnit>> for WorkQueue {
    fn from(units: Vec<QueryUnit>) -> Self {
        Self {
            units: units.into(),
        }
    }
}

/// Trims lines and drops the blank ones.
pub fn parse_queries(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Builds the work queue from per-engine query file contents.
///
/// Queries already in `completed` are skipped whatever engine completed them.
/// The result is one uniform permutation across every engine.
pub fn build_queue<'a, I, R>(sources: I, completed: &CheckpointSet, rng: &mut R) -> WorkQueue
where
    I: IntoIterator<Item = (EngineId, &'a str)>,
    R: Rng + ?Sized,
{
    let mut units: Vec<QueryUnit> = sources
        .into_iter()
        .flat_map(|(engine, text)| {
            parse_queries(text)
                .filter(|query| !completed.contains(query))
                .map(move |query| QueryUnit::new(engine.clone(), query))
                .collect::<Vec<_>>()
        })
        .collect();
    units.shuffle(rng);
    WorkQueue::from(units)
}
