//! Open voting: one ballot per voter, highest count is eliminated

use crate::resolution::Resolver;
use crate::rng::choose;
use log::info;
use shared::EliminationCause;
use std::collections::BTreeMap;

/// Ballots cast during the current voting phase
#[derive(Debug, Default)]
pub struct VoteTally {
    /// voter id -> target id
    ballots: BTreeMap<u32, u32>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a ballot. A repeat vote replaces the voter's earlier one.
    pub fn cast(&mut self, voter: u32, target: u32) -> Option<u32> {
        self.ballots.insert(voter, target)
    }

    /// target id -> number of votes
    pub fn counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for target in self.ballots.values() {
            *counts.entry(*target).or_insert(0) += 1;
        }
        counts
    }

    /// Every target sharing the highest count, in id order
    pub fn leaders(&self) -> Vec<u32> {
        let counts = self.counts();
        let Some(top) = counts.values().max().copied() else {
            return Vec::new();
        };
        counts
            .into_iter()
            .filter(|(_, count)| *count == top)
            .map(|(target, _)| target)
            .collect()
    }

    pub fn reset(&mut self) {
        self.ballots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }

    /// Eliminates the most-voted session, breaking ties at random, and
    /// empties the tally. Returns the eliminated id.
    pub fn resolve(&mut self, resolver: &mut Resolver<'_>) -> Option<u32> {
        let leaders = self.leaders();
        self.reset();

        let chosen = *choose(resolver.rng, &leaders)?;
        let name = resolver.registry.get(chosen)?.name.clone();
        info!("Vote settled on session {}", chosen);

        resolver
            .eliminate(
                chosen,
                EliminationCause::Vote,
                format!("Player {} eliminated by vote.", name),
            )
            .then_some(chosen)
    }
}
