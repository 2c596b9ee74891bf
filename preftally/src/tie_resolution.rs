// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.


//! Breaking ties between candidates with equal tallies. Strategies are
//! tried in a configured chain; each either picks a single candidate or
//! narrows the tied set for the next strategy.

use crate::ballot_metadata::CandidateIndex;
use crate::election_result::{ElectionRound, SelectionMethod};
use crate::random_util::Randomness;

/// What a single strategy made of a tie.
#[derive(Clone,Debug,Eq,PartialEq)]
pub enum TiebreakResolution {
    Winner(CandidateIndex),
    /// Could not single one out; the (possibly smaller) set to hand to the
    /// next strategy in the chain.
    Narrowed(Vec<CandidateIndex>),
}

pub enum Tiebreaker {
    History,
    Random(TiebreakRandom),
}

impl Tiebreaker {
    pub fn method(&self) -> SelectionMethod {
        match self {
            Tiebreaker::History => SelectionMethod::TiebreakHistory,
            Tiebreaker::Random(_) => SelectionMethod::TiebreakRandom,
        }
    }

    /// `lowest` is true when breaking a least-votes tie (an exclusion).
    pub fn resolve(&mut self,tied:&[CandidateIndex],rounds:&[ElectionRound],lowest:bool) -> TiebreakResolution {
        match self {
            Tiebreaker::History => resolve_by_history(tied,rounds,lowest),
            Tiebreaker::Random(random) => random.resolve(tied,lowest),
        }
    }
}

/// Walk prior rounds newest to oldest. In each, restrict to the tied
/// candidates and take the extreme tally; a unique extreme settles the tie,
/// a shared one narrows the set and the walk continues.
fn resolve_by_history(tied:&[CandidateIndex],rounds:&[ElectionRound],lowest:bool) -> TiebreakResolution {
    let mut tied : Vec<CandidateIndex> = tied.to_vec();
    for round in rounds.iter().rev() {
        let entries : Vec<_> = tied.iter().filter_map(|&c|round.votes.get(&c).map(|&v|(c,v))).collect();
        if entries.is_empty() { continue; }
        let extreme = if lowest { entries.iter().map(|e|e.1).min() } else { entries.iter().map(|e|e.1).max() }.unwrap();
        let narrowed : Vec<CandidateIndex> = entries.iter().filter(|e|e.1==extreme).map(|e|e.0).collect();
        if narrowed.len()==1 {
            return TiebreakResolution::Winner(narrowed[0]);
        }
        tied=narrowed;
    }
    TiebreakResolution::Narrowed(tied)
}

/// Resolves by a single random permutation of *all* candidates, drawn once
/// at poll construction. Every tie consults the same permutation, and the
/// finished result reports it.
pub struct TiebreakRandom {
    shuffled : Vec<CandidateIndex>,
    used : bool,
}

impl TiebreakRandom {
    pub fn new(num_candidates:usize,randomness:&mut Randomness) -> Self {
        let mut shuffled : Vec<CandidateIndex> = (0..num_candidates).map(CandidateIndex).collect();
        randomness.shuffle(&mut shuffled);
        TiebreakRandom{shuffled,used:false}
    }

    /// true once this strategy has decided anything; the report then
    /// includes the permutation.
    pub fn used(&self) -> bool { self.used }
    pub fn order(&self) -> &[CandidateIndex] { &self.shuffled }

    fn resolve(&mut self,tied:&[CandidateIndex],lowest:bool) -> TiebreakResolution {
        self.used=true;
        let winner = if lowest {
            self.shuffled.iter().rev().find(|c|tied.contains(c))
        } else {
            self.shuffled.iter().find(|c|tied.contains(c))
        };
        // always succeeds: the permutation covers every candidate.
        TiebreakResolution::Winner(*winner.expect("tied candidate not in permutation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::election_result::{CandidateStatus};
    use crate::fixed_precision_decimal::VoteCount;

    fn round_with(votes:&[(usize,usize)]) -> ElectionRound {
        let votes : BTreeMap<CandidateIndex,VoteCount> = votes.iter().map(|&(c,v)|(CandidateIndex(c),VoteCount::from(v))).collect();
        ElectionRound{status:CandidateStatus::Excluded,method:SelectionMethod::Direct,selected:vec![],votes}
    }

    #[test]
    fn test_history_still_tied() {
        let rounds = vec![round_with(&[(2,1),(3,1)])];
        let tied = vec![CandidateIndex(2),CandidateIndex(3)];
        assert_eq!(TiebreakResolution::Narrowed(tied.clone()),resolve_by_history(&tied,&rounds,false));
    }

    #[test]
    fn test_history_highest_and_lowest() {
        let rounds = vec![round_with(&[(2,2),(3,1)])];
        let tied = vec![CandidateIndex(2),CandidateIndex(3)];
        assert_eq!(TiebreakResolution::Winner(CandidateIndex(2)),resolve_by_history(&tied,&rounds,false));
        assert_eq!(TiebreakResolution::Winner(CandidateIndex(3)),resolve_by_history(&tied,&rounds,true));
    }

    #[test]
    fn test_history_walks_back_through_rounds() {
        // newest two rounds are tied, the oldest discriminates.
        let rounds = vec![
            round_with(&[(2,2),(3,1)]),
            round_with(&[(2,3),(3,3)]),
            round_with(&[(2,4),(3,4)]),
        ];
        let tied = vec![CandidateIndex(2),CandidateIndex(3)];
        assert_eq!(TiebreakResolution::Winner(CandidateIndex(2)),resolve_by_history(&tied,&rounds,false));
    }

    #[test]
    fn test_history_narrows_before_older_round() {
        // three-way tie: the newest round splits off candidate 4, the older
        // round separates the remaining pair.
        let rounds = vec![
            round_with(&[(2,7),(3,8),(4,7)]),
            round_with(&[(2,5),(3,6),(4,6)]),
        ];
        let tied = vec![CandidateIndex(2),CandidateIndex(3),CandidateIndex(4)];
        assert_eq!(TiebreakResolution::Winner(CandidateIndex(3)),resolve_by_history(&tied,&rounds,false));
    }

    #[test]
    fn test_random_is_terminal_and_marks_use() {
        let mut randomness = Randomness::seeded(42);
        let mut strategy = TiebreakRandom::new(5,&mut randomness);
        assert!(!strategy.used());
        let tied = vec![CandidateIndex(1),CandidateIndex(3)];
        let highest = strategy.resolve(&tied,false);
        let lowest = strategy.resolve(&tied,true);
        assert!(strategy.used());
        // the two ends of the permutation differ for a two-way tie.
        match (highest,lowest) {
            (TiebreakResolution::Winner(h),TiebreakResolution::Winner(l)) => assert_ne!(h,l),
            other => panic!("unexpected resolutions {:?}",other),
        }
    }

    #[test]
    fn test_random_reproducible_under_seed() {
        let order1 = TiebreakRandom::new(8,&mut Randomness::seeded(7)).shuffled;
        let order2 = TiebreakRandom::new(8,&mut Randomness::seeded(7)).shuffled;
        assert_eq!(order1,order2);
    }
}
