// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.


//! Moving the votes of candidates leaving the count to the next standing
//! preference on each ballot. The two orderings are both valid STV
//! readings and give different fractional results; which one a poll uses
//! is part of its configuration.

use std::collections::{BTreeMap, BTreeSet};
use num::Zero;
use crate::ballot_metadata::CandidateIndex;
use crate::ballot_paper::PreferenceBallot;
use crate::fixed_precision_decimal::VoteCount;
use crate::transfer_value::TransferValue;

/// What a transfer operation produced: an audit ledger of value moved per
/// (from, to) pair, the value that could not move anywhere, and the rebuilt
/// tally. The tally covers exactly the candidates still standing — entries
/// for departed candidates are dropped, not zeroed.
pub struct TransferOutcome {
    pub transfers : BTreeMap<(CandidateIndex,CandidateIndex),VoteCount>,
    pub exhausted : VoteCount,
    pub votes : BTreeMap<CandidateIndex,VoteCount>,
}

#[derive(Copy,Clone,Debug,Eq,PartialEq)]
pub enum TransferStrategy {
    /// Every transfer value comes from the pre-transfer snapshot, and only
    /// standing candidates may receive value.
    AllAtOnce,
    /// Leaving candidates are processed one at a time. A candidate later in
    /// the list may receive value from an earlier one, and its own transfer
    /// value is then computed from its increased tally.
    Serial,
}

impl TransferStrategy {
    /// Move the votes of `transfers` onward. `decrease_value` is set when
    /// the candidates were elected, in which case only the surplus fraction
    /// `(votes - quota) / votes` travels; excluded candidates transfer in
    /// full.
    pub fn transfer(self,
                    ballots:&mut [PreferenceBallot],
                    vote_count:&BTreeMap<CandidateIndex,VoteCount>,
                    transfers:&[CandidateIndex],
                    standing:&BTreeSet<CandidateIndex>,
                    quota:usize,
                    decrease_value:bool) -> TransferOutcome {
        match self {
            TransferStrategy::AllAtOnce => transfer_all(ballots,vote_count,transfers,standing,quota,decrease_value),
            TransferStrategy::Serial => transfer_serial(ballots,vote_count,transfers,standing,quota,decrease_value),
        }
    }
}

fn surplus_fraction(votes:VoteCount,quota:VoteCount) -> TransferValue {
    let surplus = if votes>quota { votes-quota } else { VoteCount::zero() };
    TransferValue::from_surplus(surplus,votes)
}

fn transfer_all(ballots:&mut [PreferenceBallot],
                vote_count:&BTreeMap<CandidateIndex,VoteCount>,
                transfers:&[CandidateIndex],
                standing:&BTreeSet<CandidateIndex>,
                quota:usize,
                decrease_value:bool) -> TransferOutcome {
    let quota = VoteCount::from(quota);
    let mut ledger : BTreeMap<(CandidateIndex,CandidateIndex),VoteCount> = BTreeMap::new();
    let mut exhausted = VoteCount::zero();
    let mut votes : BTreeMap<CandidateIndex,VoteCount> =
        standing.iter().map(|&c|(c,vote_count.get(&c).copied().unwrap_or_else(VoteCount::zero))).collect();
    for &candidate in transfers {
        let transfer_value = if decrease_value {
            surplus_fraction(vote_count.get(&candidate).copied().unwrap_or_else(VoteCount::zero),quota)
        } else { TransferValue::one() };
        for ballot in ballots.iter_mut().filter(|b|b.current_preference()==Some(candidate)) {
            if decrease_value { ballot.decrease_value(&transfer_value); }
            match ballot.advance(standing) {
                Some(target) => {
                    *votes.entry(target).or_insert_with(VoteCount::zero)+=ballot.value();
                    *ledger.entry((candidate,target)).or_insert_with(VoteCount::zero)+=ballot.value();
                }
                None => { exhausted+=ballot.value(); }
            }
        }
    }
    TransferOutcome{transfers:ledger,exhausted,votes}
}

fn transfer_serial(ballots:&mut [PreferenceBallot],
                   vote_count:&BTreeMap<CandidateIndex,VoteCount>,
                   transfers:&[CandidateIndex],
                   standing:&BTreeSet<CandidateIndex>,
                   quota:usize,
                   decrease_value:bool) -> TransferOutcome {
    let quota = VoteCount::from(quota);
    let mut ledger : BTreeMap<(CandidateIndex,CandidateIndex),VoteCount> = BTreeMap::new();
    let mut exhausted = VoteCount::zero();
    // working tally over standing candidates plus those still to transfer.
    let mut votes : BTreeMap<CandidateIndex,VoteCount> =
        standing.iter().chain(transfers.iter()).map(|&c|(c,vote_count.get(&c).copied().unwrap_or_else(VoteCount::zero))).collect();
    for (done,&candidate) in transfers.iter().enumerate() {
        let mut allowed : BTreeSet<CandidateIndex> = standing.clone();
        allowed.extend(transfers[done+1..].iter().copied());
        let transfer_value = if decrease_value {
            surplus_fraction(votes[&candidate],quota)
        } else { TransferValue::one() };
        for ballot in ballots.iter_mut().filter(|b|b.current_preference()==Some(candidate)) {
            if decrease_value { ballot.decrease_value(&transfer_value); }
            match ballot.advance(&allowed) {
                Some(target) => {
                    *votes.entry(target).or_insert_with(VoteCount::zero)+=ballot.value();
                    *ledger.entry((candidate,target)).or_insert_with(VoteCount::zero)+=ballot.value();
                }
                None => { exhausted+=ballot.value(); }
            }
        }
        votes.remove(&candidate);
    }
    TransferOutcome{transfers:ledger,exhausted,votes}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(i:usize) -> CandidateIndex { CandidateIndex(i) }
    fn v(s:&str) -> VoteCount { s.parse().unwrap() }

    fn example_ballots() -> Vec<PreferenceBallot> {
        vec![
            PreferenceBallot::new(vec![c(1),c(2),c(3)],4),
            PreferenceBallot::new(vec![c(2),c(3)],2),
            PreferenceBallot::new(vec![c(3)],1),
            PreferenceBallot::new(vec![c(1)],1),
        ]
    }

    fn example_votes() -> BTreeMap<CandidateIndex,VoteCount> {
        [(c(1),v("5")),(c(2),v("2")),(c(3),v("1"))].into_iter().collect()
    }

    #[test]
    fn test_transfer_all() {
        let mut ballots = example_ballots();
        let standing : BTreeSet<CandidateIndex> = [c(3)].into_iter().collect();
        let outcome = TransferStrategy::AllAtOnce.transfer(&mut ballots,&example_votes(),&[c(1),c(2)],&standing,2,true);
        // transfer value for candidate 1 is (5-2)/5 = 0.6, applied to 4 papers.
        let expected_ledger : BTreeMap<_,_> = [((c(1),c(3)),v("2.4")),((c(2),c(3)),v("0"))].into_iter().collect();
        assert_eq!(expected_ledger,outcome.transfers);
        assert_eq!(v("0.6"),outcome.exhausted);
        let expected_votes : BTreeMap<_,_> = [(c(3),v("3.4"))].into_iter().collect();
        assert_eq!(expected_votes,outcome.votes);
        assert_eq!(v("0.6"),ballots[0].multiplier());
        assert_eq!(v("0"),ballots[1].multiplier());
    }

    #[test]
    fn test_transfer_serial() {
        let mut ballots = example_ballots();
        let standing : BTreeSet<CandidateIndex> = [c(3)].into_iter().collect();
        let outcome = TransferStrategy::Serial.transfer(&mut ballots,&example_votes(),&[c(1),c(2)],&standing,2,true);
        assert_eq!(v("0.6"),outcome.exhausted);
        // candidate 2 picks up 2.4 from candidate 1, so its own transfer
        // value is (4.4-2)/4.4 and its outgoing value reflects both.
        let expected_ledger : BTreeMap<_,_> = [((c(1),c(2)),v("2.4")),((c(2),c(3)),v("2.39998"))].into_iter().collect();
        assert_eq!(expected_ledger,outcome.transfers);
        assert_eq!(v("0.54545"),ballots[1].multiplier());
        assert_eq!(v("0.32727"),ballots[0].multiplier());
        let expected_votes : BTreeMap<_,_> = [(c(3),v("3.39998"))].into_iter().collect();
        assert_eq!(expected_votes,outcome.votes);
    }

    #[test]
    fn test_exclusion_transfers_full_value() {
        let mut ballots = vec![
            PreferenceBallot::new(vec![c(0),c(1)],3),
            PreferenceBallot::new(vec![c(0)],2),
        ];
        let votes : BTreeMap<_,_> = [(c(0),v("5")),(c(1),v("7"))].into_iter().collect();
        let standing : BTreeSet<CandidateIndex> = [c(1)].into_iter().collect();
        let outcome = TransferStrategy::Serial.transfer(&mut ballots,&votes,&[c(0)],&standing,6,false);
        let expected_ledger : BTreeMap<_,_> = [((c(0),c(1)),v("3"))].into_iter().collect();
        assert_eq!(expected_ledger,outcome.transfers);
        assert_eq!(v("2"),outcome.exhausted);
        let expected_votes : BTreeMap<_,_> = [(c(1),v("10"))].into_iter().collect();
        assert_eq!(expected_votes,outcome.votes);
        // full-value transfers leave the multiplier alone.
        assert_eq!(v("1"),ballots[0].multiplier());
    }
}
