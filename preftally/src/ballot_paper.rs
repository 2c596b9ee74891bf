// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.


//! A weighted ranked ballot, part way through being distributed.

use std::collections::BTreeSet;
use crate::ballot_metadata::CandidateIndex;
use crate::fixed_precision_decimal::VoteCount;
use crate::transfer_value::TransferValue;

/// A group of identical ballot papers: a preference ranking (most favoured
/// candidate first), the number of voters who cast exactly that ranking,
/// and the fraction of a whole vote each paper is still worth.
///
/// `upto` marks the preference currently holding the ballot. It only ever
/// moves forward, and the multiplier only ever shrinks.
#[derive(Clone,Debug)]
pub struct PreferenceBallot {
    prefs : Vec<CandidateIndex>,
    count : usize,
    multiplier : VoteCount,
    upto : usize,
}

impl PreferenceBallot {
    pub fn new(prefs:Vec<CandidateIndex>,count:usize) -> Self {
        PreferenceBallot{prefs,count,multiplier:VoteCount::one(),upto:0}
    }

    pub fn count(&self) -> usize { self.count }
    pub fn multiplier(&self) -> VoteCount { self.multiplier }

    /// multiplier times the number of papers.
    pub fn value(&self) -> VoteCount { self.multiplier*self.count }

    /// The preference currently holding this ballot, if any.
    pub fn current_preference(&self) -> Option<CandidateIndex> {
        self.prefs.get(self.upto).copied()
    }

    pub fn exhausted(&self) -> bool { self.upto>=self.prefs.len() }

    /// Shrink each paper's worth by the given surplus fraction, rounding to
    /// the fixed precision.
    pub fn decrease_value(&mut self,transfer_value:&TransferValue) {
        self.multiplier = transfer_value.times_rounded(self.multiplier);
    }

    /// Move forward to the next preference in `allowed`, returning it. If
    /// there is none the ballot becomes exhausted.
    pub fn advance(&mut self,allowed:&BTreeSet<CandidateIndex>) -> Option<CandidateIndex> {
        for i in self.upto+1 .. self.prefs.len() {
            if allowed.contains(&self.prefs[i]) {
                self.upto=i;
                return Some(self.prefs[i]);
            }
        }
        self.upto=self.prefs.len();
        None
    }

    /// The first preference at or after the cursor that is in `allowed`,
    /// without moving the cursor. Used by duel simulations, which tally by
    /// repeated inspection rather than by advancing ballots.
    pub fn first_preference_in(&self,allowed:&BTreeSet<CandidateIndex>) -> Option<CandidateIndex> {
        self.prefs[self.upto..].iter().find(|c|allowed.contains(c)).copied()
    }

    /// A fresh full-value copy of the remaining preferences, for use in an
    /// isolated simulation. The original is not affected by anything done
    /// to the copy.
    pub fn duplicate_unweighted(&self) -> PreferenceBallot {
        PreferenceBallot::new(self.prefs[self.upto..].to_vec(),self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Zero;

    fn allowed(indices:&[usize]) -> BTreeSet<CandidateIndex> {
        indices.iter().map(|&i|CandidateIndex(i)).collect()
    }

    #[test]
    fn test_advance_skips_departed_candidates() {
        let mut b = PreferenceBallot::new(vec![CandidateIndex(0),CandidateIndex(1),CandidateIndex(2)],4);
        assert_eq!(Some(CandidateIndex(0)),b.current_preference());
        assert_eq!(Some(CandidateIndex(2)),b.advance(&allowed(&[2])));
        assert_eq!(Some(CandidateIndex(2)),b.current_preference());
        assert_eq!(None,b.advance(&allowed(&[0,1])));
        assert!(b.exhausted());
    }

    #[test]
    fn test_value_tracks_multiplier() {
        let mut b = PreferenceBallot::new(vec![CandidateIndex(0)],4);
        assert_eq!("4",b.value().to_string());
        b.decrease_value(&"3/5".parse().unwrap());
        assert_eq!("0.6",b.multiplier().to_string());
        assert_eq!("2.4",b.value().to_string());
    }

    #[test]
    fn test_multiplier_never_increases() {
        let mut b = PreferenceBallot::new(vec![CandidateIndex(0)],7);
        let mut previous = b.multiplier();
        for fraction in ["9/34","6/11","1/1","3/5","0/5"] {
            b.decrease_value(&fraction.parse().unwrap());
            assert!(b.multiplier()<=previous);
            previous = b.multiplier();
        }
        assert!(b.multiplier().is_zero());
    }

    #[test]
    fn test_duplicate_is_full_value() {
        let mut b = PreferenceBallot::new(vec![CandidateIndex(0),CandidateIndex(1)],2);
        b.decrease_value(&"1/2".parse().unwrap());
        b.advance(&allowed(&[1]));
        let copy = b.duplicate_unweighted();
        assert_eq!(Some(CandidateIndex(1)),copy.current_preference());
        assert_eq!("2",copy.value().to_string());
    }
}
