// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.

//! Polls whose ties the random strategy has to settle, and polls whose
//! ties history settles without it.

use preftally::poll::{CountingMethod, PollOptions, PreferencePoll};

fn seeded(seed:u64) -> PollOptions {
    PollOptions{seed:Some(seed),..PollOptions::default()}
}

fn sparse_poll(method:CountingMethod) -> PreferencePoll {
    let mut poll = PreferencePoll::new(method,3,&["A","B","C","D","E","F"],seeded(11)).unwrap();
    poll.add_ballot(&["A","D","C"],1).unwrap();
    poll.add_ballot(&["E","C","A","B"],1).unwrap();
    poll
}

#[test]
fn test_scottish_stv_random_tiebreaks() {
    let result = sparse_poll(CountingMethod::ScottishStv).calculate();
    assert!(result.randomized());
    assert!(result.complete());
    // the permutation consulted is part of the report.
    assert!(result.random_order.is_some());
    assert_eq!(6,result.random_order.as_ref().unwrap().len());
}

#[test]
fn test_cpo_stv_random_tiebreaks() {
    let result = sparse_poll(CountingMethod::CpoStv).calculate();
    assert!(result.randomized());
    assert!(result.complete());
}

/// Quota of one: several candidates reach it in the same round and the
/// election order falls out of the tally sort.
#[test]
fn test_multiple_elected_in_one_round() {
    let mut poll = PreferencePoll::new(CountingMethod::ScottishStv,4,&["one","two","three","four","five","six"],seeded(3)).unwrap();
    poll.add_ballot(&["one","three"],1).unwrap();
    poll.add_ballot(&["two","four"],1).unwrap();
    poll.add_ballot(&["five","six"],1).unwrap();
    let result = poll.calculate();
    assert!(result.complete());
    assert_eq!(4,result.winners().len());
}

/// Same poll under pedantic ordering: the tie-break chain fixes the order
/// of the equal-vote winners instead of the sort. The winner set must not
/// change, only (possibly) its order.
#[test]
fn test_pedantic_order_same_winners() {
    let options = PollOptions{pedantic_order:true,..seeded(3)};
    let mut poll = PreferencePoll::new(CountingMethod::ScottishStv,4,&["one","two","three","four","five","six"],options).unwrap();
    poll.add_ballot(&["one","three"],1).unwrap();
    poll.add_ballot(&["two","four"],1).unwrap();
    poll.add_ballot(&["five","six"],1).unwrap();
    let pedantic = poll.calculate();
    assert!(pedantic.complete());
    assert!(pedantic.randomized()); // ordering equal votes consulted the permutation

    let mut plain = PreferencePoll::new(CountingMethod::ScottishStv,4,&["one","two","three","four","five","six"],seeded(3)).unwrap();
    plain.add_ballot(&["one","three"],1).unwrap();
    plain.add_ballot(&["two","four"],1).unwrap();
    plain.add_ballot(&["five","six"],1).unwrap();
    let plain = plain.calculate();
    assert_eq!(plain.winner_set(),pedantic.winner_set());
}
