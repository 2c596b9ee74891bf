// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.


//! Comparison of Pairs of Outcomes. Every possible set of winners is duelled
//! against every other on an isolated copy of the ballots; a Condorcet
//! winner among outcomes is elected directly, otherwise the tie is resolved
//! by minimax over the Smith set of the defeat graph.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use num::Zero;
use crate::ballot_metadata::CandidateIndex;
use crate::ballot_paper::PreferenceBallot;
use crate::errors::IncompleteResult;
use crate::fixed_precision_decimal::VoteCount;
use crate::random_util::Randomness;
use crate::transfer_value::TransferValue;

/// The verdict of one pairwise comparison. `winner` and `loser` index the
/// round's outcome list; when `tied` they are interchangeable.
#[derive(Clone,Debug)]
pub struct Duel {
    pub winner : usize,
    pub loser : usize,
    pub difference : VoteCount,
    pub tied : bool,
}

/// Pick the winning outcome among all size-`seats_to_fill` subsets of the
/// standing candidates. Returns the outcome and whether randomness was
/// needed to settle it.
pub fn best_outcome(ballots:&[PreferenceBallot],
                    standing:&BTreeSet<CandidateIndex>,
                    seats_to_fill:usize,
                    quota:usize,
                    randomness:&mut Randomness,
                    random_allowed:bool) -> Result<(Vec<CandidateIndex>,bool),IncompleteResult> {
    let standing : Vec<CandidateIndex> = standing.iter().copied().collect();
    let outcomes = combinations(&standing,seats_to_fill);
    let mut duels = Vec::with_capacity(outcomes.len()*(outcomes.len().saturating_sub(1))/2);
    for i in 0..outcomes.len() {
        for j in i+1..outcomes.len() {
            duels.push(compare_outcomes(ballots,&outcomes,i,j,quota));
        }
    }
    if let Some(winner) = condorcet_winner(&duels) {
        return Ok((outcomes[winner].clone(),false));
    }
    let (winner,randomized) = minimax_over_smith_set(&duels,outcomes.len(),randomness,random_allowed)?;
    Ok((outcomes[winner].clone(),randomized))
}

/// All k-element subsets of `items`, in lexicographic order of positions.
fn combinations(items:&[CandidateIndex],k:usize) -> Vec<Vec<CandidateIndex>> {
    fn build(items:&[CandidateIndex],k:usize,start:usize,current:&mut Vec<CandidateIndex>,res:&mut Vec<Vec<CandidateIndex>>) {
        if current.len()==k { res.push(current.clone()); return; }
        for i in start..items.len() {
            if items.len()-i < k-current.len() { break; }
            current.push(items[i]);
            build(items,k,i+1,current,res);
            current.pop();
        }
    }
    let mut res = Vec::new();
    build(items,k,0,&mut Vec::with_capacity(k),&mut res);
    res
}

/// Duel two outcomes. Works entirely on fresh full-value copies of the
/// ballots; the poll's own ballots are never touched.
///
/// Candidates in neither outcome are ignored from the start. First
/// preferences within the union are tallied, then every candidate common to
/// both outcomes with a tally strictly over quota is capped at quota and
/// its surplus fraction is passed to each ballot's next preference within
/// the shrinking restricted set.
fn compare_outcomes(ballots:&[PreferenceBallot],
                    outcomes:&[Vec<CandidateIndex>],
                    a:usize,
                    b:usize,
                    quota:usize) -> Duel {
    let union : BTreeSet<CandidateIndex> = outcomes[a].iter().chain(outcomes[b].iter()).copied().collect();
    let mut working : Vec<PreferenceBallot> = ballots.iter().map(|ballot|ballot.duplicate_unweighted()).collect();
    let mut standing = union.clone();
    let mut votes : BTreeMap<CandidateIndex,VoteCount> = union.iter().map(|&c|(c,VoteCount::zero())).collect();
    for ballot in &working {
        if let Some(c) = ballot.first_preference_in(&standing) {
            *votes.get_mut(&c).unwrap()+=ballot.value();
        }
    }
    let shared : Vec<CandidateIndex> = outcomes[a].iter().filter(|c|outcomes[b].contains(c)).copied().collect();
    let quota = VoteCount::from(quota);
    for &candidate in &shared {
        let tally = votes[&candidate];
        if tally>quota {
            let fraction = TransferValue::from_surplus(tally-quota,tally);
            votes.insert(candidate,quota);
            let mut targets = standing.clone();
            targets.remove(&candidate);
            for ballot in working.iter_mut() {
                if ballot.first_preference_in(&standing)==Some(candidate) {
                    ballot.decrease_value(&fraction);
                    if let Some(next) = ballot.first_preference_in(&targets) {
                        *votes.get_mut(&next).unwrap()+=ballot.value();
                    }
                }
            }
        }
        standing.remove(&candidate);
    }
    let total = |outcome:&[CandidateIndex]| -> VoteCount { outcome.iter().map(|c|votes[c]).sum() };
    let total_a = total(&outcomes[a]);
    let total_b = total(&outcomes[b]);
    if total_a>total_b {
        Duel{winner:a,loser:b,difference:total_a-total_b,tied:false}
    } else {
        Duel{winner:b,loser:a,difference:total_b-total_a,tied:total_a==total_b}
    }
}

/// The outcome that won every duel it took part in, if there is exactly
/// one. A tied duel counts against both sides.
fn condorcet_winner(duels:&[Duel]) -> Option<usize> {
    let mut wins = HashSet::new();
    let mut losses = HashSet::new();
    for duel in duels {
        losses.insert(duel.loser);
        if duel.tied { losses.insert(duel.winner); } else { wins.insert(duel.winner); }
    }
    let undefeated : Vec<usize> = wins.difference(&losses).copied().collect();
    if undefeated.len()==1 { Some(undefeated[0]) } else { None }
}

/// No Condorcet winner: find the Smith set (the sink strongly connected
/// component of the loser-to-winner defeat graph — outcomes undefeated by
/// anything outside the cycle) and take the member whose worst defeat is
/// smallest. Several sharing the minimal worst defeat are settled
/// uniformly at random, when allowed.
fn minimax_over_smith_set(duels:&[Duel],
                          num_outcomes:usize,
                          randomness:&mut Randomness,
                          random_allowed:bool) -> Result<(usize,bool),IncompleteResult> {
    let mut graph : Vec<Vec<usize>> = vec![Vec::new();num_outcomes];
    for duel in duels {
        graph[duel.loser].push(duel.winner);
        if duel.tied { graph[duel.winner].push(duel.loser); }
    }
    let mut smith_set = strongly_connected_components(&graph).into_iter().next().unwrap_or_default();
    smith_set.sort_unstable();
    let worst_defeats : Vec<(usize,VoteCount)> = smith_set.iter().map(|&outcome|{
        let worst = duels.iter().filter(|d|d.loser==outcome).map(|d|d.difference).max().unwrap_or_else(VoteCount::zero);
        (outcome,worst)
    }).collect();
    let minimal = worst_defeats.iter().map(|w|w.1).min().expect("empty smith set");
    let winners : Vec<usize> = worst_defeats.iter().filter(|w|w.1==minimal).map(|w|w.0).collect();
    if winners.len()==1 { return Ok((winners[0],false)); }
    if !random_allowed { return Err(IncompleteResult::new("tied pairwise comparison (random disallowed)")); }
    Ok((randomness.choose(&winners),true))
}

/// Iterative Tarjan. Components come out in reverse topological order of
/// the condensation, so the first one has no edges leaving it. Every pair
/// of outcomes duels, making the condensation a tournament with a unique
/// sink — which is exactly the Smith set when edges run loser to winner.
fn strongly_connected_components(graph:&[Vec<usize>]) -> Vec<Vec<usize>> {
    const UNVISITED : usize = usize::MAX;
    let n = graph.len();
    let mut index = vec![UNVISITED;n];
    let mut lowlink = vec![0usize;n];
    let mut on_stack = vec![false;n];
    let mut stack : Vec<usize> = Vec::new();
    let mut next_index = 0usize;
    let mut components : Vec<Vec<usize>> = Vec::new();
    let mut work : Vec<(usize,usize)> = Vec::new(); // (vertex, next edge to look at)
    for start in 0..n {
        if index[start]!=UNVISITED { continue; }
        work.push((start,0));
        while let Some(frame) = work.last_mut() {
            let v = frame.0;
            if frame.1==0 {
                index[v]=next_index;
                lowlink[v]=next_index;
                next_index+=1;
                stack.push(v);
                on_stack[v]=true;
            }
            if frame.1<graph[v].len() {
                let w = graph[v][frame.1];
                frame.1+=1;
                if index[w]==UNVISITED {
                    work.push((w,0));
                } else if on_stack[w] {
                    lowlink[v]=lowlink[v].min(index[w]);
                }
            } else {
                work.pop();
                if let Some(&(parent,_)) = work.last() {
                    lowlink[parent]=lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v]==index[v] {
                    let mut component = Vec::new();
                    loop {
                        let w = stack.pop().expect("tarjan stack underflow");
                        on_stack[w]=false;
                        component.push(w);
                        if w==v { break; }
                    }
                    components.push(component);
                }
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(i:usize) -> CandidateIndex { CandidateIndex(i) }

    #[test]
    fn test_combinations() {
        let items : Vec<CandidateIndex> = (0..5).map(CandidateIndex).collect();
        let combos = combinations(&items,3);
        assert_eq!(10,combos.len());
        assert_eq!(vec![c(0),c(1),c(2)],combos[0]);
        assert_eq!(vec![c(2),c(3),c(4)],combos[9]);
        assert_eq!(1,combinations(&items,0).len());
        assert_eq!(5,combinations(&items,1).len());
    }

    #[test]
    fn test_tarjan_sink_component_first() {
        // 0 and 1 defeat each other; both defeat 2 (edges run loser to winner).
        let graph = vec![vec![1],vec![0],vec![0,1]];
        let components = strongly_connected_components(&graph);
        let mut sink = components[0].clone();
        sink.sort_unstable();
        assert_eq!(vec![0,1],sink);
        assert_eq!(2,components.len());
        assert_eq!(vec![2],components[1]);
    }

    #[test]
    fn test_tarjan_single_chain() {
        // 2 -> 1 -> 0: three singleton components, sink first.
        let graph = vec![vec![],vec![0],vec![1]];
        let components = strongly_connected_components(&graph);
        assert_eq!(vec![vec![0],vec![1],vec![2]],components);
    }

    /// The decisive duel from the Wikipedia CPO-STV example: with a quota
    /// of 25, Carter's surplus flows to Delilah, so the outcome with
    /// Delilah beats the one with Scott.
    #[test]
    fn test_duel_with_shared_surplus() {
        let ballots = vec![
            PreferenceBallot::new(vec![c(0)],25),                // Andrea
            PreferenceBallot::new(vec![c(1),c(2),c(3)],34),      // Carter > Brad > Delilah
            PreferenceBallot::new(vec![c(2),c(3)],7),
            PreferenceBallot::new(vec![c(3),c(2)],8),
            PreferenceBallot::new(vec![c(3),c(4)],5),
            PreferenceBallot::new(vec![c(4),c(3)],21),
        ];
        let outcomes = vec![vec![c(0),c(1),c(3)],vec![c(0),c(1),c(4)]];
        let duel = compare_outcomes(&ballots,&outcomes,0,1,25);
        assert!(!duel.tied);
        assert_eq!(0,duel.winner);
        assert_eq!(1,duel.loser);
        assert_eq!("8.00014",duel.difference.to_string());
    }

    #[test]
    fn test_duel_disjoint_outcomes_plain_tally() {
        let ballots = vec![
            PreferenceBallot::new(vec![c(0)],3),
            PreferenceBallot::new(vec![c(1)],2),
            PreferenceBallot::new(vec![c(2)],4),
            PreferenceBallot::new(vec![c(3)],1),
        ];
        let outcomes = vec![vec![c(0),c(1)],vec![c(2),c(3)]];
        let duel = compare_outcomes(&ballots,&outcomes,0,1,100);
        assert!(duel.tied); // 5 vs 5, no shared candidates, no transfers
        assert_eq!("0",duel.difference.to_string());
    }

    #[test]
    fn test_condorcet_winner_requires_no_losses() {
        let win = |w:usize,l:usize| Duel{winner:w,loser:l,difference:VoteCount::from(1),tied:false};
        assert_eq!(Some(0),condorcet_winner(&[win(0,1),win(0,2),win(1,2)]));
        // a cycle has no condorcet winner.
        assert_eq!(None,condorcet_winner(&[win(0,1),win(1,2),win(2,0)]));
        // a tie counts against both participants.
        let tie = Duel{winner:0,loser:1,difference:VoteCount::zero(),tied:true};
        assert_eq!(None,condorcet_winner(&[tie,win(0,2),win(1,2)]));
    }

    #[test]
    fn test_minimax_picks_smallest_worst_defeat() {
        // cycle 0 -> 1 -> 2 -> 0 with defeats of differing size.
        let duel = |w:usize,l:usize,diff:usize| Duel{winner:w,loser:l,difference:VoteCount::from(diff),tied:false};
        let duels = vec![duel(1,0,5),duel(2,1,3),duel(0,2,4)];
        let mut randomness = Randomness::seeded(1);
        let (winner,randomized) = minimax_over_smith_set(&duels,3,&mut randomness,true).unwrap();
        assert_eq!(1,winner); // worst defeats: 0 loses by 5, 1 by 3, 2 by 4.
        assert!(!randomized);
    }

    #[test]
    fn test_minimax_tie_needs_randomness() {
        let duel = |w:usize,l:usize| Duel{winner:w,loser:l,difference:VoteCount::from(2),tied:false};
        let duels = vec![duel(1,0),duel(2,1),duel(0,2)];
        assert!(minimax_over_smith_set(&duels,3,&mut Randomness::seeded(1),false).is_err());
        let (winner,randomized) = minimax_over_smith_set(&duels,3,&mut Randomness::seeded(1),true).unwrap();
        assert!(randomized);
        assert!(winner<3);
    }
}
