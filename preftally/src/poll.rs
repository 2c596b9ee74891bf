//! The poll engine: ballot registration, the initial tally, and the round
//! loop that elects and excludes candidates until the seats are filled or
//! the count stalls. The per-method round logic is dispatched over
//! [CountingMethod]; everything else is shared.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use num::Zero;
use once_cell::unsync::OnceCell;
use crate::ballot_metadata::{CandidateIndex, PollMetadata};
use crate::ballot_paper::PreferenceBallot;
use crate::election_result::{CandidateStatus, ElectionResult, SelectionMethod, TransferLogEntry};
use crate::errors::{IncompleteResult, PollError};
use crate::fixed_precision_decimal::VoteCount;
use crate::outcome_comparison::best_outcome;
use crate::quotas::{droop_quota, hagenbach_bischof_quota, majority_quota, QuotaFunction};
use crate::random_util::Randomness;
use crate::tie_resolution::{TiebreakRandom, TiebreakResolution, Tiebreaker};
use crate::transfer_strategy::TransferStrategy;

/// Which counting rules the poll runs.
#[derive(Copy,Clone,Debug,Eq,PartialEq)]
pub enum CountingMethod {
    ScottishStv,
    InstantRunoff,
    CpoStv,
}

impl CountingMethod {
    fn default_quota(self) -> QuotaFunction {
        match self {
            CountingMethod::ScottishStv => droop_quota,
            CountingMethod::InstantRunoff => majority_quota,
            CountingMethod::CpoStv => hagenbach_bischof_quota,
        }
    }
}

/// Configuration shared by all methods. `Default` gives the conventional
/// setup: the method's own quota rule, history-then-random tie-breaking,
/// serial transfers, fast (non-pedantic) election order, entropy seeding.
#[derive(Copy,Clone,Debug)]
pub struct PollOptions {
    /// Override the method's default quota rule.
    pub quota : Option<QuotaFunction>,
    /// Allow the terminal random tie-break strategy. Without it an
    /// unresolvable tie stalls the count instead.
    pub random_in_tiebreaks : bool,
    /// Resolve the order of equal-vote candidates elected together through
    /// the tie-break chain instead of leaving it to the sort.
    pub pedantic_order : bool,
    pub transfer_strategy : TransferStrategy,
    /// Fix the random seed for reproducible results.
    pub seed : Option<u64>,
}

impl Default for PollOptions {
    fn default() -> Self {
        PollOptions{
            quota: None,
            random_in_tiebreaks: true,
            pedantic_order: false,
            transfer_strategy: TransferStrategy::Serial,
            seed: None,
        }
    }
}

/// A single election being counted. Register ballots, then call
/// [PreferencePoll::calculate], which consumes the poll and returns the
/// result — a poll can only be counted once.
pub struct PreferencePoll {
    method : CountingMethod,
    seats : usize,
    metadata : PollMetadata,
    ballots : Vec<PreferenceBallot>,
    quota_function : QuotaFunction,
    quota : OnceCell<usize>,
    tiebreakers : Vec<Tiebreaker>,
    random_in_tiebreaks : bool,
    pedantic_order : bool,
    transfer_strategy : TransferStrategy,
    randomness : Randomness,
    standing : BTreeSet<CandidateIndex>,
    current_votes : BTreeMap<CandidateIndex,VoteCount>,
    result : ElectionResult,
}

impl PreferencePoll {
    pub fn new(method:CountingMethod,seats:usize,candidates:&[&str],options:PollOptions) -> Result<Self,PollError> {
        if candidates.len()<seats {
            return Err(PollError::NotEnoughCandidates{seats,candidates:candidates.len()});
        }
        if method==CountingMethod::InstantRunoff && seats!=1 {
            return Err(PollError::InstantRunoffSeats(seats));
        }
        let mut seen : HashSet<&str> = HashSet::new();
        for &name in candidates {
            if !seen.insert(name) { return Err(PollError::DuplicateCandidate(name.to_string())); }
        }
        let metadata = PollMetadata::new(candidates.iter().map(|s|s.to_string()).collect());
        let mut randomness = match options.seed {
            Some(seed) => Randomness::seeded(seed),
            None => Randomness::from_entropy(),
        };
        let mut tiebreakers = vec![Tiebreaker::History];
        if options.random_in_tiebreaks {
            tiebreakers.push(Tiebreaker::Random(TiebreakRandom::new(candidates.len(),&mut randomness)));
        }
        let standing : BTreeSet<CandidateIndex> = metadata.indices().collect();
        let result = ElectionResult::new(metadata.clone(),seats);
        Ok(PreferencePoll{
            method,
            seats,
            metadata,
            ballots: vec![],
            quota_function: options.quota.unwrap_or_else(||method.default_quota()),
            quota: OnceCell::new(),
            tiebreakers,
            random_in_tiebreaks: options.random_in_tiebreaks,
            // pedantic ordering has no meaning for a CPO batch election.
            pedantic_order: options.pedantic_order && method!=CountingMethod::CpoStv,
            transfer_strategy: options.transfer_strategy,
            randomness,
            standing,
            current_votes: BTreeMap::new(),
            result,
        })
    }

    pub fn scottish_stv(seats:usize,candidates:&[&str]) -> Result<Self,PollError> {
        Self::new(CountingMethod::ScottishStv,seats,candidates,PollOptions::default())
    }
    pub fn instant_runoff(candidates:&[&str]) -> Result<Self,PollError> {
        Self::new(CountingMethod::InstantRunoff,1,candidates,PollOptions::default())
    }
    pub fn cpo_stv(seats:usize,candidates:&[&str]) -> Result<Self,PollError> {
        Self::new(CountingMethod::CpoStv,seats,candidates,PollOptions::default())
    }

    /// Register `count` identical ballots ranking the named candidates,
    /// most favoured first. An empty ranking is counted but takes no part
    /// in the poll.
    pub fn add_ballot(&mut self,ranking:&[&str],count:usize) -> Result<(),PollError> {
        let mut prefs : Vec<CandidateIndex> = Vec::with_capacity(ranking.len());
        for &name in ranking {
            let index = self.metadata.index_of(name).ok_or_else(||PollError::CandidateDoesNotExist(name.to_string()))?;
            if prefs.contains(&index) { return Err(PollError::DuplicatePreference(name.to_string())); }
            prefs.push(index);
        }
        if prefs.is_empty() {
            self.result.empty_ballot_count+=count;
        } else {
            self.ballots.push(PreferenceBallot::new(prefs,count));
        }
        Ok(())
    }

    /// Number of non-empty ballot papers registered.
    pub fn ballot_count(&self) -> usize {
        self.ballots.iter().map(|b|b.count()).sum()
    }

    /// Computed from the ballot count on first access, then cached.
    pub fn quota(&self) -> usize {
        *self.quota.get_or_init(||(self.quota_function)(self.ballot_count(),self.seats))
    }

    pub fn seats(&self) -> usize { self.seats }
    pub fn metadata(&self) -> &PollMetadata { &self.metadata }

    fn seats_to_fill(&self) -> usize { self.seats-self.result.elected.len() }

    /// Run the count to completion and return the result. An unbreakable
    /// tie leaves the result incomplete rather than failing.
    pub fn calculate(mut self) -> ElectionResult {
        self.initial_votes();
        while !self.result.complete() {
            let round = match self.method {
                CountingMethod::ScottishStv => self.scottish_round(),
                CountingMethod::InstantRunoff => self.irv_round(),
                CountingMethod::CpoStv => self.cpo_round(),
            };
            if round.is_err() { break; }
        }
        let quota = self.quota();
        let random_order = self.tiebreakers.iter().find_map(|t|match t {
            Tiebreaker::Random(random) if random.used() => Some(self.metadata.names(random.order())),
            _ => None,
        });
        self.result.finalize(quota,random_order);
        self.result
    }

    /// Tally every ballot's full value to its first preference. Logged as
    /// the transfer-log entry with no transfers.
    fn initial_votes(&mut self) {
        let mut votes : BTreeMap<CandidateIndex,VoteCount> = self.metadata.indices().map(|c|(c,VoteCount::zero())).collect();
        for ballot in &self.ballots {
            let first = ballot.current_preference().expect("registered ballots are never empty");
            *votes.get_mut(&first).unwrap()+=ballot.value();
        }
        self.result.transfer_log.push(TransferLogEntry{
            transfers: None,
            current_votes: votes.clone(),
            exhausted: VoteCount::zero(),
        });
        self.current_votes=votes;
    }

    /// The extreme-vote candidate in `sample` (standing candidates when
    /// None), with the method that settled it. Ties go through the chain.
    fn get_candidate(&mut self,most_votes:bool,sample:Option<Vec<CandidateIndex>>) -> Result<(CandidateIndex,SelectionMethod),IncompleteResult> {
        let sample = sample.unwrap_or_else(||self.standing.iter().copied().collect());
        let tallies : Vec<VoteCount> = sample.iter().map(|c|self.current_votes[c]).collect();
        let extreme = if most_votes { tallies.iter().max() } else { tallies.iter().min() };
        let extreme = *extreme.expect("selection from no candidates");
        let tied : Vec<CandidateIndex> = sample.iter().copied().filter(|c|self.current_votes[c]==extreme).collect();
        if tied.len()==1 {
            Ok((tied[0],SelectionMethod::Direct))
        } else {
            self.resolve_tie(tied,most_votes)
        }
    }

    /// Try each strategy in the chain; a strategy either singles out a
    /// candidate or narrows the set for the next one.
    fn resolve_tie(&mut self,mut tied:Vec<CandidateIndex>,most_votes:bool) -> Result<(CandidateIndex,SelectionMethod),IncompleteResult> {
        for tiebreaker in self.tiebreakers.iter_mut() {
            let method = tiebreaker.method();
            match tiebreaker.resolve(&tied,&self.result.rounds,!most_votes) {
                TiebreakResolution::Winner(candidate) => return Ok((candidate,method)),
                TiebreakResolution::Narrowed(narrowed) => { tied=narrowed; }
            }
        }
        Err(IncompleteResult::new("unresolved tiebreak (random disallowed)"))
    }

    fn sorted_by_votes_descending(&self,mut candidates:Vec<CandidateIndex>) -> Vec<CandidateIndex> {
        candidates.sort_by(|a,b|self.current_votes[b].cmp(&self.current_votes[a]));
        candidates
    }

    /// Election order with equal-vote groups settled one candidate at a
    /// time through the tie-break chain.
    fn pedantic_order_of(&mut self,candidates:Vec<CandidateIndex>) -> Result<Vec<CandidateIndex>,IncompleteResult> {
        let sorted = self.sorted_by_votes_descending(candidates);
        let mut ordered : Vec<CandidateIndex> = Vec::with_capacity(sorted.len());
        let mut from = 0;
        while from<sorted.len() {
            let tally = self.current_votes[&sorted[from]];
            let mut upto = from+1;
            while upto<sorted.len() && self.current_votes[&sorted[upto]]==tally { upto+=1; }
            let mut group : Vec<CandidateIndex> = sorted[from..upto].to_vec();
            while group.len()>1 {
                let (next,_) = self.resolve_tie(group.clone(),true)?;
                ordered.push(next);
                group.retain(|&c|c!=next);
            }
            ordered.extend(group);
            from=upto;
        }
        Ok(ordered)
    }

    /// Append an election round. The order of `candidates` as recorded is
    /// the order they take seats.
    fn elect(&mut self,candidates:Vec<CandidateIndex>,method:SelectionMethod) -> Result<(),IncompleteResult> {
        if candidates.is_empty() { return Ok(()); }
        let ordered = if self.pedantic_order {
            self.pedantic_order_of(candidates)?
        } else {
            self.sorted_by_votes_descending(candidates)
        };
        for candidate in &ordered { self.standing.remove(candidate); }
        self.result.select(ordered,self.current_votes.clone(),method,CandidateStatus::Elected);
        Ok(())
    }

    fn exclude(&mut self,candidate:CandidateIndex,method:SelectionMethod) {
        self.standing.remove(&candidate);
        self.result.select(vec![candidate],self.current_votes.clone(),method,CandidateStatus::Excluded);
    }

    /// Run the configured transfer strategy and install the rebuilt tally.
    fn do_transfer(&mut self,transfers:&[CandidateIndex],decrease_value:bool) {
        let quota = self.quota();
        let outcome = self.transfer_strategy.transfer(&mut self.ballots,&self.current_votes,transfers,&self.standing,quota,decrease_value);
        self.result.exhausted+=outcome.exhausted;
        self.result.transfer_log.push(TransferLogEntry{
            transfers: Some(outcome.transfers),
            current_votes: outcome.votes.clone(),
            exhausted: self.result.exhausted,
        });
        self.current_votes=outcome.votes;
    }

    fn scottish_round(&mut self) -> Result<(),IncompleteResult> {
        // nothing left to resolve: the remaining candidates take the seats.
        if self.standing.len()<=self.seats_to_fill() {
            let remaining : Vec<CandidateIndex> = self.standing.iter().copied().collect();
            self.elect(remaining,SelectionMethod::NoCompetition)?;
            return Ok(());
        }
        let quota = VoteCount::from(self.quota());
        let above_quota : Vec<CandidateIndex> = self.current_votes.iter().filter(|&(_,v)|*v>=quota).map(|(&c,_)|c).collect();
        if !above_quota.is_empty() {
            self.elect(above_quota,SelectionMethod::Direct)?;
            // transfer surpluses in the order the candidates were elected.
            let elected_order = self.result.rounds.last().expect("just elected").selected.clone();
            self.do_transfer(&elected_order,true);
        } else {
            let (lowest,method) = self.get_candidate(false,None)?;
            self.exclude(lowest,method);
            self.do_transfer(&[lowest],false);
        }
        Ok(())
    }

    fn irv_round(&mut self) -> Result<(),IncompleteResult> {
        let quota = VoteCount::from(self.quota());
        // at most one candidate can hold a majority.
        if let Some((&winner,_)) = self.current_votes.iter().find(|&(_,v)|*v>=quota) {
            self.elect(vec![winner],SelectionMethod::Direct)?;
            return Ok(());
        }
        if self.standing.len()==1 {
            return Err(IncompleteResult::new("no candidate can reach a majority"));
        }
        let (lowest,method) = self.get_candidate(false,None)?;
        self.exclude(lowest,method);
        self.do_transfer(&[lowest],false);
        Ok(())
    }

    fn cpo_round(&mut self) -> Result<(),IncompleteResult> {
        if self.standing.len()==self.seats_to_fill() {
            let remaining : Vec<CandidateIndex> = self.standing.iter().copied().collect();
            self.elect(remaining,SelectionMethod::Direct)?;
            return Ok(());
        }
        let quota = self.quota();
        let seats_to_fill = self.seats_to_fill();
        let (outcome,randomized) = best_outcome(&self.ballots,&self.standing,seats_to_fill,quota,&mut self.randomness,self.random_in_tiebreaks)?;
        if randomized { self.result.set_randomized(); }
        self.elect(outcome,SelectionMethod::Cpo)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ballot_count_and_empty_ballots() {
        let mut poll = PreferencePoll::scottish_stv(1,&["a","b"]).unwrap();
        poll.add_ballot(&["a","b"],13).unwrap();
        poll.add_ballot(&["b"],28).unwrap();
        poll.add_ballot(&["a"],1).unwrap();
        poll.add_ballot(&[],3).unwrap();
        assert_eq!(42,poll.ballot_count());
        let result = poll.calculate();
        assert_eq!(3,result.empty_ballot_count);
        // quota over 42 ballots, not 45.
        assert_eq!(22,result.quota);
    }

    #[test]
    fn test_quota_cached() {
        let mut poll = PreferencePoll::scottish_stv(1,&["a","b"]).unwrap();
        poll.add_ballot(&["a"],10).unwrap();
        let first = poll.quota();
        // further ballots do not change an already computed quota.
        poll.add_ballot(&["b"],90).unwrap();
        assert_eq!(first,poll.quota());
        assert_eq!(6,first);
    }

    #[test]
    fn test_not_enough_candidates() {
        let error = PreferencePoll::scottish_stv(4,&["a","b","c"]).err().unwrap();
        assert_eq!(PollError::NotEnoughCandidates{seats:4,candidates:3},error);
    }

    #[test]
    fn test_duplicate_candidate() {
        assert!(matches!(
            PreferencePoll::scottish_stv(1,&["a","b","a"]),
            Err(PollError::DuplicateCandidate(_))
        ));
    }

    #[test]
    fn test_irv_takes_one_seat() {
        assert!(matches!(
            PreferencePoll::new(CountingMethod::InstantRunoff,2,&["a","b","c"],PollOptions::default()),
            Err(PollError::InstantRunoffSeats(2))
        ));
    }

    #[test]
    fn test_bad_ballots() {
        let mut poll = PreferencePoll::scottish_stv(2,&["one","two","three"]).unwrap();
        assert!(matches!(poll.add_ballot(&["a","b"],1),Err(PollError::CandidateDoesNotExist(_))));
        assert!(matches!(poll.add_ballot(&["one","two","one"],1),Err(PollError::DuplicatePreference(_))));
        assert!(poll.add_ballot(&["one","two"],1).is_ok());
    }
}
