//! The outcome of a count: who was selected in each round, with what votes,
//! by what method. The round log is the audit trail.

use std::collections::BTreeMap;
use std::time::Instant;
use num::Zero;
use serde::{Serialize,Deserialize};
use crate::ballot_metadata::{CandidateIndex, PollMetadata};
use crate::fixed_precision_decimal::VoteCount;

#[derive(Copy,Clone,Debug,Eq,PartialEq,Serialize,Deserialize)]
pub enum CandidateStatus {
    Elected,
    Excluded,
}

/// How a round's selection was decided.
#[derive(Copy,Clone,Debug,Eq,PartialEq,Serialize,Deserialize)]
pub enum SelectionMethod {
    Direct,
    TiebreakHistory,
    TiebreakRandom,
    NoCompetition,
    Cpo,
}

impl SelectionMethod {
    pub fn name(self) -> &'static str {
        match self {
            SelectionMethod::Direct => "Direct",
            SelectionMethod::TiebreakHistory => "Tiebreak (history)",
            SelectionMethod::TiebreakRandom => "Tiebreak (random)",
            SelectionMethod::NoCompetition => "No competition left",
            SelectionMethod::Cpo => "Comparison of Pairs of Outcomes",
        }
    }
}

/// One decision: candidates elected or excluded, with a snapshot of the
/// standing candidates' tallies at the moment of selection.
#[derive(Clone,Debug,Serialize,Deserialize)]
pub struct ElectionRound {
    pub status : CandidateStatus,
    pub method : SelectionMethod,
    /// The selected candidate(s); for an election of several, in election order.
    pub selected : Vec<CandidateIndex>,
    pub votes : BTreeMap<CandidateIndex,VoteCount>,
}

/// One entry per transfer operation: what moved where, the rebuilt tally,
/// and the running exhausted total. The first entry is the initial tally
/// and has no transfers.
#[derive(Clone,Debug,Serialize,Deserialize)]
pub struct TransferLogEntry {
    pub transfers : Option<BTreeMap<(CandidateIndex,CandidateIndex),VoteCount>>,
    pub current_votes : BTreeMap<CandidateIndex,VoteCount>,
    pub exhausted : VoteCount,
}

/// Accumulates the count as it runs; finalized exactly once when the round
/// loop ends. Candidates are elected in insertion order of `elected`.
pub struct ElectionResult {
    metadata : PollMetadata,
    seats : usize,
    pub elected : Vec<CandidateIndex>,
    pub rounds : Vec<ElectionRound>,
    pub transfer_log : Vec<TransferLogEntry>,
    pub exhausted : VoteCount,
    pub empty_ballot_count : usize,
    pub quota : usize,
    /// Wall clock seconds from poll construction to finalize.
    pub runtime : f64,
    /// The random permutation consulted for tie-breaking, if it was.
    pub random_order : Option<Vec<String>>,
    forced_randomized : bool,
    start : Instant,
}

impl ElectionResult {
    pub fn new(metadata:PollMetadata,seats:usize) -> Self {
        ElectionResult{
            metadata,
            seats,
            elected: vec![],
            rounds: vec![],
            transfer_log: vec![],
            exhausted: VoteCount::zero(),
            empty_ballot_count: 0,
            quota: 0,
            runtime: 0.0,
            random_order: None,
            forced_randomized: false,
            start: Instant::now(),
        }
    }

    pub fn metadata(&self) -> &PollMetadata { &self.metadata }
    pub fn seats(&self) -> usize { self.seats }

    /// Append a round. Elections extend the winner list in the given order.
    pub fn select(&mut self,candidates:Vec<CandidateIndex>,votes:BTreeMap<CandidateIndex,VoteCount>,method:SelectionMethod,status:CandidateStatus) {
        if status==CandidateStatus::Elected {
            self.elected.extend(candidates.iter().copied());
        }
        self.rounds.push(ElectionRound{status,method,selected:candidates,votes});
    }

    /// A candidate is standing iff no round has selected it.
    pub fn still_standing(&self,candidate:CandidateIndex) -> bool {
        self.rounds.iter().all(|r|!r.selected.contains(&candidate))
    }

    pub fn complete(&self) -> bool { self.elected.len()==self.seats }

    pub fn randomized(&self) -> bool {
        self.forced_randomized || self.rounds.iter().any(|r|r.method==SelectionMethod::TiebreakRandom)
    }

    /// Used when randomness is consumed without a TiebreakRandom round, as
    /// in the CPO minimax fallback.
    pub fn set_randomized(&mut self) { self.forced_randomized=true; }

    /// Stamp the runtime and quota, and attach tiebreaker metadata. Called
    /// once, at the end of `calculate`.
    pub fn finalize(&mut self,quota:usize,random_order:Option<Vec<String>>) {
        self.quota=quota;
        self.runtime=(self.start.elapsed().as_secs_f64()*1e6).round()/1e6;
        if random_order.is_some() {
            self.forced_randomized=true;
            self.random_order=random_order;
        }
    }

    pub fn winners(&self) -> Vec<String> {
        self.metadata.names(&self.elected)
    }

    pub fn winner_set(&self) -> std::collections::BTreeSet<String> {
        self.winners().into_iter().collect()
    }

    /// The serializable report consumed by external tooling.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary{
            winners: self.winners(),
            candidates: self.metadata.candidates.clone(),
            complete: self.complete(),
            rounds: self.rounds.iter().map(|r|self.round_summary(r)).collect(),
            randomized: self.randomized(),
            quota: self.quota,
            runtime: self.runtime,
            empty_ballot_count: self.empty_ballot_count,
            random_order: self.random_order.clone(),
        }
    }

    fn round_summary(&self,round:&ElectionRound) -> RoundSummary {
        RoundSummary{
            method: round.method.name().to_string(),
            selected: self.metadata.names(&round.selected),
            status: round.status,
            vote_count: round.votes.iter().map(|(&c,v)|(self.metadata.candidate(c).to_string(),v.approx_f64())).collect(),
        }
    }
}

/// The report form of a finished count, keyed by candidate name.
#[derive(Clone,Debug,Serialize,Deserialize)]
pub struct ResultSummary {
    pub winners : Vec<String>,
    pub candidates : Vec<String>,
    pub complete : bool,
    pub rounds : Vec<RoundSummary>,
    pub randomized : bool,
    pub quota : usize,
    pub runtime : f64,
    pub empty_ballot_count : usize,
    #[serde(skip_serializing_if = "Option::is_none",default)]
    pub random_order : Option<Vec<String>>,
}

#[derive(Clone,Debug,Serialize,Deserialize)]
pub struct RoundSummary {
    pub method : String,
    pub selected : Vec<String>,
    pub status : CandidateStatus,
    pub vote_count : BTreeMap<String,f64>,
}
