// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.

use thiserror::Error;

/// Errors surfaced to the caller, either at poll construction or when a
/// ballot is registered.
#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum PollError {
    #[error("not enough candidates to fill {seats} seats ({candidates} nominated)")]
    NotEnoughCandidates { seats : usize, candidates : usize },
    #[error("candidate {0:?} is registered more than once")]
    DuplicateCandidate(String),
    #[error("instant-runoff voting fills exactly one seat, not {0}")]
    InstantRunoffSeats(usize),
    #[error("candidate {0:?} does not exist in this poll")]
    CandidateDoesNotExist(String),
    #[error("candidate {0:?} is ranked more than once on the same ballot")]
    DuplicatePreference(String),
}

/// Internal control signal: the count stalled (an unresolvable tie, or no
/// IRV majority possible). Caught by the round loop; callers only ever see
/// `ElectionResult::complete() == false`.
#[derive(Debug,Clone)]
pub struct IncompleteResult {
    pub reason : &'static str,
}

impl IncompleteResult {
    pub fn new(reason:&'static str) -> Self { IncompleteResult{reason} }
}
