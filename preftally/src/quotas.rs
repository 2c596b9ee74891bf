// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.


//! Quota functions: how many votes a candidate needs to be elected
//! directly. `ballot_count` excludes empty ballots.

/// A pluggable quota rule. Computed once per poll and cached.
pub type QuotaFunction = fn(ballot_count:usize,winners:usize) -> usize;

/// The quota used for CPO-STV comparisons.
pub fn hagenbach_bischof_quota(ballot_count:usize,winners:usize) -> usize {
    ballot_count/(winners+1)
}

/// The quota used for Scottish STV.
pub fn droop_quota(ballot_count:usize,winners:usize) -> usize {
    hagenbach_bischof_quota(ballot_count,winners)+1
}

pub fn hare_quota(ballot_count:usize,winners:usize) -> usize {
    ballot_count/winners
}

/// More than 50% of votes. Instant-runoff voting needs a majority, not a
/// proportional quota.
pub fn majority_quota(ballot_count:usize,_winners:usize) -> usize {
    ballot_count/2+1
}
