// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.


pub mod ballot_metadata;
pub mod ballot_paper;
pub mod election_result;
pub mod errors;
pub mod fixed_precision_decimal;
pub mod outcome_comparison;
pub mod poll;
pub mod quotas;
pub mod random_util;
pub mod tie_resolution;
pub mod transfer_strategy;
pub mod transfer_value;
