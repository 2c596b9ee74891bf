// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.

use serde::Serialize;
use serde::Deserialize;
use num::{One, Zero, BigRational, BigInt};
use std::fmt::{Display, Formatter};
use std::convert::TryFrom;
use std::str::FromStr;
use num::rational::{ParseRatioError, Ratio};
use crate::fixed_precision_decimal::FixedPrecisionDecimal;

/// The fraction of its value a ballot retains when a surplus is passed on:
/// `(votes - quota) / votes` for the candidate being transferred, or one for
/// a full-value transfer from an excluded candidate. Held exactly; rounding
/// happens only when it is applied to a ballot multiplier.
#[derive(Clone,Debug,Serialize,Deserialize,Ord, PartialOrd, Eq, PartialEq,Hash)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct TransferValue(pub(crate) BigRational);

impl TransferValue {
    pub fn one() -> Self { TransferValue(BigRational::one())}
    pub fn zero() -> Self { TransferValue(BigRational::zero())}

    /// The surplus fraction for a candidate holding `votes` of which
    /// everything above `quota` is surplus. Zero votes means there is
    /// nothing to pass on.
    pub fn from_surplus<const DIGITS:usize>(surplus:FixedPrecisionDecimal<DIGITS>,votes:FixedPrecisionDecimal<DIGITS>) -> Self {
        if votes.is_zero() { return TransferValue::zero(); }
        // the 10^DIGITS scales cancel.
        TransferValue(BigRational::new(BigInt::from(surplus.get_scaled_value()),BigInt::from(votes.get_scaled_value())))
    }

    /// Apply this fraction to a ballot multiplier, rounding the product to
    /// the multiplier's fixed precision.
    pub fn times_rounded<const DIGITS:usize>(&self,multiplier:FixedPrecisionDecimal<DIGITS>) -> FixedPrecisionDecimal<DIGITS> {
        let exact = multiplier.to_rational()*&self.0;
        FixedPrecisionDecimal::from_rational_rounding_nearest(&exact)
    }
}

impl Display for TransferValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.0)
    }
}

impl From<TransferValue> for String {
    fn from(t: TransferValue) -> Self { t.0.to_string() }
}

impl FromStr for TransferValue {
    type Err = ParseRatioError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(TransferValue(Ratio::from_str(s)?)) }
}

impl TryFrom<String> for TransferValue {
    type Error = ParseRatioError;
    fn try_from(s: String) -> Result<Self, Self::Error> { Ok(TransferValue(Ratio::from_str(&s)?)) }
}
