//! Information about the contest, such as candidates.

use serde::{Serialize,Deserialize};
use std::fmt;

/// a candidate, referred to by position in the poll's candidate list, 0 being first
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,Serialize,Deserialize)]
pub struct CandidateIndex(pub usize);
// type alias really, don't want long display
impl fmt::Display for CandidateIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.0) }
}
// type alias really, don't want long display
impl fmt::Debug for CandidateIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// The candidates in a poll. The names are whatever tokens the caller
/// supplied; everything inside the engine works on [CandidateIndex].
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct PollMetadata {
    pub candidates : Vec<String>,
}

impl PollMetadata {
    pub fn new(candidates:Vec<String>) -> Self { PollMetadata{candidates} }
    pub fn num_candidates(&self) -> usize { self.candidates.len() }
    pub fn candidate(&self,index:CandidateIndex) -> &str { &self.candidates[index.0] }
    /// Find the index for a candidate name, if it is registered.
    pub fn index_of(&self,name:&str) -> Option<CandidateIndex> {
        self.candidates.iter().position(|c|c==name).map(CandidateIndex)
    }
    /// All candidate indices, in list order.
    pub fn indices(&self) -> impl Iterator<Item=CandidateIndex> + '_ {
        (0..self.candidates.len()).map(CandidateIndex)
    }
    pub fn names(&self,indices:&[CandidateIndex]) -> Vec<String> {
        indices.iter().map(|&c|self.candidate(c).to_string()).collect()
    }
}
