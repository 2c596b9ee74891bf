// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.

use std::fs::File;
use std::path::PathBuf;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use preftally::poll::{CountingMethod, PollOptions, PreferencePoll};
use preftally::quotas;
use preftally::transfer_strategy::TransferStrategy;

#[derive(Copy,Clone,Debug,ValueEnum)]
enum Method {
    /// Scottish STV: elect everyone over quota, transfer surpluses,
    /// exclude the lowest otherwise.
    Scottish,
    /// Instant-runoff voting: one seat, majority quota.
    Irv,
    /// CPO-STV: full pairwise comparison of possible outcomes.
    Cpo,
}

impl From<Method> for CountingMethod {
    fn from(method:Method) -> Self {
        match method {
            Method::Scottish => CountingMethod::ScottishStv,
            Method::Irv => CountingMethod::InstantRunoff,
            Method::Cpo => CountingMethod::CpoStv,
        }
    }
}

#[derive(Copy,Clone,Debug,ValueEnum)]
enum QuotaName {
    HagenbachBischof,
    Droop,
    Hare,
    Majority,
}

impl QuotaName {
    fn function(self) -> quotas::QuotaFunction {
        match self {
            QuotaName::HagenbachBischof => quotas::hagenbach_bischof_quota,
            QuotaName::Droop => quotas::droop_quota,
            QuotaName::Hare => quotas::hare_quota,
            QuotaName::Majority => quotas::majority_quota,
        }
    }
}

#[derive(Parser)]
#[command(version)]
/// Count ranked-ballot proportional-representation elections: Scottish
/// STV, instant-runoff voting, and comparison of pairs of outcomes.
struct Opts {
    /// The counting method to use.
    #[arg(value_enum)]
    method : Method,

    /// The JSON file to read candidates and ballots from.
    votes : PathBuf,

    /// The number of people to elect. Overrides the ballot file.
    #[arg(short,long)]
    seats : Option<usize>,

    /// Override the method's default quota rule.
    #[arg(long,value_enum)]
    quota : Option<QuotaName>,

    /// Fix the random seed so tie-breaks are reproducible.
    #[arg(long)]
    seed : Option<u64>,

    /// Leave unbreakable ties unresolved instead of settling them randomly.
    #[arg(long)]
    no_random : bool,

    /// Settle the election order of equal-vote candidates through the
    /// tie-break chain.
    #[arg(long)]
    pedantic_order : bool,

    /// Compute all of a round's transfers from the pre-transfer snapshot
    /// instead of serially.
    #[arg(long)]
    batch_transfers : bool,

    /// Write the result report here instead of stdout.
    #[arg(short,long)]
    output : Option<PathBuf>,
}

fn default_count() -> usize { 1 }

#[derive(Deserialize)]
struct BallotFile {
    candidates : Vec<String>,
    #[serde(default)]
    seats : Option<usize>,
    ballots : Vec<BallotEntry>,
}

#[derive(Deserialize)]
struct BallotEntry {
    ranking : Vec<String>,
    #[serde(default = "default_count")]
    count : usize,
}

fn main() -> anyhow::Result<()> {
    let opts : Opts = Opts::parse();

    let data : BallotFile = {
        let file = File::open(&opts.votes)?;
        serde_json::from_reader(file)?
    };
    let seats = opts.seats.or(data.seats).unwrap_or(1);

    let options = PollOptions{
        quota: opts.quota.map(QuotaName::function),
        random_in_tiebreaks: !opts.no_random,
        pedantic_order: opts.pedantic_order,
        transfer_strategy: if opts.batch_transfers { TransferStrategy::AllAtOnce } else { TransferStrategy::Serial },
        seed: opts.seed,
    };
    let candidates : Vec<&str> = data.candidates.iter().map(String::as_str).collect();
    let mut poll = PreferencePoll::new(opts.method.into(),seats,&candidates,options)?;
    for entry in &data.ballots {
        let ranking : Vec<&str> = entry.ranking.iter().map(String::as_str).collect();
        poll.add_ballot(&ranking,entry.count)?;
    }

    let result = poll.calculate();
    let summary = result.summary();

    for (number,round) in summary.rounds.iter().enumerate() {
        eprintln!("Round {}: {:?} {} ({})",number+1,round.status,round.selected.join(", "),round.method);
    }
    eprintln!("{} of {} seats filled, quota {}, {:.6}s{}",
        summary.winners.len(),seats,summary.quota,summary.runtime,
        if summary.complete {""} else {" - INCOMPLETE"});

    match &opts.output {
        Some(path) => {
            serde_json::to_writer_pretty(File::create(path)?,&summary)?;
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout().lock(),&summary)?;
            println!();
        }
    }
    Ok(())
}
