//! Shot tallies: a pure fold over recognized call sites.

use serde::{Deserialize, Serialize};

use crate::calls::{CallPattern, CallSite, ShotArg, find_call_sites};
use crate::error::{AnalysisError, AnalysisResult};

/// Submission counts of a program or bundle.
///
/// The six fields are the statement count and summed literal shots of each
/// submission class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTally {
    pub quantum_tasks: u64,
    pub quantum_task_shots: u64,
    pub batches: u64,
    pub batch_shots: u64,
    pub executes: u64,
    pub execute_shots: u64,
}

impl ShotTally {
    /// Whether no submission was recognized.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// All submission statements of any class, `None` on overflow.
    pub fn total_statements(&self) -> Option<u64> {
        self.quantum_tasks
            .checked_add(self.batches)?
            .checked_add(self.executes)
    }

    /// All shots of any class, `None` on overflow.
    pub fn total_shots(&self) -> Option<u64> {
        self.quantum_task_shots
            .checked_add(self.batch_shots)?
            .checked_add(self.execute_shots)
    }

    /// Field-wise sum, `None` when any count overflows.
    pub fn checked_add(self, rhs: ShotTally) -> Option<ShotTally> {
        Some(ShotTally {
            quantum_tasks: self.quantum_tasks.checked_add(rhs.quantum_tasks)?,
            quantum_task_shots: self.quantum_task_shots.checked_add(rhs.quantum_task_shots)?,
            batches: self.batches.checked_add(rhs.batches)?,
            batch_shots: self.batch_shots.checked_add(rhs.batch_shots)?,
            executes: self.executes.checked_add(rhs.executes)?,
            execute_shots: self.execute_shots.checked_add(rhs.execute_shots)?,
        })
    }

    /// Sum of many tallies. Fails instead of wrapping.
    pub fn try_sum(tallies: impl IntoIterator<Item = ShotTally>) -> AnalysisResult<ShotTally> {
        tallies
            .into_iter()
            .try_fold(ShotTally::default(), |acc, tally| {
                acc.checked_add(tally).ok_or(AnalysisError::ShotCountOverflow)
            })
    }
}

impl CallPattern {
    /// The tally contributed by one call of this pattern with `shots` shots.
    pub fn contribution(self, shots: u64) -> ShotTally {
        match self {
            CallPattern::DeviceRun | CallPattern::CreateQuantumTask => ShotTally {
                quantum_tasks: 1,
                quantum_task_shots: shots,
                ..ShotTally::default()
            },
            CallPattern::DeviceRunBatch => ShotTally {
                batches: 1,
                batch_shots: shots,
                ..ShotTally::default()
            },
            CallPattern::QiskitExecute => ShotTally {
                executes: 1,
                execute_shots: shots,
                ..ShotTally::default()
            },
        }
    }
}

/// Fold call sites into a tally. The first unresolvable shot argument
/// rejects the whole estimate.
pub fn tally_calls<'a>(sites: impl IntoIterator<Item = &'a CallSite>) -> AnalysisResult<ShotTally> {
    sites.into_iter().try_fold(ShotTally::default(), |acc, site| {
        let shots = match &site.shots {
            ShotArg::Literal(n) => *n,
            ShotArg::Expression(expr) => {
                return Err(AnalysisError::AmbiguousShotCount {
                    call: site.pattern.to_string(),
                    line: site.line,
                    expression: expr.clone(),
                });
            }
            ShotArg::Missing => {
                return Err(AnalysisError::AmbiguousShotCount {
                    call: site.pattern.to_string(),
                    line: site.line,
                    expression: "<no shots argument>".into(),
                });
            }
        };
        acc.checked_add(site.pattern.contribution(shots))
            .ok_or(AnalysisError::ShotCountOverflow)
    })
}

/// Tally a single program source.
pub fn tally_source(source: &str) -> AnalysisResult<ShotTally> {
    let sites = find_call_sites(source);
    tally_calls(&sites)
}
