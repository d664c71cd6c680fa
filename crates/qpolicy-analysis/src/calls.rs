//! Recognition of quantum-task submitting call sites.
//!
//! A call site is `receiver.method(args...)` where the receiver is a bare
//! name (not itself an attribute such as `self.device`). Four patterns are
//! recognized; each knows where its shot argument lives.

use serde::{Deserialize, Serialize};

use crate::lexer::{SpannedToken, Token, line_of, tokenize};

/// A recognized submission call pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallPattern {
    /// `device.run(task, shots)`: one Braket quantum task.
    DeviceRun,
    /// `braket_client.create_quantum_task(..., shots=n)`: one Braket quantum task.
    CreateQuantumTask,
    /// `device.run_batch(tasks, shots)`: a Braket task batch.
    DeviceRunBatch,
    /// `qiskit.execute(circuits, backend, shots)`: a Qiskit execution.
    QiskitExecute,
}

impl CallPattern {
    /// All recognized patterns.
    pub const ALL: [CallPattern; 4] = [
        CallPattern::DeviceRun,
        CallPattern::CreateQuantumTask,
        CallPattern::DeviceRunBatch,
        CallPattern::QiskitExecute,
    ];

    /// Receiver name the pattern is bound to.
    pub fn receiver(self) -> &'static str {
        match self {
            CallPattern::DeviceRun | CallPattern::DeviceRunBatch => "device",
            CallPattern::CreateQuantumTask => "braket_client",
            CallPattern::QiskitExecute => "qiskit",
        }
    }

    /// Method name the pattern is bound to.
    pub fn method(self) -> &'static str {
        match self {
            CallPattern::DeviceRun => "run",
            CallPattern::CreateQuantumTask => "create_quantum_task",
            CallPattern::DeviceRunBatch => "run_batch",
            CallPattern::QiskitExecute => "execute",
        }
    }

    /// Zero-based positional index of the shot argument, if it may be passed
    /// positionally.
    pub fn shots_position(self) -> Option<usize> {
        match self {
            CallPattern::DeviceRun | CallPattern::DeviceRunBatch => Some(1),
            CallPattern::QiskitExecute => Some(2),
            CallPattern::CreateQuantumTask => None,
        }
    }

    /// Look up the pattern for a `receiver.method` pair.
    pub fn lookup(receiver: &str, method: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.receiver() == receiver && p.method() == method)
    }
}

impl std::fmt::Display for CallPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.receiver(), self.method())
    }
}

/// The shot argument of a call as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotArg {
    /// An integer literal.
    Literal(u64),
    /// Any other expression, kept as source text.
    Expression(String),
    /// The call passes no shot argument.
    Missing,
}

/// One recognized call in a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub pattern: CallPattern,
    pub shots: ShotArg,
    /// 1-based source line.
    pub line: usize,
}

/// A single call argument: optional keyword plus its value tokens.
struct Argument<'a> {
    keyword: Option<&'a str>,
    value: &'a [SpannedToken],
}

/// Scan a program source for recognized call sites, in source order.
pub fn find_call_sites(source: &str) -> Vec<CallSite> {
    let tokens = tokenize(source);
    let mut sites = Vec::new();

    let mut i = 0;
    while i + 3 < tokens.len() {
        let pattern = match (
            &tokens[i].token,
            &tokens[i + 1].token,
            &tokens[i + 2].token,
            &tokens[i + 3].token,
        ) {
            (Token::Identifier(recv), Token::Dot, Token::Identifier(method), Token::LParen) => {
                let is_attribute = i > 0 && tokens[i - 1].token == Token::Dot;
                if is_attribute {
                    None
                } else {
                    CallPattern::lookup(recv, method)
                }
            }
            _ => None,
        };

        let Some(pattern) = pattern else {
            i += 1;
            continue;
        };

        let open = i + 3;
        let close = matching_close(&tokens, open);
        let args = split_arguments(&tokens[open + 1..close]);
        let shots = shot_argument(source, pattern, &args);
        let line = line_of(source, tokens[i].span.start);

        tracing::debug!("Found {} at line {} with shots {:?}", pattern, line, shots);
        sites.push(CallSite {
            pattern,
            shots,
            line,
        });

        // Nested calls inside the argument list are still scanned.
        i = open + 1;
    }

    sites
}

/// Index of the token closing the group opened at `open`, or the token count
/// if the group is unterminated.
fn matching_close(tokens: &[SpannedToken], open: usize) -> usize {
    let mut depth = 0usize;
    for (idx, t) in tokens.iter().enumerate().skip(open) {
        if t.token.opens_group() {
            depth += 1;
        } else if t.token.closes_group() {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return idx;
            }
        }
    }
    tokens.len()
}

fn split_arguments(tokens: &[SpannedToken]) -> Vec<Argument<'_>> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, t) in tokens.iter().enumerate() {
        if t.token.opens_group() {
            depth += 1;
        } else if t.token.closes_group() {
            depth = depth.saturating_sub(1);
        } else if t.token == Token::Comma && depth == 0 {
            push_argument(&mut args, &tokens[start..idx]);
            start = idx + 1;
        }
    }
    push_argument(&mut args, &tokens[start..]);

    args
}

fn push_argument<'a>(args: &mut Vec<Argument<'a>>, tokens: &'a [SpannedToken]) {
    match tokens {
        [] => {}
        [
            SpannedToken {
                token: Token::Identifier(name),
                ..
            },
            SpannedToken {
                token: Token::Assign,
                ..
            },
            value @ ..,
        ] => args.push(Argument {
            keyword: Some(name.as_str()),
            value,
        }),
        value => args.push(Argument {
            keyword: None,
            value,
        }),
    }
}

fn shot_argument(source: &str, pattern: CallPattern, args: &[Argument<'_>]) -> ShotArg {
    let keyword = args.iter().find(|a| a.keyword == Some("shots"));
    let positional = pattern.shots_position().and_then(|pos| {
        args.iter()
            .take_while(|a| a.keyword.is_none())
            .nth(pos)
    });

    match keyword.or(positional) {
        Some(arg) => classify(source, arg.value),
        None => ShotArg::Missing,
    }
}

fn classify(source: &str, value: &[SpannedToken]) -> ShotArg {
    match value {
        [
            SpannedToken {
                token: Token::IntLiteral(n),
                ..
            },
        ] => ShotArg::Literal(*n),
        [] => ShotArg::Missing,
        [first, .., last] => ShotArg::Expression(source[first.span.start..last.span.end].to_string()),
        [only] => ShotArg::Expression(source[only.span.clone()].to_string()),
    }
}
