use miette::Diagnostic;

/// The engine needs at least one action to propose.
#[derive(
    Debug, thiserror::Error, Diagnostic, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash,
)]
#[error("Can't build a learner over an empty action space")]
#[diagnostic(help = "Construct the learner with a nonempty set of action ids")]
pub struct EmptyActionSpace;

/// A state string the engine cannot accept.
///
/// States are either binary (every character `'0'` or `'1'`) or real-valued
/// (`';'`-separated decimal tokens); once a session has seen a state, all
/// later states must have the same number of lines.
#[derive(Debug, thiserror::Error, Diagnostic, PartialEq, Clone)]
pub enum InvalidInput {
    #[error("state string is empty")]
    #[diagnostic(help = "A state must encode at least one input line")]
    EmptyState,

    #[error("state token {token:?} is not a real number")]
    #[diagnostic(help = "Real-valued states are `;`-separated decimals, e.g. \"0.25;0.75\"")]
    MalformedToken { token: String },

    #[error("state has {actual} input lines where this session's states have {expected}")]
    #[diagnostic(
        help = "All states in one session share a dimensionality; call `reset` to start over"
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Any error an [`XcsLearner`](crate::learner::XcsLearner) entry point can
/// report.
#[derive(Debug, thiserror::Error, Diagnostic, PartialEq, Clone)]
pub enum XcsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error(transparent)]
    #[diagnostic(transparent)]
    EmptyActionSpace(#[from] EmptyActionSpace),
}
