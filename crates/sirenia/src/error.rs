use crate::scheduler::Direction;

/// Coarse classification of layout failures.
///
/// Every [`Error`] belongs to exactly one kind; callers that only care about "fix the options"
/// versus "fix the data" versus "fix the wiring" can match on this instead of the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A layout parameter is incompatible with another one (e.g. gaps eat the whole circle).
    Configuration,
    /// The flow data makes proportional allocation undefined.
    InvalidData,
    /// Something was looked up against an arc or ribbon it does not belong to.
    Lookup,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(
        "cumulative gap angle {total_gap} ({gap} x {entity_count} entities) must be smaller than max_angle {max_angle}; reduce gap_angle"
    )]
    GapExceedsMaxAngle {
        gap: f64,
        entity_count: usize,
        total_gap: f64,
        max_angle: f64,
    },

    #[error("invalid layout option `{option}`: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },

    #[error("sum of entity amounts is zero; proportional allocation is undefined")]
    ZeroTotalAmount,

    #[error("entity `{key}` has a total amount of zero")]
    ZeroEntityAmount { key: String },

    #[error("flow #{index} has invalid amount {amount}; amounts must be finite and >= 0")]
    InvalidAmount { index: usize, amount: f64 },

    #[error("entity `{key}` is listed in the layout order but has no incident flows")]
    UnknownEntity { key: String },

    #[error(
        "wrong direction or wrong arc: flow #{flow_index} ({direction}) is not registered on `{key}`"
    )]
    EndpointNotRegistered {
        key: String,
        flow_index: usize,
        direction: Direction,
    },

    #[error("no arc for entity `{key}`")]
    ArcNotFound { key: String },

    #[error("no ribbon for `{key}`")]
    RibbonNotFound { key: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::GapExceedsMaxAngle { .. } | Error::InvalidOption { .. } => {
                ErrorKind::Configuration
            }
            Error::ZeroTotalAmount
            | Error::ZeroEntityAmount { .. }
            | Error::InvalidAmount { .. }
            | Error::UnknownEntity { .. } => ErrorKind::InvalidData,
            Error::EndpointNotRegistered { .. }
            | Error::ArcNotFound { .. }
            | Error::RibbonNotFound { .. } => ErrorKind::Lookup,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
