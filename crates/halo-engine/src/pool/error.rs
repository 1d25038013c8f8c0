use std::fmt;

/// Why the pool could not hand out a context.
///
/// None of these are fatal: callers are expected to fall back (for instance to
/// a static placeholder) and carry on.
#[derive(Debug)]
pub enum AllocationError {
    /// No drawing surface was supplied.
    MissingSurface,
    /// Every beacon slot is taken.
    CapacityExhausted { max: usize },
    /// The factory could not bind a native context to the surface.
    ContextCreationFailed(anyhow::Error),
}

impl AllocationError {
    /// True for refusals decided by the pool itself, as opposed to native failures.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::MissingSurface | Self::CapacityExhausted { .. })
    }
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSurface => f.write_str("allocation denied: no drawing surface"),
            Self::CapacityExhausted { max } => {
                write!(f, "allocation denied: maximum beacon limit ({max}) reached")
            }
            Self::ContextCreationFailed(err) => write!(f, "context creation failed: {err:#}"),
        }
    }
}

impl std::error::Error for AllocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ContextCreationFailed(err) => Some(&**err),
            _ => None,
        }
    }
}
