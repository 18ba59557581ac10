//! Declared argument shapes.

use std::fmt;

/// How many arguments a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
    /// No constraint.
    #[default]
    Any,
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    /// Inclusive range. A range with `min > max` accepts nothing and is
    /// rejected when a descriptor is built; use [`Arity::between`] to get
    /// ordered bounds.
    Between(usize, usize),
}

impl Arity {
    /// Inclusive range with its bounds put in order.
    pub fn between(a: usize, b: usize) -> Self {
        Self::Between(a.min(b), a.max(b))
    }

    /// Whether at least one argument count is accepted.
    pub fn is_satisfiable(self) -> bool {
        match self {
            Self::Between(min, max) => min <= max,
            _ => true,
        }
    }

    /// Whether `count` arguments satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::AtMost(n) => count <= n,
            Self::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

fn arguments(n: usize) -> String {
    if n == 1 {
        "1 argument".to_string()
    } else {
        format!("{n} arguments")
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Any => f.write_str("any number of arguments"),
            Self::Exactly(n) => write!(f, "exactly {}", arguments(n)),
            Self::AtLeast(n) => write!(f, "at least {}", arguments(n)),
            Self::AtMost(n) => write!(f, "at most {}", arguments(n)),
            Self::Between(min, max) => write!(f, "{min} to {max} arguments"),
        }
    }
}
