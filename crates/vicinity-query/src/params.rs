//! Query parameter bags.

use crate::error::{QueryError, Result};

/// Tagged query parameters, one variant per query mode.
///
/// Validated eagerly at query entry and matched exhaustively by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryMode {
    /// Fixed-radius ball query: all points within `r_max`.
    Ball { r_max: f64, exclude_self: bool },
    /// k-nearest-neighbor query.
    Nearest { k: usize, exclude_self: bool },
}

impl QueryMode {
    /// Ball query with `exclude_self = false`.
    pub fn ball(r_max: f64) -> Self {
        Self::Ball {
            r_max,
            exclude_self: false,
        }
    }

    /// k-NN query with `exclude_self = false`.
    pub fn nearest(k: usize) -> Self {
        Self::Nearest {
            k,
            exclude_self: false,
        }
    }

    /// Toggle self-exclusion (only meaningful for self-queries, where the
    /// query points are the indexed points).
    pub fn exclude_self(self, exclude: bool) -> Self {
        match self {
            Self::Ball { r_max, .. } => Self::Ball {
                r_max,
                exclude_self: exclude,
            },
            Self::Nearest { k, .. } => Self::Nearest {
                k,
                exclude_self: exclude,
            },
        }
    }

    /// True when the mode excludes i == j pairs.
    pub fn excludes_self(&self) -> bool {
        match *self {
            Self::Ball { exclude_self, .. } | Self::Nearest { exclude_self, .. } => exclude_self,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Self::Ball { r_max, .. } => {
                if !(r_max > 0.0 && r_max.is_finite()) {
                    return Err(QueryError::InvalidParameter(format!(
                        "r_max must be positive and finite, got {r_max}"
                    )));
                }
            }
            Self::Nearest { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(QueryMode::ball(1.0).validate().is_ok());
        assert!(QueryMode::ball(0.0).validate().is_err());
        assert!(QueryMode::ball(-1.0).validate().is_err());
        assert!(QueryMode::ball(f64::NAN).validate().is_err());
        assert!(QueryMode::ball(f64::INFINITY).validate().is_err());
        assert!(QueryMode::nearest(0).validate().is_ok());
    }

    #[test]
    fn test_exclude_toggle() {
        let m = QueryMode::nearest(4).exclude_self(true);
        assert!(m.excludes_self());
        assert_eq!(
            m,
            QueryMode::Nearest {
                k: 4,
                exclude_self: true
            }
        );
    }
}
