//! Recursion-depth guard for the decoder.
//!
//! Unlike the teacher's `DepthTracker` (a `Vec<u32>` of remaining sibling
//! counts, used to bound a push-based serializer that doesn't know its own
//! call depth), this decoder's recursion *is* its own depth: `read` calls
//! itself once per nested Array/Map element, so a plain counter threaded
//! through those calls is enough to cap native stack usage on adversarial
//! input.

use crate::error::DecodeError;

/// Maximum nesting depth `decode` will follow before giving up with
/// [`DecodeError::NestingTooDeep`].
pub const MAX_DEPTH: u32 = 1024;

/// Checks `depth` against [`MAX_DEPTH`] before a composite value is allowed
/// to recurse one level deeper.
pub(crate) fn check_depth(depth: u32) -> Result<(), DecodeError> {
    if depth > MAX_DEPTH {
        Err(DecodeError::NestingTooDeep { limit: MAX_DEPTH })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_at_the_limit_is_allowed() {
        assert!(check_depth(MAX_DEPTH).is_ok());
    }

    #[test]
    fn depth_past_the_limit_is_rejected() {
        assert_eq!(
            check_depth(MAX_DEPTH + 1),
            Err(DecodeError::NestingTooDeep { limit: MAX_DEPTH })
        );
    }
}
