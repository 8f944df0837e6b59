//! Authentication and ownership guards
//!
//! [`Viewer`] is the request's possibly-anonymous identity. Every mutation
//! starts with [`Viewer::require_user`], and every delete or dislike runs
//! [`assert_owner`] before touching the store.

use crate::models::Owned;

use super::LedgerError;

/// Identity behind a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    user_id: Option<i64>,
}

impl Viewer {
    /// A visitor without a session
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// A signed-in user
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Whether a session was presented
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// The signed-in user's ID, if any
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// The signed-in user's ID, or `Unauthenticated`
    pub fn require_user(&self) -> Result<i64, LedgerError> {
        self.user_id.ok_or(LedgerError::Unauthenticated)
    }
}

/// Fail unless `viewer` owns `entity`.
///
/// Anonymous viewers get `Unauthenticated`; signed-in non-owners get `Forbidden`.
pub fn assert_owner<T: Owned>(entity: &T, viewer: &Viewer) -> Result<(), LedgerError> {
    let user_id = viewer.require_user()?;
    if entity.owner_id() != user_id {
        tracing::warn!(
            user_id,
            owner_id = entity.owner_id(),
            "Rejected action on a record owned by another user"
        );
        return Err(LedgerError::Forbidden(
            "Only the owner can do that".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(i64);

    impl Owned for Thing {
        fn owner_id(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_viewer_identity() {
        assert!(!Viewer::anonymous().is_authenticated());
        assert_eq!(Viewer::anonymous().user_id(), None);
        assert!(Viewer::user(3).is_authenticated());
        assert_eq!(Viewer::user(3).require_user().unwrap(), 3);
        assert!(matches!(
            Viewer::anonymous().require_user(),
            Err(LedgerError::Unauthenticated)
        ));
    }

    #[test]
    fn test_assert_owner() {
        let thing = Thing(1);
        assert!(assert_owner(&thing, &Viewer::user(1)).is_ok());
        assert!(matches!(
            assert_owner(&thing, &Viewer::user(2)),
            Err(LedgerError::Forbidden(_))
        ));
        assert!(matches!(
            assert_owner(&thing, &Viewer::anonymous()),
            Err(LedgerError::Unauthenticated)
        ));
    }
}
