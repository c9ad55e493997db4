//! User and referral relation models.

use serde::{Deserialize, Serialize};

use crate::models::Uid;

/// Immutable reference data for a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: Uid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// One edge of the referral forest.
///
/// Each user has at most one inviter; `None` marks a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralEdge {
    pub uid: Uid,
    pub inviter_uid: Option<Uid>,
}
