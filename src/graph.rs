//! Referral graph lookups.
//!
//! One- and two-hop ancestor and descendant queries over the referral
//! forest. The forest is assumed acyclic; a misconfigured cycle is not
//! detected and yields incorrect but non-crashing attributions, since every
//! walk is capped at two hops by construction.

use crate::models::Uid;

/// Ancestor/descendant lookups over the referral forest.
///
/// Implementors provide the one-hop queries; the two-hop queries are
/// derived. Unknown users and roots both answer `None` / empty.
pub trait ReferralGraph {
    /// Direct inviter of `uid`.
    fn inviter_of(&self, uid: Uid) -> Option<Uid>;

    /// Users directly invited by `uid`.
    fn invitees_of(&self, uid: Uid) -> Vec<Uid>;

    /// Inviter of the inviter, or `None` if either hop is absent.
    fn second_level_inviter_of(&self, uid: Uid) -> Option<Uid> {
        self.inviter_of(uid).and_then(|up| self.inviter_of(up))
    }

    /// Users invited by `uid`'s direct invitees.
    fn second_level_invitees_of(&self, uid: Uid) -> Vec<Uid> {
        self.invitees_of(uid)
            .into_iter()
            .flat_map(|invitee| self.invitees_of(invitee))
            .collect()
    }
}
