use nix::unistd::{Gid, Group, Uid, User};
use tracing::debug;

/// Resolves numeric owner and group ids to display names.
///
/// `None` means the name is unknown; callers fall back to the number.
pub trait IdentityLookup {
    /// Name of the user with id `uid`.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Name of the group with id `gid`.
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Looks identities up through the system user and group databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentityLookup for SystemIdentity {
    fn user_name(&self, uid: u32) -> Option<String> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(user) => user.map(|u| u.name),
            Err(e) => {
                debug!(uid, error = %e, "user lookup failed");
                None
            },
        }
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        match Group::from_gid(Gid::from_raw(gid)) {
            Ok(group) => group.map(|g| g.name),
            Err(e) => {
                debug!(gid, error = %e, "group lookup failed");
                None
            },
        }
    }
}

/// Never resolves a name, so listings show numeric ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericIdentity;

impl IdentityLookup for NumericIdentity {
    fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }

    fn group_name(&self, _gid: u32) -> Option<String> {
        None
    }
}
