// Moderation: validation for the privileged kick path.
//
// A kick request moves through Requested -> Validated -> Executed; validation
// happens here, execution (notify, close, unregister) is driven by the arena
// task so the ordering guarantees hold on the outbound channel.

use crate::domain::PlayerId;
use crate::use_cases::registry::PlayerRegistry;

/// Reasons a kick request is rejected. None of these are reported back to the
/// requester; unauthorized requests fail silently by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickRejection {
    RequesterUnknown,
    RequesterNotAdmin,
    TargetUnknown,
    SelfKick,
}

/// Validates a kick request against the current registry.
///
/// Returns the target id once the request is safe to execute.
pub fn validate_kick(
    registry: &PlayerRegistry,
    requester: PlayerId,
    target: PlayerId,
) -> Result<PlayerId, KickRejection> {
    let requester_record = registry
        .get(requester)
        .ok_or(KickRejection::RequesterUnknown)?;

    if !requester_record.is_admin() {
        return Err(KickRejection::RequesterNotAdmin);
    }
    if requester == target {
        return Err(KickRejection::SelfKick);
    }
    if !registry.contains(target) {
        return Err(KickRejection::TargetUnknown);
    }

    Ok(target)
}
