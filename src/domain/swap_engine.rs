//! Swap transaction engine.
//!
//! Pure functions that validate and compute the outcome of creating and
//! accepting a swap. They never touch storage: a store loads the records,
//! calls into this module on copies, and persists the results only when
//! every check has passed. That is what lets both store implementations
//! commit the three-record update of an accepted swap all-or-nothing.

use chrono::Utc;
use serde::Serialize;

use super::{CallerIdentity, Event, EventStatus, SwapRequest, SwapRequestId, SwapStatus, UserId};
use crate::error::SwapperError;

/// The three records written by an accepted swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettledSwap {
    /// The request, now `accepted`.
    pub request: SwapRequest,
    /// The slot the requester offered, now owned by the responder.
    pub offered_event: Event,
    /// The slot the requester asked for, now owned by the requester.
    pub requested_event: Event,
}

/// Builds a pending swap request from `requester`'s `offer` for `target`.
///
/// Both slots are snapshotted; the responder is whoever owns `target` now.
///
/// # Errors
///
/// - [`SwapperError::InvalidRequest`] if both ids name the same event or
///   the requester already owns the target.
/// - [`SwapperError::Forbidden`] if the requester does not own `offer`.
pub fn propose(
    requester: &CallerIdentity,
    target: &Event,
    offer: &Event,
) -> Result<SwapRequest, SwapperError> {
    if target.id == offer.id {
        return Err(SwapperError::InvalidRequest(
            "target and offered event must differ".to_string(),
        ));
    }
    if target.is_owned_by(requester.user_id) {
        return Err(SwapperError::InvalidRequest(format!(
            "event {} already belongs to the requester",
            target.id
        )));
    }
    offer.ensure_owner(requester.user_id, "offer")?;

    let now = Utc::now();
    Ok(SwapRequest {
        id: SwapRequestId::new(),
        requester_id: requester.user_id,
        requester_name: requester.name.clone(),
        responder_id: target.owner_id,
        responder_name: target.owner_name.clone(),
        offered_slot: offer.snapshot(),
        requested_slot: target.snapshot(),
        status: SwapStatus::Pending,
        created_at: now,
        updated_at: now,
    })
}

/// Checks that `caller` may settle `request` and that it is still open.
///
/// Run before the referenced events are loaded so that a wrong caller
/// gets `Forbidden` regardless of the events' state.
///
/// # Errors
///
/// [`SwapperError::Forbidden`] for non-responders, then
/// [`SwapperError::Conflict`] for settled requests.
pub fn authorize_settlement(request: &SwapRequest, caller: UserId) -> Result<(), SwapperError> {
    request.ensure_responder(caller, "accept")?;
    request.ensure_pending()
}

/// Exchanges ownership of the two slots and marks the request accepted.
///
/// All checks run before the first write, so on error the three arguments
/// are left exactly as they were.
///
/// # Errors
///
/// - [`SwapperError::Forbidden`] / [`SwapperError::Conflict`] as in
///   [`authorize_settlement`].
/// - [`SwapperError::Internal`] if the events do not match the request.
/// - [`SwapperError::Conflict`] if either event changed hands since the
///   request was made.
pub fn settle(
    request: &mut SwapRequest,
    offered: &mut Event,
    requested: &mut Event,
    caller: UserId,
) -> Result<(), SwapperError> {
    authorize_settlement(request, caller)?;

    if offered.id != request.offered_slot.event_id
        || requested.id != request.requested_slot.event_id
        || offered.id == requested.id
    {
        return Err(SwapperError::Internal(format!(
            "events do not match swap request {}",
            request.id
        )));
    }
    if !offered.is_owned_by(request.requester_id) || !requested.is_owned_by(request.responder_id)
    {
        return Err(SwapperError::Conflict(format!(
            "swap request {} is stale: a slot has changed owner",
            request.id
        )));
    }

    let now = Utc::now();
    std::mem::swap(&mut offered.owner_id, &mut requested.owner_id);
    std::mem::swap(&mut offered.owner_name, &mut requested.owner_name);
    for event in [&mut *offered, &mut *requested] {
        event.status = EventStatus::Busy;
        event.updated_at = now;
    }
    request.status = SwapStatus::Accepted;
    request.updated_at = now;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{NewEvent, UserId};

    fn user(name: &str) -> CallerIdentity {
        CallerIdentity::new(UserId::new(), name)
    }

    fn event(owner: &CallerIdentity, title: &str, status: EventStatus) -> Event {
        let Ok(draft) = NewEvent::new(title, "2024-01-01T09:00", "2024-01-01T17:00", status) else {
            panic!("valid draft");
        };
        Event::create(draft, owner)
    }

    struct Fixture {
        alice: CallerIdentity,
        bob: CallerIdentity,
        shift1: Event,
        shift2: Event,
        request: SwapRequest,
    }

    fn fixture() -> Fixture {
        let alice = user("alice");
        let bob = user("bob");
        let shift1 = event(&alice, "Shift1", EventStatus::Swappable);
        let shift2 = event(&bob, "Shift2", EventStatus::Swappable);
        let Ok(request) = propose(&bob, &shift1, &shift2) else {
            panic!("proposal should succeed");
        };
        Fixture {
            alice,
            bob,
            shift1,
            shift2,
            request,
        }
    }

    #[test]
    fn propose_snapshots_both_slots() {
        let f = fixture();
        assert_eq!(f.request.status, SwapStatus::Pending);
        assert_eq!(f.request.requester_id, f.bob.user_id);
        assert_eq!(f.request.responder_id, f.alice.user_id);
        assert_eq!(f.request.responder_name, "alice");
        assert_eq!(f.request.offered_slot, f.shift2.snapshot());
        assert_eq!(f.request.requested_slot, f.shift1.snapshot());
    }

    #[test]
    fn propose_requires_owning_the_offer() {
        let f = fixture();
        let carol = user("carol");
        let result = propose(&carol, &f.shift1, &f.shift2);
        assert!(matches!(result, Err(SwapperError::Forbidden(_))));
    }

    #[test]
    fn propose_rejects_own_target_and_same_event() {
        let f = fixture();
        let own = event(&f.bob, "Shift3", EventStatus::Busy);
        assert!(matches!(
            propose(&f.bob, &own, &f.shift2),
            Err(SwapperError::InvalidRequest(_))
        ));
        assert!(matches!(
            propose(&f.bob, &f.shift2, &f.shift2),
            Err(SwapperError::InvalidRequest(_))
        ));
    }

    #[test]
    fn settle_exchanges_owners_and_marks_busy() {
        let mut f = fixture();
        let (mut offered, mut requested) = (f.shift2.clone(), f.shift1.clone());

        let result = settle(&mut f.request, &mut offered, &mut requested, f.alice.user_id);
        assert!(result.is_ok());

        assert_eq!(offered.owner_id, f.alice.user_id);
        assert_eq!(offered.owner_name, "alice");
        assert_eq!(requested.owner_id, f.bob.user_id);
        assert_eq!(requested.owner_name, "bob");
        assert_eq!(offered.status, EventStatus::Busy);
        assert_eq!(requested.status, EventStatus::Busy);
        assert_eq!(f.request.status, SwapStatus::Accepted);
    }

    #[test]
    fn settle_by_requester_is_forbidden_and_mutates_nothing() {
        let mut f = fixture();
        let before = (f.request.clone(), f.shift2.clone(), f.shift1.clone());
        let (mut offered, mut requested) = (f.shift2.clone(), f.shift1.clone());

        let result = settle(&mut f.request, &mut offered, &mut requested, f.bob.user_id);
        assert!(matches!(result, Err(SwapperError::Forbidden(_))));
        assert_eq!((f.request, offered, requested), before);
    }

    #[test]
    fn settle_twice_conflicts() {
        let mut f = fixture();
        let (mut offered, mut requested) = (f.shift2.clone(), f.shift1.clone());
        assert!(settle(&mut f.request, &mut offered, &mut requested, f.alice.user_id).is_ok());

        let snapshot = (offered.clone(), requested.clone());
        let again = settle(&mut f.request, &mut offered, &mut requested, f.alice.user_id);
        assert!(matches!(again, Err(SwapperError::Conflict(_))));
        assert_eq!((offered, requested), snapshot);
    }

    #[test]
    fn settle_detects_stale_ownership() {
        let mut f = fixture();
        let carol = user("carol");
        let mut offered = f.shift2.clone();
        offered.owner_id = carol.user_id;
        let mut requested = f.shift1.clone();

        let result = settle(&mut f.request, &mut offered, &mut requested, f.alice.user_id);
        assert!(matches!(result, Err(SwapperError::Conflict(_))));
        assert_eq!(f.request.status, SwapStatus::Pending);
        assert_eq!(requested.owner_id, f.alice.user_id);
    }

    #[test]
    fn settle_rejects_mismatched_events() {
        let mut f = fixture();
        let mut offered = event(&f.bob, "Other", EventStatus::Busy);
        let mut requested = f.shift1.clone();
        let result = settle(&mut f.request, &mut offered, &mut requested, f.alice.user_id);
        assert!(matches!(result, Err(SwapperError::Internal(_))));
    }
}
