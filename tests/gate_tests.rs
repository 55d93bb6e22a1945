use tubetldr::core::gate::Gate;
use tubetldr::core::ledger::DedupLedger;

#[test]
fn test_six_acquires_against_capacity_five() {
    let gate = Gate::new(5);

    let attempts: Vec<_> = (0..6).map(|_| gate.try_acquire()).collect();
    let granted = attempts.iter().filter(|p| p.is_some()).count();

    assert_eq!(granted, 5);
    assert!(attempts[5].is_none(), "the sixth acquire must fail immediately");
    assert_eq!(gate.available(), 0);
}

#[test]
fn test_dropping_permit_admits_next() {
    let gate = Gate::new(1);
    let held = gate.try_acquire().expect("first permit");
    assert!(gate.try_acquire().is_none());

    drop(held);

    assert!(gate.try_acquire().is_some());
    assert_eq!(gate.available(), 1, "temporary permit was released on drop");
}

#[test]
fn test_clones_share_permits() {
    let gate = Gate::new(2);
    let other = gate.clone();

    let _a = gate.try_acquire().unwrap();
    let _b = other.try_acquire().unwrap();

    assert!(gate.try_acquire().is_none());
    assert_eq!(other.capacity(), 2);
}

#[test]
fn test_ledger_seen_and_mark() {
    let mut ledger = DedupLedger::new();
    assert!(ledger.is_empty());
    assert!(!ledger.seen("abc"));

    ledger.mark_seen("abc");
    ledger.mark_seen("abc");

    assert!(ledger.seen("abc"));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_ledger_reservations() {
    let mut ledger = DedupLedger::new();

    assert!(ledger.reserve("abc"));
    assert!(!ledger.reserve("abc"), "second reservation must be refused");
    assert!(ledger.is_in_flight("abc"));
    assert_eq!(ledger.in_flight_len(), 1);

    ledger.release("abc");

    assert!(!ledger.is_in_flight("abc"));
    assert!(ledger.reserve("abc"));
    // Reservations never count as processed.
    assert_eq!(ledger.len(), 0);
}
