mod support;

use streamledger::domain::error::DomainError;
use streamledger::domain::ModuleRole;
use streamledger::error::LedgerError;
use streamledger::port::Event;
use streamledger::testkit::config::REWARD;
use streamledger::testkit::{viewer, TestChannel};

#[test]
fn first_mark_pays_reward_second_is_rejected() {
    let test = TestChannel::deploy();
    let v = viewer("v");
    test.attendance()
        .start_new_attendance(&test.admin(), 30)
        .unwrap();

    assert_eq!(test.attendance().mark_my_attendance(&v).unwrap(), REWARD);
    assert_eq!(
        test.attendance().mark_my_attendance(&v),
        Err(LedgerError::AlreadyMarked { viewer: v.clone() })
    );
    assert_eq!(test.balance(&v), REWARD);
    assert!(test.attendance().has_marked(&v));
}

#[test]
fn mark_before_any_session_is_rejected() {
    let test = TestChannel::deploy();
    assert_eq!(
        test.attendance().mark_my_attendance(&viewer("v")),
        Err(LedgerError::NoActiveSession)
    );
}

#[test]
fn mark_at_window_end_is_expired() {
    let test = TestChannel::deploy();
    let v = viewer("v");
    let session = test
        .attendance()
        .start_new_attendance(&test.admin(), 30)
        .unwrap();

    test.clock.advance_minutes(29);
    test.attendance().mark_my_attendance(&viewer("early")).unwrap();

    test.clock.advance_minutes(1);
    assert_eq!(
        test.attendance().mark_my_attendance(&v),
        Err(LedgerError::WindowExpired {
            closed_at: session.closes_at,
        })
    );
    assert_eq!(test.balance(&v), 0);
    assert!(!test.attendance().current_session().unwrap().open);
}

#[test]
fn new_session_resets_marks() {
    let test = TestChannel::deploy();
    let v = viewer("v");

    test.fund(&[&v], 2);

    assert_eq!(test.balance(&v), 2 * REWARD);
    assert_eq!(test.attendance().current_session().unwrap().attendees, 1);
}

#[test]
fn only_administrator_starts_sessions() {
    let test = TestChannel::deploy();
    let v = viewer("v");

    let result = test.attendance().start_new_attendance(&v, 30);

    assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    assert!(test.attendance().current_session().is_none());
}

#[test]
fn zero_minute_window_is_invalid() {
    let test = TestChannel::deploy();
    assert_eq!(
        test.attendance().start_new_attendance(&test.admin(), 0),
        Err(LedgerError::Invalid(DomainError::ZeroWindow))
    );
}

#[test]
fn revoked_attendance_module_leaves_session_untouched() {
    let test = TestChannel::deploy();
    let v = viewer("v");
    test.attendance()
        .start_new_attendance(&test.admin(), 30)
        .unwrap();
    test.ledger()
        .register_module(&test.admin(), ModuleRole::Attendance, viewer("elsewhere"))
        .unwrap();

    let result = test.attendance().mark_my_attendance(&v);

    assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    assert!(!test.attendance().has_marked(&v));
    assert_eq!(test.balance(&v), 0);
}

#[test]
fn reward_emits_credit_and_reward_events() {
    let test = TestChannel::deploy();
    let v = viewer("v");
    test.fund(&[&v], 1);

    assert_eq!(
        test.events
            .count(|e| matches!(e, Event::AttendanceRewarded(r) if r.viewer == v)),
        1
    );
    let credit = test.events.balance_events().pop().unwrap();
    assert_eq!(credit.role, ModuleRole::Attendance);
    assert_eq!(credit.balance_after, REWARD);
}
