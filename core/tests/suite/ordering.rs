//! In-order verification scenarios

use doppel_core::{DoppelError, ErrorKind, MockContext, Sequence, then};
use insta::assert_snapshot;

use crate::common::{Bike, Car, Methods, Person, Police};

#[test]
fn calls_in_the_right_order() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    let mut in_order = ctx.in_order(&[&mock]).unwrap();

    mock.boolean_object_returning_method().unwrap();
    mock.array_returning_method().unwrap();

    then(&mock)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(Methods::boolean_object_returning_method)
        .unwrap();
    then(&mock)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(Methods::array_returning_method)
        .unwrap();
}

#[test]
fn calls_in_the_wrong_order() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    let mut in_order = ctx.in_order(&[&mock]).unwrap();

    mock.array_returning_method().unwrap();
    mock.boolean_object_returning_method().unwrap();

    then(&mock)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(Methods::boolean_object_returning_method)
        .unwrap();
    let err = then(&mock)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(Methods::array_returning_method)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VerificationOrderFailure);
    let DoppelError::VerificationOrderFailure {
        cursor, earlier, ..
    } = &err
    else {
        panic!("expected VerificationOrderFailure, got {err:?}");
    };
    assert_eq!(*cursor, Some(Sequence::new(2)));
    assert_eq!(earlier.len(), 1);
    assert_eq!(earlier[0].sequence, Sequence::new(1));
    assert_snapshot!(
        err.to_string(),
        @"verification in order failed: iMethods.arrayReturningMethod() at least once, found 0 time(s) after the last verified call"
    );
}

#[test]
fn order_of_calls_that_did_not_happen() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    let mut in_order = ctx.in_order(&[&mock]).unwrap();

    let err = then(&mock)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(Methods::boolean_object_returning_method)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WantedButNotInvoked);
}

#[test]
fn fluent_scenario_in_order() {
    let ctx = MockContext::new();
    let bike = Bike;
    let car = Car;
    let person = Person::mock(&ctx);
    let mut in_order = ctx.in_order(&[&person]).unwrap();

    person.drive(&car).unwrap();
    person.ride(&bike).unwrap();
    person.ride(&bike).unwrap();

    then(&person)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(|p| p.drive(&car))
        .unwrap();
    then(&person)
        .unwrap()
        .should()
        .times(2)
        .in_order(&mut in_order)
        .called(|p| p.ride(&bike))
        .unwrap();
}

#[test]
fn fluent_scenario_in_order_for_two_mocks() {
    let ctx = MockContext::new();
    let car = Car;
    let person = Person::mock(&ctx);
    let police = Police::mock(&ctx);
    let mut in_order = ctx.in_order(&[&person, &police]).unwrap();

    person.drive(&car).unwrap();
    person.drive(&car).unwrap();
    police.chase(&car).unwrap();

    then(&person)
        .unwrap()
        .should()
        .times(2)
        .in_order(&mut in_order)
        .called(|p| p.drive(&car))
        .unwrap();
    then(&police)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(|p| p.chase(&car))
        .unwrap();
    assert_eq!(in_order.cursor(), Some(Sequence::new(3)));
}

#[test]
fn second_mock_cannot_be_verified_before_the_first_is_consumed() {
    let ctx = MockContext::new();
    let car = Car;
    let person = Person::mock(&ctx);
    let police = Police::mock(&ctx);
    let mut in_order = ctx.in_order(&[&person, &police]).unwrap();

    person.drive(&car).unwrap();
    person.drive(&car).unwrap();
    police.chase(&car).unwrap();

    then(&police)
        .unwrap()
        .should()
        .in_order(&mut in_order)
        .called(|p| p.chase(&car))
        .unwrap();
    let err = then(&person)
        .unwrap()
        .should()
        .times(2)
        .in_order(&mut in_order)
        .called(|p| p.drive(&car))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VerificationOrderFailure);
}

#[test]
fn one_of_a_run_of_two_is_an_order_failure() {
    let ctx = MockContext::new();
    let car = Car;
    let person = Person::mock(&ctx);
    let police = Police::mock(&ctx);
    let mut in_order = ctx.in_order(&[&person, &police]).unwrap();

    person.drive(&car).unwrap();
    person.drive(&car).unwrap();
    police.chase(&car).unwrap();

    let err = then(&person)
        .unwrap()
        .should()
        .times(1)
        .in_order(&mut in_order)
        .called(|p| p.drive(&car))
        .unwrap_err();
    assert!(matches!(
        err,
        DoppelError::VerificationOrderFailure { actual: 2, .. }
    ));
}

#[test]
fn sessions_do_not_share_cursors() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    mock.void_method().unwrap();

    for _ in 0..2 {
        let mut in_order = ctx.in_order(&[&mock]).unwrap();
        then(&mock)
            .unwrap()
            .should()
            .in_order(&mut in_order)
            .called(Methods::void_method)
            .unwrap();
    }
}

#[test]
fn in_order_rejects_non_mocks() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    let not_a_mock = "notMock";

    let err = ctx.in_order(&[&mock, &not_a_mock]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAMock);
}
