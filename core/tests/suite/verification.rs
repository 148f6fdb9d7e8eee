//! Verification scenarios

use doppel_core::{DoppelError, ErrorKind, MockContext, Times, then};
use insta::assert_snapshot;
use serde_json::json;

use crate::common::{Bike, Methods, Person, Police};

#[test]
fn verifying_a_non_mock_fails() {
    let err = then("notMock").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAMock);
    assert_snapshot!(err.to_string(), @r#""notMock" is not a mock"#);
}

#[test]
fn verifying_a_non_mock_fails_whatever_the_cardinality() {
    // The identity check happens before a cardinality can even be given.
    for target in [json!("notMock"), json!(19), json!({ "not": "a mock" })] {
        let err = then(&target).unwrap_err();
        assert!(matches!(err, DoppelError::NotAMock { .. }));
    }
}

#[test]
fn verifying_no_more_interactions_on_a_non_mock_fails() {
    let not_a_mock = String::from("notMock");
    let err = then(&not_a_mock).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn expected_call_that_did_not_happen() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);

    let err = then(&mock)
        .unwrap()
        .should()
        .called(Methods::boolean_object_returning_method)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WantedButNotInvoked);
    assert_snapshot!(
        err.to_string(),
        @"wanted but not invoked: iMethods.booleanObjectReturningMethod() at least once, but was invoked 0 time(s)"
    );
}

#[test]
fn expected_call_that_happened() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);

    mock.boolean_object_returning_method().unwrap();

    then(&mock)
        .unwrap()
        .should()
        .called(Methods::boolean_object_returning_method)
        .unwrap();
}

#[test]
fn once_then_never() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);

    let err = then(&mock)
        .unwrap()
        .should()
        .called(Methods::void_method)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WantedButNotInvoked);

    mock.void_method().unwrap();
    then(&mock)
        .unwrap()
        .should()
        .called(Methods::void_method)
        .unwrap();
}

#[test]
fn mock_without_interactions() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);

    then(&mock).unwrap().should_have_zero_interactions().unwrap();
}

#[test]
fn mock_with_unwanted_interactions() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);

    mock.boolean_object_returning_method().unwrap();

    let err = then(&mock)
        .unwrap()
        .should_have_zero_interactions()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnwantedInteraction);
    assert_snapshot!(
        err.to_string(),
        @"unwanted interactions on iMethods: #1 iMethods.booleanObjectReturningMethod()"
    );
}

#[test]
fn fluent_scenario() {
    let ctx = MockContext::new();
    let bike = Bike;
    let person = Person::mock(&ctx);
    let police = Police::mock(&ctx);

    person.ride(&bike).unwrap();
    person.ride(&bike).unwrap();

    then(&person)
        .unwrap()
        .should()
        .times(2)
        .called(|p| p.ride(&bike))
        .unwrap();
    then(&police).unwrap().should_have_zero_interactions().unwrap();
}

#[test]
fn no_more_interactions_after_everything_was_verified() {
    let ctx = MockContext::new();
    let bike = Bike;
    let person = Person::mock(&ctx);

    person.ride(&bike).unwrap();
    person.ride(&bike).unwrap();

    let err = then(&person)
        .unwrap()
        .should_have_no_more_interactions()
        .unwrap_err();
    let DoppelError::UnwantedInteractions { invocations, .. } = &err else {
        panic!("expected UnwantedInteractions, got {err:?}");
    };
    assert_eq!(invocations.len(), 2);

    then(&person)
        .unwrap()
        .should()
        .times(2)
        .called(|p| p.ride(&bike))
        .unwrap();
    then(&person)
        .unwrap()
        .should_have_no_more_interactions()
        .unwrap();
}

#[test]
fn failures_serialize_with_their_data() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    mock.simple_method_with("actual").unwrap();

    let err = then(&mock)
        .unwrap()
        .should()
        .times(1)
        .called(|m| m.simple_method_with("wanted"))
        .unwrap_err();

    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["kind"], json!("wanted_but_not_invoked"));
    assert_eq!(value["detail"]["wanted"], json!("iMethods.simpleMethod(\"wanted\")"));
    assert_eq!(value["detail"]["actual"], json!(0));
    assert_eq!(
        value["detail"]["cardinality"],
        json!({ "mode": "exactly", "count": 1 })
    );
    assert_eq!(
        value["detail"]["similar"][0]["call"],
        json!("iMethods.simpleMethod(\"actual\")")
    );
    assert_eq!(
        value["detail"]["arguments_diff"],
        json!("1 -\"wanted\"\n1 +\"actual\"\n")
    );
}

#[test]
fn too_many_invocations_lists_them() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    mock.void_method().unwrap();
    mock.void_method().unwrap();
    mock.void_method().unwrap();

    let err = then(&mock)
        .unwrap()
        .should()
        .at_most(2)
        .called(Methods::void_method)
        .unwrap_err();
    let DoppelError::TooManyInvocations {
        cardinality,
        actual,
        invocations,
        ..
    } = &err
    else {
        panic!("expected TooManyInvocations, got {err:?}");
    };
    assert_eq!(*cardinality, Times::AtMost(2));
    assert_eq!(*actual, 3);
    assert_eq!(invocations.len(), 3);
    assert_snapshot!(
        err.to_string(),
        @"too many invocations: iMethods.voidMethod() at most 2 times, but was invoked 3 time(s)"
    );
}

#[test]
fn verification_does_not_record_calls() {
    let ctx = MockContext::new();
    let mock = Methods::mock(&ctx);
    mock.void_method().unwrap();

    for _ in 0..3 {
        then(&mock)
            .unwrap()
            .should()
            .times(1)
            .called(Methods::void_method)
            .unwrap();
    }
    assert_eq!(mock.handle().invocations().len(), 1);
    assert_eq!(ctx.invocations().len(), 1);
}
