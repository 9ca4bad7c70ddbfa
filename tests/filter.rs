use pyexpr::{
    config,
    filter::{SubjectFilter, SubjectFilterError},
    subject::Subject,
    Evaluator,
};

fn student() -> Subject {
    config::load_subject("tests/fixtures/student.toml").unwrap()
}

#[test]
fn entitlement_filter() {
    let filter = SubjectFilter::default();
    let expression = r#"subject.attribute_statement.attributes["eduPersonEntitlement"].values[0] == "eresources""#;

    assert!(filter.execute(expression, &student()).unwrap());
}

#[test]
fn membership_filter() {
    let filter = SubjectFilter::default();

    assert!(filter
        .execute("'library' in subject.attribute_statement.attributes['eduPersonEntitlement'].values", &student())
        .unwrap());
    assert!(!filter
        .execute("'staff' in subject.attribute_statement.attributes['eduPersonEntitlement'].values", &student())
        .unwrap());
}

#[test]
fn name_id_fields() {
    let filter = SubjectFilter::default();

    assert!(filter
        .execute("subject.name_id.sp_name_qualifier == 'http://opds.hilbertteam.net/metadata/'", &student())
        .unwrap());
    assert!(filter.execute("subject.idp.startswith('http://idp.')", &student()).unwrap());
}

#[test]
fn missing_attribute_is_an_error() {
    let filter = SubjectFilter::default();
    let error = filter
        .execute("subject.attribute_statement.attributes['surname'].values[0] == 'Ent'", &student())
        .unwrap_err();

    assert!(matches!(error, SubjectFilterError::Expression { .. }));
    assert!(error.to_string().contains("'surname'"));
}

#[test]
fn cached_evaluator_gives_same_answers() {
    let filter = SubjectFilter::new(Evaluator::builder().cache(true).build());
    let expression = "subject.attribute_statement.attributes['uid'].values[0] == 'student1'";

    for _ in 0..3 {
        assert!(filter.execute(expression, &student()).unwrap());
    }
}

#[test]
fn validate_rejects_malformed_expressions() {
    let filter = SubjectFilter::default();

    assert!(filter.validate("subject.idp ==").is_err());
    assert!(filter.validate("subject.idp == 'x'").is_ok());
}
