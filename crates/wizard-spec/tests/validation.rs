use serde_json::json;

use wizard_spec::{
    FieldKind, FormFactory, FormManager, QuestionType, SchemaSource, StaticSchemaSource,
    validate_page,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "pages" => include_str!("../tests/fixtures/pages.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

#[test]
fn legacy_dropdown_pages_load_as_select_fields() {
    let source = StaticSchemaSource::from_json(fixture("pages")).expect("pages");
    let pages = source.wizard_set(1);
    assert_eq!(pages[0].questions[0].kind, QuestionType::Dropdown);

    let factory = FormFactory::for_page(&pages[0]);
    assert!(matches!(factory.fields()[0].kind, FieldKind::Select { .. }));
    assert!(matches!(
        factory.fields()[1].kind,
        FieldKind::Text {
            multiline: false,
            ..
        }
    ));
}

#[test]
fn validation_reports_missing_and_invalid_fields() {
    let source = StaticSchemaSource::from_json(fixture("pages")).expect("pages");
    let pages = source.wizard_set(1);

    let result = validate_page(&pages[1], &json!({}));
    assert!(!result.valid);
    assert_eq!(result.missing_required, vec!["question_3"]);

    let result = validate_page(&pages[1], &json!({ "question_3": ["21", "99"] }));
    assert!(!result.valid);
    assert_eq!(result.errors[0].code, "invalid_choice");

    let long_answer = "x".repeat(41);
    let result = validate_page(&pages[0], &json!({ "question_2": long_answer }));
    assert_eq!(result.errors[0].code, "max_length");
}

#[test]
fn shared_answer_payload_validates_every_page() {
    let source = StaticSchemaSource::from_json(fixture("pages")).expect("pages");
    let answers = json!({
        "question_1": "11",
        "question_3": ["22"],
        "question_5": "32",
        "extra_info": "ignored by fields"
    });
    let forms = FormManager::forms_for_site(&source, 1, &answers);
    assert_eq!(forms.len(), 3);
    assert!(forms.iter().all(|form| form.is_valid()));

    let forms = FormManager::forms_for_site(&source, 1, &json!({ "question_1": "11" }));
    let validity: Vec<bool> = forms.iter().map(|form| form.is_valid()).collect();
    assert_eq!(validity, vec![true, false, false]);
}
