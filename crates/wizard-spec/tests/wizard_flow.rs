use serde_json::{Map, Value, json};

use wizard_spec::{
    CURRENT_STEP_KEY, FormManager, SchemaSource, StaticSchemaSource, Step, StepUrls, Steps,
    Storage, WizardPost,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "pages" => include_str!("../tests/fixtures/pages.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn source() -> StaticSchemaSource {
    StaticSchemaSource::from_json(fixture("pages")).expect("pages fixture")
}

/// Handles one submission the way a step view would.
fn submit(session: &mut Map<String, Value>, post: Value) -> (Step, bool) {
    let pages = source().wizard_set(1);
    let forms = FormManager::build_forms(&pages, &post);
    let post = WizardPost::from_value(post);
    Storage::new(session).set_form_data(&post).expect("store");
    let urls = StepUrls::default();
    let mut steps = Steps::new(&forms, session, &urls).expect("steps");
    let step = steps.set_from_post(&post);
    (step, steps.finished(step, &post))
}

#[test]
fn full_run_produces_review_in_answer_order() {
    let mut session = Map::new();

    let (step, finished) = submit(
        &mut session,
        json!({
            "csrfmiddlewaretoken": "token",
            "wizard_current_step": "0",
            "wizard_goto_step": "Next",
            "form_pk": "1",
            "question_1": "12",
            "question_2": "",
            "extra_info": "the library"
        }),
    );
    assert_eq!((step, finished), (Step::Index(1), false));

    let (step, _) = submit(
        &mut session,
        json!({
            "wizard_current_step": "1",
            "wizard_goto_step": "Next",
            "form_pk": "2",
            "question_3": ["21", "23"],
            "extra_options": "1"
        }),
    );
    assert_eq!(step, Step::Index(2));

    let (step, finished) = submit(
        &mut session,
        json!({
            "wizard_current_step": "2",
            "wizard_goto_step": "Next",
            "form_pk": "3",
            "question_4": "no",
            "question_5": "31"
        }),
    );
    assert_eq!(step, Step::Done);
    assert!(finished);
    assert_eq!(session[CURRENT_STEP_KEY], json!("done"));

    let forms = FormManager::forms_for_site(&source(), 1, &json!({}));
    let review = Storage::new(&mut session).cleaned_form_data(&forms);
    assert_eq!(
        serde_json::to_value(&review).unwrap(),
        json!([
            { "Where did it happen?": ["Off campus: the library"] },
            { "Who was involved?": ["A friend", "Someone I know from: School"] },
            { "Anything else?": ["no"] },
            { "Can we contact you?": ["Yes"] }
        ])
    );
    assert_eq!(review.skipped(), 0);
}

#[test]
fn going_back_then_reviewing_keeps_stored_answers() {
    let mut session = Map::new();
    submit(
        &mut session,
        json!({
            "wizard_current_step": "0",
            "wizard_goto_step": "Next",
            "form_pk": "1",
            "question_1": "11"
        }),
    );
    let (step, _) = submit(
        &mut session,
        json!({
            "wizard_current_step": "1",
            "wizard_goto_step": "Back",
            "form_pk": "2",
            "question_3": "22"
        }),
    );
    assert_eq!(step, Step::Index(0));

    let (step, finished) = submit(
        &mut session,
        json!({
            "wizard_current_step": "0",
            "wizard_goto_step": "Review",
            "form_pk": "1",
            "question_1": "11"
        }),
    );
    assert_eq!(step, Step::Index(0));
    assert!(finished);

    let forms = FormManager::forms_for_site(&source(), 1, &json!({}));
    let review = Storage::new(&mut session).cleaned_form_data(&forms);
    let questions: Vec<&str> = review
        .entries()
        .iter()
        .map(|entry| entry.question.as_str())
        .collect();
    assert_eq!(questions, vec!["Where did it happen?", "Who was involved?"]);
}

#[test]
fn shrinking_schema_clamps_stored_step_and_skips_stale_answers() {
    let mut session = Map::new();
    session.insert(CURRENT_STEP_KEY.into(), json!(2));
    session.insert(
        "form_1".into(),
        json!({ "form_pk": "1", "question_1": "11", "question_9": "gone" }),
    );

    // Site 2 publishes two pages, so step 2 no longer exists.
    let forms = FormManager::forms_for_site(&source(), 2, &json!({}));
    assert_eq!(forms.len(), 2);

    let review = Storage::new(&mut session).cleaned_form_data(&forms);
    assert_eq!(review.len(), 1);
    assert_eq!(review.skipped(), 1);

    let urls = StepUrls::default();
    let mut steps = Steps::new(&forms, &mut session, &urls).expect("steps");
    assert!(steps.overflowed(steps.raw_current()));
    assert_eq!(steps.current(), Step::Index(1));
    assert_eq!(steps.last_url().unwrap(), "/wizard/step/1/");
    assert_eq!(steps.set_from_get(None), Step::Index(1));
}
