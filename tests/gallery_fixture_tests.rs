//! End-to-end runs over the gallery dialogs
use gallery_validation::dom::fixture::DocumentFixture;
use gallery_validation::dom::MemoryDocument;
use gallery_validation::validation::rules::NAME_ALLOW_LIST_MESSAGE;
use gallery_validation::{DocumentReport, Settings, ValidationEngine, clear_validation};

fn gallery() -> (MemoryDocument, ValidationEngine<MemoryDocument>, Settings) {
    let document = DocumentFixture::gallery().expect("gallery fixture").build();
    let settings = Settings::gallery();
    let mut engine = ValidationEngine::new(document.clone());
    engine.enable_validation(&settings).expect("enable validation");
    (document, engine, settings)
}

fn type_into(document: &MemoryDocument, id: &str, value: &str) {
    document
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("field {}", id))
        .type_text(value)
        .expect("input handled");
}

#[test]
fn test_enable_over_gallery() {
    let document = DocumentFixture::gallery().unwrap().build();
    let mut engine = ValidationEngine::new(document.clone());
    let summary = engine.enable_validation(&Settings::gallery()).unwrap();

    assert_eq!(summary.forms_found, 4);
    assert_eq!(summary.registered, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(engine.registered_forms(), 4);

    let report = DocumentReport::capture(&document, &Settings::gallery()).unwrap();
    // Empty required fields keep every dialog's submit inactive
    for name in ["edit-profile", "new-place", "edit-avatar"] {
        let form = report.form(name).unwrap();
        assert!(form.submit.as_ref().unwrap().disabled, "{} submit", name);
        assert!(form.fields.iter().all(|f| !f.error_visible));
    }
    // The confirmation dialog keeps its button as authored
    assert!(!report.form("remove-card").unwrap().submit.as_ref().unwrap().disabled);
}

#[test]
fn test_edit_profile_session() {
    let (document, _engine, settings) = gallery();

    type_into(&document, "name-input", "Jacques Cousteau");
    type_into(&document, "description-input", "Sailor, researcher");
    let report = DocumentReport::capture(&document, &settings).unwrap();
    let profile = report.form("edit-profile").unwrap();
    let name = profile.field("name-input").unwrap();
    assert!(!name.marked_invalid);
    assert_eq!(name.error_text.as_deref(), Some(""));
    // Commas are outside the allow-list
    let description = profile.field("description-input").unwrap();
    assert!(description.marked_invalid);
    assert_eq!(description.error_text.as_deref(), Some(NAME_ALLOW_LIST_MESSAGE));
    assert!(profile.submit.as_ref().unwrap().disabled);

    type_into(&document, "description-input", "Исследователь океана");
    let report = DocumentReport::capture(&document, &settings).unwrap();
    let profile = report.form("edit-profile").unwrap();
    assert!(profile.fields.iter().all(|f| !f.marked_invalid));
    assert!(!profile.submit.as_ref().unwrap().disabled);
    assert!(!profile.submit.as_ref().unwrap().inactive);
}

#[test]
fn test_short_name_reports_length() {
    let (document, _engine, settings) = gallery();

    type_into(&document, "name-input", "Я");
    let report = DocumentReport::capture(&document, &settings).unwrap();
    let name = report.form("edit-profile").unwrap().field("name-input").unwrap();
    assert_eq!(
        name.error_text.as_deref(),
        Some("Please lengthen this text to 2 characters or more (you are currently using 1 characters).")
    );
    assert!(name.error_visible);
}

#[test]
fn test_new_place_link_must_be_url() {
    let (document, _engine, settings) = gallery();

    type_into(&document, "place-name-input", "Байкал");
    type_into(&document, "link-input", "not a link");
    let report = DocumentReport::capture(&document, &settings).unwrap();
    let place = report.form("new-place").unwrap();
    assert_eq!(
        place.field("link-input").unwrap().error_text.as_deref(),
        Some("Please enter a URL.")
    );
    assert!(place.submit.as_ref().unwrap().disabled);

    type_into(&document, "link-input", "https://example.com/baikal.jpg");
    let report = DocumentReport::capture(&document, &settings).unwrap();
    assert!(!report.form("new-place").unwrap().submit.as_ref().unwrap().disabled);
}

#[test]
fn test_reopening_a_dialog_clears_it() {
    let (document, _engine, settings) = gallery();

    type_into(&document, "avatar-input", "nope");
    type_into(&document, "avatar-input", "https://example.com/me.png");
    type_into(&document, "avatar-input", "");

    let forms = document.query_selector_all(&settings.form_selector).unwrap();
    let avatar = forms
        .iter()
        .find(|form| form.attribute("name").as_deref() == Some("edit-avatar"))
        .unwrap();
    clear_validation(avatar, &settings).unwrap();

    let report = DocumentReport::capture(&document, &settings).unwrap();
    let form = report.form("edit-avatar").unwrap();
    let field = form.field("avatar-input").unwrap();
    assert!(!field.marked_invalid);
    assert!(!field.error_visible);
    assert_eq!(field.error_text.as_deref(), Some(""));
    assert!(form.submit.as_ref().unwrap().disabled);
    assert!(form.submit.as_ref().unwrap().inactive);
}

#[test]
fn test_fixture_without_error_element() {
    let fixture = DocumentFixture::from_toml_str(
        r#"
        [[forms]]
        name = "broken"
        classes = ["popup__form"]

        [[forms.fields]]
        id = "orphan"
        classes = ["popup__input"]
        required = true
        error_element = false
        "#,
    )
    .unwrap();
    let document = fixture.build();
    let mut engine = ValidationEngine::new(document.clone());
    engine.enable_validation(&Settings::gallery()).unwrap();

    let result = document.get_element_by_id("orphan").unwrap().type_text("x");
    assert!(result.is_err());
    let report = DocumentReport::capture(&document, &Settings::gallery()).unwrap();
    assert_eq!(report.form("broken").unwrap().field("orphan").unwrap().error_text, None);
}
