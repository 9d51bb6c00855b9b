use anyhow::{Context, Result, bail};

use gallery_validation::config::{Config, OutputFormat};
use gallery_validation::{DocumentReport, ValidationEngine, clear_validation};

fn main() -> Result<()> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .parse_default_env()
        .init();

    let settings = config.load_settings()?;
    let document = config.load_document()?;

    let mut engine = ValidationEngine::new(document.clone());
    let summary = engine.enable_validation(&settings)?;
    log::debug!("{:?}", summary);

    for edit in &config.inputs {
        let Some(field) = document.get_element_by_id(&edit.field_id) else {
            bail!("No field with id '{}'", edit.field_id);
        };
        field
            .type_text(&edit.value)
            .with_context(|| format!("Input into '{}' failed", edit.field_id))?;
    }

    for name in &config.clear {
        let forms = document.query_selector_all(&settings.form_selector)?;
        let Some(form) = forms
            .iter()
            .find(|form| form.attribute("name").as_deref() == Some(name.as_str()))
        else {
            bail!("No form named '{}'", name);
        };
        clear_validation(form, &settings)?;
    }

    let report = DocumentReport::capture(&document, &settings)?;
    match config.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
