mod wizard;

use clap::{Parser, Subcommand};
use component_wizard::{review as wizard_review, validate_forms};
use serde_json::{Map, Value, json};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wizard::{
    AnswerParseError, Verbosity, WizardPresenter, goto_hint, parse_goto, parse_selection,
    question_prompt,
};
use wizard_spec::post::{
    CURRENT_STEP_FIELD, EXTRA_INFO_FIELD, EXTRA_OPTIONS_FIELD, FORM_PK_FIELD, GOTO_STEP_FIELD,
};
use wizard_spec::{
    ChoiceSpec, DEFAULT_SITE_ID, Form, FormManager, GotoStep, PageSpec, QuestionSpec,
    QuestionType, SchemaSource, SiteId, StaticSchemaSource, Step, StepUrls, Steps, Storage,
    WizardPost,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const SITE_ENV: &str = "GREENTIC_WIZARD_SITE";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Text-based multi-page wizard CLI",
    long_about = "Runs page wizards in a text shell and reviews or validates stored answers"
)]
struct Cli {
    /// Log navigation and storage decisions to stderr.
    #[arg(long, alias = "debug", global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk through the wizard pages in a text shell.
    Wizard {
        /// JSON file listing the wizard pages.
        #[arg(long, value_name = "PAGES")]
        pages: PathBuf,
        /// Site whose pages are shown (defaults to GREENTIC_WIZARD_SITE or 1).
        #[arg(long)]
        site: Option<SiteId>,
        /// Session file; answers are resumed from and saved to it.
        #[arg(long, value_name = "SESSION")]
        session: Option<PathBuf>,
        /// Handlebars template for step URLs shown in verbose mode.
        #[arg(long, value_name = "TEMPLATE")]
        step_url: Option<String>,
    },
    /// Print the review of the answers stored in a session file.
    Review {
        #[arg(long, value_name = "PAGES")]
        pages: PathBuf,
        #[arg(long, value_name = "SESSION")]
        session: PathBuf,
        #[arg(long)]
        site: Option<SiteId>,
        /// Print the raw JSON review instead of text lines.
        #[arg(long)]
        json: bool,
    },
    /// Validate one answers payload against every page of a site.
    Validate {
        #[arg(long, value_name = "PAGES")]
        pages: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        #[arg(long)]
        site: Option<SiteId>,
    },
    /// Print the JSON schema of a pages document.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Wizard {
            pages,
            site,
            session,
            step_url,
        } => run_wizard(pages, resolve_site(site)?, session, step_url, cli.verbose),
        Command::Review {
            pages,
            session,
            site,
            json,
        } => run_review(&pages, &session, resolve_site(site)?, json),
        Command::Validate {
            pages,
            answers,
            site,
        } => run_validate(&pages, &answers, resolve_site(site)?),
        Command::Schema => run_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_site(site: Option<SiteId>) -> CliResult<SiteId> {
    if let Some(site) = site {
        return Ok(site);
    }
    match env::var(SITE_ENV) {
        Ok(raw) => raw
            .trim()
            .parse::<SiteId>()
            .map_err(|_| format!("{} must be a site id, got '{}'", SITE_ENV, raw).into()),
        Err(_) => Ok(DEFAULT_SITE_ID),
    }
}

fn component_config(pages_path: &Path, site: SiteId) -> CliResult<String> {
    let pages_json = fs::read_to_string(pages_path)?;
    Ok(json!({ "pages_json": pages_json, "site_id": site }).to_string())
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn load_session(path: Option<&Path>) -> CliResult<Map<String, Value>> {
    match path {
        Some(path) if path.exists() => {
            let contents = fs::read_to_string(path)?;
            match serde_json::from_str::<Value>(&contents)? {
                Value::Object(session) => Ok(session),
                _ => Err(format!("session file {} is not a JSON object", path.display()).into()),
            }
        }
        _ => Ok(Map::new()),
    }
}

fn save_session(path: Option<&Path>, session: &Map<String, Value>) -> CliResult<()> {
    if let Some(path) = path {
        fs::write(path, serde_json::to_string_pretty(session)?)?;
        debug!(path = %path.display(), "session saved");
    }
    Ok(())
}

fn run_wizard(
    pages_path: PathBuf,
    site: SiteId,
    session_path: Option<PathBuf>,
    step_url: Option<String>,
    verbose: bool,
) -> CliResult<()> {
    let source = StaticSchemaSource::from_path(&pages_path)?;
    let pages = source.wizard_set(site);
    let urls = match step_url.as_deref() {
        Some(template) => StepUrls::new(template)?,
        None => StepUrls::default(),
    };
    let forms = FormManager::build_forms(&pages, &Value::Null);
    let mut session = load_session(session_path.as_deref())?;
    let presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));

    loop {
        let (index, url) = {
            let mut steps = Steps::new(&forms, &mut session, &urls)
                .map_err(|_| format!("site {} has no wizard pages", site))?;
            let step = steps.set_from_get(None);
            (step, steps.url(step)?)
        };
        let Step::Index(index) = index else {
            break;
        };
        let form = &forms[index];
        presenter.show_page(form, forms.len());
        if verbose {
            println!("URL: {}", url);
        }

        let stored = Storage::new(&mut session).data_from_pk(form.pk);
        let post = prompt_page(form, index, &stored, &presenter)?;

        let bound = FormManager::build_forms(&pages, &Value::Object(post.data().clone()));
        let checked = &bound[index];
        if !checked.is_valid() && post.goto_step() != Some(GotoStep::Back) {
            presenter.show_errors(checked.errors());
            continue;
        }

        Storage::new(&mut session).set_form_data(&post)?;
        let finished = {
            let mut steps = Steps::new(&forms, &mut session, &urls)?;
            let step = steps.set_from_post(&post);
            steps.finished(step, &post)
        };
        save_session(session_path.as_deref(), &session)?;
        if finished {
            break;
        }
    }

    let review = Storage::new(&mut session).cleaned_form_data(&forms);
    presenter.show_review(&review);
    save_session(session_path.as_deref(), &session)
}

fn prompt_page(
    form: &Form,
    index: usize,
    stored: &Map<String, Value>,
    presenter: &WizardPresenter,
) -> CliResult<WizardPost> {
    let mut post = WizardPost::default();
    post.insert(CURRENT_STEP_FIELD, Value::String(index.to_string()));
    post.insert(FORM_PK_FIELD, Value::String(form.pk.to_string()));

    for question in form.serialized() {
        let previous = stored.get(&question.field_id);
        if let Some(answer) = prompt_question(question, previous, presenter, &mut post)? {
            post.insert(question.field_id.clone(), answer);
        }
    }

    let first_page = index == 0;
    let goto = loop {
        let raw = prompt_line(&format!("Action ({})", goto_hint(first_page)), Some("next"))?;
        match parse_goto(&raw, first_page) {
            Ok(goto) => break goto,
            Err(err) => presenter.show_parse_error(&err),
        }
    };
    post.insert(GOTO_STEP_FIELD, Value::String(goto.as_str().to_string()));
    Ok(post)
}

fn prompt_question(
    question: &QuestionSpec,
    stored: Option<&Value>,
    presenter: &WizardPresenter,
    post: &mut WizardPost,
) -> CliResult<Option<Value>> {
    let label = question_prompt(question);
    if question.kind.is_free_text() {
        let default = stored.and_then(Value::as_str).filter(|text| !text.is_empty());
        return Ok(Some(Value::String(prompt_line(&label, default)?)));
    }

    let multiple = question.kind == QuestionType::Checkbox;
    let picked = loop {
        presenter.show_choices(question);
        let raw = prompt_line(&label, None)?;
        match parse_selection(&raw, question.choices.len(), multiple) {
            Ok(picked) => break picked,
            Err(err) => presenter.show_parse_error(&err),
        }
    };

    let mut values = Vec::with_capacity(picked.len());
    for choice in picked.iter().filter_map(|index| question.choices.get(*index)) {
        values.push(Value::String(choice.pk.to_string()));
        if choice.accepts_extra_info()
            && let Some(prompt) = choice.extra_info_text.as_deref()
        {
            // Blank overwrites the stored detail, not one typed earlier on this page.
            let info = prompt_line(prompt, None)?;
            if !info.is_empty() || post.get(EXTRA_INFO_FIELD).is_none() {
                post.insert(EXTRA_INFO_FIELD, Value::String(info));
            }
        }
        if choice.accepts_extra_options() {
            let option = prompt_option(question, choice, presenter)?;
            post.insert(EXTRA_OPTIONS_FIELD, Value::String(option.to_string()));
        }
    }

    if values.is_empty() {
        // A select posts its blank entry; unticked radios and boxes post nothing.
        let blank = question.kind == QuestionType::Dropdown;
        return Ok(blank.then(|| Value::String(String::new())));
    }
    if multiple {
        Ok(Some(Value::Array(values)))
    } else {
        Ok(values.pop())
    }
}

fn prompt_option(
    question: &QuestionSpec,
    choice: &ChoiceSpec,
    presenter: &WizardPresenter,
) -> CliResult<usize> {
    loop {
        presenter.show_options(choice);
        let raw = prompt_line(&format!("{} (number)", choice.text), None)?;
        let picked = parse_selection(&raw, choice.options.len(), false).and_then(|picked| {
            picked.first().copied().ok_or_else(|| {
                AnswerParseError::new(
                    format!("'{}' needs one of its options", choice.text),
                    Some(format!("an option for {}", question.field_id)),
                )
            })
        });
        match picked {
            Ok(index) => return Ok(index),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

fn run_review(
    pages_path: &Path,
    session_path: &Path,
    site: SiteId,
    as_json: bool,
) -> CliResult<()> {
    let config = component_config(pages_path, site)?;
    let session_json = fs::read_to_string(session_path)?;
    let result = parse_component_result(&wizard_review(&config, &session_json))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let entries = result["answers"].as_array().cloned().unwrap_or_default();
    if entries.is_empty() {
        println!("No answers stored.");
    }
    for entry in entries.iter().filter_map(Value::as_object) {
        for (question, answers) in entry {
            let answers: Vec<&str> = answers
                .as_array()
                .map(|list| list.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            println!("{}: {}", question, answers.join(", "));
        }
    }
    if let Some(skipped) = result["skipped"].as_u64().filter(|count| *count > 0) {
        eprintln!(
            "{} stored answer(s) no longer match the wizard and were skipped.",
            skipped
        );
    }
    Ok(())
}

fn run_validate(pages_path: &Path, answers_path: &Path, site: SiteId) -> CliResult<()> {
    let config = component_config(pages_path, site)?;
    let answers_json = fs::read_to_string(answers_path)?;
    let result = parse_component_result(&validate_forms(&config, &answers_json))?;
    let reports = result.as_array().cloned().unwrap_or_default();

    let mut all_valid = true;
    for report in &reports {
        let valid = report["valid"].as_bool().unwrap_or(false);
        all_valid &= valid;
        println!(
            "Page {} (step {}): {}",
            report["pk"],
            report["manager_index"],
            if valid { "valid" } else { "invalid" }
        );
        describe_errors(report);
    }

    if all_valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_errors(report: &Value) {
    let Some(errors) = report["errors"].as_array() else {
        return;
    };
    for error in errors {
        println!(
            "  {} - {}",
            error["field_id"].as_str().unwrap_or("<unknown>"),
            error["message"].as_str().unwrap_or_default()
        );
    }
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(Vec<PageSpec>);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn prompt_line(prompt: &str, default: Option<&str>) -> CliResult<String> {
    if let Some(default_value) = default {
        print!("{} [{}]: ", prompt, default_value);
    } else {
        print!("{}: ", prompt);
    }
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err("wizard input ended before the wizard finished".into());
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_site_wins_over_default() {
        assert_eq!(resolve_site(Some(7)).unwrap(), 7);
    }

    #[test]
    fn component_errors_become_cli_errors() {
        assert!(parse_component_result(r#"{"error": "boom"}"#).is_err());
        assert!(parse_component_result(r#"{"answers": []}"#).is_ok());
    }

    #[test]
    fn missing_session_file_starts_empty() {
        let dir = TempDir::new().expect("temp dir");
        let absent = dir.path().join("absent.json");
        let session = load_session(Some(absent.as_path())).expect("session");
        assert!(session.is_empty());
    }

    #[test]
    fn saved_session_loads_back() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.json");
        let mut session = Map::new();
        session.insert("current_step".into(), json!(1));
        save_session(Some(path.as_path()), &session).expect("save");
        assert_eq!(load_session(Some(path.as_path())).expect("load"), session);
    }
}
