use wizard_spec::{ChoiceSpec, FieldError, Form, GotoStep, QuestionSpec, QuestionType, Review};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: page identity, choice ids and the review as JSON.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints pages, choices and the final review.
pub struct WizardPresenter {
    verbosity: Verbosity,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn show_page(&self, form: &Form, total: usize) {
        println!("Step {}/{}", form.manager_index + 1, total);
        if self.verbosity.is_verbose() {
            println!("Page pk: {}", form.pk);
        }
    }

    pub fn show_choices(&self, question: &QuestionSpec) {
        for (index, choice) in question.choices.iter().enumerate() {
            if self.verbosity.is_verbose() {
                println!("  {}) {} [pk {}]", index + 1, choice.text, choice.pk);
            } else {
                println!("  {}) {}", index + 1, choice.text);
            }
        }
    }

    pub fn show_options(&self, choice: &ChoiceSpec) {
        for (index, option) in choice.options.iter().enumerate() {
            println!("  {}) {}", index + 1, option.text);
        }
    }

    pub fn show_errors(&self, errors: &[FieldError]) {
        eprintln!("Invalid answers:");
        for error in errors {
            eprintln!("  {}: {}", error.field_id, error.message);
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_review(&self, review: &Review) {
        println!("Review");
        for line in review_lines(review) {
            println!("{}", line);
        }
        if review.skipped() > 0 {
            eprintln!(
                "{} stored answer(s) no longer match the wizard and were skipped.",
                review.skipped()
            );
        }
        match review.to_cbor() {
            Ok(bytes) => println!("Answers (CBOR hex): {}", encode_hex(&bytes)),
            Err(err) => eprintln!("Failed to serialize review to CBOR: {}", err),
        }
        if self.verbosity.is_verbose() {
            match review.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => eprintln!("Failed to serialize review to JSON: {}", err),
            }
        }
    }
}

/// One `question: answer, answer` line per review entry.
pub fn review_lines(review: &Review) -> Vec<String> {
    review
        .entries()
        .iter()
        .map(|entry| format!("{}: {}", entry.question, entry.answers.join(", ")))
        .collect()
}

/// Prompt label for a question, marking required ones.
pub fn question_prompt(question: &QuestionSpec) -> String {
    let hint = match question.kind {
        QuestionType::Singlelinetext | QuestionType::Textarea => "",
        QuestionType::Radiobutton | QuestionType::Dropdown => " (number)",
        QuestionType::Checkbox => " (numbers, comma separated)",
    };
    if question.required {
        format!("{}{} *", question.question_text, hint)
    } else {
        format!("{}{}", question.question_text, hint)
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Parses 1-based selections such as `2` or `1, 3` into 0-based indexes.
pub fn parse_selection(
    raw: &str,
    count: usize,
    multiple: bool,
) -> Result<Vec<usize>, AnswerParseError> {
    let mut picked = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let number = part.parse::<usize>().map_err(|_| {
            AnswerParseError::new(
                format!("'{}' is not a number", part),
                Some(format!("a number between 1 and {}", count)),
            )
        })?;
        if number == 0 || number > count {
            return Err(AnswerParseError::new(
                format!("{} is out of range", number),
                Some(format!("a number between 1 and {}", count)),
            ));
        }
        if !picked.contains(&(number - 1)) {
            picked.push(number - 1);
        }
    }
    if !multiple && picked.len() > 1 {
        return Err(AnswerParseError::new(
            "only one choice is allowed",
            Some("a single number".to_string()),
        ));
    }
    Ok(picked)
}

/// Parses the navigation action typed after a page.
pub fn parse_goto(raw: &str, first_page: bool) -> Result<GotoStep, AnswerParseError> {
    match raw.trim().to_lowercase().as_str() {
        "" | "n" | "next" => Ok(GotoStep::Next),
        "b" | "back" if !first_page => Ok(GotoStep::Back),
        "r" | "review" => Ok(GotoStep::Review),
        other => Err(AnswerParseError::new(
            format!("unknown action '{}'", other),
            Some(goto_hint(first_page).to_string()),
        )),
    }
}

pub fn goto_hint(first_page: bool) -> &'static str {
    if first_page {
        "next/review"
    } else {
        "next/back/review"
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_accepts_single_and_lists() {
        assert_eq!(parse_selection("2", 3, false).unwrap(), vec![1]);
        assert_eq!(parse_selection("1, 3,1", 3, true).unwrap(), vec![0, 2]);
        assert!(parse_selection("", 3, false).unwrap().is_empty());
    }

    #[test]
    fn selection_rejects_bad_input() {
        assert!(parse_selection("4", 3, false).is_err());
        assert!(parse_selection("0", 3, false).is_err());
        assert!(parse_selection("two", 3, true).is_err());
        assert!(parse_selection("1,2", 3, false).is_err());
    }

    #[test]
    fn goto_parsing_blocks_back_on_first_page() {
        assert_eq!(parse_goto("", false).unwrap(), GotoStep::Next);
        assert_eq!(parse_goto("Back", false).unwrap(), GotoStep::Back);
        assert_eq!(parse_goto("r", true).unwrap(), GotoStep::Review);
        assert!(parse_goto("back", true).is_err());
    }

    #[test]
    fn hex_encoding_is_lowercase() {
        assert_eq!(encode_hex(&[0x0a, 0xff]), "0aff");
    }
}
