//! User input for edit and delete
//!
//! Edit needs three free-text answers and delete needs a yes/no. Both go
//! through [`InputProvider`] so tests can script the answers.

use std::collections::VecDeque;

use calc_types::CalculationUpdate;

pub const PROMPT_OPERAND1: &str = "Enter new first operand:";
pub const PROMPT_OPERAND2: &str = "Enter new second operand:";
pub const PROMPT_OPERATION: &str = "Enter new operation (add/subtract/multiply/divide):";
pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this calculation?";

/// Source of answers for blocking questions.
pub trait InputProvider {
    /// Ask for a line of text. `None` means the prompt was cancelled.
    fn prompt(&mut self, message: &str) -> Option<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Ask for the three edit fields in order. All three questions are asked
    /// even when an earlier one is cancelled.
    fn edit_fields(&mut self) -> Option<EditFields> {
        let operand1 = self.prompt(PROMPT_OPERAND1);
        let operand2 = self.prompt(PROMPT_OPERAND2);
        let operation = self.prompt(PROMPT_OPERATION);
        EditFields::from_answers(operand1, operand2, operation)
    }
}

impl<T: InputProvider + ?Sized> InputProvider for &mut T {
    fn prompt(&mut self, message: &str) -> Option<String> {
        (**self).prompt(message)
    }

    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn edit_fields(&mut self) -> Option<EditFields> {
        (**self).edit_fields()
    }
}

/// Raw answers to the edit prompts, all non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFields {
    pub operand1: String,
    pub operand2: String,
    pub operation: String,
}

impl EditFields {
    /// `None` if any answer is missing or empty
    pub fn from_answers(
        operand1: Option<String>,
        operand2: Option<String>,
        operation: Option<String>,
    ) -> Option<Self> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        Some(Self {
            operand1: non_empty(operand1)?,
            operand2: non_empty(operand2)?,
            operation: non_empty(operation)?,
        })
    }

    /// Request body for these answers.
    ///
    /// No validation beyond number reading: the operation goes out verbatim and
    /// unreadable operands go out as `null`. The server decides.
    pub fn to_update(&self) -> CalculationUpdate {
        CalculationUpdate {
            operation: Some(self.operation.clone()),
            operand1: parse_float_lenient(&self.operand1),
            operand2: parse_float_lenient(&self.operand2),
        }
    }
}

/// Read the longest leading decimal number, ignoring leading whitespace and
/// anything after the number (`"12abc"` reads as 12).
pub fn parse_float_lenient(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let is_digit = |i: usize| i < len && bytes[i].is_ascii_digit();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while is_digit(j) {
            j += 1;
        }
        mantissa_digits += j - (end + 1);
        if mantissa_digits > 0 {
            end = j;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while is_digit(j) {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============================================================================
// SCRIPTED INPUT
// ============================================================================

/// Pre-recorded answers, consumed in order.
///
/// Running out of answers behaves like the user cancelling.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    answers: VecDeque<Option<String>>,
    confirmations: VecDeque<bool>,
    asked: Vec<String>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers for the three edit prompts
    pub fn edit(operand1: &str, operand2: &str, operation: &str) -> Self {
        Self::new()
            .answer(operand1)
            .answer(operand2)
            .answer(operation)
    }

    pub fn confirming(yes: bool) -> Self {
        Self::new().confirmation(yes)
    }

    pub fn answer(mut self, text: &str) -> Self {
        self.answers.push_back(Some(text.to_string()));
        self
    }

    pub fn cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    pub fn confirmation(mut self, yes: bool) -> Self {
        self.confirmations.push_back(yes);
        self
    }

    /// Every question asked so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl InputProvider for ScriptedInput {
    fn prompt(&mut self, message: &str) -> Option<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().flatten()
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }
}
