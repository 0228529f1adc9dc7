//! View State
//!
//! Which pane is showing, plus the form drafts behind each pane.
//!
//! ```text
//!   Login     ── show_register ──────────► Register
//!   Register  ── show_login, register ok ─► Login
//!   Login     ── login ok ────────────────► Dashboard
//!   Dashboard ── logout, 401 on load ─────► Login
//! ```

use calc_types::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Anonymous, login form visible
    #[default]
    Login,
    /// Anonymous, registration form visible
    Register,
    /// Authenticated dashboard
    Dashboard,
}

impl View {
    /// Initial view given whether a token was found in storage
    pub fn initial(has_stored_token: bool) -> Self {
        if has_stored_token {
            View::Dashboard
        } else {
            View::Login
        }
    }

    pub fn is_anonymous(&self) -> bool {
        !matches!(self, View::Dashboard)
    }

    /// Toggle to the registration form; no effect once authenticated
    pub fn show_register(self) -> Self {
        match self {
            View::Login | View::Register => View::Register,
            View::Dashboard => View::Dashboard,
        }
    }

    /// Toggle to the login form; no effect once authenticated
    pub fn show_login(self) -> Self {
        match self {
            View::Login | View::Register => View::Login,
            View::Dashboard => View::Dashboard,
        }
    }
}

// ============================================================================
// FORM DRAFTS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationForm {
    pub operation: Option<Operation>,
    pub operand1: Option<f64>,
    pub operand2: Option<f64>,
}

/// Last submitted values of each form. Success resets a form; failure keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forms {
    pub registration: RegistrationForm,
    pub login: LoginForm,
    pub calculation: CalculationForm,
}
