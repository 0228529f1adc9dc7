//! Session client
//!
//! Owns the session, the cached calculation list, the current view and the
//! notice board, and keeps them in step with the server. Every operation
//! publishes a notice and also returns its outcome so callers can branch.
//!
//! Mutations never patch the cached list: a successful create, edit or delete
//! is followed by a full reload.

use calc_types::{
    Calculation, CalculationCreate, HealthResponse, ListQuery, LoginRequest, Operation,
    RegisterRequest,
};
use reqwest::StatusCode;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::notice::{Notice, NoticeBoard};
use crate::prompt::{InputProvider, CONFIRM_DELETE};
use crate::render::{render, CardAction, ListView};
use crate::session::Session;
use crate::storage::TokenStore;
use crate::view::{CalculationForm, Forms, LoginForm, RegistrationForm, View};

// Notice texts
const REGISTER_OK: &str = "Registration successful! Please login.";
const REGISTER_FAILED: &str = "Registration failed";
const LOGIN_OK: &str = "Login successful!";
const LOGIN_FAILED: &str = "Login failed";
const LOGOUT_OK: &str = "Logged out successfully";
const SESSION_EXPIRED: &str = "Session expired. Please login again.";
const LOAD_FAILED: &str = "Failed to load calculations";
const READ_FAILED: &str = "Failed to load calculation";
const CREATE_OK: &str = "Calculation created successfully!";
const CREATE_FAILED: &str = "Failed to create calculation";
const UPDATE_OK: &str = "Calculation updated successfully!";
const UPDATE_FAILED: &str = "Failed to update calculation";
const DELETE_OK: &str = "Calculation deleted successfully!";
const DELETE_FAILED: &str = "Failed to delete calculation";

pub struct SessionClient<S: TokenStore> {
    api: ApiClient,
    store: S,
    session: Session,
    calculations: Vec<Calculation>,
    list: ListView,
    view: View,
    forms: Forms,
    notices: NoticeBoard,
}

impl<S: TokenStore> SessionClient<S> {
    /// Build a client without touching the server. The session is restored
    /// from `store`; call [`start`](Self::start) to confirm it.
    pub fn new(config: ClientConfig, store: S) -> Result<Self> {
        let notices = NoticeBoard::new(config.notice_ttl);
        let api = ApiClient::new(config)?;

        let session = match store.load() {
            Ok(Some(token)) if !token.is_empty() => Session::restored(token),
            Ok(_) => Session::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable token store: {}", e);
                Session::new()
            }
        };
        let view = View::initial(session.is_authenticated());

        Ok(Self {
            api,
            store,
            session,
            calculations: Vec::new(),
            list: ListView::Blank,
            view,
            forms: Forms::default(),
            notices,
        })
    }

    /// Startup: with a stored token, optimistically show the dashboard and
    /// load the list (a 401 demotes back to the login view).
    pub async fn start(&mut self) -> Result<()> {
        if self.session.is_authenticated() {
            tracing::info!("Restored session from token store");
            self.load_calculations().await.map(|_| ())
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Cached list from the most recent successful fetch
    pub fn calculations(&self) -> &[Calculation] {
        &self.calculations
    }

    /// Rendered form of the cached list
    pub fn list_view(&self) -> &ListView {
        &self.list
    }

    pub fn forms(&self) -> &Forms {
        &self.forms
    }

    /// Visible notice, if one is showing and has not expired
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ========================================================================
    // VIEW TOGGLES
    // ========================================================================

    pub fn show_register(&mut self) {
        self.view = self.view.show_register();
    }

    pub fn show_login(&mut self) {
        self.view = self.view.show_login();
    }

    // ========================================================================
    // AUTH
    // ========================================================================

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        self.forms.registration = RegistrationForm {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let req = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.api.register(&req).await {
            Ok(()) => {
                tracing::info!(username, "Registered user");
                self.notices.success(REGISTER_OK);
                self.forms.registration = RegistrationForm::default();
                self.show_login();
                Ok(())
            }
            Err(e) => Err(self.fail(e, REGISTER_FAILED)),
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.forms.login = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let token = match self.api.login(&req).await {
            Ok(resp) => resp.access_token,
            Err(e) => return Err(self.fail(e, LOGIN_FAILED)),
        };

        if let Err(e) = self.store.save(&token) {
            // The in-memory session still works; it just won't survive a restart
            tracing::warn!("Failed to persist token: {}", e);
        }
        self.session.begin(token, username);
        tracing::info!(username, "Logged in");

        self.notices.success(LOGIN_OK);
        self.forms.login = LoginForm::default();
        self.view = View::Dashboard;

        // The reload reports its own failures; login itself has succeeded
        let _ = self.load_calculations().await;
        Ok(())
    }

    /// Local only: clears token, username and list, then shows the login view
    pub fn logout(&mut self) {
        self.end_session();
        self.notices.success(LOGOUT_OK);
        tracing::info!("Logged out");
    }

    fn end_session(&mut self) {
        self.session.clear();
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored token: {}", e);
        }
        self.calculations.clear();
        self.list = ListView::Blank;
        self.view = View::Login;
    }

    // ========================================================================
    // CALCULATIONS
    // ========================================================================

    /// Browse. Replaces the cached list wholesale on success.
    pub async fn load_calculations(&mut self) -> Result<&[Calculation]> {
        let query = ListQuery {
            skip: 0,
            limit: self.api.config().list_limit,
        };
        let result = match self.session.token() {
            Some(token) => self.api.list_calculations(token, query).await,
            None => Err(ClientError::Unauthorized),
        };

        match result {
            Ok(calculations) => {
                tracing::debug!(count = calculations.len(), "Loaded calculations");
                self.list = render(&calculations);
                self.calculations = calculations;
                Ok(&self.calculations)
            }
            Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED) => {
                tracing::info!("Token rejected, ending session");
                self.end_session();
                self.notices.error(SESSION_EXPIRED);
                Err(ClientError::Unauthorized)
            }
            Err(e) => Err(self.fail(e, LOAD_FAILED)),
        }
    }

    /// Read one record. The cached list is left alone.
    pub async fn read_calculation(&mut self, id: i64) -> Result<Calculation> {
        let result = match self.session.token() {
            Some(token) => self.api.get_calculation(token, id).await,
            None => Err(ClientError::Unauthorized),
        };
        result.map_err(|e| self.fail(e, READ_FAILED))
    }

    /// Add. Divide by zero is refused before any request is made.
    pub async fn create_calculation(
        &mut self,
        operation: Operation,
        operand1: f64,
        operand2: f64,
    ) -> Result<Calculation> {
        self.forms.calculation = CalculationForm {
            operation: Some(operation),
            operand1: Some(operand1),
            operand2: Some(operand2),
        };

        if operation == Operation::Divide && operand2 == 0.0 {
            return Err(self.fail(ClientError::DivideByZero, CREATE_FAILED));
        }

        let body = CalculationCreate {
            operation,
            operand1,
            operand2,
        };
        let result = match self.session.token() {
            Some(token) => self.api.create_calculation(token, &body).await,
            None => Err(ClientError::Unauthorized),
        };

        match result {
            Ok(created) => {
                tracing::info!(id = created.id, "Created calculation");
                self.notices.success(CREATE_OK);
                self.forms.calculation = CalculationForm::default();
                let _ = self.load_calculations().await;
                Ok(created)
            }
            Err(e) => Err(self.fail(e, CREATE_FAILED)),
        }
    }

    /// Edit. Asks `input` for the three new values; an empty or cancelled
    /// answer aborts without a request.
    pub async fn edit_calculation(
        &mut self,
        id: i64,
        mut input: impl InputProvider,
    ) -> Result<Calculation> {
        let Some(fields) = input.edit_fields() else {
            tracing::debug!(id, "Edit cancelled");
            return Err(ClientError::Cancelled);
        };

        let body = fields.to_update();
        let result = match self.session.token() {
            Some(token) => self.api.update_calculation(token, id, &body).await,
            None => Err(ClientError::Unauthorized),
        };

        match result {
            Ok(updated) => {
                tracing::info!(id, "Updated calculation");
                self.notices.success(UPDATE_OK);
                let _ = self.load_calculations().await;
                Ok(updated)
            }
            Err(e) => Err(self.fail(e, UPDATE_FAILED)),
        }
    }

    /// Delete, after confirmation from `input`.
    pub async fn delete_calculation(&mut self, id: i64, mut input: impl InputProvider) -> Result<()> {
        if !input.confirm(CONFIRM_DELETE) {
            tracing::debug!(id, "Delete declined");
            return Err(ClientError::Cancelled);
        }

        let result = match self.session.token() {
            Some(token) => self.api.delete_calculation(token, id).await,
            None => Err(ClientError::Unauthorized),
        };

        match result {
            Ok(()) => {
                tracing::info!(id, "Deleted calculation");
                self.notices.success(DELETE_OK);
                let _ = self.load_calculations().await;
                Ok(())
            }
            Err(e) => {
                // Delete never surfaces server detail
                let e = match e {
                    ClientError::Rejected { status, .. } => ClientError::Rejected {
                        status,
                        detail: None,
                    },
                    other => other,
                };
                Err(self.fail(e, DELETE_FAILED))
            }
        }
    }

    /// Run an action picked from a rendered card.
    pub async fn dispatch(&mut self, action: CardAction, input: impl InputProvider) -> Result<()> {
        match action {
            CardAction::Edit(id) => self.edit_calculation(id, input).await.map(|_| ()),
            CardAction::Delete(id) => self.delete_calculation(id, input).await,
        }
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.api.health().await
    }

    /// Publish the error notice for `err` and hand the error back
    fn fail(&mut self, err: ClientError, fallback: &str) -> ClientError {
        self.notices.error(err.notice_text(fallback));
        err
    }
}
