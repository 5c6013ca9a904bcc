use std::rc::Rc;
use yew::prelude::*;
use web_sys::window;

/// Explicit auth context provided once at the app root. Components receive
/// it through `use_auth` instead of reading storage ad hoc.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthContext {
    pub token: Option<String>,
}

impl AuthContext {
    /// Reads the session token once, at provider construction.
    pub fn load() -> Self {
        let token = window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item("token").ok().flatten())
            .or_else(|| {
                window()
                    .and_then(|w| w.session_storage().ok().flatten())
                    .and_then(|s| s.get_item("token").ok().flatten())
            });
        Self { token }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.as_deref().unwrap_or_default())
    }
}

#[hook]
pub fn use_auth() -> Rc<AuthContext> {
    use_context::<Rc<AuthContext>>().expect("AuthContext not provided")
}
