pub mod login;
pub mod logout;
pub mod recipients;
pub mod send;
pub mod status;

use herald_core::session::Session;

/// One-line description of the session for terminal output.
pub(crate) fn describe_session(session: &Session) -> String {
    match (&session.token, &session.user) {
        (None, _) => "Not connected".to_string(),
        (Some(_), None) => "Connected (profile not loaded)".to_string(),
        (Some(_), Some(user)) => match &user.email {
            Some(email) => format!("Connected as {} <{}> (id {})", user.name, email, user.id),
            None => format!("Connected as {} (id {})", user.name, user.id),
        },
    }
}
