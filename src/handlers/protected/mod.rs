// Protected handlers: every operation requires `Session::Authenticated` and
// scopes its queries to the session's user id.
pub mod projects;
