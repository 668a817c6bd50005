/// Requests from presentation to the session controller.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Abort(),
    Clear(),
    HealthCheck(),
    Submit(String),
}
