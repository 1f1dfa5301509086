use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub login_url: &'static str,
    pub home_url: &'static str,
    /// Address shapes a run may start from, as shown to the operator.
    pub accepted_pages: &'static [&'static str],
}
