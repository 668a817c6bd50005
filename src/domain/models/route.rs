#[cfg(test)]
#[path = "route_test.rs"]
mod tests;

use std::str::FromStr;

use ratatui::style::Color;
use strum::EnumIter;
use strum::EnumString;

/// Classification the backend attaches to an answer. Only used to group and
/// label assistant bubbles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RouteTag {
    Faq,
    Sql,
    Contextual,
    Fallback,
    Unknown,
}

impl RouteTag {
    /// Unrecognised labels collapse into `Unknown` rather than failing, the
    /// backend is free to grow new routes.
    pub fn parse(text: &str) -> RouteTag {
        return RouteTag::from_str(text.trim().to_lowercase().as_str())
            .unwrap_or(RouteTag::Unknown);
    }

    pub fn label(&self) -> &'static str {
        match self {
            RouteTag::Faq => return "FAQ",
            RouteTag::Sql => return "Product Search",
            RouteTag::Contextual => return "Follow-up",
            RouteTag::Fallback => return "AI Fallback",
            RouteTag::Unknown => return "AI",
        }
    }

    pub fn colour(&self) -> Color {
        match self {
            RouteTag::Faq => return Color::Rgb(167, 139, 250),
            RouteTag::Sql => return Color::Rgb(6, 182, 212),
            RouteTag::Contextual => return Color::Rgb(245, 158, 11),
            RouteTag::Fallback | RouteTag::Unknown => return Color::Rgb(139, 92, 246),
        }
    }
}
