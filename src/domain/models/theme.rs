use ratatui::style::Color;
use strum::EnumString;
use strum::EnumVariantNames;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumString, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub primary: Color,
    pub user_bubble: Color,
    pub assistant_bubble: Color,
    pub error: Color,
    pub success: Color,
}

impl Theme {
    pub fn toggle(&self) -> Theme {
        match self {
            Theme::Light => return Theme::Dark,
            Theme::Dark => return Theme::Light,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => {
                return Palette {
                    background: Color::Rgb(15, 15, 26),
                    text: Color::Rgb(226, 232, 240),
                    muted: Color::Rgb(100, 116, 139),
                    primary: Color::Rgb(139, 92, 246),
                    user_bubble: Color::Rgb(6, 182, 212),
                    assistant_bubble: Color::Rgb(139, 92, 246),
                    error: Color::Rgb(248, 113, 113),
                    success: Color::Rgb(74, 222, 128),
                };
            }
            Theme::Light => {
                return Palette {
                    background: Color::Rgb(248, 250, 252),
                    text: Color::Rgb(15, 23, 42),
                    muted: Color::Rgb(100, 116, 139),
                    primary: Color::Rgb(109, 40, 217),
                    user_bubble: Color::Rgb(8, 145, 178),
                    assistant_bubble: Color::Rgb(109, 40, 217),
                    error: Color::Rgb(220, 38, 38),
                    success: Color::Rgb(22, 163, 74),
                };
            }
        }
    }
}
