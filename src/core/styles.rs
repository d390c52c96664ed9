//! Terminal styles as an enum of roles mapped to `colored::Color`.
//!
//! Colour is applied only when the caller passes `enabled = true`, so
//! nothing here depends on global state.
//!
//! ```
//! use filehound::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Plugin", false), "Plugin");
//! assert!(StyleRole::Header.paint("Plugin", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header      => Some(Color::Yellow),
    Literal     => Some(Color::Cyan),
    Placeholder => Some(Color::Green),
    Invalid     => Some(Color::Red),
    Error       => Some(Color::BrightRed),
    Value       => None,
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        Some(match self.color()? {
            Color::Red => "31",
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Cyan => "36",
            Color::BrightRed => "91",
            _ => return None,
        })
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// Foreground colour as a prettytable style spec
    pub fn to_prettytable_spec(self) -> Option<String> {
        let spec = match self.color()? {
            Color::Red => "r",
            Color::Green => "g",
            Color::Yellow => "y",
            Color::Cyan => "c",
            Color::BrightRed => "R",
            _ => return None,
        };
        Some(format!("F{}", spec))
    }

    fn ansi(self) -> Option<AnsiColor> {
        Some(match self.color()? {
            Color::Red => AnsiColor::Red,
            Color::Green => AnsiColor::Green,
            Color::Yellow => AnsiColor::Yellow,
            Color::Cyan => AnsiColor::Cyan,
            Color::BrightRed => AnsiColor::BrightRed,
            _ => return None,
        })
    }
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.ansi() {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Placeholder, false))
        .invalid(style(StyleRole::Invalid, false))
        .error(style(StyleRole::Error, true))
}
