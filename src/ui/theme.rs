use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct StatusBarTheme {
    pub background: Color,
    pub foreground: Color,
    pub brand: Color,
    pub separator: Color,
    pub mode: Color,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub foreground: Color,
    pub muted: Color,
    pub header: Color,
    pub link: Color,
    pub border: Color,
    pub dialog_background: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
    pub statusbar: StatusBarTheme,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(137, 180, 250),
            foreground: Color::Rgb(205, 214, 244),
            muted: Color::Rgb(108, 112, 134),
            header: Color::Rgb(203, 166, 247),
            link: Color::Rgb(116, 199, 236),
            border: Color::Rgb(88, 91, 112),
            dialog_background: Color::Rgb(30, 30, 46),
            info: Color::Rgb(166, 227, 161),
            warning: Color::Rgb(249, 226, 175),
            error: Color::Rgb(243, 139, 168),
            statusbar: StatusBarTheme {
                background: Color::Rgb(24, 24, 37),
                foreground: Color::Rgb(186, 194, 222),
                brand: Color::Rgb(137, 180, 250),
                separator: Color::Rgb(88, 91, 112),
                mode: Color::Rgb(147, 153, 178),
            },
        }
    }
}
