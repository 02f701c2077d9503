use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::Cyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const BOOL_TRUE: Color = Color::Green;
pub const BOOL_FALSE: Color = Color::Red;
pub const NUMBER: Color = Color::Yellow;
pub const TEXT: Color = Color::BrightWhite;
pub const CHOICE: Color = Color::Magenta;
pub const COLLECTION: Color = Color::Blue;
