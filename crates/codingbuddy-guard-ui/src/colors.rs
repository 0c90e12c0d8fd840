//! Named terminal color palette, carried over as data from the reference
//! `show_colors.py` / `statusline.py` Molokai theme rather than ported
//! line-by-line.

/// `(name, ansi16, ansi256, truecolor)` for the 16 standard foreground
/// colors plus their bright variants.
pub const STANDARD: &[(&str, &str, &str, &str)] = &[
    ("black", "30", "38;5;16", "38;2;0;0;0"),
    ("red", "31", "38;5;160", "38;2;204;0;0"),
    ("green", "32", "38;5;70", "38;2;78;154;6"),
    ("yellow", "33", "38;5;178", "38;2;196;160;0"),
    ("blue", "34", "38;5;26", "38;2;52;101;164"),
    ("magenta", "35", "38;5;96", "38;2;117;80;123"),
    ("cyan", "36", "38;5;30", "38;2;6;152;154"),
    ("white", "37", "38;5;188", "38;2;211;215;207"),
    ("brightBlack", "90", "38;5;59", "38;2;85;87;83"),
    ("brightRed", "91", "38;5;203", "38;2;239;41;41"),
    ("brightGreen", "92", "38;5;155", "38;2;138;226;52"),
    ("brightYellow", "93", "38;5;227", "38;2;252;233;79"),
    ("brightBlue", "94", "38;5;111", "38;2;114;159;207"),
    ("brightMagenta", "95", "38;5;140", "38;2;173;127;168"),
    ("brightCyan", "96", "38;5;80", "38;2;52;226;226"),
    ("brightWhite", "97", "38;5;231", "38;2;238;238;236"),
];

/// `(name, hex, is_bg)` — the Molokai-derived theme.
pub const MOLOKAI: &[(&str, &str, bool)] = &[
    ("black", "121212", false),
    ("red", "fa2573", false),
    ("green", "98e123", false),
    ("yellow", "dfd460", false),
    ("blue", "1080d0", false),
    ("magenta", "8700ff", false),
    ("cyan", "43a8d0", false),
    ("white", "bbbbbb", false),
    ("brightBlack", "555555", false),
    ("brightRed", "f6669d", false),
    ("brightGreen", "b1e05f", false),
    ("brightYellow", "fff26d", false),
    ("brightBlue", "00afff", false),
    ("brightMagenta", "af87ff", false),
    ("brightCyan", "51ceff", false),
    ("brightWhite", "ffffff", false),
];

/// Renders a hex color (without leading `#`) as a truecolor ANSI escape.
pub fn hex_to_ansi_truecolor(hex: &str, is_bg: bool) -> Option<String> {
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    let prefix = if is_bg { "48" } else { "38" };
    Some(format!("{prefix};2;{r};{g};{b}"))
}

/// Renders the full named palette as plain text lines, for the operator
/// `colors` subcommand.
pub fn render_palette() -> String {
    let mut out = String::new();
    out.push_str("Standard\n");
    for (name, ansi16, _ansi256, _truecolor) in STANDARD {
        out.push_str(&format!("{name:<16} \\033[{ansi16}m\n"));
    }
    out.push_str("\nMolokai\n");
    for (name, hex, is_bg) in MOLOKAI {
        if let Some(code) = hex_to_ansi_truecolor(hex, *is_bg) {
            out.push_str(&format!("{name:<16} #{hex} \\033[{code}m\n"));
        }
    }
    out
}
