//! Static theming tables: name → emoji glyphs and the node color palette.

/// Glyph for heroes the lookup table does not know.
pub const DEFAULT_EMOJI: &str = "🦸";

/// Glyph for heroes added during this process' lifetime.
pub const NEW_EMOJI: &str = "🆕";

const EMOJI_TABLE: &[(&str, &str)] = &[
    ("Spider-Man", "🕷️"),
    ("Iron Man", "🤖"),
    ("Thor", "⚡"),
    ("Hulk", "💪"),
    ("Captain America", "🛡️"),
    ("Black Widow", "♟️"),
    ("Doctor Strange", "🌀"),
    ("Black Panther", "🐆"),
    ("Scarlet Witch", "🔮"),
    ("Ant-Man", "🐜"),
    ("dataiskole", "📊"),
];

/// Ten evenly spaced HUSL hues. Assignment to nodes carries no meaning.
pub const PALETTE: [&str; 10] = [
    "#f77189", "#dc8932", "#ae9d31", "#77ab31", "#33b07a", "#36ada4", "#38a9c5", "#6e9bf4",
    "#cc7af4", "#f565cc",
];

/// Look up the glyph for a hero name, falling back to [`DEFAULT_EMOJI`].
pub fn emoji_for(name: &str) -> &'static str {
    EMOJI_TABLE
        .iter()
        .find(|(hero, _)| *hero == name)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(DEFAULT_EMOJI)
}
