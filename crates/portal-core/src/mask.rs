/// Glyph used for hidden characters.
pub const MASK_GLYPH: char = '•';

/// Number of glyphs shown in place of the hidden part of a secret.
pub const MASK_RUN: usize = 10;

/// Characters kept visible at each end of a hidden secret.
pub const REVEAL_EDGE: usize = 4;

/// Display form of a secret.
///
/// Visible secrets are returned as-is. Hidden secrets keep the first and last
/// four characters around a fixed run of mask glyphs. Secrets shorter than
/// eight characters are masked entirely, so the edges never overlap and the
/// output length says nothing about the input.
pub fn mask_secret(secret: &str, visible: bool) -> String {
    if visible {
        return secret.to_string();
    }

    let chars: Vec<char> = secret.chars().collect();
    let run: String = std::iter::repeat(MASK_GLYPH).take(MASK_RUN).collect();

    if chars.len() < REVEAL_EDGE * 2 {
        return run;
    }

    let head: String = chars[..REVEAL_EDGE].iter().collect();
    let tail: String = chars[chars.len() - REVEAL_EDGE..].iter().collect();
    format!("{head}{run}{tail}")
}
