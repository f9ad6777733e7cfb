use crate::prediction::Prediction;

/// Number of rows folded into the ticker line.
pub const TICKER_LEN: usize = 10;

const TITLE_MAX: usize = 40;

/// Build the bottom ticker string from the newest rows.
///
/// Format per entry: `<glyph> <PLATFORM> <title…> <score>` joined by a
/// separator. At most [`TICKER_LEN`] entries are used.
pub fn ticker_line(rows: &[Prediction]) -> String {
    rows.iter()
        .take(TICKER_LEN)
        .map(|p| {
            format!(
                "{} {} {} {:.0}",
                p.tier.glyph(),
                p.platform.to_uppercase(),
                truncate_title(p.title.as_deref().unwrap_or("(untitled)"), TITLE_MAX),
                p.final_score,
            )
        })
        .collect::<Vec<_>>()
        .join("  •  ")
}

/// Truncate on a character boundary, appending an ellipsis when cut.
fn truncate_title(title: &str, max_chars: usize) -> String {
    let mut chars = title.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_title("héllo wörld", 5), "héllo…");
        assert_eq!(truncate_title("short", 40), "short");
    }
}
