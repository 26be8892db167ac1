//! Change-Id trailer extraction.
//!
//! Gerrit stamps every change with a `Change-Id: I<sha1>` trailer that
//! survives rebase and cherry-pick. Messages may come straight from the
//! object database (flush-left) or from `git log` output (indented by four
//! spaces), so leading whitespace is ignored when matching.

/// Trailer key written by Gerrit's commit-msg hook
pub const CHANGE_ID_PREFIX: &str = "Change-Id:";

/// Identity and title pulled from a single commit message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    pub change_id: Option<String>,
    pub title: String,
}

/// Parse a commit message.
///
/// The first trailer line wins; later `Change-Id:` lines are ignored and
/// never used as the title. The title is the first non-empty line that is
/// not a trailer, which may come after the trailer when the trailer is the
/// first thing in the message.
pub fn parse_message(message: &str) -> ParsedMessage {
    let mut parsed = ParsedMessage::default();
    let mut have_title = false;

    for line in message.lines() {
        let content = line.trim_start();

        if let Some(value) = trailer_value(content) {
            if parsed.change_id.is_none() && !value.is_empty() {
                parsed.change_id = Some(value.to_string());
            }
        } else if !have_title && !content.trim_end().is_empty() {
            parsed.title = content.trim_end().to_string();
            have_title = true;
        }

        if have_title && parsed.change_id.is_some() {
            break;
        }
    }

    parsed
}

/// Return the trimmed trailer value if `line` is a Change-Id trailer
fn trailer_value(line: &str) -> Option<&str> {
    line.strip_prefix(CHANGE_ID_PREFIX).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_left_message() {
        let msg = "Add retry to uploader\n\
                   \n\
                   Longer description of the change.\n\
                   \n\
                   Change-Id: I8473b95934b5732ac55d26311a706c9c2bde9940\n";
        let parsed = parse_message(msg);
        assert_eq!(
            parsed.change_id.as_deref(),
            Some("I8473b95934b5732ac55d26311a706c9c2bde9940")
        );
        assert_eq!(parsed.title, "Add retry to uploader");
    }

    #[test]
    fn test_indented_log_message() {
        let msg = "    Bump version\n    \n    Change-Id: Iabc\n";
        let parsed = parse_message(msg);
        assert_eq!(parsed.change_id.as_deref(), Some("Iabc"));
        assert_eq!(parsed.title, "Bump version");
    }

    #[test]
    fn test_trailer_first_uses_following_line_as_title() {
        let msg = "Change-Id: I1\n\nReal subject line\nsecond line\n";
        let parsed = parse_message(msg);
        assert_eq!(parsed.change_id.as_deref(), Some("I1"));
        assert_eq!(parsed.title, "Real subject line");
    }

    #[test]
    fn test_first_trailer_wins() {
        let msg = "Squashed\n\nChange-Id: Ifirst\nChange-Id: Isecond\n";
        let parsed = parse_message(msg);
        assert_eq!(parsed.change_id.as_deref(), Some("Ifirst"));
        assert_eq!(parsed.title, "Squashed");
    }

    #[test]
    fn test_no_trailer() {
        let parsed = parse_message("Merge branch 'topic'\n\nNo trailer here\n");
        assert_eq!(parsed.change_id, None);
        assert_eq!(parsed.title, "Merge branch 'topic'");
    }

    #[test]
    fn test_value_is_trimmed() {
        let parsed = parse_message("t\nChange-Id:   I42   \n");
        assert_eq!(parsed.change_id.as_deref(), Some("I42"));
    }

    #[test]
    fn test_bare_trailer_key_is_not_a_title() {
        let parsed = parse_message("Change-Id:\nFix x\n");
        assert_eq!(parsed.change_id, None);
        assert_eq!(parsed.title, "Fix x");
    }

    #[test]
    fn test_empty_trailer_does_not_block_later_one() {
        let parsed = parse_message("Fix x\nChange-Id:   \nChange-Id: I77\n");
        assert_eq!(parsed.change_id.as_deref(), Some("I77"));
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(parse_message(""), ParsedMessage::default());
    }

    #[test]
    fn test_prefix_must_be_at_line_start() {
        let parsed = parse_message("Mention Change-Id: Ifoo inline\n");
        assert_eq!(parsed.change_id, None);
        assert_eq!(parsed.title, "Mention Change-Id: Ifoo inline");
    }
}
