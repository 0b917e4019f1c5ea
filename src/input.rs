use std::io::{IsTerminal, Read};

use crate::error::{Result, TwistError};

/// Reads piped stdin; `None` when stdin is a terminal or the input is blank.
pub fn read_stdin() -> Option<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return None;
    }
    let mut data = String::new();
    if let Err(err) = stdin.read_to_string(&mut data) {
        tracing::debug!(error = %err, "failed to read stdin");
        return None;
    }
    non_blank(&data)
}

/// Opens `$VISUAL`/`$EDITOR` on an empty markdown buffer.
pub fn open_editor() -> Result<Option<String>> {
    let edited = dialoguer::Editor::new()
        .extension(".md")
        .require_save(true)
        .edit("")
        .map_err(|err| TwistError::Message(format!("Failed to open editor: {err}")))?;
    Ok(edited.as_deref().and_then(non_blank))
}

/// Reply content from stdin, the positional argument or the editor, in that
/// order.
pub fn reply_content(positional: Option<&str>) -> Result<String> {
    let content = match read_stdin() {
        Some(content) => Some(content),
        None => match positional.and_then(non_blank) {
            Some(content) => Some(content),
            None => open_editor()?,
        },
    };
    content.ok_or_else(|| TwistError::Message("No content provided".to_string()))
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::non_blank;

    #[test]
    fn blank_input_is_none() {
        assert_eq!(non_blank("  \n\t"), None);
        assert_eq!(non_blank("  hi there \n").as_deref(), Some("hi there"));
    }
}
