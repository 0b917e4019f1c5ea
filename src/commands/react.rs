use crate::api::ReactionTarget;
use crate::cli::ReactArgs;
use crate::error::Result;
use crate::refs::extract_id;
use crate::session::Session;
use crate::ui;

const SHORTCODES: &[(&str, &str)] = &[
    ("+1", "👍"),
    ("-1", "👎"),
    ("heart", "❤️"),
    ("tada", "🎉"),
    ("smile", "😊"),
    ("laughing", "😂"),
    ("thinking", "🤔"),
    ("fire", "🔥"),
    ("check", "✅"),
    ("x", "❌"),
    ("eyes", "👀"),
    ("pray", "🙏"),
    ("clap", "👏"),
    ("rocket", "🚀"),
    ("wave", "👋"),
];

/// Maps a known shortcode to its emoji; anything else passes through.
pub fn normalize_emoji(emoji: &str) -> String {
    let lower = emoji.to_lowercase();
    SHORTCODES
        .iter()
        .find(|(code, _)| *code == lower)
        .map(|(_, emoji)| (*emoji).to_string())
        .unwrap_or_else(|| emoji.to_string())
}

pub fn run_react(session: &mut Session, args: ReactArgs, add: bool) -> Result<()> {
    let target_id = extract_id(&args.reference)?;
    let emoji = normalize_emoji(&args.emoji);
    let target = args.target.as_str();
    let (verb, preposition) = if add { ("add", "to") } else { ("remove", "from") };

    if args.dry_run {
        ui::info(&format!(
            "Dry run: would {verb} {emoji} {preposition} {target} {target_id}"
        ));
        return Ok(());
    }

    if args.target.in_channel() {
        let thread_id = match args.target {
            ReactionTarget::Comment => session.client().comment(target_id)?.thread_id,
            _ => target_id,
        };
        let thread = session.client().thread(thread_id)?;
        session.assert_thread_is_public(&thread)?;
    }

    let client = session.client();
    if add {
        client.add_reaction(args.target, target_id, &emoji)?;
        ui::success(&format!("Added {emoji} to {target} {target_id}"));
    } else {
        client.remove_reaction(args.target, target_id, &emoji)?;
        ui::success(&format!("Removed {emoji} from {target} {target_id}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_shortcodes_case_insensitively() {
        assert_eq!(normalize_emoji("+1"), "👍");
        assert_eq!(normalize_emoji("HEART"), "❤️");
        assert_eq!(normalize_emoji("Rocket"), "🚀");
    }

    #[test]
    fn passes_through_unknown_emoji() {
        assert_eq!(normalize_emoji("🦀"), "🦀");
        assert_eq!(normalize_emoji("party"), "party");
    }
}
