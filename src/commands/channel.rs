use crate::cli::ChannelsArgs;
use crate::error::Result;
use crate::models::Channel;
use crate::output::{EntityKind, Format, print_json, print_ndjson};
use crate::session::Session;
use crate::ui;

pub fn run_channels(session: &mut Session, args: ChannelsArgs) -> Result<()> {
    let workspace_id = super::selected_workspace(session, &args.selector)?;
    let all = session.channels(workspace_id)?;
    let channels = visible_channels(all, session.include_private_channels());

    if channels.is_empty() {
        ui::info("No channels found.");
        return Ok(());
    }

    let output = args.output;
    match output.format() {
        Format::Json => return print_json(&channels, Some(EntityKind::Channel), output.full),
        Format::Ndjson => return print_ndjson(&channels, Some(EntityKind::Channel), output.full),
        Format::Text => {}
    }

    for channel in &channels {
        let visibility = if channel.public {
            String::new()
        } else {
            ui::dim(" [private]")
        };
        let archived = if channel.archived {
            ui::dim(" (archived)")
        } else {
            String::new()
        };
        ui::info(&format!(
            "{}  {}{visibility}{archived}",
            ui::id_tag(channel.id),
            ui::channel().apply_to(&channel.name)
        ));
    }
    Ok(())
}

fn visible_channels(channels: Vec<Channel>, include_private: bool) -> Vec<Channel> {
    if include_private {
        return channels;
    }
    channels.into_iter().filter(|channel| channel.public).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hides_private_channels_by_default() {
        let channels = vec![
            Channel {
                id: 1,
                public: true,
                ..Channel::default()
            },
            Channel {
                id: 2,
                public: false,
                ..Channel::default()
            },
        ];
        let ids = |list: Vec<Channel>| list.iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(visible_channels(channels.clone(), false)), vec![1]);
        assert_eq!(ids(visible_channels(channels, true)), vec![1, 2]);
    }
}
