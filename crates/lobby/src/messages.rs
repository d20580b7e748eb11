//! Text sent to members and announcement channels.

use crate::types::Category;

pub const TIMED_OUT: &str = "You didn't respond in time. Please try again.";
pub const LEFT: &str = "You have been removed from the channel.";
pub const POSTED: &str = "Your message has been posted.";
pub const NO_TEXT_CHANNEL: &str =
    "Sorry, I couldn't find a text channel in this group to post the message.";
pub const POST_FAILED: &str = "Sorry, I couldn't post the message in the text channel.";
pub const DECLINED: &str = "No problem! Have a great time in the voice channel.";
pub const CREATE_FAILED: &str = "Sorry, I couldn't create your voice channel. Please try again later.";

/// Reply that cancels provisioning (compared lowercased and trimmed).
pub const LEAVE_KEYWORD: &str = "leave";

pub fn name_prompt(display_name: &str, category: Option<&Category>) -> String {
    let section = match category {
        Some(c) => format!("\"{}\" section", c.name),
        None => "uncategorized section".to_string(),
    };
    format!(
        "Hi {display_name}! You are creating a temporary voice channel in the {section}. \
         What would you like to name it?\n\n\
         If you do not want to create a channel, type \"Leave\"."
    )
}

pub fn moved(channel_name: &str) -> String {
    format!("You have been moved to your new channel - \"{channel_name}\". Have fun!")
}

pub fn consent_prompt(channel_name: &str) -> String {
    format!(
        "Would you like to notify others in the group text channel that you're in the voice \
         channel \"{channel_name}\"? Reply with \"yes\" or \"no\"."
    )
}

pub fn announcement(display_name: &str, channel_name: &str) -> String {
    format!(
        "Hey everyone! {display_name} is hanging out in the \"{channel_name}\" voice channel. \
         Feel free to join in!"
    )
}

pub const CREATE_REASON: &str = "Auto-created new channel when user joined";
pub const DELETE_REASON: &str = "Channel is empty and has no members.";

#[cfg(test)]
mod tests {
    use {super::*, crate::types::ChannelId};

    #[test]
    fn prompt_names_the_category() {
        let category = Category {
            id: ChannelId(1),
            name: "Gaming".into(),
        };
        let text = name_prompt("alice", Some(&category));
        assert!(text.starts_with("Hi alice!"));
        assert!(text.contains("\"Gaming\" section"));
        assert!(text.contains("type \"Leave\""));
    }

    #[test]
    fn prompt_without_category_says_uncategorized() {
        assert!(name_prompt("bob", None).contains("uncategorized section"));
    }
}
