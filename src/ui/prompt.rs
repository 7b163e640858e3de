//! Form fields for the two credentials

use dialoguer::{Input, Password, theme::ColorfulTheme};
use std::fmt;

/// Unvalidated form input. Never printed in full.
pub struct RawCredentials {
    pub api_key: String,
    pub channel_id: String,
}

impl fmt::Debug for RawCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCredentials")
            .field("api_key", &format_args!("<{} chars>", self.api_key.chars().count()))
            .field("channel_id", &format_args!("<{} chars>", self.channel_id.chars().count()))
            .finish()
    }
}

/// Ask for the API key (masked) and the channel id
pub fn prompt_credentials() -> anyhow::Result<RawCredentials> {
    let theme = ColorfulTheme::default();

    let api_key = Password::with_theme(&theme)
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()?;

    let channel_id: String = Input::with_theme(&theme)
        .with_prompt("Channel ID")
        .allow_empty(true)
        .interact_text()?;

    Ok(RawCredentials {
        api_key,
        channel_id,
    })
}
