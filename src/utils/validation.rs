use regex::Regex;
use std::sync::LazyLock;

use crate::utils::error::{AppError, AppResult};

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_ROOM_NAME_LENGTH: usize = 256;
pub const MAX_ROOM_ABOUT_LENGTH: usize = 256;
pub const MAX_PROFILE_PICTURE_LENGTH: usize = 1024;
pub const MAX_MESSAGE_TEXT_LENGTH: usize = 512;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("URL pattern is valid")
});

fn is_printable(s: &str) -> bool {
    s.chars().all(|c| !c.is_control())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() {
        return Err(AppError::validation("Username cannot be empty"));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Username must be at most {} characters long",
            MAX_USERNAME_LENGTH
        )));
    }

    if !is_printable(username) {
        return Err(AppError::validation(
            "Username must contain only printable characters",
        ));
    }

    Ok(())
}

pub fn validate_max_participants(max_participants: i64) -> AppResult<()> {
    if max_participants < 1 {
        return Err(AppError::validation(
            "Rooms need room for at least one participant!",
        ));
    }

    Ok(())
}

/// Group rooms are listed by name, so they cannot go without one.
pub fn validate_room_name(name: &str, max_participants: i64) -> AppResult<()> {
    if name.chars().count() > MAX_ROOM_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Room name must be at most {} characters long",
            MAX_ROOM_NAME_LENGTH
        )));
    }

    if name.trim().is_empty() && max_participants > 2 {
        return Err(AppError::validation("Group Rooms need a name!"));
    }

    Ok(())
}

pub fn validate_room_about(about: Option<&str>) -> AppResult<()> {
    if let Some(about) = about
        && about.chars().count() > MAX_ROOM_ABOUT_LENGTH
    {
        return Err(AppError::Validation(format!(
            "Room description must be at most {} characters long",
            MAX_ROOM_ABOUT_LENGTH
        )));
    }

    Ok(())
}

pub fn validate_profile_picture(url: Option<&str>) -> AppResult<()> {
    let Some(url) = url else {
        return Ok(());
    };

    if url.len() > MAX_PROFILE_PICTURE_LENGTH {
        return Err(AppError::Validation(format!(
            "Profile picture URL must be at most {} characters long",
            MAX_PROFILE_PICTURE_LENGTH
        )));
    }

    if !URL_PATTERN.is_match(url) {
        return Err(AppError::validation("Profile picture must be a valid URL"));
    }

    Ok(())
}

pub fn validate_message_text(text: &str) -> AppResult<()> {
    if text.chars().count() > MAX_MESSAGE_TEXT_LENGTH {
        return Err(AppError::Validation(format!(
            "Message text must be at most {} characters long",
            MAX_MESSAGE_TEXT_LENGTH
        )));
    }

    Ok(())
}
