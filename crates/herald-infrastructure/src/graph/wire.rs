//! Graph API payloads and their mapping onto domain types.

use herald_core::HeraldError;
use herald_core::recipient::Recipient;
use herald_core::session::Profile;
use serde::Deserialize;

/// Graph's "invalid OAuth access token" error code.
const OAUTH_EXCEPTION_CODE: i64 = 190;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphProfile {
    id: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<GraphPicture>,
}

#[derive(Debug, Deserialize)]
struct GraphPicture {
    data: GraphPictureData,
}

#[derive(Debug, Deserialize)]
struct GraphPictureData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphFriend {
    id: String,
    name: String,
    #[serde(default)]
    picture: Option<GraphPicture>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphGroup {
    id: String,
    name: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    member_count: Option<u64>,
}

/// A single page of a Graph edge. Paging cursors are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

impl From<GraphProfile> for Profile {
    fn from(raw: GraphProfile) -> Self {
        Profile {
            id: raw.id,
            name: raw.name,
            picture: raw.picture.and_then(|p| p.data.url),
            email: raw.email,
        }
    }
}

impl From<GraphFriend> for Recipient {
    fn from(raw: GraphFriend) -> Self {
        let mut recipient = Recipient::individual(raw.id, raw.name);
        recipient.picture = raw.picture.and_then(|p| p.data.url);
        recipient
    }
}

impl From<GraphGroup> for Recipient {
    fn from(raw: GraphGroup) -> Self {
        let mut recipient = Recipient::group(raw.id, raw.name);
        recipient.picture = raw.icon;
        recipient.member_count = raw.member_count;
        recipient
    }
}

impl<T> GraphList<T> {
    pub(crate) fn into_recipients(self) -> Vec<Recipient>
    where
        T: Into<Recipient>,
    {
        self.data.into_iter().map(Into::into).collect()
    }
}

pub(crate) fn parse_profile(body: &str) -> Result<Profile, HeraldError> {
    let raw: GraphProfile = serde_json::from_str(body)?;
    Ok(raw.into())
}

pub(crate) fn parse_individuals(body: &str) -> Result<Vec<Recipient>, HeraldError> {
    let list: GraphList<GraphFriend> = serde_json::from_str(body)?;
    Ok(list.into_recipients())
}

pub(crate) fn parse_groups(body: &str) -> Result<Vec<Recipient>, HeraldError> {
    let list: GraphList<GraphGroup> = serde_json::from_str(body)?;
    Ok(list.into_recipients())
}

/// Maps a non-success Graph response onto a [`HeraldError`].
pub(crate) fn map_error(status: u16, body: &str) -> HeraldError {
    match serde_json::from_str::<GraphErrorEnvelope>(body) {
        Ok(envelope) if envelope.error.code == Some(OAUTH_EXCEPTION_CODE) => {
            HeraldError::SessionInvalid(envelope.error.message)
        }
        Ok(envelope) => match envelope.error.code {
            Some(code) => HeraldError::remote(format!("{} (code {})", envelope.error.message, code)),
            None => HeraldError::remote(envelope.error.message),
        },
        Err(_) => HeraldError::remote(format!("HTTP {}: {}", status, body.trim())),
    }
}

/// Extracts an access token from what the user pasted after the OAuth dialog.
///
/// Accepts either the bare token or the full redirect URL, whose fragment
/// carries `access_token=...`. Returns `None` when the redirect reports an
/// error (the user cancelled) or nothing usable was pasted.
pub fn token_from_redirect(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let Some((_, params)) = input.split_once(['#', '?']) else {
        return (!input.contains("://")).then(|| input.to_string());
    };

    let mut token = None;
    for pair in params.split(['&', '#']) {
        match pair.split_once('=') {
            Some(("error", _)) => return None,
            Some(("access_token", value)) if !value.is_empty() => token = Some(value.to_string()),
            _ => {}
        }
    }
    token
}
