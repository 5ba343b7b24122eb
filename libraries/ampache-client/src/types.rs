//! XML response types for the Ampache server API.
//!
//! The server wraps every response in a `<root>` element and reports
//! failures as an `<error code="...">message</error>` child (newer servers
//! nest the text in `<errorMessage>`). Numeric values
//! arrive as (often CDATA-wrapped) text, so they are read as strings and
//! parsed leniently.

use ampache_core::{AlbumId, AlbumRecord, CatalogError, Result, SessionInfo, SongId, SongRecord};
use serde::Deserialize;

// =============================================================================
// Shared
// =============================================================================

/// `<error code="404">Not found</error>` or
/// `<error errorCode="4704"><errorMessage>Not Found</errorMessage></error>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct XmlError {
    #[serde(rename = "@code")]
    pub code: Option<String>,
    #[serde(rename = "@errorCode")]
    pub error_code: Option<String>,
    #[serde(rename = "$text")]
    pub message: Option<String>,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
}

impl XmlError {
    pub fn code(&self) -> String {
        self.code
            .as_deref()
            .or(self.error_code.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    pub fn message(&self) -> String {
        [self.message.as_deref(), self.error_message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// 404 in the classic API, 4704 in the newer numbering
    pub fn is_not_found(&self) -> bool {
        matches!(self.code().as_str(), "404" | "4704")
    }
}

/// Element with attributes (ignored) and text content, e.g. `<artist id="3">Name</artist>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct XmlText {
    #[serde(rename = "$text")]
    pub value: String,
}

fn parse_count(value: Option<&str>) -> usize {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn parse_u32(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

// =============================================================================
// Handshake
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HandshakeResponse {
    pub error: Option<XmlError>,
    pub auth: Option<String>,
    pub api: Option<String>,
    pub albums: Option<String>,
    pub artists: Option<String>,
    pub songs: Option<String>,
}

impl HandshakeResponse {
    pub fn into_session(self) -> Result<SessionInfo> {
        if let Some(error) = self.error {
            return Err(CatalogError::AuthFailed(error.message()));
        }

        let token = text(self.auth);
        if token.is_empty() {
            return Err(CatalogError::protocol(
                "No error reported by the server, but no token received",
            ));
        }

        Ok(SessionInfo {
            token,
            album_count: parse_count(self.albums.as_deref()),
            artist_count: parse_count(self.artists.as_deref()),
            song_count: parse_count(self.songs.as_deref()),
            api_version: self.api.map(|v| v.trim().to_string()),
        })
    }
}

// =============================================================================
// Albums
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct XmlAlbum {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub artist: Option<XmlText>,
    pub tracks: Option<String>,
    pub art: Option<String>,
}

impl XmlAlbum {
    pub fn into_record(self) -> Result<AlbumRecord> {
        let raw_id = self.id.unwrap_or_default();
        let id: AlbumId = raw_id
            .parse()
            .map_err(|_| CatalogError::protocol(format!("Invalid album id: {:?}", raw_id)))?;

        Ok(AlbumRecord::new(
            id,
            text(self.name),
            self.artist.map(|a| a.value.trim().to_string()).unwrap_or_default(),
        )
        .with_cover_url(text(self.art))
        .with_track_count(parse_u32(self.tracks.as_deref())))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AlbumsResponse {
    pub error: Option<XmlError>,
    pub total_count: Option<String>,
    #[serde(rename = "album")]
    pub albums: Vec<XmlAlbum>,
}

// =============================================================================
// Songs
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct XmlSong {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub track: Option<String>,
    pub time: Option<String>,
}

impl XmlSong {
    pub fn into_record(self) -> Result<SongRecord> {
        let raw_id = self.id.unwrap_or_default();
        let id: SongId = raw_id
            .parse()
            .map_err(|_| CatalogError::protocol(format!("Invalid song id: {:?}", raw_id)))?;

        Ok(SongRecord::new(id, text(self.title), text(self.url))
            .with_track_number(parse_u32(self.track.as_deref()))
            .with_duration_seconds(parse_u32(self.time.as_deref())))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SongsResponse {
    pub error: Option<XmlError>,
    #[serde(rename = "song")]
    pub songs: Vec<XmlSong>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_with_cdata_counts() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<root>
    <auth><![CDATA[cfj3f237d563f479f5223k23189dbb34]]></auth>
    <api><![CDATA[350001]]></api>
    <songs><![CDATA[120]]></songs>
    <albums><![CDATA[12]]></albums>
    <artists><![CDATA[5]]></artists>
</root>"#;
        let response: HandshakeResponse = quick_xml::de::from_str(xml).unwrap();
        let session = response.into_session().unwrap();

        assert_eq!(session.token, "cfj3f237d563f479f5223k23189dbb34");
        assert_eq!(session.album_count, 12);
        assert_eq!(session.artist_count, 5);
        assert_eq!(session.song_count, 120);
        assert_eq!(session.api_version.as_deref(), Some("350001"));
    }

    #[test]
    fn handshake_error_carries_server_message() {
        let xml = r#"<root><error code="401"><![CDATA[Error Invalid Handshake - Invalid Username/Password]]></error></root>"#;
        let response: HandshakeResponse = quick_xml::de::from_str(xml).unwrap();

        match response.into_session() {
            Err(CatalogError::AuthFailed(msg)) => assert!(msg.contains("Invalid Username")),
            other => panic!("Expected AuthFailed, got {:?}", other),
        }
    }

    #[test]
    fn nested_error_message_is_used() {
        let xml = concat!(
            r#"<root><error errorCode="4701">"#,
            "<errorAction><![CDATA[handshake]]></errorAction>",
            "<errorType><![CDATA[account]]></errorType>",
            "<errorMessage><![CDATA[Received Invalid Handshake - Incorrect username or password]]></errorMessage>",
            "</error></root>"
        );
        let response: HandshakeResponse = quick_xml::de::from_str(xml).unwrap();

        match response.into_session() {
            Err(CatalogError::AuthFailed(msg)) => {
                assert_eq!(msg, "Received Invalid Handshake - Incorrect username or password");
            }
            other => panic!("Expected AuthFailed, got {:?}", other),
        }
    }

    #[test]
    fn handshake_without_token_is_protocol_error() {
        let xml = r#"<root><api>350001</api></root>"#;
        let response: HandshakeResponse = quick_xml::de::from_str(xml).unwrap();
        assert!(matches!(
            response.into_session(),
            Err(CatalogError::Protocol(_))
        ));
    }

    #[test]
    fn album_list_parses_nested_artist() {
        let xml = r#"<root>
<total_count>2</total_count>
<album id="2910">
    <name><![CDATA[Back in Black]]></name>
    <artist id="129348"><![CDATA[AC/DC]]></artist>
    <year>1980</year>
    <tracks>10</tracks>
    <art><![CDATA[http://localhost/image.php?id=2910]]></art>
</album>
<album id="2911">
    <name>Highway to Hell</name>
    <artist id="129348">AC/DC</artist>
    <tracks>10</tracks>
</album>
</root>"#;
        let response: AlbumsResponse = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(response.albums.len(), 2);

        let first = response.albums[0].clone().into_record().unwrap();
        assert_eq!(first.id, AlbumId::new(2910));
        assert_eq!(first.name, "Back in Black");
        assert_eq!(first.artist, "AC/DC");
        assert_eq!(first.track_count, 10);
        assert_eq!(first.cover_url, "http://localhost/image.php?id=2910");

        let second = response.albums[1].clone().into_record().unwrap();
        assert!(second.cover_url.is_empty());
    }

    #[test]
    fn album_without_id_is_rejected() {
        let album = XmlAlbum {
            name: Some("Nameless".into()),
            ..Default::default()
        };
        assert!(matches!(album.into_record(), Err(CatalogError::Protocol(_))));
    }

    #[test]
    fn song_fields_default_when_missing() {
        let xml = r#"<root><song id="77"><title>Untitled</title></song></root>"#;
        let response: SongsResponse = quick_xml::de::from_str(xml).unwrap();
        let song = response.songs[0].clone().into_record().unwrap();

        assert_eq!(song.id, SongId::new(77));
        assert_eq!(song.title, "Untitled");
        assert_eq!(song.track_number, 0);
        assert_eq!(song.duration_seconds, 0);
        assert!(song.url.is_empty());
    }

    #[test]
    fn not_found_codes() {
        let classic = XmlError {
            code: Some("404".into()),
            ..Default::default()
        };
        let newer = XmlError {
            error_code: Some("4704".into()),
            ..Default::default()
        };
        let other = XmlError {
            code: Some("400".into()),
            ..Default::default()
        };
        assert!(classic.is_not_found());
        assert!(newer.is_not_found());
        assert!(!other.is_not_found());
    }
}
