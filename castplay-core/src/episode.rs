use std::fmt::Display;
use std::path::Path;

use lofty::{ file::{ AudioFile, TaggedFileExt }, probe::Probe, tag::Accessor };

use crate::error::DeviceError;

/// A single playable episode.
///
/// Episodes carry no identity beyond their slot in the queue, so the same
/// episode may appear several times.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Episode {
    /// Episode title
    pub title: String,
    /// Display credits (hosts, guests)
    pub members: String,
    /// Artwork location
    pub thumbnail: String,
    /// Length in whole seconds
    pub duration: u32,
    /// Media location handed to the playback device
    pub url: String,
}

impl Episode {
    pub fn new(
        title: impl Into<String>,
        members: impl Into<String>,
        thumbnail: impl Into<String>,
        duration: u32,
        url: impl Into<String>
    ) -> Self {
        Self {
            title: title.into(),
            members: members.into(),
            thumbnail: thumbnail.into(),
            duration,
            url: url.into(),
        }
    }

    /// Build an episode from a local audio file, reading title, artist and
    /// length from its tags. Missing tags fall back to the file stem and an
    /// empty credit line.
    pub fn from_path(path: &Path) -> Result<Episode, DeviceError> {
        if !path.is_file() {
            return Err(DeviceError::SourceNotFound(path.display().to_string()));
        }

        let mut episode = Episode {
            url: path.display().to_string(),
            ..Default::default()
        };

        match Probe::open(path).and_then(|p| p.read()) {
            Ok(tagged_file) => {
                episode.duration = tagged_file.properties().duration().as_secs() as u32;
                if let Some(tag) = tagged_file.primary_tag() {
                    if let Some(title) = tag.title() {
                        episode.title = title.to_string();
                    }
                    if let Some(artist) = tag.artist() {
                        episode.members = artist.to_string();
                    }
                }
                log::info!("Episode loaded: {:?} by {:?}", episode.title, episode.members);
            }
            Err(e) => {
                log::warn!("Failed to read tags from {}: {}", path.display(), e);
            }
        }

        if episode.title.is_empty() {
            episode.title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown")
                .to_string();
        }

        Ok(episode)
    }
}

impl Display for Episode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mins = self.duration / 60;
        let secs = self.duration % 60;
        if self.members.is_empty() {
            write!(f, "{} ({:02}:{:02})", self.title, mins, secs)
        } else {
            write!(f, "{} - {} ({:02}:{:02})", self.title, self.members, mins, secs)
        }
    }
}
