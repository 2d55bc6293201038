use std::fmt;

use crate::VolumioError;

/// Volume argument for [`crate::VolumioClient::set_volume`].
///
/// Either an absolute level in `0..=100` or one of the symbolic adjustments
/// understood by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Volume {
    /// Absolute level. Build through [`Volume::level`] to keep it in range.
    Level(u8),
    Mute,
    Unmute,
    /// Increase by one device step.
    Plus,
    /// Decrease by one device step.
    Minus,
}

impl Volume {
    /// Maximum absolute level accepted by the device.
    pub const MAX: u8 = 100;

    /// Builds an absolute level, rejecting values above [`Volume::MAX`].
    pub fn level(level: u8) -> Result<Self, VolumioError> {
        if level > Self::MAX {
            return Err(VolumioError::InvalidVolume(level));
        }
        Ok(Self::Level(level))
    }

    /// Value of the `volume` query parameter.
    pub fn as_query_value(&self) -> String {
        match self {
            Self::Level(level) => level.to_string(),
            Self::Mute => "mute".to_owned(),
            Self::Unmute => "unmute".to_owned(),
            Self::Plus => "plus".to_owned(),
            Self::Minus => "minus".to_owned(),
        }
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query_value())
    }
}

impl TryFrom<u8> for Volume {
    type Error = VolumioError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::level(level)
    }
}

/// Tri-state argument for repeat and random modes.
///
/// `Toggle` leaves the decision to the device, so it stays distinct from
/// `Off`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Switch {
    #[default]
    Toggle,
    On,
    Off,
}

impl Switch {
    /// Value of the `value` query parameter, `None` for a toggle.
    pub fn as_query_value(&self) -> Option<&'static str> {
        match self {
            Self::Toggle => None,
            Self::On => Some("true"),
            Self::Off => Some("false"),
        }
    }
}

impl From<bool> for Switch {
    fn from(value: bool) -> Self {
        if value {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl From<Option<bool>> for Switch {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Toggle, Self::from)
    }
}

/// Optional arguments for [`crate::VolumioClient::browse`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrowseOptions {
    /// Library URI to list, `None` for the root.
    pub uri: Option<String>,
    /// Maximum number of entries.
    pub limit: Option<u32>,
    /// Index of the first entry.
    pub offset: Option<u32>,
}

impl BrowseOptions {
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}
