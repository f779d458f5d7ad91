use std::fmt;
use std::str::FromStr;

use crate::foundation::error::StoryError;

/// Identity of one transformable layer.
///
/// The textual form (`meta`, `stats`, `primary`, `route`, `image:<uuid>`) is what drafts store
/// as map keys and in the order list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LayerId {
    Meta,
    Stats,
    Primary,
    Route,
    Image(String),
}

impl LayerId {
    pub const BUILTIN: [LayerId; 4] = [LayerId::Meta, LayerId::Stats, LayerId::Primary, LayerId::Route];

    pub fn image(id: impl Into<String>) -> Self {
        LayerId::Image(id.into())
    }

    pub fn is_image(&self) -> bool {
        matches!(self, LayerId::Image(_))
    }

    pub fn image_id(&self) -> Option<&str> {
        match self {
            LayerId::Image(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerId::Meta => f.write_str("meta"),
            LayerId::Stats => f.write_str("stats"),
            LayerId::Primary => f.write_str("primary"),
            LayerId::Route => f.write_str("route"),
            LayerId::Image(id) => write!(f, "image:{id}"),
        }
    }
}

impl FromStr for LayerId {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta" => Ok(LayerId::Meta),
            "stats" => Ok(LayerId::Stats),
            "primary" => Ok(LayerId::Primary),
            "route" => Ok(LayerId::Route),
            other => match other.strip_prefix("image:") {
                Some(id) if !id.trim().is_empty() => Ok(LayerId::Image(id.to_string())),
                _ => Err(StoryError::validation(format!("unknown layer id '{other}'"))),
            },
        }
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for LayerId {
    type Error = StoryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    Off,
    Map,
    #[default]
    Trace,
}

impl RouteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteMode::Off => "off",
            RouteMode::Map => "map",
            RouteMode::Trace => "trace",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(RouteMode::Off),
            "map" => Some(RouteMode::Map),
            "trace" => Some(RouteMode::Trace),
            _ => None,
        }
    }

    /// Tap-activate cycle. `Off` is not part of it.
    pub fn cycled(self) -> Self {
        match self {
            RouteMode::Map => RouteMode::Trace,
            RouteMode::Trace => RouteMode::Map,
            RouteMode::Off => RouteMode::Off,
        }
    }
}

/// Free-form image placed on the canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageOverlay {
    pub id: String,
    pub uri: String,
    /// Nominal size in logical canvas units.
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    #[serde(default)]
    pub name: String,
}

impl ImageOverlay {
    pub fn layer_id(&self) -> LayerId {
        LayerId::Image(self.id.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundMedia {
    pub kind: MediaKind,
    pub uri: String,
}

impl BackgroundMedia {
    pub fn image(uri: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            uri: uri.into(),
        }
    }

    pub fn video(uri: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            uri: uri.into(),
        }
    }
}

/// Colour tint drawn between the background media and the layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundFilter {
    #[default]
    None,
    Dim,
    Warm,
    Cool,
}

impl BackgroundFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(BackgroundFilter::None),
            "dim" => Some(BackgroundFilter::Dim),
            "warm" => Some(BackgroundFilter::Warm),
            "cool" => Some(BackgroundFilter::Cool),
            _ => None,
        }
    }

    pub fn tint(self) -> Option<crate::foundation::core::Rgba8> {
        use crate::foundation::core::Rgba8;
        match self {
            BackgroundFilter::None => None,
            BackgroundFilter::Dim => Some(Rgba8::new(0, 0, 0, 89)),
            BackgroundFilter::Warm => Some(Rgba8::new(255, 140, 40, 46)),
            BackgroundFilter::Cool => Some(Rgba8::new(40, 120, 255, 46)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/layer.rs"]
mod tests;
