//! Tables registered in the geopackage content catalog.

use std::fmt;

/// Content type declared in `gpkg_contents.data_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    /// Vector features with a geometry column
    Features,
    /// Tile pyramid
    Tiles,
    /// Non-spatial attributes
    Attributes,
    /// Extension-defined content type
    Other(String),
}

impl ContentType {
    /// Parse a catalog `data_type` value.
    pub fn from_data_type(data_type: &str) -> Self {
        match data_type {
            "features" => ContentType::Features,
            "tiles" => ContentType::Tiles,
            "attributes" => ContentType::Attributes,
            other => ContentType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Features => f.write_str("features"),
            ContentType::Tiles => f.write_str("tiles"),
            ContentType::Attributes => f.write_str("attributes"),
            ContentType::Other(other) => f.write_str(other),
        }
    }
}

/// A user table known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Declared content type
    pub content_type: ContentType,
}

impl Table {
    /// Create a table entry.
    pub fn new(name: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            name: name.into(),
            content_type,
        }
    }

    /// Feature table entry.
    pub fn features(name: impl Into<String>) -> Self {
        Self::new(name, ContentType::Features)
    }

    /// Attributes table entry.
    pub fn attributes(name: impl Into<String>) -> Self {
        Self::new(name, ContentType::Attributes)
    }

    /// Whether the table holds geometries, so bounding boxes can be computed.
    pub fn is_feature_table(&self) -> bool {
        self.content_type == ContentType::Features
    }
}
