//! Page geometry for artifact generation.

/// Paper size for the generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Parse a format name; case-insensitive.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "letter" => Some(Self::Letter),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::Letter => "Letter",
        }
    }
}

/// Geometry used when printing the assembled document to a paginated
/// artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGeometry {
    /// Paper size.
    pub format: PageFormat,
    /// Uniform page margin in millimetres.
    pub margin_mm: u32,
    /// Whether CSS backgrounds are printed.
    pub print_background: bool,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            margin_mm: 20,
            print_background: true,
        }
    }
}
