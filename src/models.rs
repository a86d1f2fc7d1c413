use serde::{Serialize, Deserialize, Serializer};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use std::fmt;

// Fixed-choice form fields: serialized by their display label.
macro_rules! choice_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self { $($name::$variant => $label),+ }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
        }
    };
}

choice_enum!(Gender { Female => "Female", Male => "Male", Other => "Other" });

choice_enum!(BodyShape {
    Hourglass => "Hourglass",
    Pear => "Pear",
    Apple => "Apple",
    Rectangle => "Rectangle",
    InvertedTriangle => "Inverted Triangle",
    All => "All",
});

choice_enum!(StyleTag {
    Minimal => "Minimal",
    Elegant => "Elegant",
    Modern => "Modern",
    Casual => "Casual",
    Feminine => "Feminine",
    Street => "Street",
    Office => "Office",
    Vintage => "Vintage",
});

choice_enum!(EventType {
    Office => "Office",
    Casual => "Casual",
    Date => "Date",
    Party => "Party",
    Travel => "Travel",
    Formal => "Formal",
    Interview => "Interview",
});

/// Country presets offered by the form; any other text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Country {
    Pakistan,
    India,
    Bangladesh,
    Other(String),
}

impl Country {
    pub const PRESETS: &'static [&'static str] = &["Pakistan", "India", "Bangladesh", "Other"];
}

impl From<String> for Country {
    fn from(s: String) -> Self {
        match s.trim() {
            "Pakistan" => Country::Pakistan,
            "India" => Country::India,
            "Bangladesh" => Country::Bangladesh,
            other => Country::Other(other.to_string()),
        }
    }
}

impl From<Country> for String {
    fn from(c: Country) -> Self { c.to_string() }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Country::Pakistan => f.write_str("Pakistan"),
            Country::India => f.write_str("India"),
            Country::Bangladesh => f.write_str("Bangladesh"),
            Country::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub gender: Gender,
    pub country: Country,
    pub body_shape: BodyShape,
    pub styles: Vec<StyleTag>,
    pub event_types: Vec<EventType>,
    pub budget: f64, // USD
    pub exclude_colors: String, // comma-separated free text
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            gender: Gender::Female,
            country: Country::Pakistan,
            body_shape: BodyShape::Hourglass,
            styles: vec![StyleTag::Minimal],
            event_types: vec![EventType::Casual],
            budget: 120.0,
            exclude_colors: "light blue, sky blue".to_string(),
        }
    }
}

impl Preferences {
    pub fn excluded_colors(&self) -> Vec<String> {
        self.exclude_colors
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub system: String,
    pub user: String,
}

/// Garment slot of an item. Unknown slots invented by the model are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Top,
    Bottom,
    Shoes,
    Accessory,
    Outer,
    Other(String),
}

impl Category {
    /// Row background used by the results table.
    pub fn background_color(&self) -> &'static str {
        match self {
            Category::Top => "#FFD1DC",       // light pink
            Category::Bottom => "#D1F0FF",    // light blue
            Category::Shoes => "#FFF0D1",     // light orange
            Category::Accessory => "#E2FFD1", // light green
            Category::Outer => "#F0D1FF",     // light purple
            Category::Other(_) => "#FFFFFF",
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Top" => Category::Top,
            "Bottom" => Category::Bottom,
            "Shoes" => Category::Shoes,
            "Accessory" => Category::Accessory,
            "Outer" => Category::Outer,
            _ => Category::Other(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self { c.to_string() }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Top => f.write_str("Top"),
            Category::Bottom => f.write_str("Bottom"),
            Category::Shoes => f.write_str("Shoes"),
            Category::Accessory => f.write_str("Accessory"),
            Category::Outer => f.write_str("Outer"),
            Category::Other(s) => f.write_str(s),
        }
    }
}

/// Outfit total as reported by the model. Never derived from item prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TotalPrice {
    Amount(f64),
    Unknown,
}

impl TotalPrice {
    pub const UNKNOWN_LABEL: &'static str = "N/A";
}

impl fmt::Display for TotalPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalPrice::Amount(v) => write!(f, "${:.2}", v),
            TotalPrice::Unknown => f.write_str(Self::UNKNOWN_LABEL),
        }
    }
}

impl Serialize for TotalPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TotalPrice::Amount(v) => serializer.serialize_f64(*v),
            TotalPrice::Unknown => serializer.serialize_str(Self::UNKNOWN_LABEL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutfitItem {
    pub category: Category,
    pub name: String,
    pub brand: String,
    pub color: String,
    pub material: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutfitRecord {
    pub outfit_name: String,
    pub items: Vec<OutfitItem>,
    pub total_price: TotalPrice,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub outfits: Vec<OutfitRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub genders: Vec<&'static str>,
    pub countries: Vec<&'static str>,
    pub body_shapes: Vec<&'static str>,
    pub styles: Vec<&'static str>,
    pub event_types: Vec<&'static str>,
    pub max_styles: usize,
    pub defaults: Preferences,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            genders: Gender::ALL.iter().map(Gender::label).collect(),
            countries: Country::PRESETS.to_vec(),
            body_shapes: BodyShape::ALL.iter().map(BodyShape::label).collect(),
            styles: StyleTag::ALL.iter().map(StyleTag::label).collect(),
            event_types: EventType::ALL.iter().map(EventType::label).collect(),
            max_styles: crate::prompts::MAX_STYLES,
            defaults: Preferences::default(),
        }
    }
}
