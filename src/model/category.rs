use serde::{Deserialize, Serialize};

/// The kind of expense. The serialized names are the labels stored in the worksheet and must not
/// change; the English names are accepted when parsing.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum Category {
    #[serde(rename = "Tanken", alias = "Fuel")]
    Fuel,
    #[serde(rename = "Service/Reparatur", alias = "Service/Repair")]
    ServiceRepair,
    #[serde(rename = "Versicherung", alias = "Insurance")]
    Insurance,
    #[serde(rename = "Busse", alias = "Fine")]
    Fine,
    #[serde(rename = "Parkgebühren", alias = "Parking")]
    Parking,
    #[serde(rename = "Sonstiges", alias = "Other")]
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories in the order they are offered for selection.
    pub const ALL: [Category; 6] = [
        Category::Fuel,
        Category::ServiceRepair,
        Category::Insurance,
        Category::Fine,
        Category::Parking,
        Category::Other,
    ];
}
