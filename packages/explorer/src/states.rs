//! Indian state and union territory codes.
//!
//! Maps the two-letter region codes used as snapshot keys to display
//! names. `TT` is the country-wide aggregate.

/// Region codes of the 36 states and union territories.
pub const STATE_CODES: &[&str] = &[
    "AN", "AP", "AR", "AS", "BR", "CH", "CT", "DL", "DN", "GA", "GJ", "HP", "HR", "JH", "JK", "KA",
    "KL", "LA", "LD", "MH", "ML", "MN", "MP", "MZ", "NL", "OR", "PB", "PY", "RJ", "SK", "TG", "TN",
    "TR", "UP", "UT", "WB",
];

/// Returns `true` for a state or union territory code (not `TT`).
#[must_use]
pub fn is_state_code(code: &str) -> bool {
    STATE_CODES.contains(&code)
}

/// Maps a region code to its display name.
///
/// Returns `None` for unrecognized codes.
#[must_use]
pub fn state_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "TT" => "India",
        "AN" => "Andaman and Nicobar Islands",
        "AP" => "Andhra Pradesh",
        "AR" => "Arunachal Pradesh",
        "AS" => "Assam",
        "BR" => "Bihar",
        "CH" => "Chandigarh",
        "CT" => "Chhattisgarh",
        "DL" => "Delhi",
        "DN" => "Dadra and Nagar Haveli and Daman and Diu",
        "GA" => "Goa",
        "GJ" => "Gujarat",
        "HP" => "Himachal Pradesh",
        "HR" => "Haryana",
        "JH" => "Jharkhand",
        "JK" => "Jammu and Kashmir",
        "KA" => "Karnataka",
        "KL" => "Kerala",
        "LA" => "Ladakh",
        "LD" => "Lakshadweep",
        "MH" => "Maharashtra",
        "ML" => "Meghalaya",
        "MN" => "Manipur",
        "MP" => "Madhya Pradesh",
        "MZ" => "Mizoram",
        "NL" => "Nagaland",
        "OR" => "Odisha",
        "PB" => "Punjab",
        "PY" => "Puducherry",
        "RJ" => "Rajasthan",
        "SK" => "Sikkim",
        "TG" => "Telangana",
        "TN" => "Tamil Nadu",
        "TR" => "Tripura",
        "UP" => "Uttar Pradesh",
        "UT" => "Uttarakhand",
        "WB" => "West Bengal",
        _ => return None,
    };
    Some(name)
}
