use serde::Serialize;

/// A curated neighborhood with fixed coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighborhood {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub label: &'static str,
}

const fn entry(name: &'static str, latitude: f64, longitude: f64, label: &'static str) -> Neighborhood {
    Neighborhood {
        name,
        latitude,
        longitude,
        label,
    }
}

/// London neighborhoods offered when address lookup is unavailable
pub const NEIGHBORHOODS: &[Neighborhood] = &[
    entry("Harrow", 51.5898, -0.3346, "Harrow, Greater London"),
    entry("Wembley", 51.5560, -0.2796, "Wembley, Brent"),
    entry("Ealing", 51.5130, -0.3089, "Ealing, Greater London"),
    entry("Richmond", 51.4613, -0.3037, "Richmond, Richmond upon Thames"),
    entry("Wimbledon", 51.4214, -0.2064, "Wimbledon, Merton"),
    entry("Kensington", 51.4991, -0.1938, "Kensington, Kensington and Chelsea"),
    entry("Camden", 51.5390, -0.1426, "Camden Town, Camden"),
    entry("Westminster", 51.4975, -0.1357, "Westminster, City of Westminster"),
    entry("Islington", 51.5362, -0.1033, "Islington, Greater London"),
    entry("Brixton", 51.4613, -0.1156, "Brixton, Lambeth"),
    entry("Shoreditch", 51.5260, -0.0780, "Shoreditch, Hackney"),
    entry("Hackney", 51.5450, -0.0553, "Hackney, Greater London"),
    entry("Canary Wharf", 51.5054, -0.0235, "Canary Wharf, Tower Hamlets"),
    entry("Greenwich", 51.4826, -0.0077, "Greenwich, Royal Borough of Greenwich"),
    entry("Stratford", 51.5416, -0.0034, "Stratford, Newham"),
    entry("Croydon", 51.3762, -0.0982, "Croydon, Greater London"),
];

/// Case-insensitive lookup by name
pub fn find(name: &str) -> Option<&'static Neighborhood> {
    let wanted = name.trim();
    NEIGHBORHOODS
        .iter()
        .find(|n| n.name.eq_ignore_ascii_case(wanted))
}

pub fn names() -> Vec<&'static str> {
    NEIGHBORHOODS.iter().map(|n| n.name).collect()
}
