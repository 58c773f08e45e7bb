//! Simulated IoT packet sources
//!
//! Two device families:
//! - **Smart home hub**: environment readings plus owner and network data.
//! - **Health wearable**: vital signs plus wearer identity (GDPR Art. 9).

use crate::error::{Error, Result};
use crate::packet::{Fields, Packet};
use chrono::{Duration, Local};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;

const FIRST_NAMES: &[&str] = &[
    "Giulia", "Marco", "Francesca", "Luca", "Chiara", "Alessandro", "Sara", "Matteo", "Elena",
    "Davide", "Martina", "Simone",
];

const LAST_NAMES: &[&str] = &[
    "Rossi", "Bianchi", "Romano", "Colombo", "Ricci", "Marino", "Greco", "Bruno", "Gallo",
    "Conti", "Esposito", "Fontana",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

const CITIES: &[&str] = &[
    "Milano", "Torino", "Bologna", "Firenze", "Napoli", "Palermo", "Genova", "Verona", "Bari",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Device family to simulate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    #[default]
    SmartHome,
    WearableHealth,
}

impl Scenario {
    /// `source_type` written into generated packets
    pub fn source_type(&self) -> &'static str {
        match self {
            Self::SmartHome => "SMART_HOME_HUB",
            Self::WearableHealth => "HEALTH_WEARABLE",
        }
    }

    /// Whether this scenario carries special-category data
    pub fn is_health(&self) -> bool {
        matches!(self, Self::WearableHealth)
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmartHome => write!(f, "smart-home"),
            Self::WearableHealth => write!(f, "wearable-health"),
        }
    }
}

impl std::str::FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "smart-home" | "home" => Ok(Self::SmartHome),
            "wearable-health" | "wearable" | "health" => Ok(Self::WearableHealth),
            other => Err(Error::Config(format!("Unknown scenario '{}'", other))),
        }
    }
}

/// Random packet generator
pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible generator
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce the next packet for a scenario
    pub fn next_packet(&mut self, scenario: Scenario) -> Packet {
        match scenario {
            Scenario::SmartHome => self.smart_home(),
            Scenario::WearableHealth => self.wearable(),
        }
    }

    fn smart_home(&mut self) -> Packet {
        let (first, last) = self.person();
        let domain = self.pick(EMAIL_DOMAINS);

        let payload = fields(json!({
            "temperature": round2(self.rng.gen_range(18.0..24.0)),
            "humidity": self.rng.gen_range(30..=60),
            "energy_consumption": round2(self.rng.gen_range(0.5..2.5)),
        }));
        let metadata = fields(json!({
            "device_id": format!("home_{}", self.rng.gen_range(1000..=9999)),
            "owner_name": format!("{} {}", first, last),
            "owner_email": format!("{}.{}@{}", first.to_lowercase(), last.to_lowercase(), domain),
            "ip_address": self.ipv4(),
            "gps_lat": round6(self.rng.gen_range(-90.0..90.0)),
            "gps_lon": round6(self.rng.gen_range(-180.0..180.0)),
        }));

        Packet::new(Scenario::SmartHome.source_type(), now(), payload, metadata)
    }

    fn wearable(&mut self) -> Packet {
        let (first, last) = self.person();
        let age_days = self.rng.gen_range(18 * 365..90 * 365);
        let dob = Local::now().date_naive() - Duration::days(age_days);

        let payload = fields(json!({
            "heart_rate": self.rng.gen_range(60..=140),
            "blood_oxygen": self.rng.gen_range(95..=100),
            "steps": self.rng.gen_range(0..=100),
        }));
        let metadata = fields(json!({
            "device_serial": format!("wear_{}", self.rng.gen_range(1000..=9999)),
            "user_fullname": format!("{} {}", first, last),
            "user_dob": dob.format("%Y-%m-%d").to_string(),
            "health_id": self.fiscal_code(),
            "location_city": self.pick(CITIES),
        }));

        Packet::new(Scenario::WearableHealth.source_type(), now(), payload, metadata)
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn person(&mut self) -> (&'static str, &'static str) {
        (self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn ipv4(&mut self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.rng.gen_range(1..=223),
            self.rng.gen_range(0..=255),
            self.rng.gen_range(0..=255),
            self.rng.gen_range(1..=254)
        )
    }

    /// Italian tax-code shaped identifier (16 chars)
    fn fiscal_code(&mut self) -> String {
        let mut code = String::with_capacity(16);
        for _ in 0..6 {
            code.push(self.letter());
        }
        code.push_str(&format!("{:02}", self.rng.gen_range(0..100)));
        code.push(self.letter());
        code.push_str(&format!("{:02}", self.rng.gen_range(1..=71)));
        code.push(self.letter());
        code.push_str(&format!("{:03}", self.rng.gen_range(0..1000)));
        code.push(self.letter());
        code
    }

    fn letter(&mut self) -> char {
        char::from(b'A' + self.rng.gen_range(0..26u8))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}
