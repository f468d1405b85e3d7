//! Static EVSE data as pushed to the hub
//!
//! These records are the flattened output of the charge point / station /
//! pool hierarchy. Vocabulary fields (plugs, facilities, modes, ...) carry
//! the hub's wire names, already mapped by the caller.

use serde::{Deserialize, Serialize};

use super::identifiers::{EvseId, OperatorId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// ISO 3166-1 alpha-3 country code.
    pub country: String,
    pub city: String,
    pub street: String,
    pub postal_code: Option<String>,
    pub house_number: Option<String>,
    pub floor: Option<String>,
    pub region: Option<String>,
    pub time_zone: Option<String>,
}

impl Address {
    pub fn new(
        country: impl Into<String>,
        city: impl Into<String>,
        street: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
            street: street.into(),
            postal_code: None,
            house_number: None,
            floor: None,
            region: None,
            time_zone: None,
        }
    }
}

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Static data of one EVSE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvseDataRecord {
    pub evse_id: EvseId,
    pub charging_station_id: Option<String>,
    /// Mandatory on the wire; sent empty when unknown.
    pub charging_station_name: Option<String>,
    pub en_charging_station_name: Option<String>,
    pub address: Address,
    pub geo_coordinates: GeoCoordinates,
    pub plugs: Vec<String>,
    pub charging_facilities: Vec<String>,
    pub charging_modes: Vec<String>,
    pub authentication_modes: Vec<String>,
    /// Maximum capacity in kWh.
    pub max_capacity: Option<u32>,
    pub payment_options: Vec<String>,
    /// Mandatory on the wire; sent empty when unknown.
    pub accessibility: Option<String>,
    /// Mandatory on the wire; sent empty when unknown.
    pub hotline_phone_number: Option<String>,
    pub additional_info: Option<String>,
    pub en_additional_info: Option<String>,
    pub geo_charging_point_entrance: Option<GeoCoordinates>,
    pub is_open_24_hours: bool,
    pub opening_time: Option<String>,
    pub hub_operator_id: Option<OperatorId>,
    pub clearinghouse_id: Option<String>,
    pub is_hubject_compatible: bool,
    pub dynamic_info_available: DynamicInfoAvailable,
}

impl EvseDataRecord {
    /// Record with the required fields set and everything optional empty.
    pub fn new(evse_id: EvseId, address: Address, geo_coordinates: GeoCoordinates) -> Self {
        Self {
            evse_id,
            charging_station_id: None,
            charging_station_name: None,
            en_charging_station_name: None,
            address,
            geo_coordinates,
            plugs: Vec::new(),
            charging_facilities: Vec::new(),
            charging_modes: Vec::new(),
            authentication_modes: Vec::new(),
            max_capacity: None,
            payment_options: Vec::new(),
            accessibility: None,
            hotline_phone_number: None,
            additional_info: None,
            en_additional_info: None,
            geo_charging_point_entrance: None,
            is_open_24_hours: true,
            opening_time: None,
            hub_operator_id: None,
            clearinghouse_id: None,
            is_hubject_compatible: true,
            dynamic_info_available: DynamicInfoAvailable::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicInfoAvailable {
    True,
    False,
    Auto,
}

impl DynamicInfoAvailable {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Auto => "auto",
        }
    }
}

/// A batch of static EVSE data for one operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorEvseData {
    pub operator_id: OperatorId,
    pub operator_name: Option<String>,
    pub records: Vec<EvseDataRecord>,
}
