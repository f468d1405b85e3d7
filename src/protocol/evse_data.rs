//! `eRoamingPushEvseData`
//!
//! Element order of `EvseDataRecord` follows the hub schema; the hub rejects
//! records with reordered children.

use super::common_types::read_acknowledgement;
use super::envelope::SoapRequest;
use super::namespaces::Namespace;
use super::numeric::format_coordinate;
use super::operation::Operation;
use super::xml::{XmlElement, XmlWriter};
use crate::domain::{Acknowledgement, ActionType, Address, EvseDataRecord, GeoCoordinates, OperatorEvseData};
use crate::support::errors::CodecResult;

const NS: Namespace = Namespace::EvseData;
const CT: Namespace = Namespace::CommonTypes;

#[derive(Debug, Clone, PartialEq)]
pub struct PushEvseDataRequest {
    pub action: ActionType,
    pub data: OperatorEvseData,
}

impl SoapRequest for PushEvseDataRequest {
    type Response = Acknowledgement;

    fn operation(&self) -> Operation {
        Operation::PushEvseData
    }

    fn write_content(&self, w: &mut XmlWriter) -> CodecResult<()> {
        w.element(NS, "ActionType", self.action.as_wire_str())?;
        w.nested(NS, "OperatorEvseData", |w| {
            w.element(NS, "OperatorID", self.data.operator_id.as_str())?;
            w.optional(NS, "OperatorName", self.data.operator_name.as_deref())?;
            for record in &self.data.records {
                write_record(w, record)?;
            }
            Ok(())
        })
    }

    fn decode_response(payload: &XmlElement) -> CodecResult<Acknowledgement> {
        read_acknowledgement(payload)
    }
}

fn write_record(w: &mut XmlWriter, r: &EvseDataRecord) -> CodecResult<()> {
    w.nested(NS, "EvseDataRecord", |w| {
        w.element(NS, "EvseId", r.evse_id.as_str())?;
        w.optional(NS, "ChargingStationId", r.charging_station_id.as_deref())?;
        w.mandatory(NS, "ChargingStationName", r.charging_station_name.as_deref())?;
        w.optional(NS, "EnChargingStationName", r.en_charging_station_name.as_deref())?;
        write_address(w, &r.address)?;
        write_geo(w, "GeoCoordinates", &r.geo_coordinates)?;
        write_list(w, "Plugs", "Plug", &r.plugs)?;
        write_list(w, "ChargingFacilities", "ChargingFacility", &r.charging_facilities)?;
        write_list(w, "ChargingModes", "ChargingMode", &r.charging_modes)?;
        write_list(w, "AuthenticationModes", "AuthenticationMode", &r.authentication_modes)?;
        if let Some(capacity) = r.max_capacity {
            w.element(NS, "MaxCapacity", &capacity.to_string())?;
        }
        write_list(w, "PaymentOptions", "PaymentOption", &r.payment_options)?;
        w.mandatory(NS, "Accessibility", r.accessibility.as_deref())?;
        w.mandatory(NS, "HotlinePhoneNum", r.hotline_phone_number.as_deref())?;
        w.optional(NS, "AdditionalInfo", r.additional_info.as_deref())?;
        w.optional(NS, "EnAdditionalInfo", r.en_additional_info.as_deref())?;
        if let Some(entrance) = &r.geo_charging_point_entrance {
            write_geo(w, "GeoChargingPointEntrance", entrance)?;
        }
        w.boolean(NS, "IsOpen24Hours", r.is_open_24_hours)?;
        w.optional(NS, "OpeningTime", r.opening_time.as_deref())?;
        w.optional(NS, "HubOperatorID", r.hub_operator_id.as_ref().map(|id| id.as_str()))?;
        w.optional(NS, "ClearinghouseID", r.clearinghouse_id.as_deref())?;
        w.boolean(NS, "IsHubjectCompatible", r.is_hubject_compatible)?;
        w.element(NS, "DynamicInfoAvailable", r.dynamic_info_available.as_wire_str())
    })
}

fn write_address(w: &mut XmlWriter, address: &Address) -> CodecResult<()> {
    w.nested(NS, "Address", |w| {
        w.element(CT, "Country", &address.country)?;
        w.element(CT, "City", &address.city)?;
        w.element(CT, "Street", &address.street)?;
        w.optional(CT, "PostalCode", address.postal_code.as_deref())?;
        w.optional(CT, "HouseNum", address.house_number.as_deref())?;
        w.optional(CT, "Floor", address.floor.as_deref())?;
        w.optional(CT, "Region", address.region.as_deref())?;
        w.optional(CT, "TimeZone", address.time_zone.as_deref())
    })
}

fn write_geo(w: &mut XmlWriter, element: &str, geo: &GeoCoordinates) -> CodecResult<()> {
    let longitude = format_coordinate("Longitude", geo.longitude)?;
    let latitude = format_coordinate("Latitude", geo.latitude)?;
    w.nested(NS, element, |w| {
        w.nested(CT, "DecimalDegree", |w| {
            w.element(CT, "Longitude", &longitude)?;
            w.element(CT, "Latitude", &latitude)
        })
    })
}

/// Wrapper element with one child per value; omitted when empty.
fn write_list(w: &mut XmlWriter, wrapper: &str, item: &str, values: &[String]) -> CodecResult<()> {
    if values.is_empty() {
        return Ok(());
    }
    w.nested(NS, wrapper, |w| {
        for value in values {
            w.element(NS, item, value)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvseId, OperatorId};
    use crate::protocol::envelope::{encode_request, parse_envelope, EnvelopeBody};
    use crate::support::errors::CodecError;

    fn record() -> EvseDataRecord {
        let mut address = Address::new("DEU", "Jena", "Biberweg");
        address.house_number = Some("18".to_string());
        let mut record = EvseDataRecord::new(
            EvseId::new("DE*ABC*E1").unwrap(),
            address,
            GeoCoordinates::new(50.927054, 11.5892372),
        );
        record.plugs = vec!["Type 2 Outlet".to_string()];
        record.authentication_modes = vec!["NFC RFID Classic".to_string()];
        record.hotline_phone_number = Some("+49 3641 000000".to_string());
        record
    }

    fn encoded_record(record: EvseDataRecord) -> XmlElement {
        let request = PushEvseDataRequest {
            action: ActionType::FullLoad,
            data: OperatorEvseData {
                operator_id: OperatorId::new("DE*ABC").unwrap(),
                operator_name: None,
                records: vec![record],
            },
        };
        let xml = encode_request(&request).unwrap();
        let payload = match parse_envelope(&xml).unwrap() {
            EnvelopeBody::Payload(p) => p,
            other => panic!("Expected payload, got {:?}", other),
        };
        assert_eq!(payload.name, "eRoamingPushEvseData");
        assert_eq!(payload.child_text("ActionType"), Some("fullLoad"));
        payload
            .child("OperatorEvseData")
            .and_then(|o| o.child("EvseDataRecord"))
            .cloned()
            .unwrap()
    }

    #[test]
    fn record_children_follow_schema_order() {
        let element = encoded_record(record());
        let names: Vec<_> = element.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "EvseId",
                "ChargingStationName",
                "Address",
                "GeoCoordinates",
                "Plugs",
                "AuthenticationModes",
                "Accessibility",
                "HotlinePhoneNum",
                "IsOpen24Hours",
                "IsHubjectCompatible",
                "DynamicInfoAvailable",
            ]
        );
    }

    #[test]
    fn mandatory_fields_are_sent_empty() {
        let element = encoded_record(record());
        assert!(element.child("ChargingStationName").is_some());
        assert_eq!(element.child_text("ChargingStationName"), None);
        assert!(element.child("Accessibility").is_some());
        assert_eq!(element.child("EnChargingStationName"), None);
    }

    #[test]
    fn coordinates_use_decimal_point_and_six_digits() {
        let element = encoded_record(record());
        let degree = element
            .child("GeoCoordinates")
            .and_then(|g| g.child("DecimalDegree"))
            .unwrap();
        assert_eq!(degree.child_text("Longitude"), Some("11.589237"));
        assert_eq!(degree.child_text("Latitude"), Some("50.927054"));
    }

    #[test]
    fn address_order() {
        let element = encoded_record(record());
        let address = element.child("Address").unwrap();
        let names: Vec<_> = address.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Country", "City", "Street", "HouseNum"]);
    }

    #[test]
    fn invalid_coordinates_fail_encoding() {
        let mut bad = record();
        bad.geo_coordinates.latitude = f64::NAN;
        let request = PushEvseDataRequest {
            action: ActionType::Insert,
            data: OperatorEvseData {
                operator_id: OperatorId::new("DE*ABC").unwrap(),
                operator_name: None,
                records: vec![bad],
            },
        };
        assert!(matches!(
            encode_request(&request),
            Err(CodecError::InvalidValue { .. })
        ));
    }
}
