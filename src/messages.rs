//! Request and reply envelope types for the registry protocol
//!
//! These mirror the broker-side message definitions to ensure protocol
//! compatibility. Wire field names are camelCase.

use serde::{Deserialize, Serialize};

/// Description of one sensor in a device's schema
///
/// Schemas are ordered: a sensor's position correlates with the position
/// of its samples in a telemetry frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDescriptor {
    pub sensor_id: u32,
    pub type_id: u32,
    pub value_type: u32,
    pub unit: u32,
    pub name: String,
}

/// A registered device as reported by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub schema: Vec<SensorDescriptor>,
}

/// One telemetry sample, positionally tied to a sensor in the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSample {
    pub sensor_id: u32,
    pub value: serde_json::Value,
}

/// Request envelope for [`Operation::Register`](crate::Operation::Register)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub token: String,
    pub device_id: String,
    pub name: String,
}

/// Request envelope for unregister and auth, which only identify a device
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRequest {
    pub token: String,
    pub device_id: String,
}

/// Request envelope for [`Operation::GetDevices`](crate::Operation::GetDevices)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub token: String,
}

/// Request envelope for [`Operation::UpdateSchema`](crate::Operation::UpdateSchema)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchemaRequest {
    pub token: String,
    pub device_id: String,
    pub schema: Vec<SensorDescriptor>,
}

/// Request envelope for [`Operation::PublishData`](crate::Operation::PublishData)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    pub token: String,
    pub device_id: String,
    pub samples: Vec<DataSample>,
}

/// Reply to a registration request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReply {
    pub id: String,
    #[serde(default)]
    pub schema: Option<Vec<SensorDescriptor>>,
}

/// Reply to unregister and auth requests
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckReply {
    pub id: String,
}

/// Reply to a device listing request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListReply {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Reply to a schema update request
///
/// `schema` may be null when the broker reports an error; the error itself
/// is classified before this type is ever decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReply {
    pub id: String,
    #[serde(default)]
    pub schema: Option<Vec<SensorDescriptor>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_serialization() {
        let msg = RegisterRequest {
            token: "secret".to_string(),
            device_id: "abc123".to_string(),
            name: "my-device".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"token":"secret","deviceId":"abc123","name":"my-device"}"#
        );
    }

    #[test]
    fn test_device_request_serialization() {
        let msg = DeviceRequest {
            token: "secret".to_string(),
            device_id: "abc123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"token":"secret","deviceId":"abc123"}"#);
    }

    #[test]
    fn test_list_request_serialization() {
        let msg = ListRequest {
            token: "secret".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"token":"secret"}"#);
    }

    #[test]
    fn test_update_schema_request_serialization() {
        let msg = UpdateSchemaRequest {
            token: "secret".to_string(),
            device_id: "abc123".to_string(),
            schema: vec![SensorDescriptor {
                sensor_id: 1,
                type_id: 2,
                value_type: 3,
                unit: 4,
                name: "temp".to_string(),
            }],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"token":"secret","deviceId":"abc123","schema":[{"sensorId":1,"typeId":2,"valueType":3,"unit":4,"name":"temp"}]}"#
        );
    }

    #[test]
    fn test_data_request_serialization() {
        let msg = DataRequest {
            token: "secret".to_string(),
            device_id: "abc123".to_string(),
            samples: vec![DataSample {
                sensor_id: 1,
                value: serde_json::json!(21.5),
            }],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"token":"secret","deviceId":"abc123","samples":[{"sensorId":1,"value":21.5}]}"#
        );
    }

    #[test]
    fn test_register_reply_deserialization() {
        let json = r#"{"id":"abc123"}"#;
        let msg: RegisterReply = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            RegisterReply {
                id: "abc123".to_string(),
                schema: None
            }
        );
    }

    #[test]
    fn test_register_reply_with_schema_deserialization() {
        let json = r#"{"id":"abc123","schema":[{"sensorId":7,"typeId":1,"valueType":2,"unit":3,"name":"hum"}]}"#;
        let msg: RegisterReply = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "abc123");
        let schema = msg.schema.unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema[0].sensor_id, 7);
        assert_eq!(schema[0].name, "hum");
    }

    #[test]
    fn test_ack_reply_deserialization() {
        let json = r#"{"id":"abc123"}"#;
        let msg: AckReply = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "abc123");
    }

    #[test]
    fn test_ack_reply_ignores_extra_fields() {
        // Brokers may echo fields alongside the id; they are ignored.
        let json = r#"{"id":"abc123","requestedAt":"2024-01-01T00:00:00Z"}"#;
        let msg: AckReply = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "abc123");
    }

    #[test]
    fn test_device_list_reply_deserialization() {
        let json = r#"{"devices":[{"id":"a","name":"one","schema":[]},{"id":"b","name":"two"}]}"#;
        let msg: DeviceListReply = serde_json::from_str(json).unwrap();
        assert_eq!(msg.devices.len(), 2);
        assert_eq!(msg.devices[0].id, "a");
        assert_eq!(msg.devices[1].name, "two");
        assert!(msg.devices[1].schema.is_empty());
    }

    #[test]
    fn test_device_list_reply_missing_devices_field() {
        let json = r#"{}"#;
        let msg: DeviceListReply = serde_json::from_str(json).unwrap();
        assert!(msg.devices.is_empty());
    }

    #[test]
    fn test_schema_reply_null_schema_deserialization() {
        let json = r#"{"id":"abc123","schema":null}"#;
        let msg: SchemaReply = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "abc123");
        assert!(msg.schema.is_none());
    }

    #[test]
    fn test_schema_reply_preserves_sensor_order() {
        let json = r#"{"id":"abc123","schema":[
            {"sensorId":3,"typeId":0,"valueType":0,"unit":0,"name":"c"},
            {"sensorId":1,"typeId":0,"valueType":0,"unit":0,"name":"a"},
            {"sensorId":2,"typeId":0,"valueType":0,"unit":0,"name":"b"}
        ]}"#;
        let msg: SchemaReply = serde_json::from_str(json).unwrap();
        let ids: Vec<u32> = msg.schema.unwrap().iter().map(|s| s.sensor_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
