//! Info records: medicine metadata owned by an admin and reachable publicly
//! through a QR-coded view URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A stored info record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InfoRecord {
    pub id: Uuid,

    // Medicine details
    pub medicine_name: String,
    pub usage: String,
    pub dosage: String,
    pub exp: String,
    pub man: String,
    pub price: String,
    pub btno: String,
    pub comp_name: String,
    pub instr: String,
    pub drugs: String,

    // Ownership and QR
    pub admin_id: Uuid,
    pub qr_code_url: String,
    pub qr_code_image: Option<String>,
    pub unique_id: String,

    // Bookkeeping
    pub view_count: i32,
    pub last_viewed: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InfoRecord {
    pub fn new(
        content: RecordContent,
        admin_id: Uuid,
        unique_id: String,
        qr_code_url: String,
        qr_code_image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            medicine_name: content.medicine_name,
            usage: content.usage,
            dosage: content.dosage,
            exp: content.exp,
            man: content.man,
            price: content.price,
            btno: content.btno,
            comp_name: content.comp_name,
            instr: content.instr,
            drugs: content.drugs,
            admin_id,
            qr_code_url,
            qr_code_image,
            unique_id,
            view_count: 0,
            last_viewed: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn content(&self) -> RecordContent {
        RecordContent {
            medicine_name: self.medicine_name.clone(),
            usage: self.usage.clone(),
            dosage: self.dosage.clone(),
            exp: self.exp.clone(),
            man: self.man.clone(),
            price: self.price.clone(),
            btno: self.btno.clone(),
            comp_name: self.comp_name.clone(),
            instr: self.instr.clone(),
            drugs: self.drugs.clone(),
        }
    }

    /// Replace the editable fields and bump `updated_at`.
    pub fn set_content(&mut self, content: RecordContent) {
        self.medicine_name = content.medicine_name;
        self.usage = content.usage;
        self.dosage = content.dosage;
        self.exp = content.exp;
        self.man = content.man;
        self.price = content.price;
        self.btno = content.btno;
        self.comp_name = content.comp_name;
        self.instr = content.instr;
        self.drugs = content.drugs;
        self.updated_at = Utc::now();
    }

    /// Free-text fields worth translating for a viewer, keyed by JSON name.
    pub fn translatable_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("medicineName", self.medicine_name.clone()),
            ("usage", self.usage.clone()),
            ("dosage", self.dosage.clone()),
            ("instr", self.instr.clone()),
            ("drugs", self.drugs.clone()),
            ("compName", self.comp_name.clone()),
        ]
    }
}

/// Request body for create and update. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFields {
    pub medicine_name: Option<String>,
    pub usage: Option<String>,
    pub dosage: Option<String>,
    pub exp: Option<String>,
    pub man: Option<String>,
    pub price: Option<String>,
    pub btno: Option<String>,
    pub comp_name: Option<String>,
    pub instr: Option<String>,
    pub drugs: Option<String>,
}

impl RecordFields {
    /// Fields a create request may not omit before anything else is checked.
    pub fn has_essentials(&self) -> bool {
        [&self.medicine_name, &self.usage, &self.dosage]
            .iter()
            .all(|field| present(field).is_some())
    }

    /// Build validated content for a new record.
    pub fn into_content(self) -> Result<RecordContent, ValidationError> {
        RecordContent::default().merged_with(self)
    }
}

/// Editable, trimmed fields of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordContent {
    pub medicine_name: String,
    pub usage: String,
    pub dosage: String,
    pub exp: String,
    pub man: String,
    pub price: String,
    pub btno: String,
    pub comp_name: String,
    pub instr: String,
    pub drugs: String,
}

impl RecordContent {
    /// Overwrite every field `fields` carries a non-blank value for, then
    /// validate the result.
    pub fn merged_with(mut self, fields: RecordFields) -> Result<RecordContent, ValidationError> {
        let pairs = [
            (&mut self.medicine_name, fields.medicine_name),
            (&mut self.usage, fields.usage),
            (&mut self.dosage, fields.dosage),
            (&mut self.exp, fields.exp),
            (&mut self.man, fields.man),
            (&mut self.price, fields.price),
            (&mut self.btno, fields.btno),
            (&mut self.comp_name, fields.comp_name),
            (&mut self.instr, fields.instr),
            (&mut self.drugs, fields.drugs),
        ];

        for (slot, value) in pairs {
            if let Some(value) = present(&value) {
                *slot = value.to_string();
            }
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let rules: [(&str, &str, Option<(usize, &str)>); 10] = [
            (self.medicine_name.as_str(), "Medicine name is required", Some((200, "Medicine name"))),
            (self.usage.as_str(), "Usage/Purpose is required", Some((500, "Usage"))),
            (self.dosage.as_str(), "Dosage instructions are required", Some((1000, "Dosage instructions"))),
            (self.exp.as_str(), "Expiry date is required", None),
            (self.man.as_str(), "Manufacturing date is required", None),
            (self.price.as_str(), "Price is required", None),
            (self.btno.as_str(), "Batch number is required", Some((100, "Batch number"))),
            (self.comp_name.as_str(), "Company name is required", Some((200, "Company name"))),
            (self.instr.as_str(), "Storage instructions are required", Some((1000, "Storage instructions"))),
            (self.drugs.as_str(), "Drug composition is required", Some((1000, "Drug composition"))),
        ];

        let mut messages = Vec::new();
        for (value, required, limit) in rules {
            if value.trim().is_empty() {
                messages.push(required.to_string());
            } else if let Some((max, label)) = limit {
                if value.chars().count() > max {
                    messages.push(format!("{} must be less than {} characters", label, max));
                }
            }
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { messages })
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Validation error: {}", .messages.join(", "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_fields() -> RecordFields {
        RecordFields {
            medicine_name: Some("  Paracetamol 500mg ".to_string()),
            usage: Some("Fever and mild pain".to_string()),
            dosage: Some("Take twice daily".to_string()),
            exp: Some("2027-01".to_string()),
            man: Some("2025-01".to_string()),
            price: Some("4.50".to_string()),
            btno: Some("B-1234".to_string()),
            comp_name: Some("Acme Pharma".to_string()),
            instr: Some("Store below 25°C".to_string()),
            drugs: Some("Paracetamol".to_string()),
        }
    }

    #[test]
    fn test_into_content_trims_fields() {
        let content = full_fields().into_content().expect("valid");
        assert_eq!(content.medicine_name, "Paracetamol 500mg");
        assert_eq!(content.instr, "Store below 25°C");
    }

    #[test]
    fn test_has_essentials() {
        assert!(full_fields().has_essentials());

        let mut fields = full_fields();
        fields.dosage = Some("   ".to_string());
        assert!(!fields.has_essentials());

        assert!(!RecordFields::default().has_essentials());
    }

    #[test]
    fn test_missing_fields_collects_every_message() {
        let fields = RecordFields {
            medicine_name: Some("Ibuprofen".to_string()),
            usage: Some("Pain".to_string()),
            dosage: Some("Once".to_string()),
            ..Default::default()
        };

        let err = fields.into_content().unwrap_err();
        assert_eq!(err.messages.len(), 7);
        assert!(err.messages.contains(&"Expiry date is required".to_string()));
        assert!(err.messages.contains(&"Drug composition is required".to_string()));
        assert!(err
            .messages
            .contains(&"Storage instructions are required".to_string()));
    }

    #[test]
    fn test_required_messages_name_each_field() {
        let err = RecordContent::default().validate().unwrap_err();
        assert_eq!(
            err.messages,
            vec![
                "Medicine name is required",
                "Usage/Purpose is required",
                "Dosage instructions are required",
                "Expiry date is required",
                "Manufacturing date is required",
                "Price is required",
                "Batch number is required",
                "Company name is required",
                "Storage instructions are required",
                "Drug composition is required",
            ]
        );
    }

    #[test]
    fn test_usage_length_message() {
        let mut fields = full_fields();
        fields.usage = Some("u".repeat(501));
        let err = fields.into_content().unwrap_err();
        assert_eq!(
            err.messages,
            vec!["Usage must be less than 500 characters".to_string()]
        );
    }

    #[test]
    fn test_max_length_counts_characters() {
        let mut fields = full_fields();
        fields.btno = Some("é".repeat(100));
        assert!(fields.clone().into_content().is_ok());

        fields.btno = Some("x".repeat(101));
        let err = fields.into_content().unwrap_err();
        assert_eq!(
            err.messages,
            vec!["Batch number must be less than 100 characters".to_string()]
        );
    }

    #[test]
    fn test_merge_keeps_existing_values_for_blank_input() {
        let content = full_fields().into_content().unwrap();
        let update = RecordFields {
            price: Some("5.00".to_string()),
            usage: Some("".to_string()),
            ..Default::default()
        };

        let merged = content.clone().merged_with(update).unwrap();
        assert_eq!(merged.price, "5.00");
        assert_eq!(merged.usage, content.usage);
        assert_eq!(merged.medicine_name, content.medicine_name);
    }

    #[test]
    fn test_new_record_defaults() {
        let admin = Uuid::new_v4();
        let record = InfoRecord::new(
            full_fields().into_content().unwrap(),
            admin,
            "abc".to_string(),
            "http://localhost:3000/view/abc".to_string(),
            None,
        );

        assert_eq!(record.admin_id, admin);
        assert_eq!(record.view_count, 0);
        assert!(record.is_active);
        assert!(record.last_viewed.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_set_content_bumps_updated_at() {
        let mut record = InfoRecord::new(
            full_fields().into_content().unwrap(),
            Uuid::new_v4(),
            "abc".to_string(),
            "url".to_string(),
            None,
        );
        let created = record.created_at;

        let mut content = record.content();
        content.price = "9.99".to_string();
        record.set_content(content);

        assert_eq!(record.price, "9.99");
        assert!(record.updated_at >= created);
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = InfoRecord::new(
            full_fields().into_content().unwrap(),
            Uuid::new_v4(),
            "abc".to_string(),
            "url".to_string(),
            Some("data:image/svg+xml;base64,AAAA".to_string()),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["medicineName"], "Paracetamol 500mg");
        assert_eq!(json["compName"], "Acme Pharma");
        assert_eq!(json["qrCodeUrl"], "url");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["viewCount"], 0);
    }

    #[test]
    fn test_translatable_fields_order() {
        let record = InfoRecord::new(
            full_fields().into_content().unwrap(),
            Uuid::new_v4(),
            "abc".to_string(),
            "url".to_string(),
            None,
        );

        let keys: Vec<_> = record.translatable_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["medicineName", "usage", "dosage", "instr", "drugs", "compName"]
        );
    }
}
