use crate::error::EditorError;
use crate::models::DocumentKind;
use chrono::{DateTime, Utc};

/// Width of the `YYYYMMDDHHMMSS` prefix on an encoded key.
pub const TIMESTAMP_LEN: usize = 14;

/// Field separator inside an encoded key. No field may contain it.
const SEPARATOR: &str = "__";

/// The opaque editing-session token round-tripped through the external
/// editor.
///
/// The editor promises to echo the encoded form back verbatim on save, which
/// lets the service stay stateless: everything needed to re-authorize and
/// commit the document travels inside the key itself. The embedded timestamp
/// is advisory (a freshness marker for operators) and is never used for
/// authorization decisions.
///
/// Wire layout: `<14-digit timestamp><object_name>__<kind>__<document_id>__<user_id>`.
/// Fields past the fourth are tolerated and ignored so the layout can grow
/// without breaking keys already held by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    created_at: String,
    object_name: String,
    kind: DocumentKind,
    document_id: String,
    user_id: String,
}

impl SessionKey {
    pub fn new(
        created_at: DateTime<Utc>,
        object_name: &str,
        kind: DocumentKind,
        document_id: &str,
        user_id: &str,
    ) -> Result<Self, EditorError> {
        let timestamp = created_at.format("%Y%m%d%H%M%S").to_string();
        Self::from_parts(timestamp, object_name, kind, document_id, user_id)
    }

    fn from_parts(
        timestamp: String,
        object_name: &str,
        kind: DocumentKind,
        document_id: &str,
        user_id: &str,
    ) -> Result<Self, EditorError> {
        validate_timestamp(&timestamp)?;
        validate_field("object name", object_name)?;
        validate_field("document id", document_id)?;
        validate_field("user id", user_id)?;

        Ok(Self {
            created_at: timestamp,
            object_name: object_name.to_string(),
            kind,
            document_id: document_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    /// Parse an encoded key echoed back by the editor. Pure; fails closed.
    pub fn decode(raw: &str) -> Result<Self, EditorError> {
        let timestamp = raw
            .get(..TIMESTAMP_LEN)
            .ok_or_else(|| EditorError::MalformedKey("key is shorter than the timestamp prefix".to_string()))?;
        let rest = raw
            .get(TIMESTAMP_LEN..)
            .ok_or_else(|| EditorError::MalformedKey("key is shorter than the timestamp prefix".to_string()))?;

        let fields: Vec<&str> = rest.split(SEPARATOR).collect();
        if fields.len() < 4 {
            return Err(EditorError::MalformedKey(format!(
                "expected at least 4 '{}'-separated fields, got {}",
                SEPARATOR,
                fields.len()
            )));
        }

        let kind: DocumentKind = fields[1].parse()?;

        Self::from_parts(timestamp.to_string(), fields[0], kind, fields[2], fields[3])
    }

    /// Render the wire form handed to the editor as the `key` field.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{sep}{}{sep}{}{sep}{}",
            self.created_at,
            self.object_name,
            self.kind,
            self.document_id,
            self.user_id,
            sep = SEPARATOR,
        )
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

fn validate_timestamp(timestamp: &str) -> Result<(), EditorError> {
    if timestamp.len() != TIMESTAMP_LEN || !timestamp.chars().all(|c| c.is_ascii_digit()) {
        return Err(EditorError::MalformedKey(
            "timestamp prefix must be 14 ASCII digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_field(name: &str, value: &str) -> Result<(), EditorError> {
    if value.is_empty() {
        return Err(EditorError::MalformedKey(format!("{} is empty", name)));
    }
    if value.contains(SEPARATOR) {
        return Err(EditorError::MalformedKey(format!(
            "{} must not contain '{}'",
            name, SEPARATOR
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_key() -> SessionKey {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 5).unwrap();
        SessionKey::new(
            created_at,
            "generated/cv-42.docx",
            DocumentKind::Candidate,
            "42",
            "auth0|u123",
        )
        .unwrap()
    }

    #[test]
    fn encode_produces_expected_layout() {
        let encoded = sample_key().encode();
        assert_eq!(
            encoded,
            "20240307150405generated/cv-42.docx__candidate__42__auth0|u123"
        );
    }

    #[test]
    fn decode_round_trips_encode() {
        let key = sample_key();
        let decoded = SessionKey::decode(&key.encode()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn decode_rejects_short_keys() {
        let err = SessionKey::decode("2024").unwrap_err();
        assert!(matches!(err, EditorError::MalformedKey(_)));
    }

    #[test]
    fn decode_rejects_non_digit_timestamp() {
        let err = SessionKey::decode("2024030715040Xobj__candidate__1__u").unwrap_err();
        assert!(matches!(err, EditorError::MalformedKey(_)));
    }

    #[test]
    fn decode_rejects_too_few_fields() {
        let err = SessionKey::decode("20240307150405obj__candidate__1").unwrap_err();
        assert!(matches!(err, EditorError::MalformedKey(_)));
    }

    #[test]
    fn decode_rejects_empty_fields() {
        let err = SessionKey::decode("20240307150405obj__candidate__1__").unwrap_err();
        assert!(matches!(err, EditorError::MalformedKey(_)));
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        let err = SessionKey::decode("20240307150405obj__invoice__1__u").unwrap_err();
        assert!(matches!(err, EditorError::UnsupportedDocumentKind(_)));
    }

    #[test]
    fn decode_ignores_extra_fields() {
        let decoded = SessionKey::decode("20240307150405obj__job_post__9__u1__extra").unwrap();
        assert_eq!(decoded.object_name(), "obj");
        assert_eq!(decoded.kind(), DocumentKind::JobPost);
        assert_eq!(decoded.document_id(), "9");
        assert_eq!(decoded.user_id(), "u1");
    }

    #[test]
    fn constructor_rejects_separator_in_object_name() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 5).unwrap();
        let err = SessionKey::new(
            created_at,
            "generated__cv.docx",
            DocumentKind::Candidate,
            "42",
            "u1",
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::MalformedKey(_)));
    }

    #[test]
    fn constructor_rejects_empty_document_id() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 5).unwrap();
        let err =
            SessionKey::new(created_at, "obj.docx", DocumentKind::Candidate, "", "u1").unwrap_err();
        assert!(matches!(err, EditorError::MalformedKey(_)));
    }
}
