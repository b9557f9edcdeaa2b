//! Wire types exchanged with the backend.
//!
//! Field names are camelCase on the wire. Enumerations travel as integers
//! but their names are accepted too.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed-in user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Parent,
    Child,
}

impl Role {
    /// Parse a role name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parent" => Some(Role::Parent),
            "child" => Some(Role::Child),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Parent => write!(f, "Parent"),
            Role::Child => write!(f, "Child"),
        }
    }
}

/// Response to register, login and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub role: String,
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_token_expires_at: Option<String>,
}

impl AuthResponse {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParentRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChildRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub monthly_allowance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
}

impl CreateChildRequest {
    /// New child with a zero allowance.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            monthly_allowance: 0.0,
            parent_email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub monthly_allowance: f64,
    pub current_balance: f64,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAllowanceRequest {
    pub monthly_allowance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductBalanceRequest {
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductPointsRequest {
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    /// Child accounts only.
    #[serde(default)]
    pub monthly_allowance: Option<f64>,
    #[serde(default)]
    pub current_balance: Option<f64>,
    #[serde(default)]
    pub points: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

/// Enum value as it may appear on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnumRepr {
    Code(u8),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnumRepr", into = "u8")]
pub enum ListType {
    Normal,
    Emergency,
}

impl TryFrom<EnumRepr> for ListType {
    type Error = String;

    fn try_from(repr: EnumRepr) -> Result<Self, Self::Error> {
        match repr {
            EnumRepr::Code(0) => Ok(ListType::Normal),
            EnumRepr::Code(1) => Ok(ListType::Emergency),
            EnumRepr::Name(name) if name.eq_ignore_ascii_case("normal") => Ok(ListType::Normal),
            EnumRepr::Name(name) if name.eq_ignore_ascii_case("emergency") => {
                Ok(ListType::Emergency)
            }
            EnumRepr::Code(code) => Err(format!("unknown list type {}", code)),
            EnumRepr::Name(name) => Err(format!("unknown list type {:?}", name)),
        }
    }
}

impl From<ListType> for u8 {
    fn from(value: ListType) -> Self {
        match value {
            ListType::Normal => 0,
            ListType::Emergency => 1,
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListType::Normal => write!(f, "normal"),
            ListType::Emergency => write!(f, "emergency"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnumRepr", into = "u8")]
pub enum ListStatus {
    Pending,
    Approved,
    Rejected,
}

impl TryFrom<EnumRepr> for ListStatus {
    type Error = String;

    fn try_from(repr: EnumRepr) -> Result<Self, Self::Error> {
        let name = match repr {
            EnumRepr::Code(0) => return Ok(ListStatus::Pending),
            EnumRepr::Code(1) => return Ok(ListStatus::Approved),
            EnumRepr::Code(2) => return Ok(ListStatus::Rejected),
            EnumRepr::Code(code) => return Err(format!("unknown list status {}", code)),
            EnumRepr::Name(name) => name,
        };
        match name.to_ascii_lowercase().as_str() {
            "pending" => Ok(ListStatus::Pending),
            "approved" => Ok(ListStatus::Approved),
            "rejected" => Ok(ListStatus::Rejected),
            _ => Err(format!("unknown list status {:?}", name)),
        }
    }
}

impl From<ListStatus> for u8 {
    fn from(value: ListStatus) -> Self {
        match value {
            ListStatus::Pending => 0,
            ListStatus::Approved => 1,
            ListStatus::Rejected => 2,
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListStatus::Pending => write!(f, "pending"),
            ListStatus::Approved => write!(f, "approved"),
            ListStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub list_type: ListType,
    pub status: ListStatus,
    #[serde(default)]
    pub total_cost: f64,
    pub created_at: String,
    #[serde(default)]
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    /// Creation time, if the timestamp is parseable.
    ///
    /// Timestamps without an offset are taken as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.created_at) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn completed_items(&self) -> usize {
        self.items.iter().filter(|item| item.is_completed).count()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShoppingListRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub list_type: ListType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTitleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteItemRequest {
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyItemRequest {
    pub image_base64: String,
}

/// Outcome of matching a photographed price tag against an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyItemResponse {
    pub is_match: bool,
    pub confidence: f64,
    #[serde(default)]
    pub ocr_text: String,
    #[serde(default)]
    pub extracted_price: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl VerifyItemResponse {
    /// Extracted price as a number, accepting a decimal comma.
    pub fn extracted_price_value(&self) -> Option<f64> {
        self.extracted_price
            .as_deref()
            .map(|raw| raw.trim().replace(',', "."))
            .and_then(|raw| raw.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_type_serializes_as_integer() {
        let request = CreateShoppingListRequest {
            title: "Groceries".into(),
            list_type: ListType::Emergency,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"title": "Groceries", "type": 1})
        );
    }

    #[test]
    fn test_shopping_list_deserializes() {
        let list: ShoppingList = serde_json::from_value(json!({
            "id": "3f2b",
            "title": "School",
            "type": 0,
            "status": 1,
            "totalCost": 12.5,
            "createdAt": "2024-09-01T10:15:00.123",
            "items": [
                {"id": "a", "name": "Pencil", "price": 2.5, "isCompleted": true},
                {"id": "b", "name": "Notebook", "price": null, "isCompleted": false}
            ]
        }))
        .unwrap();

        assert_eq!(list.list_type, ListType::Normal);
        assert_eq!(list.status, ListStatus::Approved);
        assert_eq!(list.completed_items(), 1);
        assert_eq!(list.items[1].price, None);
        assert!(list.created_at_utc().is_some());
    }

    #[test]
    fn test_enum_names_are_accepted() {
        let status: ListStatus = serde_json::from_value(json!("Rejected")).unwrap();
        assert_eq!(status, ListStatus::Rejected);
        let list_type: ListType = serde_json::from_value(json!("emergency")).unwrap();
        assert_eq!(list_type, ListType::Emergency);
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        assert!(serde_json::from_value::<ListStatus>(json!(7)).is_err());
        assert!(serde_json::from_value::<ListType>(json!("urgent")).is_err());
    }

    #[test]
    fn test_create_child_defaults() {
        let request = CreateChildRequest::new("kid@example.com", "secret1", "Ana", "Kovac");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["monthlyAllowance"], json!(0.0));
        assert!(value.get("parentEmail").is_none());
    }

    #[test]
    fn test_auth_response_role() {
        let auth: AuthResponse = serde_json::from_value(json!({
            "userId": "u1",
            "email": "p@example.com",
            "fullName": "Pat Parent",
            "role": "PARENT",
            "token": "T1",
            "refreshToken": "R1",
            "refreshTokenExpiresAt": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(auth.role(), Some(Role::Parent));
        assert_eq!(auth.refresh_token.as_deref(), Some("R1"));
    }

    #[test]
    fn test_profile_child_fields_optional() {
        let profile: MeProfile = serde_json::from_value(json!({
            "id": "p1",
            "firstName": "Pat",
            "lastName": "Parent",
            "fullName": "Pat Parent",
            "email": "p@example.com",
            "monthlyAllowance": null
        }))
        .unwrap();
        assert_eq!(profile.monthly_allowance, None);
        assert_eq!(profile.points, None);
    }

    #[test]
    fn test_extracted_price_with_decimal_comma() {
        let response = VerifyItemResponse {
            is_match: true,
            confidence: 0.92,
            ocr_text: "MLIJEKO 2,49".into(),
            extracted_price: Some("2,49".into()),
            message: String::new(),
        };
        assert_eq!(response.extracted_price_value(), Some(2.49));
    }
}
