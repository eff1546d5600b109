// ==============================================================================
// schema.rs - Request Validation Schemas
// ==============================================================================
// Description: Declarative field rules for request body/params/query per operation
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// Security: Allowlist-only body fields, anchored patterns, hex-only identifiers
// ==============================================================================

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Operation names (registry keys)
pub const CREATE_USER: &str = "createUser";
pub const UPDATE_USER: &str = "updateUser";
pub const GET_USER: &str = "getUser";
pub const LOGIN: &str = "login";

/// 10 digits, first digit 1-9
const MOBILE_NUMBER_PATTERN: &str = r"^[1-9][0-9]{9}$";

/// Part of the incoming request a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPart {
    Body,
    Params,
    Query,
}

impl RequestPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPart::Body => "body",
            RequestPart::Params => "params",
            RequestPart::Query => "query",
        }
    }
}

impl fmt::Display for RequestPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON type a field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }
}

/// Format constraint applied after the type check
#[derive(Debug, Clone)]
pub enum Constraint {
    /// String must contain at least one character
    NonEmpty,
    /// String must match the (anchored) pattern
    Pattern(Regex),
    /// String must consist of hexadecimal digits only
    Hex,
}

/// Rule for a single named field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
            constraints: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.constraints.push(Constraint::NonEmpty);
        self
    }

    pub fn pattern(mut self, regex: Regex) -> Self {
        self.constraints.push(Constraint::Pattern(regex));
        self
    }

    pub fn hex(mut self) -> Self {
        self.constraints.push(Constraint::Hex);
        self
    }
}

/// Named set of field rules, grouped by request part.
///
/// Parts without rules are not inspected at all. Within a part that has
/// rules, fields not named by any rule are rejected unless the part was
/// declared with [`ValidationSchema::allow_unknown`].
#[derive(Debug, Clone)]
pub struct ValidationSchema {
    name: &'static str,
    parts: BTreeMap<RequestPart, Vec<FieldRule>>,
    open_parts: Vec<RequestPart>,
}

impl ValidationSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            parts: BTreeMap::new(),
            open_parts: Vec::new(),
        }
    }

    pub fn body(self, rules: Vec<FieldRule>) -> Self {
        self.part(RequestPart::Body, rules)
    }

    pub fn params(self, rules: Vec<FieldRule>) -> Self {
        self.part(RequestPart::Params, rules)
    }

    pub fn query(self, rules: Vec<FieldRule>) -> Self {
        self.part(RequestPart::Query, rules)
    }

    pub fn part(mut self, part: RequestPart, rules: Vec<FieldRule>) -> Self {
        self.parts.insert(part, rules);
        self
    }

    /// Accept fields in `part` that no rule mentions
    pub fn allow_unknown(mut self, part: RequestPart) -> Self {
        if !self.open_parts.contains(&part) {
            self.open_parts.push(part);
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self, part: RequestPart) -> Option<&[FieldRule]> {
        self.parts.get(&part).map(Vec::as_slice)
    }

    pub fn declared_parts(&self) -> impl Iterator<Item = (RequestPart, &[FieldRule])> {
        self.parts.iter().map(|(part, rules)| (*part, rules.as_slice()))
    }

    pub fn declares(&self, part: RequestPart) -> bool {
        self.parts.contains_key(&part)
    }

    pub fn allows_unknown(&self, part: RequestPart) -> bool {
        self.open_parts.contains(&part)
    }
}

/// Error raised while building the registry (bad pattern literal)
#[derive(Debug, thiserror::Error)]
#[error("invalid pattern for {field}: {source}")]
pub struct SchemaError {
    field: &'static str,
    #[source]
    source: regex::Error,
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|source| SchemaError { field, source })
}

/// Immutable set of schemas, built once at startup
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    create_user: Arc<ValidationSchema>,
    update_user: Arc<ValidationSchema>,
    get_user: Arc<ValidationSchema>,
    login: Arc<ValidationSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Result<Self, SchemaError> {
        let mobile_number = compile("mobileNumber", MOBILE_NUMBER_PATTERN)?;

        let user_body = || {
            vec![
                FieldRule::string("username").required().non_empty(),
                FieldRule::string("mobileNumber")
                    .required()
                    .pattern(mobile_number.clone()),
            ]
        };
        let user_id = || vec![FieldRule::string("userId").required().non_empty().hex()];

        Ok(Self {
            // POST /api/users
            create_user: Arc::new(ValidationSchema::new(CREATE_USER).body(user_body())),
            // PUT|PATCH /api/users/{userId}
            update_user: Arc::new(
                ValidationSchema::new(UPDATE_USER)
                    .body(user_body())
                    .params(user_id()),
            ),
            // GET /api/users/{userId}
            get_user: Arc::new(ValidationSchema::new(GET_USER).params(user_id())),
            // POST /api/auth/login
            login: Arc::new(ValidationSchema::new(LOGIN).body(vec![
                FieldRule::string("username").required().non_empty(),
                FieldRule::string("password").required().non_empty(),
            ])),
        })
    }

    /// Look up a schema by operation name
    pub fn get(&self, operation: &str) -> Option<Arc<ValidationSchema>> {
        match operation {
            CREATE_USER => Some(self.create_user()),
            UPDATE_USER => Some(self.update_user()),
            GET_USER => Some(self.get_user()),
            LOGIN => Some(self.login()),
            _ => None,
        }
    }

    pub fn names(&self) -> [&'static str; 4] {
        [CREATE_USER, UPDATE_USER, GET_USER, LOGIN]
    }

    pub fn create_user(&self) -> Arc<ValidationSchema> {
        Arc::clone(&self.create_user)
    }

    pub fn update_user(&self) -> Arc<ValidationSchema> {
        Arc::clone(&self.update_user)
    }

    pub fn get_user(&self) -> Arc<ValidationSchema> {
        Arc::clone(&self.get_user)
    }

    pub fn login(&self) -> Arc<ValidationSchema> {
        Arc::clone(&self.login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_all_operations() {
        let registry = SchemaRegistry::new().unwrap();
        for name in registry.names() {
            assert_eq!(registry.get(name).unwrap().name(), name);
        }
        assert!(registry.get("deleteUser").is_none());
    }

    #[test]
    fn test_update_user_declares_body_and_params() {
        let registry = SchemaRegistry::new().unwrap();
        let schema = registry.update_user();

        assert!(schema.declares(RequestPart::Body));
        assert!(schema.declares(RequestPart::Params));
        assert!(!schema.declares(RequestPart::Query));

        let params = schema.rules(RequestPart::Params).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "userId");
        assert!(params[0].required);
        assert!(params[0]
            .constraints
            .iter()
            .any(|c| matches!(c, Constraint::Hex)));
    }

    #[test]
    fn test_login_password_has_no_format_constraint() {
        let registry = SchemaRegistry::new().unwrap();
        let login = registry.login();
        let password = login
            .rules(RequestPart::Body)
            .unwrap()
            .iter()
            .find(|rule| rule.name == "password")
            .unwrap();

        assert!(password.required);
        assert!(password
            .constraints
            .iter()
            .all(|c| matches!(c, Constraint::NonEmpty)));
    }

    #[test]
    fn test_mobile_number_pattern_is_anchored() {
        let re = compile("mobileNumber", MOBILE_NUMBER_PATTERN).unwrap();
        assert!(re.is_match("9123456780"));
        assert!(!re.is_match("0123456789"));
        assert!(!re.is_match("12345"));
        assert!(!re.is_match("91234567801"));
        assert!(!re.is_match("x9123456780"));
    }

    #[test]
    fn test_bad_pattern_reports_field() {
        let err = compile("broken", "([").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
