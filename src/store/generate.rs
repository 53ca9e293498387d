//! Synthetic record generation
//!
//! One pure function per [`RecordKind`]. Inputs are the options, the current
//! time and an optional random source; with a fixed clock and `randomize`
//! off (or a fixed `seed`) the output is fully deterministic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use super::schema::{FieldType, Schema};
use crate::error::SteadyError;

/// Fixed set of record shapes the data store can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    Employee,
    Leave,
    Performance,
    Admin,
    Custom,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        Self::User,
        Self::Employee,
        Self::Leave,
        Self::Performance,
        Self::Admin,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Employee => "employee",
            Self::Leave => "leave",
            Self::Performance => "performance",
            Self::Admin => "admin",
            Self::Custom => "custom",
        }
    }

    /// Fields every generated record of this kind carries
    pub fn schema(&self) -> Schema {
        let mut schema = Schema::new().field("id", FieldType::String);
        schema = match self {
            Self::User => schema
                .field("username", FieldType::String)
                .field("password", FieldType::String)
                .field("email", FieldType::String)
                .field("first_name", FieldType::String)
                .field("last_name", FieldType::String)
                .field("role", FieldType::String)
                .field("status", FieldType::String),
            Self::Employee => schema
                .field("employee_id", FieldType::String)
                .field("first_name", FieldType::String)
                .field("middle_name", FieldType::String)
                .field("last_name", FieldType::String)
                .field("email", FieldType::String)
                .field("phone", FieldType::String)
                .field("department", FieldType::String)
                .field("job_title", FieldType::String)
                .field("hire_date", FieldType::String),
            Self::Leave => schema
                .field("leave_type", FieldType::String)
                .field("from_date", FieldType::String)
                .field("to_date", FieldType::String)
                .field("duration", FieldType::String)
                .field("comment", FieldType::String)
                .field("status", FieldType::String),
            Self::Performance => schema
                .field("employee_name", FieldType::String)
                .field("reviewer", FieldType::String)
                .field("period_start", FieldType::String)
                .field("period_end", FieldType::String)
                .field("due_date", FieldType::String)
                .field("rating", FieldType::Number)
                .field("comments", FieldType::String)
                .field("status", FieldType::String),
            Self::Admin => schema
                .field("username", FieldType::String)
                .field("password", FieldType::String)
                .field("role", FieldType::String)
                .field("status", FieldType::String)
                .field("employee_name", FieldType::String),
            Self::Custom => schema,
        };
        schema
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = SteadyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or(SteadyError::UnknownKind { kind: wanted })
    }
}

/// How to build a record
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Leading text of generated names and ids
    pub prefix: String,
    /// Embed the creation time (`created_at` + millisecond suffix)
    pub include_timestamp: bool,
    /// Add a random component and pick values at random from the pools
    pub randomize: bool,
    /// Seed for the random component (reproducible randomness)
    pub seed: Option<u64>,
    /// Merged over the generated fields; custom values win
    pub custom: Map<String, Value>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            prefix: "test".to_string(),
            include_timestamp: true,
            randomize: true,
            seed: None,
            custom: Map::new(),
        }
    }
}

impl GenerateOptions {
    /// No timestamp, no randomness: output depends only on the prefix
    pub fn deterministic() -> Self {
        Self {
            include_timestamp: false,
            randomize: false,
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn with_randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}

const FIRST_NAMES: &[&str] = &["John", "Jane", "Peter", "Linda", "Ravi", "Amelia"];
const LAST_NAMES: &[&str] = &["Doe", "Smith", "Parker", "Garcia", "Patel", "Chen"];
const DEPARTMENTS: &[&str] = &["Engineering", "Human Resources", "Finance", "Sales"];
const JOB_TITLES: &[&str] = &["QA Engineer", "HR Manager", "Accountant", "Account Executive"];
const LEAVE_TYPES: &[&str] = &["CAN - Personal", "CAN - Vacation", "CAN - Bereavement"];

/// Value pool picker: first entry unless randomizing
struct Picker {
    rng: Option<StdRng>,
}

impl Picker {
    fn new(options: &GenerateOptions) -> Self {
        let rng = options.randomize.then(|| match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });
        Self { rng }
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        match &mut self.rng {
            Some(rng) => pool[rng.gen_range(0..pool.len())],
            None => pool[0],
        }
    }

    fn number(&mut self, low: u32, high: u32) -> u32 {
        match &mut self.rng {
            Some(rng) => rng.gen_range(low..=high),
            None => low,
        }
    }

    fn suffix(&mut self) -> Option<u32> {
        self.rng.as_mut().map(|rng| rng.gen_range(1000..10000))
    }
}

/// Build a record of `kind` at time `now`
pub fn generate(kind: RecordKind, options: &GenerateOptions, now: DateTime<Utc>) -> Value {
    let mut picker = Picker::new(options);
    let unique = unique_suffix(options, now, &mut picker);
    let prefix = options.prefix.as_str();

    let mut record = match kind {
        RecordKind::User => user(prefix, &unique, &mut picker),
        RecordKind::Employee => employee(prefix, &unique, now, &mut picker),
        RecordKind::Leave => leave(now, &mut picker),
        RecordKind::Performance => performance(prefix, now, &mut picker),
        RecordKind::Admin => admin(prefix, &unique, &mut picker),
        RecordKind::Custom => Map::new(),
    };

    record.insert("id".into(), json!(format!("{}_{}_{}", prefix, kind, unique)));
    if options.include_timestamp {
        record.insert("created_at".into(), json!(now.to_rfc3339()));
    }
    for (key, value) in &options.custom {
        record.insert(key.clone(), value.clone());
    }
    Value::Object(record)
}

fn unique_suffix(options: &GenerateOptions, now: DateTime<Utc>, picker: &mut Picker) -> String {
    let mut parts = Vec::new();
    if options.include_timestamp {
        parts.push(now.timestamp_millis().to_string());
    }
    if let Some(n) = picker.suffix() {
        parts.push(n.to_string());
    }
    if parts.is_empty() {
        parts.push("1".to_string());
    }
    parts.join("_")
}

fn user(prefix: &str, unique: &str, picker: &mut Picker) -> Map<String, Value> {
    let username = format!("{}_user_{}", prefix, unique);
    let mut record = Map::new();
    record.insert("email".into(), json!(format!("{}@example.com", username)));
    record.insert("username".into(), json!(username));
    record.insert("password".into(), json!("Passw0rd!23"));
    record.insert("first_name".into(), json!(picker.pick(FIRST_NAMES)));
    record.insert("last_name".into(), json!(picker.pick(LAST_NAMES)));
    record.insert("role".into(), json!("ESS"));
    record.insert("status".into(), json!("Enabled"));
    record
}

fn employee(
    prefix: &str,
    unique: &str,
    now: DateTime<Utc>,
    picker: &mut Picker,
) -> Map<String, Value> {
    let first = picker.pick(FIRST_NAMES);
    let last = picker.pick(LAST_NAMES);
    let mut record = Map::new();
    record.insert("employee_id".into(), json!(format!("{}{}", prefix.to_uppercase(), unique)));
    record.insert("first_name".into(), json!(first));
    record.insert("middle_name".into(), json!(""));
    record.insert("last_name".into(), json!(last));
    record.insert(
        "email".into(),
        json!(format!(
            "{}.{}.{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            unique
        )),
    );
    record.insert(
        "phone".into(),
        json!(format!("555-{:04}", picker.number(0, 9999))),
    );
    record.insert("department".into(), json!(picker.pick(DEPARTMENTS)));
    record.insert("job_title".into(), json!(picker.pick(JOB_TITLES)));
    record.insert("hire_date".into(), json!(date(now)));
    record
}

fn leave(now: DateTime<Utc>, picker: &mut Picker) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("leave_type".into(), json!(picker.pick(LEAVE_TYPES)));
    record.insert("from_date".into(), json!(date(now + Duration::days(7))));
    record.insert("to_date".into(), json!(date(now + Duration::days(8))));
    record.insert("duration".into(), json!("Full Day"));
    record.insert("comment".into(), json!("Automated leave request"));
    record.insert("status".into(), json!("Pending Approval"));
    record
}

fn performance(prefix: &str, now: DateTime<Utc>, picker: &mut Picker) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert(
        "employee_name".into(),
        json!(format!("{} {}", picker.pick(FIRST_NAMES), picker.pick(LAST_NAMES))),
    );
    record.insert("reviewer".into(), json!(format!("{} reviewer", prefix)));
    record.insert("period_start".into(), json!(date(now)));
    record.insert("period_end".into(), json!(date(now + Duration::days(90))));
    record.insert("due_date".into(), json!(date(now + Duration::days(100))));
    record.insert("rating".into(), json!(picker.number(1, 5)));
    record.insert("comments".into(), json!("Automated performance review"));
    record.insert("status".into(), json!("Inactive"));
    record
}

fn admin(prefix: &str, unique: &str, picker: &mut Picker) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("username".into(), json!(format!("{}_admin_{}", prefix, unique)));
    record.insert("password".into(), json!("Adm1nPass!23"));
    record.insert("role".into(), json!("Admin"));
    record.insert("status".into(), json!("Enabled"));
    record.insert(
        "employee_name".into(),
        json!(format!("{} {}", picker.pick(FIRST_NAMES), picker.pick(LAST_NAMES))),
    );
    record
}

fn date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::validate;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn every_kind_satisfies_its_schema() {
        for kind in RecordKind::ALL {
            let record = generate(kind, &GenerateOptions::default(), at());
            let violations = validate(&record, &kind.schema());
            assert!(violations.is_empty(), "{kind}: {violations:?}");
        }
    }

    #[test]
    fn deterministic_options_give_identical_records() {
        let a = generate(RecordKind::Employee, &GenerateOptions::deterministic(), at());
        let b = generate(RecordKind::Employee, &GenerateOptions::deterministic(), at());
        assert_eq!(a, b);
        assert_eq!(a["first_name"], "John");
        assert_eq!(a["employee_id"], "TEST1");
    }

    #[test]
    fn seed_makes_randomness_reproducible() {
        let options = GenerateOptions::default().with_seed(42);
        let a = generate(RecordKind::User, &options, at());
        let b = generate(RecordKind::User, &options, at());
        assert_eq!(a, b);
    }

    #[test]
    fn timestamp_embedded_in_id_and_created_at() {
        let options = GenerateOptions::deterministic().with_timestamp(true);
        let record = generate(RecordKind::User, &options, at());
        let millis = at().timestamp_millis().to_string();

        assert_eq!(record["created_at"], "2024-02-10T08:00:00+00:00");
        assert!(record["username"].as_str().unwrap().ends_with(&millis));
        assert_eq!(record["id"], format!("test_user_{}", millis));
    }

    #[test]
    fn custom_fields_win_over_generated_ones() {
        let options = GenerateOptions::deterministic()
            .with_prefix("qa")
            .with_field("role", "Admin")
            .with_field("team", "blue");
        let record = generate(RecordKind::User, &options, at());

        assert_eq!(record["role"], "Admin");
        assert_eq!(record["team"], "blue");
        assert_eq!(record["username"], "qa_user_1");
    }

    #[test]
    fn leave_dates_are_relative_to_now() {
        let record = generate(RecordKind::Leave, &GenerateOptions::deterministic(), at());
        assert_eq!(record["from_date"], "2024-02-17");
        assert_eq!(record["to_date"], "2024-02-18");
        assert_eq!(record["leave_type"], "CAN - Personal");
    }

    #[test]
    fn performance_rating_in_range() {
        for seed in 0..20 {
            let options = GenerateOptions::default().with_seed(seed);
            let record = generate(RecordKind::Performance, &options, at());
            let rating = record["rating"].as_u64().unwrap();
            assert!((1..=5).contains(&rating));
        }
    }

    #[test]
    fn custom_kind_has_only_base_and_custom_fields() {
        let options = GenerateOptions::deterministic().with_field("note", 7);
        let record = generate(RecordKind::Custom, &options, at());
        let keys: Vec<_> = record.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["id".to_string(), "note".to_string()]);
    }

    #[test]
    fn kind_parses_from_str() {
        assert_eq!("Employee".parse::<RecordKind>().unwrap(), RecordKind::Employee);
        let err = "robot".parse::<RecordKind>().unwrap_err();
        assert_eq!(err.code(), "STEADY-022");
    }
}
