//! Integration tests for the storefront forms and request payloads.
//!
//! These tests drive the public API the way the checkout UI and the REST
//! handlers use it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use futures_util::poll;
use storefront_validate::prelude::*;
use storefront_validate::{FieldSchema, VALIDATION_UNAVAILABLE};
use tokio::sync::oneshot;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("storefront_validate=debug")
        .with_test_writer()
        .try_init();
}

/// In-memory stand-in for the account service.
struct Accounts {
    taken: Mutex<HashSet<String>>,
    online: bool,
}

impl Accounts {
    fn new(taken: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            taken: Mutex::new(taken.iter().map(|s| s.to_string()).collect()),
            online: true,
        })
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self {
            taken: Mutex::new(HashSet::new()),
            online: false,
        })
    }
}

#[async_trait]
impl UniquenessCheck for Accounts {
    async fn is_unique(&self, value: &str) -> Result<bool, String> {
        if !self.online {
            return Err("account service unreachable".to_string());
        }
        Ok(!self.taken.lock().unwrap().contains(value))
    }
}

/// The password field's live value, read by the confirmation rule.
type PasswordCell = Arc<Mutex<String>>;

fn signup_rules(accounts: Arc<Accounts>, password: &PasswordCell) -> PayloadValidator {
    let source = Arc::clone(password);
    PayloadValidator::new()
        .field(
            "email",
            [
                required("Enter an email address"),
                email(()),
                unique(accounts, "An account with this email already exists"),
            ],
        )
        .field("password", [required(()), min_length(8, ())])
        .field(
            "password_confirmation",
            [confirmation(
                "password",
                move || Value::from(source.lock().unwrap().clone()),
                (),
            )],
        )
        .field("phone", [phone(())])
        .field("website", [url(())])
}

#[tokio::test]
async fn signup_happy_path() {
    init_tracing();
    let password = PasswordCell::default();
    let validator = signup_rules(Accounts::new(&["taken@example.com"]), &password);
    *password.lock().unwrap() = "correct horse".to_string();

    let body = serde_json::json!({
        "email": "new@example.com",
        "password": "correct horse",
        "password_confirmation": "correct horse",
        "phone": "(555) 123-4567",
        "website": "https://example.com"
    });
    assert_eq!(validator.validate(&body).await, Ok(Ok(())));

    // Optional fields may be left out entirely
    let body = serde_json::json!({
        "email": "other@example.com",
        "password": "correct horse",
        "password_confirmation": "correct horse"
    });
    assert_eq!(validator.validate(&body).await, Ok(Ok(())));
}

#[tokio::test]
async fn signup_reports_taken_email() {
    init_tracing();
    let password = PasswordCell::default();
    let validator = signup_rules(Accounts::new(&["taken@example.com"]), &password);
    *password.lock().unwrap() = "short".to_string();

    let body = serde_json::json!({
        "email": "taken@example.com",
        "password": "short",
        "password_confirmation": "shrot",
        "phone": "123-456",
        "website": "ftp://example.com"
    });

    let errors = validator.validate(&body).await.unwrap().unwrap_err();
    let api = serde_json::to_value(errors.to_api_error()).unwrap();

    assert_eq!(api["error"]["type"], "validation_error");
    let fields = api["error"]["fields"].as_array().unwrap();
    let summary: Vec<(&str, &str)> = fields
        .iter()
        .map(|f| (f["field"].as_str().unwrap(), f["code"].as_str().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("email", "unique"),
            ("password", "min_length"),
            ("password_confirmation", "confirmation"),
            ("phone", "phone"),
            ("website", "url"),
        ]
    );
    assert_eq!(
        fields[0]["message"],
        "An account with this email already exists"
    );
}

#[tokio::test]
async fn unreachable_account_service_is_not_a_pass() {
    init_tracing();
    let rules = [required(()), email(()), unique(Accounts::offline(), ())];

    assert_eq!(
        evaluate(&Value::from("someone@example.com"), &rules).await,
        Ok(Some("Unable to verify uniqueness".to_string()))
    );
}

#[tokio::test]
async fn product_listing_form() {
    let rules_price = [required(()), min(0.01, "Price must be positive")];
    let rules_stock = [range(0, 10_000, ())];
    let rules_launch = [required(()), future_date(())];
    let rules_image = [
        required("Upload a product photo"),
        file_size(2, ()),
        file_type(["image/jpeg", "image/png"], ()),
    ];

    assert_eq!(evaluate(&Value::from("19.99"), &rules_price).await, Ok(None));
    assert_eq!(
        evaluate(&Value::from(0), &rules_price).await,
        Ok(Some("Price must be positive".to_string()))
    );
    assert_eq!(
        evaluate(&Value::from("free"), &rules_price).await,
        Ok(Some("Must be a number".to_string()))
    );

    assert_eq!(
        evaluate(&Value::from(10_001), &rules_stock).await,
        Ok(Some("Must be between 0 and 10000".to_string()))
    );

    assert_eq!(
        evaluate(&Value::from("01/01/2000"), &rules_launch).await,
        Ok(Some("Date must be in the future".to_string()))
    );

    let big = FileInfo::new(5 * 1024 * 1024, "image/png").with_name("hero.png");
    assert_eq!(
        evaluate(&Value::from(big), &rules_image).await,
        Ok(Some("File size must be less than 2MB".to_string()))
    );
    let pdf = FileInfo::new(1024, "application/pdf");
    assert_eq!(
        evaluate(&Value::from(pdf), &rules_image).await,
        Ok(Some("File type must be one of: image/jpeg, image/png".to_string()))
    );
    assert_eq!(
        evaluate(&Value::Null, &rules_image).await,
        Ok(Some("Upload a product photo".to_string()))
    );
}

#[tokio::test]
async fn session_ignores_out_of_order_lookups() {
    init_tracing();
    let session = ValidationSession::new();

    // Keystroke 1 starts a lookup, keystroke 2 starts another and finishes first.
    let slow = session.begin("username");
    let fast = session.begin("username");

    let rules = [required(()), unique(Accounts::new(&["ali"]), ())];
    let fast_outcome = evaluate(&Value::from("alice"), &rules).await;
    let slow_outcome = evaluate(&Value::from("ali"), &rules).await;

    assert_eq!(session.complete(fast, fast_outcome), Completion::Applied(None));
    assert_eq!(session.complete(slow, slow_outcome), Completion::Stale);
    assert_eq!(session.error("username"), None);
    assert!(session.is_valid());
}

/// Account service whose answer for some usernames is held until released.
struct GatedAccounts {
    taken: HashSet<String>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl GatedAccounts {
    fn new(taken: &[&str]) -> Self {
        Self {
            taken: taken.iter().map(|s| s.to_string()).collect(),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Hold lookups of `value` until the returned sender fires.
    fn hold(&self, value: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gates.lock().unwrap().insert(value.to_string(), gate);
        release
    }
}

#[async_trait]
impl UniquenessCheck for GatedAccounts {
    async fn is_unique(&self, value: &str) -> Result<bool, String> {
        let gate = self.gates.lock().unwrap().remove(value);
        if let Some(gate) = gate {
            gate.await.map_err(|e| e.to_string())?;
        }
        Ok(!self.taken.contains(value))
    }
}

#[tokio::test]
async fn session_drops_lookup_that_resolves_after_a_newer_one() {
    init_tracing();
    let accounts = Arc::new(GatedAccounts::new(&["ali"]));
    let release_ali = accounts.hold("ali");
    let rules = [required(()), unique(Arc::clone(&accounts), ())];
    let session = ValidationSession::new();

    // "ali" is typed first and its lookup stalls
    let older_value = Value::from("ali");
    let older = session.validate_field("username", &older_value, &rules);
    tokio::pin!(older);
    assert!(poll!(older.as_mut()).is_pending());
    assert!(session.is_validating("username"));

    // "alice" is typed next and resolves right away
    let newer = session
        .validate_field("username", &Value::from("alice"), &rules)
        .await;
    assert_eq!(newer, Completion::Applied(None));

    // The "ali" lookup answers last, with "taken"
    release_ali.send(()).unwrap();
    assert_eq!(older.await, Completion::Stale);

    assert_eq!(session.error("username"), None);
    assert!(!session.is_validating("username"));
    assert!(session.is_valid());
}

#[tokio::test]
async fn session_keeps_newest_failure_over_late_pass() {
    let accounts = Arc::new(GatedAccounts::new(&["ali"]));
    let release_bob = accounts.hold("bob");
    let rules = [required(()), unique(Arc::clone(&accounts), ())];
    let session = ValidationSession::new();

    let older_value = Value::from("bob");
    let older = session.validate_field("username", &older_value, &rules);
    tokio::pin!(older);
    assert!(poll!(older.as_mut()).is_pending());

    let newer = session
        .validate_field("username", &Value::from("ali"), &rules)
        .await;
    assert_eq!(
        newer,
        Completion::Applied(Some("This value is already taken".to_string()))
    );

    release_bob.send(()).unwrap();
    assert_eq!(older.await, Completion::Stale);
    assert_eq!(
        session.error("username").as_deref(),
        Some("This value is already taken")
    );
}

#[tokio::test]
async fn session_marks_broken_custom_rule_unavailable() {
    let session = ValidationSession::new();
    let rules = [custom_async(
        |_: Value| async { Err("promo service timed out".to_string()) },
        (),
    )];

    let done = session
        .validate_field("promo_code", &Value::from("SPRING"), &rules)
        .await;
    assert_eq!(
        done,
        Completion::Applied(Some(VALIDATION_UNAVAILABLE.to_string()))
    );
}

#[tokio::test]
async fn shipping_schema_from_config() {
    let schema = FieldSchema::from_json(
        r#"{
            "fields": [
                {"name": "name", "rules": [{"type": "required", "message": "Enter a recipient"}]},
                {"name": "zip", "rules": [
                    {"type": "required"},
                    {"type": "pattern", "pattern": "^\\d{5}(-\\d{4})?$", "message": "Enter a valid ZIP code"}
                ]},
                {"name": "phone", "rules": [{"type": "phone"}]},
                {"name": "delivery_date", "rules": [{"type": "date"}]}
            ]
        }"#,
    )
    .unwrap();
    let validator = PayloadValidator::from_schema(&schema).unwrap();

    let ok = serde_json::json!({
        "name": "Ada",
        "zip": "94107-1234",
        "phone": "+1 555 123 4567",
        "delivery_date": "2023-12-25"
    });
    assert_eq!(validator.validate(&ok).await, Ok(Ok(())));

    let bad = serde_json::json!({"zip": "9410", "delivery_date": "someday"});
    let errors = validator.validate(&bad).await.unwrap().unwrap_err();
    assert_eq!(errors.get("name").unwrap().message, "Enter a recipient");
    assert_eq!(errors.get("zip").unwrap().message, "Enter a valid ZIP code");
    assert!(errors.get("phone").is_none());
    assert_eq!(
        errors.get("delivery_date").unwrap().message,
        "Please enter a valid date"
    );
}
