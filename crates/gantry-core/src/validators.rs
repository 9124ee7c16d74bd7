//! Field validators
//!
//! Pure predicates over single normalized values, each with a stable
//! violation code and message. Name rules follow the Kubernetes RFC 1123 /
//! RFC 1035 conventions. The engine runs a field's checks only after the
//! required/kind gates pass, so a wrong primitive type is reported as a type
//! violation, never as a panic here.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use url::Url;

use crate::kubeconfig::Kubeconfig;
use crate::schema::{Check, ObjectCheck};

static DNS1123_SUBDOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("static regex")
});

static DNS1123_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("static regex"));

static DNS1035_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("static regex"));

pub const DNS1123_SUBDOMAIN: Check = Check {
    code: "dns1123_subdomain",
    message: "must be a valid DNS subdomain (RFC 1123): lowercase alphanumeric characters, '-' or '.', max 253 characters",
    test: dns1123_subdomain,
};

pub const DNS1123_LABEL: Check = Check {
    code: "dns1123_label",
    message: "must be a valid DNS label (RFC 1123): lowercase alphanumeric characters or '-', max 63 characters",
    test: dns1123_label,
};

pub const DNS1035_LABEL: Check = Check {
    code: "dns1035_label",
    message: "must be a valid DNS label (RFC 1035): must start with a lowercase letter, followed by lowercase alphanumeric characters or '-', max 63 characters",
    test: dns1035_label,
};

pub const KUBECONFIG: Check = Check {
    code: "kubeconfig",
    message: "must be a valid kubeconfig file in YAML format with required fields (clusters, contexts, users)",
    test: kubeconfig,
};

pub const HTTP_URL: Check = Check {
    code: "http_url",
    message: "must be a valid HTTP or HTTPS URL",
    test: http_url,
};

pub const YAML_DOCUMENT: Check = Check {
    code: "yaml",
    message: "must be a valid YAML document",
    test: yaml_document,
};

pub const CRON_SCHEDULE: Check = Check {
    code: "cron_schedule",
    message: "must be a valid cron schedule expression",
    test: cron_schedule,
};

pub const PAGE_LIMIT: Check = Check {
    code: "page_limit",
    message: "must be between 1 and 250",
    test: page_limit,
};

pub const WORKSPACE_TYPE: Check = Check {
    code: "workspace_type",
    message: "must be one of: kubernetes",
    test: workspace_type,
};

pub const CONNECTION_TYPE: Check = Check {
    code: "connection_type",
    message: "must be one of: in-cluster, kubeconfig, local",
    test: connection_type,
};

/// A kubeconfig-backed connection must name the secret holding it.
pub const KUBECONFIG_SECRET_REQUIRED: ObjectCheck = ObjectCheck {
    code: "secret_required",
    message: "'secret' is required when connection type is 'kubeconfig'",
    test: kubeconfig_secret_required,
};

/// An output names its source exactly once: a literal value or a secret key.
pub const OUTPUT_SOURCE_EXCLUSIVE: ObjectCheck = ObjectCheck {
    code: "exactly_one",
    message: "exactly one of 'value', 'secretKeyRef' must be provided",
    test: output_source_exclusive,
};

pub fn is_dns1123_subdomain(value: &str) -> bool {
    !value.is_empty() && value.len() <= 253 && DNS1123_SUBDOMAIN_RE.is_match(value)
}

pub fn is_dns1123_label(value: &str) -> bool {
    !value.is_empty() && value.len() <= 63 && DNS1123_LABEL_RE.is_match(value)
}

pub fn is_dns1035_label(value: &str) -> bool {
    !value.is_empty() && value.len() <= 63 && DNS1035_LABEL_RE.is_match(value)
}

fn dns1123_subdomain(value: &JsonValue) -> bool {
    value.as_str().is_some_and(is_dns1123_subdomain)
}

fn dns1123_label(value: &JsonValue) -> bool {
    value.as_str().is_some_and(is_dns1123_label)
}

fn dns1035_label(value: &JsonValue) -> bool {
    value.as_str().is_some_and(is_dns1035_label)
}

fn kubeconfig(value: &JsonValue) -> bool {
    value.as_str().is_some_and(|text| {
        Kubeconfig::from_yaml(text)
            .map(|config| config.has_required_entries())
            .unwrap_or(false)
    })
}

fn http_url(value: &JsonValue) -> bool {
    value.as_str().is_some_and(|text| {
        Url::parse(text)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    })
}

fn yaml_document(value: &JsonValue) -> bool {
    // Parsed into a JSON value so that anything accepted here is guaranteed
    // to re-encode into the control plane's JSON wire form.
    value
        .as_str()
        .is_some_and(|text| serde_yaml::from_str::<JsonValue>(text).is_ok())
}

fn cron_schedule(value: &JsonValue) -> bool {
    value.as_str().is_some_and(|text| {
        // `cron::Schedule` wants a seconds field; standard five-field
        // expressions get one prepended.
        let expression = if text.split_whitespace().count() == 5 {
            format!("0 {text}")
        } else {
            text.to_string()
        };
        cron::Schedule::from_str(&expression).is_ok()
    })
}

fn page_limit(value: &JsonValue) -> bool {
    value.as_i64().is_some_and(|n| (1..=250).contains(&n))
}

fn workspace_type(value: &JsonValue) -> bool {
    matches!(value.as_str(), Some("kubernetes"))
}

fn connection_type(value: &JsonValue) -> bool {
    matches!(value.as_str(), Some("in-cluster" | "kubeconfig" | "local"))
}

fn kubeconfig_secret_required(object: &Map<String, JsonValue>) -> bool {
    match object.get("type").and_then(|v| v.as_str()) {
        Some("kubeconfig") => object.get("secret").is_some_and(|v| !v.is_null()),
        _ => true,
    }
}

fn output_source_exclusive(object: &Map<String, JsonValue>) -> bool {
    ["value", "secretKeyRef"]
        .iter()
        .filter(|key| object.get(**key).is_some_and(|v| !v.is_null()))
        .count()
        == 1
}
