//! Declarative request schemas
//!
//! Request shapes are described as explicit descriptor trees: fields with a
//! kind, a required marker, and a list of constraint checks; unions list
//! their mutually exclusive branches and an exclusivity rule. One generic
//! engine (see `engine`) interprets every schema, so validation logic is
//! never scattered across request types.

use std::fmt;

use serde_json::{Map, Value as JsonValue};

/// How many branches of a union may be populated at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusivity {
    ExactlyOne,
    AtMostOne,
    AtLeastOne,
}

impl Exclusivity {
    /// Stable violation code emitted when the rule is broken.
    pub fn code(self) -> &'static str {
        match self {
            Exclusivity::ExactlyOne => "exactly_one",
            Exclusivity::AtMostOne => "at_most_one",
            Exclusivity::AtLeastOne => "at_least_one",
        }
    }
}

/// A pure predicate over a single normalized value, with a stable violation
/// code and message. Checks never mutate their input and never panic on
/// unexpected value types.
#[derive(Clone, Copy)]
pub struct Check {
    pub code: &'static str,
    pub message: &'static str,
    pub test: fn(&JsonValue) -> bool,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("code", &self.code).finish()
    }
}

/// A cross-field constraint over one object, scoped to the object's path
/// (e.g. "secret is required when connection type is kubeconfig").
#[derive(Clone, Copy)]
pub struct ObjectCheck {
    pub code: &'static str,
    pub message: &'static str,
    pub test: fn(&Map<String, JsonValue>) -> bool,
}

impl fmt::Debug for ObjectCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCheck")
            .field("code", &self.code)
            .finish()
    }
}

/// Value kind expected at a field. Drives primitive coercion and descent.
#[derive(Debug, Clone)]
pub enum Kind {
    String,
    Integer,
    Boolean,
    /// Free-form JSON object, accepted as-is.
    Map,
    /// Nested object with its own fields and cross-field checks.
    Object(Schema),
    /// Array of values of the inner kind. Field checks apply per item.
    List(Box<Kind>),
    /// Mutually exclusive branches inside one object.
    Union(UnionSchema),
}

/// Union descriptor: named branches plus the exclusivity rule over them.
#[derive(Debug, Clone)]
pub struct UnionSchema {
    pub rule: Exclusivity,
    pub branches: Vec<Field>,
}

impl UnionSchema {
    pub fn new(rule: Exclusivity, branches: Vec<Field>) -> Self {
        Self { rule, branches }
    }

    pub fn branch_names(&self) -> Vec<&'static str> {
        self.branches.iter().map(|b| b.name).collect()
    }
}

/// One field descriptor.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub required: bool,
    /// Explicit JSON null is tolerated and preserved, so update requests can
    /// distinguish "clear this field" from "leave it alone".
    pub nullable: bool,
    pub checks: Vec<Check>,
}

impl Field {
    pub fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
            checks: Vec::new(),
        }
    }

    pub fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
            checks: Vec::new(),
        }
    }

    /// Optional and clearable: explicit null survives validation.
    pub fn nullable(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: true,
            checks: Vec::new(),
        }
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

/// A named request shape: ordered fields plus object-level checks.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub fields: Vec<Field>,
    pub checks: Vec<ObjectCheck>,
}

impl Schema {
    pub fn new(name: &'static str, fields: Vec<Field>) -> Self {
        Self {
            name,
            fields,
            checks: Vec::new(),
        }
    }

    pub fn check(mut self, check: ObjectCheck) -> Self {
        self.checks.push(check);
        self
    }
}
