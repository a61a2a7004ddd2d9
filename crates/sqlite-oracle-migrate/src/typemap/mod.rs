//! Type mapping between SQLite and Oracle.
//!
//! SQLite accepts any type name in a column declaration, so the mapping is
//! an ordered table of rules evaluated against the trimmed, upper-cased
//! declared type. The first rule that matches wins; the last rule always
//! matches, so mapping never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::traits::{TypeMapper, TypeMapping};

/// Target type used for undeclared, unbounded and unrecognized text.
pub const WIDE_TEXT: &str = "VARCHAR2(4000)";

/// SQLite → Oracle type mapper.
#[derive(Debug, Clone, Default)]
pub struct SqliteToOracleMapper;

impl SqliteToOracleMapper {
    /// Create a new SQLite to Oracle mapper.
    pub fn new() -> Self {
        Self
    }
}

impl TypeMapper for SqliteToOracleMapper {
    fn source_dialect(&self) -> &str {
        "sqlite"
    }

    fn target_dialect(&self) -> &str {
        "oracle"
    }

    fn map_type(&self, data_type: &str) -> TypeMapping {
        sqlite_to_oracle(data_type)
    }
}

/// Map a SQLite declared type to an Oracle column type.
pub fn sqlite_to_oracle(sqlite_type: &str) -> TypeMapping {
    let normalized = sqlite_type.trim().to_uppercase();

    for rule in TYPE_RULES {
        if let Some(mapping) = (rule.apply)(&normalized) {
            return mapping.with_rule(rule.name);
        }
    }

    // The fallback rule matches everything.
    fallback(&normalized).with_rule("fallback")
}

struct TypeRule {
    name: &'static str,
    apply: fn(&str) -> Option<TypeMapping>,
}

/// Mapping rules in priority order.
static TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        name: "empty",
        apply: |t| {
            t.is_empty()
                .then(|| TypeMapping::lossy(WIDE_TEXT, "no declared type, stored as text"))
        },
    },
    TypeRule {
        name: "native",
        apply: |t| {
            matches!(t, "DATE" | "TIMESTAMP" | "BLOB" | "CLOB" | "RAW")
                .then(|| TypeMapping::lossless(t))
        },
    },
    TypeRule {
        name: "number_params",
        apply: |t| precision_scale(&NUMBER_PARAMS, t),
    },
    TypeRule {
        name: "number",
        apply: |t| matches!(t, "NUMBER" | "NUMERIC").then(|| TypeMapping::lossless("NUMBER")),
    },
    TypeRule {
        name: "integer",
        apply: |t| {
            matches!(
                t,
                "INTEGER" | "INT" | "SMALLINT" | "BIGINT" | "TINYINT" | "MEDIUMINT"
            )
            .then(|| TypeMapping::lossless("NUMBER"))
        },
    },
    TypeRule {
        name: "float",
        apply: |t| {
            matches!(t, "REAL" | "FLOAT" | "DOUBLE" | "DOUBLE PRECISION").then(|| {
                TypeMapping::lossy("NUMBER", "binary floating point stored as decimal NUMBER")
            })
        },
    },
    TypeRule {
        name: "decimal_params",
        apply: |t| precision_scale(&DECIMAL_PARAMS, t),
    },
    TypeRule {
        name: "varchar2_params",
        apply: |t| sized(&VARCHAR2_PARAMS, t, "VARCHAR2"),
    },
    TypeRule {
        name: "varchar_params",
        apply: |t| sized(&VARCHAR_PARAMS, t, "VARCHAR2"),
    },
    TypeRule {
        name: "char_params",
        apply: |t| sized(&CHAR_PARAMS, t, "CHAR"),
    },
    TypeRule {
        name: "text",
        apply: |t| {
            matches!(t, "TEXT" | "VARCHAR" | "STRING" | "NVARCHAR" | "NTEXT")
                .then(|| TypeMapping::lossy(WIDE_TEXT, "unbounded text limited to 4000 bytes"))
        },
    },
    TypeRule {
        name: "char",
        apply: |t| (t == "CHAR").then(|| TypeMapping::lossless("CHAR(1)")),
    },
    TypeRule {
        name: "boolean",
        apply: |t| matches!(t, "BOOLEAN" | "BOOL").then(|| TypeMapping::lossless("NUMBER(1)")),
    },
    TypeRule {
        name: "datetime",
        apply: |t| (t == "DATETIME").then(|| TypeMapping::lossless("TIMESTAMP")),
    },
    TypeRule {
        name: "fallback",
        apply: |t| Some(fallback(t)),
    },
];

fn fallback(t: &str) -> TypeMapping {
    TypeMapping::lossy(WIDE_TEXT, format!("unrecognized type '{}' stored as text", t))
}

static NUMBER_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^NUMBER\s*\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").expect("valid regex"));

static DECIMAL_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^DECIMAL\s*\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").expect("valid regex"));

static VARCHAR2_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^VARCHAR2\s*\(\s*(\d+)\s*\)").expect("valid regex"));

static VARCHAR_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^VARCHAR\s*\(\s*(\d+)\s*\)").expect("valid regex"));

static CHAR_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CHAR\s*\(\s*(\d+)\s*\)").expect("valid regex"));

/// `NUMBER(p[,s])` from a `(p)(s)?` capture.
fn precision_scale(re: &Regex, t: &str) -> Option<TypeMapping> {
    let caps = re.captures(t)?;
    let precision = caps.get(1)?.as_str();
    let target = match caps.get(2) {
        Some(scale) => format!("NUMBER({},{})", precision, scale.as_str()),
        None => format!("NUMBER({})", precision),
    };
    Some(TypeMapping::lossless(target))
}

/// `<name>(n)` from a single size capture.
fn sized(re: &Regex, t: &str, target: &str) -> Option<TypeMapping> {
    let caps = re.captures(t)?;
    let size = caps.get(1)?.as_str();
    Some(TypeMapping::lossless(format!("{}({})", target, size)))
}
