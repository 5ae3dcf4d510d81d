use crate::{schema::CollectionId, stmt::Direction, Condition, Error, Result};

use indexmap::IndexMap;
use serde::Deserialize;

pub const DEFAULT_LIMIT: u64 = 100;
pub const DEFAULT_MAX_LIMIT: u64 = 1000;

/// A stored, parameterized query over one collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct View {
    #[serde(default)]
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub display_name: String,

    pub base_collection_id: CollectionId,

    /// Logical field names to return. `None` returns every readable field.
    #[serde(default)]
    pub projection: Option<Vec<String>>,

    #[serde(default)]
    pub filters: Condition,

    /// Applied in order. Empty sorts by `id` ascending.
    #[serde(default)]
    pub sorts: Vec<SortSpec>,

    /// Declared request parameters, by name.
    #[serde(default, alias = "params_schema")]
    pub params: IndexMap<String, ParamSpec>,

    #[serde(default = "default_limit")]
    pub default_limit: u64,

    #[serde(default = "default_max_limit")]
    pub max_limit: u64,

    /// Incremented on every definition change.
    #[serde(default = "default_version")]
    pub version: u64,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type", default)]
    pub ty: ParamType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    #[default]
    String,
    #[serde(alias = "int", alias = "integer", alias = "float")]
    Number,
    #[serde(alias = "bool")]
    Boolean,

    /// Overrides the request's page size.
    Limit,

    /// Overrides the request's page offset.
    Offset,

    /// Names a sortable field.
    SortField,

    /// `asc` / `desc`, or a boolean where `true` means descending.
    SortDirection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "StoredSort")]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Field(String),

    /// Field named by a request parameter, with the field to use when the
    /// parameter is absent.
    Param {
        name: String,
        fallback: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Fixed(Direction),
    Param { name: String, fallback: Direction },
}

/// Sort definition as persisted.
#[derive(Debug, Deserialize)]
struct StoredSort {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    desc: bool,
    #[serde(default)]
    is_param: bool,
    #[serde(default)]
    param_name: Option<String>,
    #[serde(default)]
    desc_is_param: bool,
    #[serde(default)]
    desc_param_name: Option<String>,
}

/// A view as persisted by the metadata store, with its definition parts as
/// JSON text columns.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub base_collection_id: String,
    #[serde(default)]
    pub projection_json: Option<String>,
    #[serde(default)]
    pub filters_json: Option<String>,
    #[serde(default)]
    pub sorts_json: Option<String>,
    #[serde(default)]
    pub params_schema_json: Option<String>,
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_max_limit() -> u64 {
    DEFAULT_MAX_LIMIT
}

fn default_version() -> u64 {
    1
}

fn default_true() -> bool {
    true
}

impl View {
    pub fn new(name: impl Into<String>, base_collection_id: impl Into<CollectionId>) -> View {
        let name = name.into();

        View {
            id: 0,
            display_name: name.clone(),
            name,
            base_collection_id: base_collection_id.into(),
            projection: None,
            filters: Condition::default(),
            sorts: vec![],
            params: IndexMap::new(),
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            version: 1,
            is_active: true,
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<View> {
        Ok(serde_json::from_value(value)?)
    }
}

impl ParamSpec {
    pub fn new(ty: ParamType) -> ParamSpec {
        ParamSpec {
            ty,
            required: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Limit => "limit",
            ParamType::Offset => "offset",
            ParamType::SortField => "sort_field",
            ParamType::SortDirection => "sort_direction",
        }
    }
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> SortSpec {
        SortSpec {
            key: SortKey::Field(field.into()),
            direction: SortDirection::Fixed(Direction::Asc),
        }
    }

    pub fn desc(field: impl Into<String>) -> SortSpec {
        SortSpec {
            key: SortKey::Field(field.into()),
            direction: SortDirection::Fixed(Direction::Desc),
        }
    }
}

impl TryFrom<StoredSort> for SortSpec {
    type Error = Error;

    fn try_from(stored: StoredSort) -> Result<SortSpec> {
        let key = if stored.is_param {
            SortKey::Param {
                name: stored.param_name.unwrap_or_else(|| "sort_field".into()),
                fallback: stored.field,
            }
        } else {
            SortKey::Field(
                stored
                    .field
                    .ok_or_else(|| Error::invalid_definition("sort is missing `field`"))?,
            )
        };

        let fixed = Direction::from_desc(stored.desc);

        let direction = if stored.desc_is_param {
            SortDirection::Param {
                name: stored.desc_param_name.unwrap_or_else(|| "sort_desc".into()),
                fallback: fixed,
            }
        } else {
            SortDirection::Fixed(fixed)
        };

        Ok(SortSpec { key, direction })
    }
}

impl TryFrom<ViewRecord> for View {
    type Error = Error;

    fn try_from(record: ViewRecord) -> Result<View> {
        fn parse<T: serde::de::DeserializeOwned + Default>(
            src: Option<&str>,
            part: &str,
        ) -> Result<T> {
            match src.map(str::trim) {
                None | Some("") | Some("null") => Ok(T::default()),
                Some(src) => serde_json::from_str(src)
                    .map_err(|err| Error::from(err).context(crate::err!("view {part}"))),
            }
        }

        let projection = parse(record.projection_json.as_deref(), "projection")?;
        let filters = match record.filters_json.as_deref().map(str::trim) {
            None | Some("") => Condition::default(),
            Some(src) => Condition::from_json_str(src)
                .map_err(|err| err.context(crate::err!("view filters")))?,
        };

        Ok(View {
            id: record.id,
            display_name: record.display_name,
            base_collection_id: CollectionId(record.base_collection_id),
            projection,
            filters,
            sorts: parse(record.sorts_json.as_deref(), "sorts")?,
            params: parse(record.params_schema_json.as_deref(), "params schema")?,
            default_limit: record.default_limit,
            max_limit: record.max_limit,
            version: record.version,
            is_active: record.is_active,
            name: record.name,
        })
    }
}
