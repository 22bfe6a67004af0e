use super::path::{FieldPath, PathSegment};
use super::value::{ParamMap, ParamValue};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

const PARAMETERS_KEY: &str = "parameters";
const ID_KEY: &str = "id";
const NAME_KEY: &str = "name";
const TYPE_KEY: &str = "type";
const POSITION_KEY: &str = "position";

/// A single node of the workflow graph.
///
/// `id` is the stable identifier used to locate a node for editing. `name` is the display
/// name and the key the connection map uses, so renaming a node changes its wiring while
/// changing its id does not.
///
/// A loaded node is written back with its keys in the order they were read. Keys it did not
/// have when loaded follow in the order `parameters, id, name, type`, pass-through keys,
/// `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub parameters: ParamMap,
    pub id: String,
    pub name: String,
    pub node_type: String,
    /// Node keys this crate does not interpret (`typeVersion`, `credentials`, ...).
    pub extra: ParamMap,
    /// Editor canvas coordinates. Never read by any graph logic.
    pub position: Option<[Number; 2]>,
    /// Key order as loaded. Empty for nodes built in code.
    pub(crate) layout: Vec<String>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            parameters: ParamMap::new(),
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            extra: ParamMap::new(),
            position: None,
            layout: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_position(mut self, x: i64, y: i64) -> Self {
        self.position = Some([x.into(), y.into()]);
        self
    }

    /// Reads the value at `path`, returning `None` when any step is missing.
    pub fn field(&self, path: &FieldPath) -> Option<ParamValue> {
        match path.root() {
            "id" | "name" | "type" if !path.rest().is_empty() => None,
            "id" => Some(ParamValue::String(self.id.clone())),
            "name" => Some(ParamValue::String(self.name.clone())),
            "type" => Some(ParamValue::String(self.node_type.clone())),
            "position" => {
                let [x, y] = self.position.clone()?;
                let coords = ParamValue::Sequence(vec![ParamValue::Number(x), ParamValue::Number(y)]);
                lookup(&coords, path.rest()).cloned()
            }
            "parameters" if path.rest().is_empty() => {
                Some(ParamValue::Mapping(self.parameters.clone()))
            }
            "parameters" => lookup_in_map(&self.parameters, path.rest()).cloned(),
            _ => lookup_in_map(&self.extra, path.segments()).cloned(),
        }
    }

    /// Shortcut for reading a string field, such as an embedded code snippet.
    pub fn string_field(&self, path: &FieldPath) -> Option<String> {
        match self.field(path)? {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }
}

fn lookup_in_map<'a>(map: &'a ParamMap, segments: &[PathSegment]) -> Option<&'a ParamValue> {
    let (head, rest) = segments.split_first()?;
    match head {
        PathSegment::Key(key) => lookup(map.get(key)?, rest),
        PathSegment::Index(_) => None,
    }
}

fn lookup<'a>(value: &'a ParamValue, segments: &[PathSegment]) -> Option<&'a ParamValue> {
    segments.iter().try_fold(value, |current, segment| match (segment, current) {
        (PathSegment::Key(key), ParamValue::Mapping(map)) => map.get(key),
        (PathSegment::Index(index), ParamValue::Sequence(items)) => items.get(*index),
        _ => None,
    })
}

impl Node {
    fn in_layout(&self, key: &str) -> bool {
        self.layout.iter().any(|k| k == key)
    }

    fn write_entry<M: SerializeMap>(&self, map: &mut M, key: &str) -> Result<(), M::Error> {
        match key {
            PARAMETERS_KEY => map.serialize_entry(key, &self.parameters),
            ID_KEY => map.serialize_entry(key, &self.id),
            NAME_KEY => map.serialize_entry(key, &self.name),
            TYPE_KEY => map.serialize_entry(key, &self.node_type),
            POSITION_KEY => match &self.position {
                Some(position) => map.serialize_entry(key, position),
                None => Ok(()),
            },
            other => match self.extra.get(other) {
                Some(value) => map.serialize_entry(other, value),
                None => Ok(()),
            },
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for key in &self.layout {
            self.write_entry(&mut map, key)?;
        }

        let canonical = [PARAMETERS_KEY, ID_KEY, NAME_KEY, TYPE_KEY]
            .into_iter()
            .chain(self.extra.keys().map(String::as_str))
            .chain([POSITION_KEY]);
        for key in canonical {
            if self.in_layout(key) {
                continue;
            }
            // A loaded node without a parameter bag stays without one until it gets parameters.
            if key == PARAMETERS_KEY && self.parameters.is_empty() && !self.layout.is_empty() {
                continue;
            }
            self.write_entry(&mut map, key)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Map::deserialize(deserializer)?;
        let layout: Vec<String> = raw.keys().cloned().collect();

        let mut parameters = None;
        let mut id = None;
        let mut name = None;
        let mut node_type = None;
        let mut position = None;
        let mut extra = ParamMap::new();
        for (key, value) in raw {
            match key.as_str() {
                PARAMETERS_KEY => parameters = Some(value),
                ID_KEY => id = Some(value),
                NAME_KEY => name = Some(value),
                TYPE_KEY => node_type = Some(value),
                POSITION_KEY => position = Some(value),
                _ => {
                    extra.insert(key, ParamValue::from(value));
                }
            }
        }

        Ok(Self {
            parameters: parameter_bag(parameters)?,
            id: required_string(id, ID_KEY)?,
            name: required_string(name, NAME_KEY)?,
            node_type: required_string(node_type, TYPE_KEY)?,
            extra,
            position: coordinates(position)?,
            layout,
        })
    }
}

fn required_string<E: de::Error>(value: Option<Value>, key: &'static str) -> Result<String, E> {
    match value {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(E::custom(format!(
            "`{}` must be a string, found a {}",
            key,
            ParamValue::from(other).type_name()
        ))),
        None => Err(E::missing_field(key)),
    }
}

fn parameter_bag<E: de::Error>(value: Option<Value>) -> Result<ParamMap, E> {
    match value.map(ParamValue::from) {
        None | Some(ParamValue::Null) => Ok(ParamMap::new()),
        Some(ParamValue::Mapping(map)) => Ok(map),
        Some(other) => Err(E::custom(format!(
            "`parameters` must be a mapping, found a {}",
            other.type_name()
        ))),
    }
}

fn coordinates<E: de::Error>(value: Option<Value>) -> Result<Option<[Number; 2]>, E> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => match <[Value; 2]>::try_from(items) {
            Ok([Value::Number(x), Value::Number(y)]) => Ok(Some([x, y])),
            _ => Err(E::custom("`position` must be a pair of numbers")),
        },
        Some(_) => Err(E::custom("`position` must be a pair of numbers")),
    }
}
