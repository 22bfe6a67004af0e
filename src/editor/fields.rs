use crate::document::{FieldPath, Node, ParamMap, ParamValue, PathSegment};
use crate::error::EditError;

/// Identifies the node and path being edited so failures can name both.
pub(super) struct FieldCtx<'a> {
    pub(super) id: &'a str,
    pub(super) path: &'a FieldPath,
}

impl FieldCtx<'_> {
    fn path(&self) -> String {
        self.path.to_string()
    }

    pub(super) fn not_found(&self) -> EditError {
        EditError::FieldNotFound {
            id: self.id.to_string(),
            path: self.path(),
        }
    }

    fn not_a_container(&self, found: &'static str) -> EditError {
        EditError::NotAContainer {
            id: self.id.to_string(),
            path: self.path(),
            found,
        }
    }

    pub(super) fn not_a_sequence(&self, found: &'static str) -> EditError {
        EditError::NotASequence {
            id: self.id.to_string(),
            path: self.path(),
            found,
        }
    }

    pub(super) fn not_a_string(&self, found: &'static str) -> EditError {
        EditError::NotAString {
            id: self.id.to_string(),
            path: self.path(),
            found,
        }
    }

    pub(super) fn out_of_bounds(&self, index: usize, len: usize) -> EditError {
        EditError::IndexOutOfBounds {
            id: self.id.to_string(),
            path: self.path(),
            index,
            len,
        }
    }

    fn invalid_value(&self, expected: &'static str, value: &ParamValue) -> EditError {
        EditError::InvalidValue {
            path: self.path(),
            expected,
            found: value.type_name(),
        }
    }

    fn not_editable_in_place(&self) -> EditError {
        EditError::InvalidFieldPath {
            path: self.path(),
            reason: "core node fields cannot be edited in place".to_string(),
        }
    }
}

/// Writes `value` at `path` on `node`, creating intermediate mappings as needed.
///
/// Core fields (`id`, `name`, `type`, `position`, `parameters`) are type-checked; every
/// other top-level key lands in the node's pass-through map.
pub(super) fn assign(node: &mut Node, path: &FieldPath, value: ParamValue) -> Result<(), EditError> {
    let ctx = FieldCtx { id: &node.id, path };
    let rest = path.rest();

    match path.root() {
        "id" | "name" | "type" | "position" if !rest.is_empty() => {
            Err(ctx.not_a_container(scalar_kind(path.root())))
        }
        root @ ("id" | "name" | "type") => {
            let ParamValue::String(text) = value else {
                return Err(ctx.invalid_value("string", &value));
            };
            match root {
                "id" => node.id = text,
                "name" => node.name = text,
                _ => node.node_type = text,
            }
            Ok(())
        }
        "position" => match &value {
            ParamValue::Sequence(items) => match items.as_slice() {
                [ParamValue::Number(x), ParamValue::Number(y)] => {
                    node.position = Some([x.clone(), y.clone()]);
                    Ok(())
                }
                _ => Err(ctx.invalid_value("pair of numbers", &value)),
            },
            _ => Err(ctx.invalid_value("pair of numbers", &value)),
        },
        "parameters" if rest.is_empty() => match value {
            ParamValue::Mapping(map) => {
                node.parameters = map;
                Ok(())
            }
            other => Err(ctx.invalid_value("mapping", &other)),
        },
        "parameters" => assign_in_map(&mut node.parameters, rest, value, &ctx),
        _ => assign_in_map(&mut node.extra, path.segments(), value, &ctx),
    }
}

fn scalar_kind(root: &str) -> &'static str {
    if root == "position" { "sequence" } else { "string" }
}

fn assign_in_map(
    map: &mut ParamMap,
    segments: &[PathSegment],
    value: ParamValue,
    ctx: &FieldCtx<'_>,
) -> Result<(), EditError> {
    let Some((PathSegment::Key(key), rest)) = segments.split_first() else {
        return Err(ctx.not_a_sequence("mapping"));
    };
    if rest.is_empty() {
        map.insert(key.clone(), value);
        return Ok(());
    }
    if !map.contains_key(key) {
        // Sequences cannot be conjured up from an index, only mappings from a key.
        if matches!(rest.first(), Some(PathSegment::Index(_))) {
            return Err(ctx.not_found());
        }
        map.insert(key.clone(), ParamValue::Mapping(ParamMap::new()));
    }
    match map.get_mut(key) {
        Some(slot) => assign_in_value(slot, rest, value, ctx),
        None => Err(ctx.not_found()),
    }
}

fn assign_in_value(
    target: &mut ParamValue,
    segments: &[PathSegment],
    value: ParamValue,
    ctx: &FieldCtx<'_>,
) -> Result<(), EditError> {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };
    match head {
        PathSegment::Key(_) => {
            if target.is_null() {
                *target = ParamValue::Mapping(ParamMap::new());
            }
            match target {
                ParamValue::Mapping(map) => assign_in_map(map, segments, value, ctx),
                other => Err(ctx.not_a_container(other.type_name())),
            }
        }
        PathSegment::Index(index) => match target {
            ParamValue::Sequence(items) => {
                let len = items.len();
                let slot = items
                    .get_mut(*index)
                    .ok_or_else(|| ctx.out_of_bounds(*index, len))?;
                assign_in_value(slot, rest, value, ctx)
            }
            other => Err(ctx.not_a_container(other.type_name())),
        },
    }
}

/// Resolves `path` to a mutable value inside the node's parameter bag or pass-through map.
pub(super) fn value_mut<'a>(
    node: &'a mut Node,
    path: &FieldPath,
    ctx: &FieldCtx<'_>,
) -> Result<&'a mut ParamValue, EditError> {
    let (map, segments) = match path.root() {
        "id" | "name" | "type" | "position" => return Err(ctx.not_editable_in_place()),
        "parameters" if path.rest().is_empty() => return Err(ctx.not_editable_in_place()),
        "parameters" => (&mut node.parameters, path.rest()),
        _ => (&mut node.extra, path.segments()),
    };

    let Some((PathSegment::Key(key), rest)) = segments.split_first() else {
        return Err(ctx.not_a_sequence("mapping"));
    };
    let mut current = map.get_mut(key).ok_or_else(|| ctx.not_found())?;
    for segment in rest {
        current = match (segment, current) {
            (PathSegment::Key(key), ParamValue::Mapping(map)) => {
                map.get_mut(key).ok_or_else(|| ctx.not_found())?
            }
            (PathSegment::Index(index), ParamValue::Sequence(items)) => {
                let len = items.len();
                items
                    .get_mut(*index)
                    .ok_or_else(|| ctx.out_of_bounds(*index, len))?
            }
            (_, other) => return Err(ctx.not_a_container(other.type_name())),
        };
    }
    Ok(current)
}
