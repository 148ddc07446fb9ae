//! Path resolution inside a `serde_json::Value`
//!
//! Objects are addressed by key, arrays by numeric segment. Anything else is
//! a traversal error.

use serde_json::Value;

use crate::error::BindError;
use crate::path::Path;

/// Human name of a JSON value's type (for error messages).
pub fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_index(segment: &str, value: &Value, path: &Path) -> Result<usize, BindError> {
    segment.parse::<usize>().map_err(|_| BindError::InvalidTraversal {
        segment: segment.to_string(),
        value_type: value_type(value).to_string(),
        path: path.key(),
    })
}

fn step<'a>(current: &'a Value, segment: &str, path: &Path) -> Result<&'a Value, BindError> {
    let next = match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(parse_index(segment, current, path)?),
        other => {
            return Err(BindError::InvalidTraversal {
                segment: segment.to_string(),
                value_type: value_type(other).to_string(),
                path: path.key(),
            })
        }
    };
    next.ok_or_else(|| BindError::PathNotFound {
        path: path.key(),
        segment: segment.to_string(),
    })
}

fn step_mut<'a>(
    current: &'a mut Value,
    segment: &str,
    path: &Path,
) -> Result<&'a mut Value, BindError> {
    let index = if current.is_array() {
        Some(parse_index(segment, current, path)?)
    } else {
        None
    };
    let next = match current {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => index.and_then(|i| items.get_mut(i)),
        other => {
            return Err(BindError::InvalidTraversal {
                segment: segment.to_string(),
                value_type: value_type(other).to_string(),
                path: path.key(),
            })
        }
    };
    next.ok_or_else(|| BindError::PathNotFound {
        path: path.key(),
        segment: segment.to_string(),
    })
}

/// Borrow the value at `path`. The root path returns `value` itself.
pub fn resolve<'a>(value: &'a Value, path: &Path) -> Result<&'a Value, BindError> {
    path.segments()
        .iter()
        .try_fold(value, |current, segment| step(current, segment, path))
}

/// Assign `new_value` at `path`, mutating the containing object in place.
///
/// - root path: replaces `model`
/// - object container: inserts or replaces the key
/// - array container: replaces an existing index, or appends when the index
///   equals the length
pub fn assign(model: &mut Value, path: &Path, new_value: Value) -> Result<(), BindError> {
    let Some((last, init)) = path.segments().split_last() else {
        *model = new_value;
        return Ok(());
    };

    let mut container = model;
    for segment in init {
        container = step_mut(container, segment, path)?;
    }

    match container {
        Value::Object(map) => {
            map.insert(last.clone(), new_value);
            Ok(())
        }
        Value::Array(items) => {
            let index = last.parse::<usize>().map_err(|_| BindError::InvalidTraversal {
                segment: last.clone(),
                value_type: "array".to_string(),
                path: path.key(),
            })?;
            if index < items.len() {
                items[index] = new_value;
                Ok(())
            } else if index == items.len() {
                items.push(new_value);
                Ok(())
            } else {
                Err(BindError::PathNotFound {
                    path: path.key(),
                    segment: last.clone(),
                })
            }
        }
        other => Err(BindError::InvalidTraversal {
            segment: last.clone(),
            value_type: value_type(other).to_string(),
            path: path.key(),
        }),
    }
}

/// Every addressable path below the root, depth first.
///
/// Object keys follow the map's iteration order, array items their index.
pub fn addressable_paths(value: &Value) -> Vec<Path> {
    fn walk(value: &Value, prefix: &Path, out: &mut Vec<Path>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = prefix.child(key.as_str());
                    out.push(path.clone());
                    walk(child, &path, out);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    let path = prefix.child(index.to_string());
                    out.push(path.clone());
                    walk(child, &path, out);
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(value, &Path::root(), &mut out);
    out
}
