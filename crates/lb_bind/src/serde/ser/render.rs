use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;

use crate::blueprint::{Features, Session};
use crate::error::BindError;
use crate::ext::WriteContext;
use crate::introspect::{Direction, ObjectDefinition};
use crate::locate::{DispatchTag, ValueWriter};
use crate::serde::property_type;
use crate::types::{DeclaredType, ResolvedType};
use crate::value::{ObjectRef, Value, date_to_value, identifier_to_text};

/// Renders `value` with the writer of its type.
///
/// Objects are written by their runtime class. Other values use the
/// declared type when it names a concrete class, else their natural type.
pub(crate) fn render<'v>(
    session: &Session,
    value: Value<'v>,
    declared: Option<&ResolvedType>,
) -> Result<Value<'v>, BindError> {
    let ty = match &value {
        Value::Null => return Ok(Value::Null),
        Value::Object(obj) => session.locator().object_type(obj, declared)?,
        data => match declared {
            Some(ty) if session.classify(ty).is_ok_and(|tag| tag != DispatchTag::Unknown) => {
                ty.resolved()
            }
            _ => {
                let natural = data
                    .natural_type()
                    .unwrap_or_else(|| DeclaredType::class("Object"));
                session.blueprint().resolve(&natural)?
            }
        },
    };
    let writer = session.writer_for(&ty)?;
    render_with(session, &writer, &ty, value)
}

/// Renders `value` of type `ty` with `writer`.
pub(crate) fn render_with<'v>(
    session: &Session,
    writer: &ValueWriter,
    ty: &ResolvedType,
    value: Value<'v>,
) -> Result<Value<'v>, BindError> {
    match writer {
        ValueWriter::Custom(custom) => {
            let out = custom.write(&WriteContext::new(session), ty, value)?;
            render_builtin(session, out)
        }
        ValueWriter::Standard(tag) => render_standard(session, *tag, ty, value),
        ValueWriter::Sequence => render_sequence(session, ty, value),
        ValueWriter::Map => render_map(session, ty, value),
        ValueWriter::Object(def) => render_object(session, def, ty, value),
        ValueWriter::Enum(def) => render_enum(session, def, value),
        ValueWriter::Tree => {
            let node = session.blueprint().pipeline().tree_codec().write(value)?;
            render_data(session, node)
        }
        ValueWriter::Any => match value {
            Value::Object(_) => Err(BindError::handler(
                ty.class_name(),
                "objects of this class have no writer",
            )),
            data => render_data(session, data),
        },
    }
}

/// Renders what a custom writer returned, with built-in handling only at
/// this level so that a writer returning its own input does not loop.
fn render_builtin<'v>(session: &Session, value: Value<'v>) -> Result<Value<'v>, BindError> {
    let Value::Object(obj) = &value else {
        return render_data(session, value);
    };
    let ty = session.locator().object_type(obj, None)?;
    let writer = session.locator().builtin_writer(&ty)?;
    render_with(session, &writer, &ty, value)
}

/// Renders the contents of plain data, leaving scalars as they are.
fn render_data<'v>(session: &Session, value: Value<'v>) -> Result<Value<'v>, BindError> {
    match value {
        Value::Seq(items) => render_items(session, items, None),
        Value::Map(entries) => render_entries(session, entries, None, None),
        Value::Object(_) => render(session, value, None),
        data => Ok(data),
    }
}

fn render_items<'v>(
    session: &Session,
    items: Vec<Value<'v>>,
    element: Option<&ResolvedType>,
) -> Result<Value<'v>, BindError> {
    items
        .into_iter()
        .map(|item| render(session, item, element))
        .collect::<Result<_, _>>()
        .map(Value::Seq)
}

fn render_entries<'v>(
    session: &Session,
    entries: Vec<(Value<'v>, Value<'v>)>,
    key: Option<&ResolvedType>,
    value: Option<&ResolvedType>,
) -> Result<Value<'v>, BindError> {
    entries
        .into_iter()
        .map(|(k, v)| Ok((render(session, k, key)?, render(session, v, value)?)))
        .collect::<Result<_, BindError>>()
        .map(Value::Map)
}

// -----------------------------------------------------------------------------
// Built-in writers

fn render_standard<'v>(
    session: &Session,
    tag: DispatchTag,
    ty: &ResolvedType,
    value: Value<'v>,
) -> Result<Value<'v>, BindError> {
    match value {
        Value::Object(obj) => {
            let data = match tag {
                DispatchTag::Date => date_to_value(obj.as_any()),
                DispatchTag::Identifier => identifier_to_text(obj.as_any()).map(Value::text),
                _ => None,
            };
            data.ok_or_else(|| {
                BindError::handler(ty.class_name(), format!("cannot write an object as {tag:?}"))
            })
        }
        Value::Seq(items)
            if tag == DispatchTag::ByteArray && items.iter().all(|v| matches!(v, Value::U8(_))) =>
        {
            let bytes = items
                .into_iter()
                .filter_map(|v| match v {
                    Value::U8(b) => Some(b),
                    _ => None,
                })
                .collect::<Vec<u8>>();
            Ok(Value::Bytes(bytes.into()))
        }
        Value::Seq(items)
            if tag == DispatchTag::CharArray && items.iter().all(|v| matches!(v, Value::Char(_))) =>
        {
            let text = items
                .into_iter()
                .filter_map(|v| match v {
                    Value::Char(c) => Some(c),
                    _ => None,
                })
                .collect::<String>();
            Ok(Value::text(text))
        }
        data => render_data(session, data),
    }
}

fn render_sequence<'v>(
    session: &Session,
    ty: &ResolvedType,
    value: Value<'v>,
) -> Result<Value<'v>, BindError> {
    let element = match ty.element() {
        Some(element) => Some(element.resolved()),
        None => parameter(ty, "Collection", 0),
    };
    match value {
        Value::Seq(items) => render_items(session, items, element.as_ref()),
        data => render_data(session, data),
    }
}

fn render_map<'v>(
    session: &Session,
    ty: &ResolvedType,
    value: Value<'v>,
) -> Result<Value<'v>, BindError> {
    let key = parameter(ty, "Map", 0);
    let item = parameter(ty, "Map", 1);
    match value {
        Value::Map(entries) => render_entries(session, entries, key.as_ref(), item.as_ref()),
        data => render_data(session, data),
    }
}

fn render_object<'v>(
    session: &Session,
    def: &ObjectDefinition,
    ty: &ResolvedType,
    value: Value<'v>,
) -> Result<Value<'v>, BindError> {
    match value {
        Value::Object(ObjectRef::Borrowed(target)) => object_entries(session, def, ty, target),
        Value::Object(ObjectRef::Owned(target)) => {
            Ok(object_entries(session, def, ty, &*target)?.into_static()?)
        }
        data => render_data(session, data),
    }
}

fn object_entries<'t>(
    session: &Session,
    def: &ObjectDefinition,
    ty: &ResolvedType,
    target: &'t dyn Any,
) -> Result<Value<'t>, BindError> {
    let write_nulls = session
        .blueprint()
        .features()
        .contains(Features::WRITE_NULL_PROPERTIES);
    let class = def.class().name();
    let mut entries = Vec::with_capacity(def.len());
    for property in def.properties() {
        let value = property
            .get(target)
            .map_err(|e| BindError::access(class, property.name(), e))?;
        if value.is_null() && !write_nulls {
            continue;
        }
        let declared = property_type(session, ty, property, Direction::Write)?;
        let value = render(session, value, Some(&declared))?;
        entries.push((Value::Text(property.name_cow().clone()), value));
    }
    Ok(Value::Map(entries))
}

fn render_enum<'v>(
    session: &Session,
    def: &ObjectDefinition,
    value: Value<'v>,
) -> Result<Value<'v>, BindError> {
    let Value::Object(obj) = &value else {
        return render_data(session, value);
    };
    let class = def.class();
    let unknown = |constant: &str| BindError::UnknownConstant {
        class: class.name().to_string(),
        constant: constant.to_string(),
    };
    let ordinal = class
        .enum_access()
        .and_then(|access| access.ordinal(obj.as_any()))
        .ok_or_else(|| unknown("?"))?;
    if session
        .blueprint()
        .features()
        .contains(Features::WRITE_ENUMS_USING_INDEX)
    {
        return Ok(Value::U64(ordinal as u64));
    }
    def.constant(ordinal)
        .map(|constant| Value::Text(constant.name_cow().clone()))
        .ok_or_else(|| unknown(&ordinal.to_string()))
}

/// The `index`th type argument `ty` supplies to its ancestor `class`.
fn parameter(ty: &ResolvedType, class: &str, index: usize) -> Option<ResolvedType> {
    ty.type_parameters_for(class)
        .and_then(|bindings| bindings.get(index).map(ResolvedType::resolved))
}
