use camprobe_iface::{FieldReadError, PropertyDescriptor, Value};

use crate::PropertyRecord;

/// Recorded in place of a field the descriptor does not carry.
pub const NOT_ACCESSIBLE: &str = "Not accessible";

/// Field names starting with this character are backend internals.
pub const RESERVED_PREFIX: char = '_';

/// Read every public field of a descriptor.
///
/// Unreadable fields are recorded, not dropped: a missing field becomes
/// [NOT_ACCESSIBLE] and any other failure becomes `"Error: <message>"`.
pub fn reflect_properties<D: PropertyDescriptor + ?Sized>(descriptor: &D) -> PropertyRecord {
    let mut record = PropertyRecord::new();
    for name in descriptor.field_names() {
        if name.starts_with(RESERVED_PREFIX) || record.contains_key(&name) {
            continue;
        }
        let value = match descriptor.field(&name) {
            Ok(value) => value,
            Err(FieldReadError::NotPresent) => Value::from(NOT_ACCESSIBLE),
            Err(FieldReadError::Failed(msg)) => Value::Text(format!("Error: {msg}")),
        };
        record.insert(name, Some(value));
    }
    record
}
