use crate::PropertyRecord;

/// Columns that always come first, in this order.
pub const LEADING_FIELDS: [&str; 6] = [
    "name",
    "display_name",
    "description",
    "value",
    "maximum",
    "minimum",
];

/// Move the [LEADING_FIELDS] to the front, inserting `None` for any missing
/// one. All other fields follow in their original order.
pub fn reorder_fields(mut record: PropertyRecord) -> PropertyRecord {
    let mut reordered = PropertyRecord::with_capacity(record.len() + LEADING_FIELDS.len());
    for key in LEADING_FIELDS {
        let value = record.shift_remove(key).flatten();
        reordered.insert(key.to_string(), value);
    }
    reordered.extend(record);
    reordered
}
