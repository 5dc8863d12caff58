use std::path::Path;

use crate::domain::WorkItem;
use crate::error::InputError;

/// Reads the work set from `path`, one `target,group,operation,variant` per line.
///
/// # Errors
///
/// Returns an error when the file cannot be read, a line does not have
/// exactly four non-empty fields, or the file holds no work items.
pub fn load_work_items(path: &Path) -> Result<Vec<WorkItem>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|err| InputError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    parse_work_items(path, &content)
}

/// Parses work-item lines; `path` is only used for error messages.
///
/// # Errors
///
/// Returns an error for malformed lines or when no items are present.
pub fn parse_work_items(path: &Path, content: &str) -> Result<Vec<WorkItem>, InputError> {
    let mut items = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index.saturating_add(1);
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [target, group, operation, variant] = fields.as_slice() else {
            return Err(InputError::WorkItemFieldCount {
                path: path.to_path_buf(),
                line: line_no,
                found: fields.len(),
            });
        };
        for (name, value) in [
            ("target", target),
            ("group", group),
            ("operation", operation),
            ("variant", variant),
        ] {
            if value.is_empty() {
                return Err(InputError::WorkItemEmptyField {
                    path: path.to_path_buf(),
                    line: line_no,
                    field: name,
                });
            }
        }
        items.push(WorkItem::new(
            (*target).to_owned(),
            (*group).to_owned(),
            (*operation).to_owned(),
            (*variant).to_owned(),
        ));
    }

    if items.is_empty() {
        return Err(InputError::WorkItemsEmpty {
            path: path.to_path_buf(),
        });
    }
    Ok(items)
}
