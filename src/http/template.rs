use std::collections::BTreeMap;

use crate::domain::WorkItem;

/// Placeholder values a trigger template can reference.
#[must_use]
pub fn work_item_vars(item: &WorkItem) -> BTreeMap<&'static str, &str> {
    BTreeMap::from([
        ("target", item.target_id.as_str()),
        ("group", item.group_id.as_str()),
        ("operation", item.operation_id.as_str()),
        ("variant", item.variant.as_str()),
    ])
}

/// Replaces every `{{ name }}` with its value. Unknown names and unterminated
/// braces are copied through unchanged.
#[must_use]
pub fn render_template(input: &str, vars: &BTreeMap<&'static str, &str>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some((before, after_open)) = rest.split_once("{{") {
        output.push_str(before);
        let Some((name, after_close)) = after_open.split_once("}}") else {
            output.push_str("{{");
            output.push_str(after_open);
            return output;
        };
        rest = after_close;
        let Some(value) = vars.get(name.trim()) else {
            output.push_str("{{");
            output.push_str(name);
            output.push_str("}}");
            continue;
        };
        output.push_str(value);
    }

    output.push_str(rest);
    output
}
