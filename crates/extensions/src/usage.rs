use ifs_index::Extension;
use std::fmt::Write;

const VALUE_INDENT: &str = "                 ";

/// Human-readable usage of an extension, as printed by `-x name:help`.
pub fn usage(extension: &dyn Extension) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = writeln!(out, "Extension {}", extension.name());
    let _ = writeln!(out, "{}", extension.description());
    let params = extension.params();
    if params.is_empty() {
        return out;
    }
    let _ = writeln!(out, "Parameters:");
    for param in params {
        let _ = writeln!(out, "  {:<14} {}", param.name, param.description);
        if let Some(values) = param.values {
            let _ = writeln!(out, "{VALUE_INDENT}Possible values:");
            for (value, description) in values {
                let _ = writeln!(out, "{VALUE_INDENT}  {value:<14} {description}");
            }
        }
        if let Some(default) = param.default {
            let _ = writeln!(out, "{VALUE_INDENT}Default value: {default}");
        }
    }
    out
}
