//! Deterministic markdown rendering of a command's metadata, for the built-in `help` command.

use reqrep::{ArgumentShape, Metadata, TimeoutClass};

/// Renders one markdown-flavoured help entry for `metadata`: a bold header, the description, an
/// optional "can take a long time" note, and Arguments/Returns/Errors sections.
pub fn render(metadata: &Metadata) -> String {
    let mut out = format!("**{}**\n\n{}\n", metadata.name, metadata.description);

    if matches!(metadata.timeout, TimeoutClass::Long) {
        out.push_str("\nCan take a long time to run.\n");
    }

    out.push_str("\nArguments:\n");
    out.push_str(&render_arguments(&metadata.arguments));

    out.push_str(&format!("\nReturns: {}\n", metadata.returns));
    out.push_str(&format!("\nErrors: {}\n", metadata.errors));

    out
}

fn render_arguments(shape: &ArgumentShape) -> String {
    match shape {
        ArgumentShape::None => "None.\n".to_string(),
        ArgumentShape::VariableLength(descriptor) => format!(
            "- {}: {} (zero or more)\n",
            descriptor.name, descriptor.description
        ),
        ArgumentShape::List(items) => {
            if items.is_empty() {
                return "None.\n".to_string();
            }
            let mut out = String::new();
            for item in items {
                out.push_str(&format!("- {}: {}\n", item.name, item.description));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqrep::ArgumentDescriptor;

    fn base(timeout: TimeoutClass, arguments: ArgumentShape) -> Metadata {
        Metadata {
            name: "echo".into(),
            description: "Echoes back the given arguments.".into(),
            timeout,
            arguments,
            returns: "the same arguments, unchanged".into(),
            errors: "none".into(),
        }
    }

    #[test]
    fn renders_header_and_description() {
        let rendered = render(&base(TimeoutClass::Default, ArgumentShape::None));
        assert!(rendered.starts_with("**echo**\n\nEchoes back the given arguments.\n"));
    }

    #[test]
    fn long_timeout_adds_the_warning_line() {
        let rendered = render(&base(TimeoutClass::Long, ArgumentShape::None));
        assert!(rendered.contains("Can take a long time to run."));

        let rendered = render(&base(TimeoutClass::Default, ArgumentShape::None));
        assert!(!rendered.contains("Can take a long time to run."));
    }

    #[test]
    fn renders_each_argument_shape_variant() {
        let none = render(&base(TimeoutClass::Default, ArgumentShape::None));
        assert!(none.contains("Arguments:\nNone.\n"));

        let var = render(&base(
            TimeoutClass::Default,
            ArgumentShape::VariableLength(ArgumentDescriptor::new("x", "any")),
        ));
        assert!(var.contains("- x: any (zero or more)"));

        let list = render(&base(
            TimeoutClass::Default,
            ArgumentShape::List(vec![
                ArgumentDescriptor::new("a", "first"),
                ArgumentDescriptor::new("b", "second"),
            ]),
        ));
        assert!(list.contains("- a: first\n"));
        assert!(list.contains("- b: second\n"));
    }

    #[test]
    fn renders_returns_and_errors_sections() {
        let rendered = render(&base(TimeoutClass::Default, ArgumentShape::None));
        assert!(rendered.contains("Returns: the same arguments, unchanged"));
        assert!(rendered.contains("Errors: none"));
    }
}
